//! Kernel utilities shared across slices.
//! Keep this crate lightweight: configuration loading, id guards and key generation.
//!
//! ## Key generation
//! Use `safe_nanoid!` for URL-safe, unambiguous record keys:
//! ```rust
//! # use cplan_kernel::safe_nanoid;
//! let key = safe_nanoid!();
//! assert_eq!(key.len(), 12);
//! ```
//!
//! ## Configuration
//! ```rust,no_run
//! use cplan_kernel::config::ConfigProvider;
//!
//! let cfg = ConfigProvider::new().load().expect("JWT_SECRET and GOOGLE_CLIENT_SECRET are set");
//! println!("{}", cfg.database.target());
//! ```
pub mod config;
pub mod security;

// Alphabet excludes visually ambiguous characters (I, O, l, 0, 1).
pub const SAFE_ALPHABET: &[char; 55] = &[
    '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L',
    'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f',
    'g', 'h', 'j', 'k', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

pub use cplan_domain as domain;
pub use nanoid::nanoid;

/// Generates an unambiguous `NanoID` (no visually confusing characters).
#[macro_export]
macro_rules! safe_nanoid {
    () => {
        $crate::nanoid!(12, $crate::SAFE_ALPHABET)
    };
    ($size:expr) => {
        $crate::nanoid!($size, $crate::SAFE_ALPHABET)
    };
}

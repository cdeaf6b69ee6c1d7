#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the course planner crates.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! cplan-derive.workspace = true
//! thiserror.workspace = true
//! ```
//!
//! The generated code refers to `::thiserror`, so consumers must depend on it directly.

mod error;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for defining crate-level error enums.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` unless already present.
/// * **Context Support**: Generates a companion `<Name>Ext` trait that adds `.context()`
///   to any `Result` that can be converted into this error type.
/// * **Standard Conversions**: Implements `From<T>` for variants containing a source field,
///   so `?` lifts upstream errors.
/// * **Internal Fallback**: Implements `From<&'static str>` and `From<String>` when an
///   `Internal` variant is present.
/// * **Kind**: Generates `kind()`, the `snake_case` variant name, for structured log fields.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum** with named-field variants.
/// 2. Variants that support context carry a `context: Option<Cow<'static, str>>` field.
/// 3. Variants wrapping upstream errors carry a `source` field (or one marked
///    `#[source]`/`#[from]`) and must also carry `context`.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[cplan_derive::planner_error]
/// pub enum StoreError {
///     #[error("Store I/O error{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal store error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read() -> Result<Vec<u8>, StoreError> {
///     Ok(std::fs::read("plans.json").context("Reading plan export")?)
/// }
/// ```
#[proc_macro_attribute]
pub fn planner_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    error::expand(input).into()
}

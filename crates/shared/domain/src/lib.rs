//! # Domain Models
//!
//! Pure data types for the course planner with minimal dependencies (`serde`, `serde_json`,
//! `zeroize`). Keep it lean: no I/O, networking, or validation workflows. Just data and
//! simple helpers.

pub mod config;
pub mod constants;
pub mod ids;
pub mod plan;
pub mod secret;

pub use ids::{PlanId, Record, SchoolId, UserId};
pub use plan::{Plan, PlanDraft, PlanPatch};
pub use secret::Secret;

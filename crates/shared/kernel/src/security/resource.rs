use cplan_domain::ids::IdError;
use cplan_domain::Record;
use std::borrow::Cow;

#[cplan_derive::planner_error]
pub enum ResourceGuardError {
    #[error("Resource validation error{}: {source}", format_context(.context))]
    Validation { source: IdError, context: Option<Cow<'static, str>> },
}

/// Checks raw ids coming from callers before they reach a store.
#[derive(Debug)]
pub struct ResourceGuard;

impl ResourceGuard {
    /// Parses a caller-supplied id for the table of `R`.
    ///
    /// Prevents "ID Spoofing" where a caller provides an id from a different table
    /// (e.g., a `school:` id where a `user:` owner is expected). Bare keys are accepted
    /// and scoped to the expected table.
    ///
    /// # Errors
    /// Returns an error if the id is empty, malformed, or names another table.
    pub fn verify<R: Record>(id: impl AsRef<str>) -> Result<R, ResourceGuardError> {
        let raw = id.as_ref();
        R::parse(raw).map_err(|source| {
            tracing::debug!(table = R::TABLE, %source, "Rejected record id");
            ResourceGuardError::Validation { source, context: Some(Cow::Borrowed(R::TABLE)) }
        })
    }
}

use cplan_database::DatabaseError;
use cplan_kernel::security::resource::ResourceGuardError;
use std::borrow::Cow;

/// A specialized [`PlanError`] enum of this crate.
#[cplan_derive::planner_error]
pub enum PlanError {
    /// A required field is absent or empty.
    #[error("Invalid plan{}: `{field}` {message}", format_context(.context))]
    Validation {
        field: &'static str,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },

    /// No plan with the requested id.
    #[error("Plan not found{}: {id}", format_context(.context))]
    NotFound { id: String, context: Option<Cow<'static, str>> },

    #[error("Plan storage error{}: {source}", format_context(.context))]
    Database { source: DatabaseError, context: Option<Cow<'static, str>> },

    /// A schema-less field could not be encoded or a stored one no longer decodes.
    #[error("Plan codec error{}: {source}", format_context(.context))]
    Codec { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Plan id error{}: {source}", format_context(.context))]
    Id { source: ResourceGuardError, context: Option<Cow<'static, str>> },
}

impl PlanError {
    pub(crate) fn invalid(field: &'static str, message: &'static str) -> Self {
        Self::Validation { field, message: Cow::Borrowed(message), context: None }
    }
}

//! Write-side checks applied before anything reaches the store.
//!
//! A plan needs a title with at least one non-whitespace character and an owner.
//! An absent title and an empty one produce the same error. Every other field is
//! accepted as given.

use crate::error::PlanError;
use cplan_domain::plan::Document;
use cplan_domain::{Plan, PlanDraft, PlanId, PlanPatch, SchoolId, UserId};
use serde_json::Value;

const EMPTY_TITLE: &str = "must not be empty";
const MISSING_USER: &str = "is required";

/// Validation entry point for write payloads.
pub trait Validate {
    type Output;

    /// # Errors
    /// Returns [`PlanError::Validation`] naming the first offending field.
    fn validate(self) -> Result<Self::Output, PlanError>;
}

/// A draft that passed validation; the only way to obtain one is [`Validate::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidPlan {
    title: String,
    details: Option<String>,
    tags: Vec<Value>,
    years: Option<Document>,
    colorscheme: Option<Document>,
    public: Option<bool>,
    school: Option<SchoolId>,
    user: UserId,
}

impl ValidPlan {
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub const fn user(&self) -> &UserId {
        &self.user
    }

    /// Attaches a freshly issued id.
    #[must_use]
    pub fn into_plan(self, id: PlanId) -> Plan {
        let Self { title, details, tags, years, colorscheme, public, school, user } = self;
        Plan { id, title, details, tags, years, colorscheme, public, school, user }
    }
}

impl Validate for PlanDraft {
    type Output = ValidPlan;

    fn validate(self) -> Result<ValidPlan, PlanError> {
        let Self { title, details, tags, years, colorscheme, public, school, user } = self;

        let title = title
            .filter(|t| !is_blank(t))
            .ok_or_else(|| PlanError::invalid("title", EMPTY_TITLE))?;
        let user = user.ok_or_else(|| PlanError::invalid("user", MISSING_USER))?;

        Ok(ValidPlan { title, details, tags, years, colorscheme, public, school, user })
    }
}

impl Validate for &PlanPatch {
    type Output = ();

    fn validate(self) -> Result<(), PlanError> {
        match &self.title {
            Some(title) if is_blank(title) => Err(PlanError::invalid("title", EMPTY_TITLE)),
            _ => Ok(()),
        }
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

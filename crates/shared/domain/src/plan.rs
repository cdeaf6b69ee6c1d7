//! The course plan document.
//!
//! `tags`, `years` and `colorscheme` are caller-defined structures; the model keeps them as
//! JSON values and never inspects them.

use crate::ids::{PlanId, SchoolId, UserId};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Arbitrary JSON object.
pub type Document = Map<String, Value>;

/// A persisted plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default)]
    pub tags: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years: Option<Document>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colorscheme: Option<Document>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school: Option<SchoolId>,
    pub user: UserId,
}

impl Plan {
    /// Visibility to non-owners; an unset flag is private.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.public.unwrap_or(false)
    }

    /// Applies an edit in place. Fields the patch leaves as `None` are untouched.
    pub fn apply(&mut self, patch: PlanPatch) {
        let PlanPatch { title, details, tags, years, colorscheme, public, school } = patch;
        if let Some(title) = title {
            self.title = title;
        }
        if let Some(details) = details {
            self.details = details;
        }
        if let Some(tags) = tags {
            self.tags = tags;
        }
        if let Some(years) = years {
            self.years = years;
        }
        if let Some(colorscheme) = colorscheme {
            self.colorscheme = colorscheme;
        }
        if let Some(public) = public {
            self.public = public;
        }
        if let Some(school) = school {
            self.school = school;
        }
    }
}

/// Insert payload, not yet validated.
///
/// `title` and `user` are optional here only so that a missing value can be reported
/// instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanDraft {
    pub title: Option<String>,
    pub details: Option<String>,
    pub tags: Vec<Value>,
    pub years: Option<Document>,
    pub colorscheme: Option<Document>,
    pub public: Option<bool>,
    pub school: Option<SchoolId>,
    pub user: Option<UserId>,
}

impl PlanDraft {
    pub fn new(title: impl Into<String>, user: UserId) -> Self {
        Self { title: Some(title.into()), user: Some(user), ..Self::default() }
    }
}

/// An edit to an existing plan.
///
/// Outer `None` means "leave unchanged". For nullable fields `Some(None)` clears the value;
/// in JSON that is an explicit `null`, while an absent key leaves the field alone.
/// The owner is not editable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub details: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Value>>,
    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub years: Option<Option<Document>>,
    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub colorscheme: Option<Option<Document>>,
    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub public: Option<Option<bool>>,
    #[serde(deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub school: Option<Option<SchoolId>>,
}

impl PlanPatch {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.details.is_none()
            && self.tags.is_none()
            && self.years.is_none()
            && self.colorscheme.is_none()
            && self.public.is_none()
            && self.school.is_none()
    }
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

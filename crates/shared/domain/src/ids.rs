//! Opaque, table-scoped record identifiers.
//!
//! An id is a key plus the table it belongs to. It parses from either the bare key
//! (`"k2x9"`) or the qualified form (`"user:k2x9"`) and always renders qualified.
//! Ids are weak references: holding one says nothing about whether the record exists.

use crate::constants::{PLAN, SCHOOL, USER};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Reason a raw string was not accepted as an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The key part is empty.
    Empty { table: &'static str },
    /// The key contains characters outside `[A-Za-z0-9_-]`.
    InvalidKey { table: &'static str, key: String },
    /// The qualified form names a different table.
    ForeignTable { expected: &'static str, found: String },
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { table } => write!(f, "empty {table} id"),
            Self::InvalidKey { table, key } => write!(f, "invalid {table} id key '{key}'"),
            Self::ForeignTable { expected, found } => {
                write!(f, "expected a '{expected}' id, got one for '{found}'")
            }
        }
    }
}

impl std::error::Error for IdError {}

/// A typed reference into one table.
pub trait Record: Sized {
    const TABLE: &'static str;

    fn from_key_unchecked(key: String) -> Self;

    fn key(&self) -> &str;

    /// Parses a bare or table-qualified key.
    ///
    /// # Errors
    /// Returns [`IdError`] for empty keys, unexpected characters or a foreign table prefix.
    fn parse(raw: impl AsRef<str>) -> Result<Self, IdError> {
        let raw = raw.as_ref().trim();
        let key = match raw.split_once(':') {
            Some((table, key)) if table == Self::TABLE => key,
            Some((table, _)) => {
                return Err(IdError::ForeignTable { expected: Self::TABLE, found: table.to_owned() });
            }
            None => raw,
        };

        if key.is_empty() {
            return Err(IdError::Empty { table: Self::TABLE });
        }
        if !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(IdError::InvalidKey { table: Self::TABLE, key: key.to_owned() });
        }

        Ok(Self::from_key_unchecked(key.to_owned()))
    }

    /// `table:key`.
    fn qualified(&self) -> String {
        format!("{}:{}", Self::TABLE, self.key())
    }
}

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident => $table:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(String);

        impl Record for $name {
            const TABLE: &'static str = $table;

            fn from_key_unchecked(key: String) -> Self {
                Self(key)
            }

            fn key(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}:{}", Self::TABLE, self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::parse(&raw).map_err(D::Error::custom)
            }
        }
    };
}

record_id!(
    /// Identifier of a persisted [`Plan`](crate::plan::Plan).
    PlanId => PLAN
);
record_id!(
    /// Owning account of a plan. Resolved against the user store elsewhere.
    UserId => USER
);
record_id!(
    /// Optional school a plan is associated with.
    SchoolId => SCHOOL
);

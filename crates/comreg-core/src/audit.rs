//! # Audit Actions
//!
//! The three mutating actions recorded in the audit trail. Entries are
//! append-only: nothing in this system updates or deletes an audit record.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The kind of mutation an audit entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// A record was created.
    Create,
    /// A record was updated.
    Update,
    /// A record was deleted.
    Delete,
}

impl AuditAction {
    /// Return the string representation of this action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a persisted action string is not recognized.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown audit action: {0}")]
pub struct UnknownActionError(pub String);

impl std::str::FromStr for AuditAction {
    type Err = UnknownActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATE" => Ok(Self::Create),
            "UPDATE" => Ok(Self::Update),
            "DELETE" => Ok(Self::Delete),
            other => Err(UnknownActionError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_strings_round_trip() {
        for a in [AuditAction::Create, AuditAction::Update, AuditAction::Delete] {
            assert_eq!(a.as_str().parse::<AuditAction>().unwrap(), a);
        }
    }

    #[test]
    fn unknown_action_rejected() {
        assert!("EXPORT".parse::<AuditAction>().is_err());
    }
}

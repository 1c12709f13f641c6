//! # Caller Roles
//!
//! Roles in the compliance registry, ordered by privilege level.
//!
//! The `Ord` derivation respects variant declaration order:
//! `Client < ComplianceOfficer < Admin`. This enables `>=` comparison for
//! role-based access checks.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A caller's role, determining view/edit/delete rights.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Can read records scoped to their affiliated company.
    Client,
    /// Can read all records and create/update licenses and remittances.
    ComplianceOfficer,
    /// Full access, including deletes and company creation.
    Admin,
}

impl Role {
    /// Return the string representation of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::ComplianceOfficer => "compliance_officer",
            Self::Admin => "admin",
        }
    }

    /// Whether this role may read registry data at all.
    ///
    /// Every authenticated role can view; unauthenticated callers never
    /// reach this check (the transport layer rejects them first).
    pub fn can_view(&self) -> bool {
        matches!(self, Self::Admin | Self::ComplianceOfficer | Self::Client)
    }

    /// Whether this role may create or update licenses and remittances.
    pub fn can_edit(&self) -> bool {
        *self >= Self::ComplianceOfficer
    }

    /// Whether this role may delete records.
    pub fn can_delete(&self) -> bool {
        *self >= Self::Admin
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognized role string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRoleError(pub String);

impl std::str::FromStr for Role {
    type Err = UnknownRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "compliance_officer" => Ok(Self::ComplianceOfficer),
            "client" => Ok(Self::Client),
            other => Err(UnknownRoleError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ordering_is_correct() {
        assert!(Role::Client < Role::ComplianceOfficer);
        assert!(Role::ComplianceOfficer < Role::Admin);
    }

    #[test]
    fn every_role_can_view() {
        assert!(Role::Admin.can_view());
        assert!(Role::ComplianceOfficer.can_view());
        assert!(Role::Client.can_view());
    }

    #[test]
    fn can_edit_iff_admin_or_compliance_officer() {
        assert!(Role::Admin.can_edit());
        assert!(Role::ComplianceOfficer.can_edit());
        assert!(!Role::Client.can_edit());
    }

    #[test]
    fn can_delete_iff_admin() {
        assert!(Role::Admin.can_delete());
        assert!(!Role::ComplianceOfficer.can_delete());
        assert!(!Role::Client.can_delete());
    }

    #[test]
    fn role_as_str_round_trips() {
        for role in [Role::Admin, Role::ComplianceOfficer, Role::Client] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_rejected() {
        let err = "superadmin".parse::<Role>().unwrap_err();
        assert_eq!(err, UnknownRoleError("superadmin".to_string()));
    }

    #[test]
    fn role_serde_uses_snake_case() {
        let json = serde_json::to_string(&Role::ComplianceOfficer).unwrap();
        assert_eq!(json, "\"compliance_officer\"");
        let parsed: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(parsed, Role::Admin);
    }
}

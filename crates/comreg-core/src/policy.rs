//! # Access Policy — Visibility Scoping & Typed List Filters
//!
//! The visibility scope restricts what a caller may read; typed filter
//! structs carry the caller's explicit query parameters. The two combine
//! AND-wise: a CLIENT's company affiliation always wins over an explicit
//! `company_id` parameter, and a CLIENT with no affiliation sees nothing.
//!
//! Enforcement is the service layer's job — this module only answers
//! "which records?" and never touches storage.

use uuid::Uuid;

use crate::role::Role;
use crate::status::{LicenseStatus, RemittanceStatus};

/// The read scope derived from a caller's role and company affiliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// No restriction; an explicit company filter may still apply.
    Unrestricted,
    /// Restricted to records belonging to this company.
    Company(Uuid),
    /// No records are visible (a CLIENT with no company affiliation).
    Denied,
}

impl Visibility {
    /// Compute the visibility scope for a role and optional affiliation.
    pub fn scope(role: Role, company_id: Option<Uuid>) -> Self {
        match role {
            Role::Client => match company_id {
                Some(id) => Self::Company(id),
                None => Self::Denied,
            },
            Role::Admin | Role::ComplianceOfficer => Self::Unrestricted,
        }
    }

    /// Whether a record owned by `company_id` falls inside this scope.
    pub fn allows(&self, company_id: Uuid) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Company(scoped) => *scoped == company_id,
            Self::Denied => false,
        }
    }
}

/// Typed filter for license list queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LicenseFilter {
    /// Restrict to a single company.
    pub company_id: Option<Uuid>,
    /// Restrict to a single derived status.
    pub status: Option<LicenseStatus>,
}

impl LicenseFilter {
    /// Combine an explicit filter with a visibility scope.
    ///
    /// Returns `None` when the scope is [`Visibility::Denied`] — the caller
    /// must produce an empty result set without touching storage. A company
    /// scope overrides any explicit `company_id` parameter.
    pub fn scoped(mut self, visibility: Visibility) -> Option<Self> {
        match visibility {
            Visibility::Denied => None,
            Visibility::Company(id) => {
                self.company_id = Some(id);
                Some(self)
            }
            Visibility::Unrestricted => Some(self),
        }
    }

    /// Whether a record with the given fields matches this filter.
    pub fn matches(&self, company_id: Uuid, status: LicenseStatus) -> bool {
        self.company_id.map_or(true, |c| c == company_id)
            && self.status.map_or(true, |s| s == status)
    }
}

/// Typed filter for remittance list queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemittanceFilter {
    /// Restrict to a single company.
    pub company_id: Option<Uuid>,
    /// Restrict to a single submission status.
    pub status: Option<RemittanceStatus>,
    /// Restrict to a reporting year.
    pub year: Option<i32>,
    /// Restrict to a reporting month (1–12).
    pub month: Option<u32>,
}

impl RemittanceFilter {
    /// Combine an explicit filter with a visibility scope.
    ///
    /// Same semantics as [`LicenseFilter::scoped`].
    pub fn scoped(mut self, visibility: Visibility) -> Option<Self> {
        match visibility {
            Visibility::Denied => None,
            Visibility::Company(id) => {
                self.company_id = Some(id);
                Some(self)
            }
            Visibility::Unrestricted => Some(self),
        }
    }

    /// Whether a record with the given fields matches this filter.
    pub fn matches(
        &self,
        company_id: Uuid,
        status: RemittanceStatus,
        year: i32,
        month: u32,
    ) -> bool {
        self.company_id.map_or(true, |c| c == company_id)
            && self.status.map_or(true, |s| s == status)
            && self.year.map_or(true, |y| y == year)
            && self.month.map_or(true, |m| m == month)
    }
}

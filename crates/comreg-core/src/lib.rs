#![deny(missing_docs)]

//! # comreg-core — Foundational Types for the COMREG Compliance Registry
//!
//! This crate defines the domain types every other crate in the workspace
//! depends on. It has no internal crate dependencies — only `serde`,
//! `thiserror`, `chrono`, and `uuid` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Derived status is never caller-supplied.** [`LicenseStatus::classify`]
//!    is the sole source of a license's lifecycle state; every write path
//!    recomputes it from the expiration date.
//!
//! 2. **The access policy is pure.** [`Role`] predicates and
//!    [`Visibility`] scoping are total functions with no side effects —
//!    enforcement (HTTP status codes, empty result sets) is the caller's
//!    concern.
//!
//! 3. **Typed filters, not dictionaries.** List queries are described by
//!    [`LicenseFilter`] and [`RemittanceFilter`] structs built from the
//!    caller's visibility scope plus explicit query parameters, never by an
//!    untyped map.

pub mod audit;
pub mod policy;
pub mod role;
pub mod status;

pub use audit::{AuditAction, UnknownActionError};
pub use policy::{LicenseFilter, RemittanceFilter, Visibility};
pub use role::{Role, UnknownRoleError};
pub use status::{LicenseStatus, RemittanceStatus, UnknownStatusError};

//! # API Route Modules
//!
//! Route modules for the compliance registry API surface:
//!
//! - `companies` — client company records (list, create).
//! - `licenses` — regulatory license records with derived status
//!   (list, create, update, delete).
//! - `remittances` — periodic financial remittance records
//!   (list, create, update, delete).
//! - `dashboard` — read-only aggregation: status counts and upcoming
//!   expiries, scoped by the caller's visibility.
//! - `audit_log` — read-only audit trail queries for admins and
//!   compliance officers.

pub mod audit_log;
pub mod companies;
pub mod dashboard;
pub mod licenses;
pub mod remittances;

//! # comreg-cli — CLI Tool for the COMREG Compliance Registry
//!
//! Provides the `comreg` command-line interface for operational jobs that
//! run outside the API server's request cycle.
//!
//! ## Subcommands
//!
//! - `comreg remind` — Refresh stored license statuses from their
//!   expiration dates and send expiry-reminder emails for licenses due
//!   within the renewal window. Intended to run on a schedule (cron).
//! - `comreg status` — Classify an expiration date from the command line.

pub mod remind;
pub mod status;

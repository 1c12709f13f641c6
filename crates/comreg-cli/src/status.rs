//! # Status Subcommand
//!
//! Classifies an expiration date against today's date, printing the
//! status the registry would derive on a write. Handy for checking what
//! a renewal will do before entering it.

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::Args;

use comreg_core::LicenseStatus;

/// Arguments for the `comreg status` subcommand.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Expiration date to classify (YYYY-MM-DD).
    #[arg(long)]
    pub expiration: NaiveDate,
}

/// Run the status classification. Returns the process exit code.
pub fn run_status(args: &StatusArgs) -> Result<u8> {
    let today = Utc::now().date_naive();
    let status = LicenseStatus::classify(args.expiration, today);
    let days_until = (args.expiration - today).num_days();

    println!("{status} ({days_until} days until expiry)");
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn classification_matches_core() {
        let today = Utc::now().date_naive();
        let args = StatusArgs {
            expiration: today + Duration::days(10),
        };
        assert_eq!(
            LicenseStatus::classify(args.expiration, today),
            LicenseStatus::PendingRenewal
        );
        assert_eq!(run_status(&args).unwrap(), 0);
    }
}

//! # Status Enums & License Status Derivation
//!
//! License status is never stored as caller input: it is derived from the
//! expiration date on every write via [`LicenseStatus::classify`].
//! Remittance status, by contrast, is an ordinary caller-managed field.
//!
//! Uses `SCREAMING_SNAKE_CASE` for serialization to match the persisted
//! column values and the API contract.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of days before expiration at which a license is due for renewal.
pub const RENEWAL_WINDOW_DAYS: i64 = 30;

/// Derived lifecycle state of a license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LicenseStatus {
    /// More than 30 days remain until expiration.
    Active,
    /// Expiration is today or within the next 30 days (inclusive).
    PendingRenewal,
    /// Expiration date is in the past.
    Expired,
}

impl LicenseStatus {
    /// Classify an expiration date relative to `today`.
    ///
    /// Pure and total. The comparison is a whole-day difference — callers
    /// working with timestamps must truncate to a date first. A difference
    /// of exactly 0 or [`RENEWAL_WINDOW_DAYS`] days is `PendingRenewal`;
    /// any negative difference is `Expired` regardless of magnitude.
    pub fn classify(expiration: NaiveDate, today: NaiveDate) -> Self {
        let days_until = (expiration - today).num_days();
        if days_until < 0 {
            Self::Expired
        } else if days_until <= RENEWAL_WINDOW_DAYS {
            Self::PendingRenewal
        } else {
            Self::Active
        }
    }

    /// Return the string representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::PendingRenewal => "PENDING_RENEWAL",
            Self::Expired => "EXPIRED",
        }
    }
}

impl std::fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LicenseStatus {
    type Err = UnknownStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(Self::Active),
            "PENDING_RENEWAL" => Ok(Self::PendingRenewal),
            "EXPIRED" => Ok(Self::Expired),
            other => Err(UnknownStatusError(other.to_string())),
        }
    }
}

/// Caller-managed submission state of a remittance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RemittanceStatus {
    /// Recorded but not yet submitted to the authority.
    #[default]
    Pending,
    /// Submitted, awaiting verification.
    Submitted,
    /// Verified by a compliance officer.
    Verified,
}

impl RemittanceStatus {
    /// Return the string representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Submitted => "SUBMITTED",
            Self::Verified => "VERIFIED",
        }
    }
}

impl std::fmt::Display for RemittanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RemittanceStatus {
    type Err = UnknownStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "SUBMITTED" => Ok(Self::Submitted),
            "VERIFIED" => Ok(Self::Verified),
            other => Err(UnknownStatusError(other.to_string())),
        }
    }
}

/// Error returned when a persisted status string is not recognized.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown status: {0}")]
pub struct UnknownStatusError(pub String);

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn expired_yesterday() {
        let today = day(2026, 8, 7);
        assert_eq!(
            LicenseStatus::classify(today - Duration::days(1), today),
            LicenseStatus::Expired
        );
    }

    #[test]
    fn pending_renewal_today() {
        let today = day(2026, 8, 7);
        assert_eq!(
            LicenseStatus::classify(today, today),
            LicenseStatus::PendingRenewal
        );
    }

    #[test]
    fn pending_renewal_at_window_boundary() {
        let today = day(2026, 8, 7);
        assert_eq!(
            LicenseStatus::classify(today + Duration::days(30), today),
            LicenseStatus::PendingRenewal
        );
    }

    #[test]
    fn active_just_past_window() {
        let today = day(2026, 8, 7);
        assert_eq!(
            LicenseStatus::classify(today + Duration::days(31), today),
            LicenseStatus::Active
        );
    }

    #[test]
    fn pending_renewal_at_fifteen_days() {
        let today = day(2026, 8, 7);
        assert_eq!(
            LicenseStatus::classify(today + Duration::days(15), today),
            LicenseStatus::PendingRenewal
        );
    }

    #[test]
    fn remittance_status_defaults_to_pending() {
        assert_eq!(RemittanceStatus::default(), RemittanceStatus::Pending);
    }

    #[test]
    fn status_strings_round_trip() {
        for s in [
            LicenseStatus::Active,
            LicenseStatus::PendingRenewal,
            LicenseStatus::Expired,
        ] {
            assert_eq!(s.as_str().parse::<LicenseStatus>().unwrap(), s);
        }
        for s in [
            RemittanceStatus::Pending,
            RemittanceStatus::Submitted,
            RemittanceStatus::Verified,
        ] {
            assert_eq!(s.as_str().parse::<RemittanceStatus>().unwrap(), s);
        }
    }

    #[test]
    fn license_status_serde_is_screaming_snake_case() {
        let json = serde_json::to_string(&LicenseStatus::PendingRenewal).unwrap();
        assert_eq!(json, "\"PENDING_RENEWAL\"");
    }

    proptest! {
        #[test]
        fn any_past_date_is_expired(offset in 1i64..20_000) {
            let today = day(2026, 8, 7);
            let expiration = today - Duration::days(offset);
            prop_assert_eq!(
                LicenseStatus::classify(expiration, today),
                LicenseStatus::Expired
            );
        }

        #[test]
        fn window_dates_are_pending_renewal(offset in 0i64..=30) {
            let today = day(2026, 8, 7);
            let expiration = today + Duration::days(offset);
            prop_assert_eq!(
                LicenseStatus::classify(expiration, today),
                LicenseStatus::PendingRenewal
            );
        }

        #[test]
        fn dates_past_window_are_active(offset in 31i64..20_000) {
            let today = day(2026, 8, 7);
            let expiration = today + Duration::days(offset);
            prop_assert_eq!(
                LicenseStatus::classify(expiration, today),
                LicenseStatus::Active
            );
        }
    }
}

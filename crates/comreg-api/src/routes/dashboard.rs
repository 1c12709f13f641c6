//! # Dashboard API
//!
//! Read-only aggregation over the caller's visible records: license and
//! remittance counts by status, plus the licenses expiring within the next
//! 30 calendar days (soonest first, capped at 10).

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use comreg_core::{status::RENEWAL_WINDOW_DAYS, LicenseStatus, RemittanceStatus};

use crate::auth::CallerIdentity;
use crate::state::AppState;

/// Maximum number of upcoming expiries returned.
const UPCOMING_EXPIRY_LIMIT: usize = 10;

// ── Response DTOs ───────────────────────────────────────────────────

/// License counts by derived status.
#[derive(Debug, Serialize, ToSchema)]
pub struct LicenseCounts {
    pub active: usize,
    pub pending_renewal: usize,
    pub expired: usize,
    pub total: usize,
}

/// Remittance counts by submission status.
#[derive(Debug, Serialize, ToSchema)]
pub struct RemittanceCounts {
    pub pending: usize,
    pub submitted: usize,
    pub verified: usize,
    pub total: usize,
}

/// A license expiring within the renewal window.
#[derive(Debug, Serialize, ToSchema)]
pub struct UpcomingExpiry {
    pub id: Uuid,
    pub company_id: Uuid,
    /// Name of the owning company, for display.
    pub company_name: String,
    pub license_type: String,
    #[schema(value_type = String, format = Date)]
    pub expiration_date: NaiveDate,
    #[schema(value_type = String)]
    pub status: LicenseStatus,
    /// Whole days until the expiration date.
    pub days_until_expiry: i64,
}

/// Dashboard statistics response.
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub licenses: LicenseCounts,
    pub remittances: RemittanceCounts,
    pub upcoming_expiries: Vec<UpcomingExpiry>,
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/dashboard/stats", get(dashboard_stats))
}

// ── Handler ─────────────────────────────────────────────────────────

/// GET /v1/dashboard/stats — Aggregated statistics scoped to the caller.
#[utoipa::path(
    get,
    path = "/v1/dashboard/stats",
    responses(
        (status = 200, description = "Dashboard statistics", body = DashboardStats),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody),
    ),
    tag = "dashboard"
)]
pub async fn dashboard_stats(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Json<DashboardStats> {
    let visibility = caller.visibility();
    let today = Utc::now().date_naive();
    let window_end = today + Duration::days(RENEWAL_WINDOW_DAYS);

    let mut licenses = LicenseCounts {
        active: 0,
        pending_renewal: 0,
        expired: 0,
        total: 0,
    };
    let mut upcoming: Vec<UpcomingExpiry> = Vec::new();

    for license in state.licenses.list() {
        if !visibility.allows(license.company_id) {
            continue;
        }
        licenses.total += 1;
        match license.status {
            LicenseStatus::Active => licenses.active += 1,
            LicenseStatus::PendingRenewal => licenses.pending_renewal += 1,
            LicenseStatus::Expired => licenses.expired += 1,
        }

        if license.expiration_date >= today && license.expiration_date <= window_end {
            let company_name = state
                .companies
                .get(&license.company_id)
                .map_or_else(|| "unknown company".to_string(), |c| c.name);
            upcoming.push(UpcomingExpiry {
                id: license.id,
                company_id: license.company_id,
                company_name,
                license_type: license.license_type.clone(),
                expiration_date: license.expiration_date,
                status: license.status,
                days_until_expiry: (license.expiration_date - today).num_days(),
            });
        }
    }

    upcoming.sort_by_key(|e| e.expiration_date);
    upcoming.truncate(UPCOMING_EXPIRY_LIMIT);

    let mut remittances = RemittanceCounts {
        pending: 0,
        submitted: 0,
        verified: 0,
        total: 0,
    };

    for remittance in state.remittances.list() {
        if !visibility.allows(remittance.company_id) {
            continue;
        }
        remittances.total += 1;
        match remittance.status {
            RemittanceStatus::Pending => remittances.pending += 1,
            RemittanceStatus::Submitted => remittances.submitted += 1,
            RemittanceStatus::Verified => remittances.verified += 1,
        }
    }

    Json(DashboardStats {
        licenses,
        remittances,
        upcoming_expiries: upcoming,
    })
}

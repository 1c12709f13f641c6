//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "COMREG API — Compliance Registry",
        version = "0.3.2",
        description = "Regulatory license and remittance tracking for client companies: record CRUD with role-scoped visibility, derived license status, dashboard aggregation, and an audit trail for every mutation.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        // Companies
        crate::routes::companies::list_companies,
        crate::routes::companies::create_company,
        // Licenses
        crate::routes::licenses::list_licenses,
        crate::routes::licenses::create_license,
        crate::routes::licenses::update_license,
        crate::routes::licenses::delete_license,
        // Remittances
        crate::routes::remittances::list_remittances,
        crate::routes::remittances::create_remittance,
        crate::routes::remittances::update_remittance,
        crate::routes::remittances::delete_remittance,
        // Dashboard
        crate::routes::dashboard::dashboard_stats,
        // Audit trail
        crate::routes::audit_log::list_audit_entries,
    ),
    components(schemas(
        // Record types
        crate::state::CompanyRecord,
        crate::state::LicenseRecord,
        crate::state::RemittanceRecord,
        crate::state::AuditLogEntry,
        // Error types
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        // Company DTOs
        crate::routes::companies::CreateCompanyRequest,
        // License DTOs
        crate::routes::licenses::LicensePayload,
        // Remittance DTOs
        crate::routes::remittances::RemittancePayload,
        // Dashboard DTOs
        crate::routes::dashboard::DashboardStats,
        crate::routes::dashboard::LicenseCounts,
        crate::routes::dashboard::RemittanceCounts,
        crate::routes::dashboard::UpcomingExpiry,
    )),
    tags(
        (name = "companies", description = "Client company records"),
        (name = "licenses", description = "Regulatory licenses with derived lifecycle status"),
        (name = "remittances", description = "Periodic financial remittance records"),
        (name = "dashboard", description = "Read-only aggregation scoped to the caller"),
        (name = "audit", description = "Audit trail queries"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
///
/// Serves the OpenAPI JSON spec at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

//! # Audit Trail API
//!
//! Read-only queries over the audit log for admins and compliance
//! officers. Clients never see the trail. Entries are returned newest
//! first; the page size is capped at 50.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use comreg_core::{AuditAction, Role};

use crate::auth::{require_role, CallerIdentity};
use crate::error::AppError;
use crate::state::{AppState, AuditLogEntry};

/// Maximum (and default) number of entries returned per query.
const MAX_PAGE_SIZE: usize = 50;

/// Query parameters for audit trail listing.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuditListQuery {
    /// Restrict to one action kind (CREATE, UPDATE, DELETE).
    #[param(value_type = Option<String>)]
    pub action: Option<AuditAction>,
    /// Restrict to one entity kind, e.g. "License".
    pub entity_type: Option<String>,
    /// Restrict to one acting user.
    pub actor: Option<Uuid>,
    /// Page size; capped at 50.
    pub limit: Option<usize>,
}

/// Build the audit trail router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/audit", get(list_audit_entries))
}

/// GET /v1/audit — Query the audit trail, newest entries first.
#[utoipa::path(
    get,
    path = "/v1/audit",
    params(AuditListQuery),
    responses(
        (status = 200, description = "Audit entries, newest first", body = Vec<AuditLogEntry>),
        (status = 403, description = "Clients cannot view the audit trail", body = crate::error::ErrorBody),
    ),
    tag = "audit"
)]
pub async fn list_audit_entries(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Query(query): Query<AuditListQuery>,
) -> Result<Json<Vec<AuditLogEntry>>, AppError> {
    require_role(&caller, Role::ComplianceOfficer)?;

    let mut entries: Vec<AuditLogEntry> = state
        .audit_log
        .list()
        .into_iter()
        .filter(|e| {
            query.action.map_or(true, |a| e.action == a)
                && query
                    .entity_type
                    .as_deref()
                    .map_or(true, |t| e.entity_type == t)
                && query.actor.map_or(true, |u| e.actor == Some(u))
        })
        .collect();

    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    entries.truncate(query.limit.unwrap_or(MAX_PAGE_SIZE).min(MAX_PAGE_SIZE));

    Ok(Json(entries))
}

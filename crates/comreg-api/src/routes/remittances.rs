//! # Remittance API
//!
//! Remittance CRUD. Unlike licenses, the submission status is an ordinary
//! caller-managed field: absent on create it defaults to PENDING, and
//! updates overwrite it with whatever the caller supplies (or the default
//! again when omitted).

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use comreg_core::{AuditAction, RemittanceFilter, RemittanceStatus, Role};

use crate::audit::{self, ENTITY_REMITTANCE};
use crate::auth::{require_role, CallerIdentity};
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::{AppState, RemittanceRecord};

// ── Request DTOs ────────────────────────────────────────────────────

/// Remittance fields accepted on create and update.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RemittancePayload {
    pub company_id: Uuid,
    /// e.g. "PAYE", "Pension", "VAT".
    pub remittance_type: String,
    /// Reporting period label, e.g. "March 2026".
    pub period: String,
    /// Reporting month, 1–12.
    pub month: u32,
    pub year: i32,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub proof_path: Option<String>,
    /// Submission status; defaults to PENDING when omitted.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub status: Option<RemittanceStatus>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Validate for RemittancePayload {
    fn validate(&self) -> Result<(), String> {
        if self.remittance_type.trim().is_empty() {
            return Err("remittance_type must not be empty".to_string());
        }
        if self.period.trim().is_empty() {
            return Err("period must not be empty".to_string());
        }
        if !(1..=12).contains(&self.month) {
            return Err(format!("month must be between 1 and 12, got {}", self.month));
        }
        Ok(())
    }
}

/// Query parameters for remittance listing.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RemittanceListQuery {
    /// Restrict to one company (ignored for CLIENT callers).
    pub company_id: Option<Uuid>,
    /// Restrict to one submission status.
    #[param(value_type = Option<String>)]
    pub status: Option<RemittanceStatus>,
    /// Restrict to a reporting year.
    pub year: Option<i32>,
    /// Restrict to a reporting month (1–12).
    pub month: Option<u32>,
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the remittances router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/remittances",
            get(list_remittances).post(create_remittance),
        )
        .route(
            "/v1/remittances/:id",
            put(update_remittance).delete(delete_remittance),
        )
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /v1/remittances — List remittances visible to the caller.
#[utoipa::path(
    get,
    path = "/v1/remittances",
    params(RemittanceListQuery),
    responses(
        (status = 200, description = "Remittances ordered by year, then month, descending", body = Vec<RemittanceRecord>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody),
    ),
    tag = "remittances"
)]
pub async fn list_remittances(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Query(query): Query<RemittanceListQuery>,
) -> Json<Vec<RemittanceRecord>> {
    let filter = RemittanceFilter {
        company_id: query.company_id,
        status: query.status,
        year: query.year,
        month: query.month,
    };

    let Some(filter) = filter.scoped(caller.visibility()) else {
        return Json(Vec::new());
    };

    let mut remittances: Vec<RemittanceRecord> = state
        .remittances
        .list()
        .into_iter()
        .filter(|r| filter.matches(r.company_id, r.status, r.year, r.month))
        .collect();
    remittances.sort_by(|a, b| b.year.cmp(&a.year).then(b.month.cmp(&a.month)));
    Json(remittances)
}

/// POST /v1/remittances — Record a new remittance.
#[utoipa::path(
    post,
    path = "/v1/remittances",
    request_body = RemittancePayload,
    responses(
        (status = 201, description = "Remittance created", body = RemittanceRecord),
        (status = 403, description = "Insufficient role", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "remittances"
)]
pub async fn create_remittance(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<RemittancePayload>, JsonRejection>,
) -> Result<(StatusCode, Json<RemittanceRecord>), AppError> {
    require_role(&caller, Role::ComplianceOfficer)?;
    let req = extract_validated_json(body)?;

    let company = state.companies.get(&req.company_id).ok_or_else(|| {
        AppError::Validation(format!("company {} does not exist", req.company_id))
    })?;

    let now = Utc::now();
    let record = RemittanceRecord {
        id: Uuid::new_v4(),
        company_id: req.company_id,
        remittance_type: req.remittance_type,
        period: req.period,
        month: req.month,
        year: req.year,
        amount: req.amount,
        proof_path: req.proof_path,
        status: req.status.unwrap_or_default(),
        notes: req.notes,
        created_by: caller.user_id,
        updated_by: None,
        created_at: now,
        updated_at: now,
    };

    state.remittances.insert(record.id, record.clone());

    if let Some(pool) = &state.db_pool {
        crate::db::remittances::insert(pool, &record).await?;
    }

    audit::record(
        &state,
        caller.user_id,
        AuditAction::Create,
        ENTITY_REMITTANCE,
        record.id,
        format!(
            "Created remittance: {} for {}",
            record.remittance_type, company.name
        ),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /v1/remittances/:id — Update a remittance.
#[utoipa::path(
    put,
    path = "/v1/remittances/{id}",
    params(("id" = Uuid, Path, description = "Remittance ID")),
    request_body = RemittancePayload,
    responses(
        (status = 200, description = "Remittance updated", body = RemittanceRecord),
        (status = 403, description = "Insufficient role", body = crate::error::ErrorBody),
        (status = 404, description = "Remittance not found", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "remittances"
)]
pub async fn update_remittance(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<RemittancePayload>, JsonRejection>,
) -> Result<Json<RemittanceRecord>, AppError> {
    require_role(&caller, Role::ComplianceOfficer)?;
    let req = extract_validated_json(body)?;

    let company = state.companies.get(&req.company_id).ok_or_else(|| {
        AppError::Validation(format!("company {} does not exist", req.company_id))
    })?;

    let now = Utc::now();
    let updated = state
        .remittances
        .update(&id, |remittance| {
            remittance.company_id = req.company_id;
            remittance.remittance_type = req.remittance_type.clone();
            remittance.period = req.period.clone();
            remittance.month = req.month;
            remittance.year = req.year;
            remittance.amount = req.amount;
            remittance.proof_path = req.proof_path.clone();
            remittance.status = req.status.unwrap_or_default();
            remittance.notes = req.notes.clone();
            remittance.updated_by = caller.user_id;
            remittance.updated_at = now;
        })
        .ok_or_else(|| AppError::NotFound(format!("remittance {id} not found")))?;

    if let Some(pool) = &state.db_pool {
        if !crate::db::remittances::update(pool, &updated).await? {
            tracing::warn!(id = %id, "remittance missing from database during update");
        }
    }

    audit::record(
        &state,
        caller.user_id,
        AuditAction::Update,
        ENTITY_REMITTANCE,
        updated.id,
        format!(
            "Updated remittance: {} for {}",
            updated.remittance_type, company.name
        ),
    )
    .await?;

    Ok(Json(updated))
}

/// DELETE /v1/remittances/:id — Delete a remittance (admin only).
#[utoipa::path(
    delete,
    path = "/v1/remittances/{id}",
    params(("id" = Uuid, Path, description = "Remittance ID")),
    responses(
        (status = 204, description = "Remittance deleted"),
        (status = 403, description = "Insufficient role", body = crate::error::ErrorBody),
        (status = 404, description = "Remittance not found", body = crate::error::ErrorBody),
    ),
    tag = "remittances"
)]
pub async fn delete_remittance(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_role(&caller, Role::Admin)?;

    let existing = state
        .remittances
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("remittance {id} not found")))?;
    let company_name = state
        .companies
        .get(&existing.company_id)
        .map_or_else(|| "unknown company".to_string(), |c| c.name);

    state.remittances.remove(&id);

    if let Some(pool) = &state.db_pool {
        if !crate::db::remittances::delete(pool, id).await? {
            tracing::warn!(id = %id, "remittance missing from database during delete");
        }
    }

    audit::record(
        &state,
        caller.user_id,
        AuditAction::Delete,
        ENTITY_REMITTANCE,
        id,
        format!(
            "Deleted remittance: {} for {}",
            existing.remittance_type, company_name
        ),
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

//! # License API
//!
//! License CRUD with derived lifecycle status. The status column is never
//! taken from the request: both create and update recompute it from the
//! expiration date, so a caller-supplied `status` field is silently
//! dropped during deserialization.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use comreg_core::{AuditAction, LicenseFilter, LicenseStatus, Role};

use crate::audit::{self, ENTITY_LICENSE};
use crate::auth::{require_role, CallerIdentity};
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::{AppState, LicenseRecord};

// ── Request DTOs ────────────────────────────────────────────────────

/// License fields accepted on create and update.
///
/// There is deliberately no `status` field here — see the module docs.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LicensePayload {
    pub company_id: Uuid,
    /// e.g. "Money Transfer License".
    pub license_type: String,
    /// The authority that issued the license.
    pub issuing_body: String,
    #[schema(value_type = String, format = Date)]
    pub issue_date: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub expiration_date: NaiveDate,
    #[serde(default)]
    pub document_path: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Validate for LicensePayload {
    fn validate(&self) -> Result<(), String> {
        if self.license_type.trim().is_empty() {
            return Err("license_type must not be empty".to_string());
        }
        if self.issuing_body.trim().is_empty() {
            return Err("issuing_body must not be empty".to_string());
        }
        Ok(())
    }
}

/// Query parameters for license listing.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LicenseListQuery {
    /// Restrict to one company (ignored for CLIENT callers, whose
    /// affiliation always wins).
    pub company_id: Option<Uuid>,
    /// Restrict to one derived status.
    #[param(value_type = Option<String>)]
    pub status: Option<LicenseStatus>,
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the licenses router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/licenses", get(list_licenses).post(create_license))
        .route(
            "/v1/licenses/:id",
            put(update_license).delete(delete_license),
        )
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /v1/licenses — List licenses visible to the caller.
#[utoipa::path(
    get,
    path = "/v1/licenses",
    params(LicenseListQuery),
    responses(
        (status = 200, description = "Licenses ordered by expiration date", body = Vec<LicenseRecord>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody),
    ),
    tag = "licenses"
)]
pub async fn list_licenses(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Query(query): Query<LicenseListQuery>,
) -> Json<Vec<LicenseRecord>> {
    let filter = LicenseFilter {
        company_id: query.company_id,
        status: query.status,
    };

    let Some(filter) = filter.scoped(caller.visibility()) else {
        // CLIENT with no company affiliation sees nothing.
        return Json(Vec::new());
    };

    let mut licenses: Vec<LicenseRecord> = state
        .licenses
        .list()
        .into_iter()
        .filter(|l| filter.matches(l.company_id, l.status))
        .collect();
    licenses.sort_by_key(|l| l.expiration_date);
    Json(licenses)
}

/// POST /v1/licenses — Record a new license.
#[utoipa::path(
    post,
    path = "/v1/licenses",
    request_body = LicensePayload,
    responses(
        (status = 201, description = "License created with derived status", body = LicenseRecord),
        (status = 403, description = "Insufficient role", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "licenses"
)]
pub async fn create_license(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<LicensePayload>, JsonRejection>,
) -> Result<(StatusCode, Json<LicenseRecord>), AppError> {
    require_role(&caller, Role::ComplianceOfficer)?;
    let req = extract_validated_json(body)?;

    let company = state.companies.get(&req.company_id).ok_or_else(|| {
        AppError::Validation(format!("company {} does not exist", req.company_id))
    })?;

    let now = Utc::now();
    let status = LicenseStatus::classify(req.expiration_date, now.date_naive());

    let record = LicenseRecord {
        id: Uuid::new_v4(),
        company_id: req.company_id,
        license_type: req.license_type,
        issuing_body: req.issuing_body,
        issue_date: req.issue_date,
        expiration_date: req.expiration_date,
        status,
        document_path: req.document_path,
        notes: req.notes,
        created_by: caller.user_id,
        updated_by: None,
        created_at: now,
        updated_at: now,
    };

    state.licenses.insert(record.id, record.clone());

    if let Some(pool) = &state.db_pool {
        crate::db::licenses::insert(pool, &record).await?;
    }

    audit::record(
        &state,
        caller.user_id,
        AuditAction::Create,
        ENTITY_LICENSE,
        record.id,
        format!(
            "Created license: {} for {}",
            record.license_type, company.name
        ),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /v1/licenses/:id — Update a license, re-deriving its status.
#[utoipa::path(
    put,
    path = "/v1/licenses/{id}",
    params(("id" = Uuid, Path, description = "License ID")),
    request_body = LicensePayload,
    responses(
        (status = 200, description = "License updated with re-derived status", body = LicenseRecord),
        (status = 403, description = "Insufficient role", body = crate::error::ErrorBody),
        (status = 404, description = "License not found", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "licenses"
)]
pub async fn update_license(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
    body: Result<Json<LicensePayload>, JsonRejection>,
) -> Result<Json<LicenseRecord>, AppError> {
    require_role(&caller, Role::ComplianceOfficer)?;
    let req = extract_validated_json(body)?;

    let company = state.companies.get(&req.company_id).ok_or_else(|| {
        AppError::Validation(format!("company {} does not exist", req.company_id))
    })?;

    let now = Utc::now();
    let status = LicenseStatus::classify(req.expiration_date, now.date_naive());

    let updated = state
        .licenses
        .update(&id, |license| {
            license.company_id = req.company_id;
            license.license_type = req.license_type.clone();
            license.issuing_body = req.issuing_body.clone();
            license.issue_date = req.issue_date;
            license.expiration_date = req.expiration_date;
            license.status = status;
            license.document_path = req.document_path.clone();
            license.notes = req.notes.clone();
            license.updated_by = caller.user_id;
            license.updated_at = now;
        })
        .ok_or_else(|| AppError::NotFound(format!("license {id} not found")))?;

    if let Some(pool) = &state.db_pool {
        if !crate::db::licenses::update(pool, &updated).await? {
            tracing::warn!(id = %id, "license missing from database during update");
        }
    }

    audit::record(
        &state,
        caller.user_id,
        AuditAction::Update,
        ENTITY_LICENSE,
        updated.id,
        format!(
            "Updated license: {} for {}",
            updated.license_type, company.name
        ),
    )
    .await?;

    Ok(Json(updated))
}

/// DELETE /v1/licenses/:id — Delete a license (admin only).
#[utoipa::path(
    delete,
    path = "/v1/licenses/{id}",
    params(("id" = Uuid, Path, description = "License ID")),
    responses(
        (status = 204, description = "License deleted"),
        (status = 403, description = "Insufficient role", body = crate::error::ErrorBody),
        (status = 404, description = "License not found", body = crate::error::ErrorBody),
    ),
    tag = "licenses"
)]
pub async fn delete_license(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    require_role(&caller, Role::Admin)?;

    // Read first: the audit entry embeds the record's descriptive fields.
    let existing = state
        .licenses
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("license {id} not found")))?;
    let company_name = state
        .companies
        .get(&existing.company_id)
        .map_or_else(|| "unknown company".to_string(), |c| c.name);

    state.licenses.remove(&id);

    if let Some(pool) = &state.db_pool {
        if !crate::db::licenses::delete(pool, id).await? {
            tracing::warn!(id = %id, "license missing from database during delete");
        }
    }

    audit::record(
        &state,
        caller.user_id,
        AuditAction::Delete,
        ENTITY_LICENSE,
        id,
        format!(
            "Deleted license: {} for {}",
            existing.license_type, company_name
        ),
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}

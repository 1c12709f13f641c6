//! # Company API
//!
//! Companies are the anchor of the registry: every license and remittance
//! belongs to exactly one. They are never deleted; clients may list them
//! (company names are not scoped data) but only admins create them.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use comreg_core::{AuditAction, Role};

use crate::audit::{self, ENTITY_COMPANY};
use crate::auth::{require_role, CallerIdentity};
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::{AppState, CompanyRecord};

// ── Request DTOs ────────────────────────────────────────────────────

/// Request to register a new company.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCompanyRequest {
    /// Company name; must be unique across the registry.
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Validate for CreateCompanyRequest {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        Ok(())
    }
}

// ── Router ──────────────────────────────────────────────────────────

/// Build the companies router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/companies", get(list_companies).post(create_company))
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /v1/companies — List all companies, sorted by name.
#[utoipa::path(
    get,
    path = "/v1/companies",
    responses(
        (status = 200, description = "List of companies", body = Vec<CompanyRecord>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorBody),
    ),
    tag = "companies"
)]
pub async fn list_companies(
    State(state): State<AppState>,
    _caller: CallerIdentity,
) -> Json<Vec<CompanyRecord>> {
    let mut companies = state.companies.list();
    companies.sort_by(|a, b| a.name.cmp(&b.name));
    Json(companies)
}

/// POST /v1/companies — Register a new company (admin only).
#[utoipa::path(
    post,
    path = "/v1/companies",
    request_body = CreateCompanyRequest,
    responses(
        (status = 201, description = "Company created", body = CompanyRecord),
        (status = 403, description = "Insufficient role", body = crate::error::ErrorBody),
        (status = 409, description = "Duplicate company name", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "companies"
)]
pub async fn create_company(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateCompanyRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CompanyRecord>), AppError> {
    require_role(&caller, Role::Admin)?;
    let req = extract_validated_json(body)?;

    let name = req.name.trim().to_string();
    if state.companies.list().iter().any(|c| c.name == name) {
        return Err(AppError::Conflict(format!(
            "company name already exists: {name}"
        )));
    }

    let record = CompanyRecord {
        id: Uuid::new_v4(),
        name,
        description: req.description,
        created_at: Utc::now(),
    };

    state.companies.insert(record.id, record.clone());

    if let Some(pool) = &state.db_pool {
        crate::db::companies::insert(pool, &record)
            .await
            .map_err(|e| {
                let msg = e.to_string();
                // Concurrent create can slip past the in-memory check; the
                // unique constraint is the backstop.
                if msg.contains("unique") || msg.contains("duplicate") {
                    state.companies.remove(&record.id);
                    AppError::Conflict(format!("company name already exists: {}", record.name))
                } else {
                    AppError::Internal(msg)
                }
            })?;
    }

    audit::record(
        &state,
        caller.user_id,
        AuditAction::Create,
        ENTITY_COMPANY,
        record.id,
        format!("Created company: {}", record.name),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! Records live in thread-safe in-memory stores; when a PostgreSQL pool is
//! configured, every mutation is additionally persisted and the stores are
//! hydrated from the database on startup. Without a pool the API operates
//! in in-memory-only mode (used by the integration tests).

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use comreg_core::{AuditAction, LicenseStatus, RemittanceStatus};

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory key-value store.
///
/// All operations are synchronous (the RwLock is `parking_lot`, not
/// `tokio::sync`) because the lock is never held across `.await` points.
/// `parking_lot::RwLock` is non-poisonable — a panicking writer does not
/// permanently corrupt the store.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: Uuid, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &Uuid) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// List all records.
    pub fn list(&self) -> Vec<T> {
        self.data.read().values().cloned().collect()
    }

    /// Update a record in place. Returns the updated record, or `None` if not found.
    pub fn update(&self, id: &Uuid, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut guard = self.data.write();
        if let Some(entry) = guard.get_mut(id) {
            f(entry);
            Some(entry.clone())
        } else {
            None
        }
    }

    /// Remove a record by ID.
    pub fn remove(&self, id: &Uuid) -> Option<T> {
        self.data.write().remove(id)
    }

    /// Check if a record exists.
    pub fn contains(&self, id: &Uuid) -> bool {
        self.data.read().contains_key(id)
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Record Types -------------------------------------------------------------

/// A client company tracked by the registry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompanyRecord {
    pub id: Uuid,
    /// Company name; unique across the registry.
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A regulatory license held by a company.
///
/// `status` is always derived from `expiration_date` at write time via
/// [`LicenseStatus::classify`] — caller-supplied status values are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LicenseRecord {
    pub id: Uuid,
    pub company_id: Uuid,
    pub license_type: String,
    pub issuing_body: String,
    #[schema(value_type = String, format = Date)]
    pub issue_date: NaiveDate,
    #[schema(value_type = String, format = Date)]
    pub expiration_date: NaiveDate,
    #[schema(value_type = String)]
    pub status: LicenseStatus,
    pub document_path: Option<String>,
    pub notes: Option<String>,
    /// The user who created the record, when known.
    pub created_by: Option<Uuid>,
    /// The user who last updated the record, when known.
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A periodic financial remittance submitted by a company.
///
/// Unlike license status, `status` here is caller-managed and defaults to
/// [`RemittanceStatus::Pending`].
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RemittanceRecord {
    pub id: Uuid,
    pub company_id: Uuid,
    pub remittance_type: String,
    /// Reporting period label, e.g. "Q1 2026" or "March 2026".
    pub period: String,
    /// Reporting month, 1–12.
    pub month: u32,
    pub year: i32,
    pub amount: Option<f64>,
    pub proof_path: Option<String>,
    #[schema(value_type = String)]
    pub status: RemittanceStatus,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Immutable record of a mutating action, written once per successful
/// create/update/delete and never modified afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditLogEntry {
    pub id: Uuid,
    /// The acting user, when the caller identity carried one.
    pub actor: Option<Uuid>,
    #[schema(value_type = String)]
    pub action: AuditAction,
    /// Entity kind, e.g. "License" or "Remittance".
    pub entity_type: String,
    pub entity_id: Uuid,
    /// Human-readable description embedding the entity's distinguishing
    /// fields and its company's name.
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

// -- Application State --------------------------------------------------------

/// Application configuration.
///
/// Custom `Debug` redacts the `auth_token` to prevent credential leakage in logs.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Static bearer token secret. If `None`, authentication is disabled.
    pub auth_token: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
        }
    }
}

/// Shared application state accessible to all route handlers.
///
/// Clone-friendly via `Arc` internals in each `Store`.
#[derive(Debug, Clone)]
pub struct AppState {
    pub companies: Store<CompanyRecord>,
    pub licenses: Store<LicenseRecord>,
    pub remittances: Store<RemittanceRecord>,
    pub audit_log: Store<AuditLogEntry>,

    /// PostgreSQL connection pool for durable persistence.
    /// When `None`, the API operates in in-memory-only mode.
    pub db_pool: Option<PgPool>,

    pub config: AppConfig,
}

impl AppState {
    /// Create a new application state with default configuration and no database.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), None)
    }

    /// Create a new application state with the given configuration and
    /// optional database pool.
    pub fn with_config(config: AppConfig, db_pool: Option<PgPool>) -> Self {
        Self {
            companies: Store::new(),
            licenses: Store::new(),
            remittances: Store::new(),
            audit_log: Store::new(),
            db_pool,
            config,
        }
    }

    /// Hydrate in-memory stores from the database.
    ///
    /// Called once on startup when a database pool is available. Loads all
    /// persisted companies, licenses, remittances, and audit entries into
    /// the in-memory stores so that read operations remain fast and
    /// synchronous.
    pub async fn hydrate_from_db(&self) -> Result<(), sqlx::Error> {
        let pool = match &self.db_pool {
            Some(pool) => pool,
            None => return Ok(()),
        };

        let companies = crate::db::companies::load_all(pool).await?;
        let company_count = companies.len();
        for record in companies {
            self.companies.insert(record.id, record);
        }

        let licenses = crate::db::licenses::load_all(pool).await?;
        let license_count = licenses.len();
        for record in licenses {
            self.licenses.insert(record.id, record);
        }

        let remittances = crate::db::remittances::load_all(pool).await?;
        let remittance_count = remittances.len();
        for record in remittances {
            self.remittances.insert(record.id, record);
        }

        let audit_entries = crate::db::audit::load_all(pool).await?;
        let audit_count = audit_entries.len();
        for entry in audit_entries {
            self.audit_log.insert(entry.id, entry);
        }

        tracing::info!(
            companies = company_count,
            licenses = license_count,
            remittances = remittance_count,
            audit_entries = audit_count,
            "Hydrated in-memory stores from database"
        );

        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

//! Audit trail persistence — append-only.
//!
//! Entries are written once per successful mutation and never updated or
//! deleted by this system.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use comreg_core::AuditAction;

use crate::state::AuditLogEntry;

/// Append an audit entry to the log.
pub async fn append(pool: &PgPool, entry: &AuditLogEntry) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO audit_log (id, actor, action, entity_type, entity_id, details, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(entry.id)
    .bind(entry.actor)
    .bind(entry.action.as_str())
    .bind(&entry.entity_type)
    .bind(entry.entity_id)
    .bind(&entry.details)
    .bind(entry.timestamp)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all audit entries from the database into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<AuditLogEntry>, sqlx::Error> {
    let rows = sqlx::query_as::<_, AuditRow>(
        "SELECT id, actor, action, entity_type, entity_id, details, created_at
         FROM audit_log ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().filter_map(AuditRow::into_entry).collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct AuditRow {
    id: Uuid,
    actor: Option<Uuid>,
    action: String,
    entity_type: String,
    entity_id: Uuid,
    details: String,
    created_at: DateTime<Utc>,
}

impl AuditRow {
    fn into_entry(self) -> Option<AuditLogEntry> {
        let action: AuditAction = match self.action.parse() {
            Ok(action) => action,
            Err(e) => {
                // Skip rather than invent an action — the trail must never
                // misattribute a mutation kind.
                tracing::error!(
                    id = %self.id,
                    action = %self.action,
                    error = %e,
                    "unknown audit action in database — skipping entry"
                );
                return None;
            }
        };

        Some(AuditLogEntry {
            id: self.id,
            actor: self.actor,
            action,
            entity_type: self.entity_type,
            entity_id: self.entity_id,
            details: self.details,
            timestamp: self.created_at,
        })
    }
}

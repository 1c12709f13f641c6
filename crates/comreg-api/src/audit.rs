//! # Audit Recorder
//!
//! Records one [`AuditLogEntry`] after every successful mutation. The
//! write-then-audit pair is not wrapped in a transaction: a crash between
//! the two leaves a mutation without its audit entry (accepted gap). A
//! persistence failure after the in-memory mutation surfaces as an opaque
//! internal error, like any other storage fault.

use chrono::Utc;
use uuid::Uuid;

use comreg_core::AuditAction;

use crate::error::AppError;
use crate::state::{AppState, AuditLogEntry};

/// Entity type tag for company audit entries.
pub const ENTITY_COMPANY: &str = "Company";
/// Entity type tag for license audit entries.
pub const ENTITY_LICENSE: &str = "License";
/// Entity type tag for remittance audit entries.
pub const ENTITY_REMITTANCE: &str = "Remittance";

/// Record a mutation in the audit trail.
///
/// Invoked synchronously immediately after the storage mutation, for every
/// successful create/update/delete, with a human-readable description
/// embedding the mutated entity's distinguishing fields and its owning
/// company's name.
pub async fn record(
    state: &AppState,
    actor: Option<Uuid>,
    action: AuditAction,
    entity_type: &str,
    entity_id: Uuid,
    details: String,
) -> Result<(), AppError> {
    let entry = AuditLogEntry {
        id: Uuid::new_v4(),
        actor,
        action,
        entity_type: entity_type.to_string(),
        entity_id,
        details,
        timestamp: Utc::now(),
    };

    tracing::info!(
        actor = ?entry.actor,
        action = %entry.action,
        entity_type = %entry.entity_type,
        entity_id = %entry.entity_id,
        "audit: {}",
        entry.details
    );

    state.audit_log.insert(entry.id, entry.clone());

    if let Some(pool) = &state.db_pool {
        crate::db::audit::append(pool, &entry).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn record_appends_exactly_one_entry() {
        let state = AppState::new();
        let entity_id = Uuid::new_v4();
        let actor = Uuid::new_v4();

        record(
            &state,
            Some(actor),
            AuditAction::Create,
            ENTITY_LICENSE,
            entity_id,
            "Created license: Money Transfer License for Acme Transfers Ltd".to_string(),
        )
        .await
        .unwrap();

        let entries = state.audit_log.list();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.actor, Some(actor));
        assert_eq!(entry.action, AuditAction::Create);
        assert_eq!(entry.entity_type, ENTITY_LICENSE);
        assert_eq!(entry.entity_id, entity_id);
        assert!(entry.details.contains("Acme Transfers Ltd"));
    }
}

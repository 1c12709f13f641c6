//! Remittance persistence operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use comreg_core::RemittanceStatus;

use crate::state::RemittanceRecord;

/// Insert a new remittance record.
pub async fn insert(pool: &PgPool, record: &RemittanceRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO remittances (id, company_id, remittance_type, period, month, year,
         amount, proof_path, status, notes, created_by, updated_by, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
    )
    .bind(record.id)
    .bind(record.company_id)
    .bind(&record.remittance_type)
    .bind(&record.period)
    .bind(record.month as i32)
    .bind(record.year)
    .bind(record.amount)
    .bind(&record.proof_path)
    .bind(record.status.as_str())
    .bind(&record.notes)
    .bind(record.created_by)
    .bind(record.updated_by)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Update an existing remittance record. Returns whether a row was affected.
pub async fn update(pool: &PgPool, record: &RemittanceRecord) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE remittances SET company_id = $2, remittance_type = $3, period = $4,
         month = $5, year = $6, amount = $7, proof_path = $8, status = $9, notes = $10,
         updated_by = $11, updated_at = $12
         WHERE id = $1",
    )
    .bind(record.id)
    .bind(record.company_id)
    .bind(&record.remittance_type)
    .bind(&record.period)
    .bind(record.month as i32)
    .bind(record.year)
    .bind(record.amount)
    .bind(&record.proof_path)
    .bind(record.status.as_str())
    .bind(&record.notes)
    .bind(record.updated_by)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a remittance by ID. Returns whether a row was affected.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM remittances WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all remittances from the database into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<RemittanceRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, RemittanceRow>(
        "SELECT id, company_id, remittance_type, period, month, year, amount, proof_path,
         status, notes, created_by, updated_by, created_at, updated_at
         FROM remittances ORDER BY year DESC, month DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(RemittanceRow::into_record).collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct RemittanceRow {
    id: Uuid,
    company_id: Uuid,
    remittance_type: String,
    period: String,
    month: i32,
    year: i32,
    amount: Option<f64>,
    proof_path: Option<String>,
    status: String,
    notes: Option<String>,
    created_by: Option<Uuid>,
    updated_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RemittanceRow {
    fn into_record(self) -> RemittanceRecord {
        let status: RemittanceStatus = self.status.parse().unwrap_or_else(|e| {
            tracing::error!(
                id = %self.id,
                status = %self.status,
                error = %e,
                "unknown remittance status in database — defaulting to PENDING; \
                 investigate: this may indicate prior data corruption"
            );
            RemittanceStatus::Pending
        });

        RemittanceRecord {
            id: self.id,
            company_id: self.company_id,
            remittance_type: self.remittance_type,
            period: self.period,
            month: self.month as u32,
            year: self.year,
            amount: self.amount,
            proof_path: self.proof_path,
            status,
            notes: self.notes,
            created_by: self.created_by,
            updated_by: self.updated_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

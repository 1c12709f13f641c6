//! License persistence operations.
//!
//! Status is stored as the text the classifier produced at write time. The
//! read path re-derives a status from the expiration date if the stored
//! text is unrecognized, logging at ERROR because that indicates prior
//! data corruption.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use comreg_core::LicenseStatus;

use crate::state::LicenseRecord;

/// Insert a new license record.
pub async fn insert(pool: &PgPool, record: &LicenseRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO licenses (id, company_id, license_type, issuing_body, issue_date,
         expiration_date, status, document_path, notes, created_by, updated_by,
         created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
    )
    .bind(record.id)
    .bind(record.company_id)
    .bind(&record.license_type)
    .bind(&record.issuing_body)
    .bind(record.issue_date)
    .bind(record.expiration_date)
    .bind(record.status.as_str())
    .bind(&record.document_path)
    .bind(&record.notes)
    .bind(record.created_by)
    .bind(record.updated_by)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Update an existing license record. Returns whether a row was affected.
pub async fn update(pool: &PgPool, record: &LicenseRecord) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE licenses SET company_id = $2, license_type = $3, issuing_body = $4,
         issue_date = $5, expiration_date = $6, status = $7, document_path = $8,
         notes = $9, updated_by = $10, updated_at = $11
         WHERE id = $1",
    )
    .bind(record.id)
    .bind(record.company_id)
    .bind(&record.license_type)
    .bind(&record.issuing_body)
    .bind(record.issue_date)
    .bind(record.expiration_date)
    .bind(record.status.as_str())
    .bind(&record.document_path)
    .bind(&record.notes)
    .bind(record.updated_by)
    .bind(record.updated_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Persist a re-derived status for one license (used by the reminder job's
/// refresh sweep). Returns whether a row was affected.
pub async fn update_status(
    pool: &PgPool,
    id: Uuid,
    status: LicenseStatus,
    updated_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE licenses SET status = $2, updated_at = $3 WHERE id = $1")
        .bind(id)
        .bind(status.as_str())
        .bind(updated_at)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a license by ID. Returns whether a row was affected.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM licenses WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all licenses from the database into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<LicenseRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, LicenseRow>(
        "SELECT id, company_id, license_type, issuing_body, issue_date, expiration_date,
         status, document_path, notes, created_by, updated_by, created_at, updated_at
         FROM licenses ORDER BY expiration_date",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(LicenseRow::into_record).collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct LicenseRow {
    id: Uuid,
    company_id: Uuid,
    license_type: String,
    issuing_body: String,
    issue_date: NaiveDate,
    expiration_date: NaiveDate,
    status: String,
    document_path: Option<String>,
    notes: Option<String>,
    created_by: Option<Uuid>,
    updated_by: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LicenseRow {
    fn into_record(self) -> LicenseRecord {
        let status: LicenseStatus = self.status.parse().unwrap_or_else(|e| {
            // READ path: an unknown status string may indicate prior data
            // corruption. Re-derive from the expiration date rather than
            // trusting the stored text.
            tracing::error!(
                id = %self.id,
                status = %self.status,
                error = %e,
                "unknown license status in database — re-deriving from expiration date"
            );
            LicenseStatus::classify(self.expiration_date, Utc::now().date_naive())
        });

        LicenseRecord {
            id: self.id,
            company_id: self.company_id,
            license_type: self.license_type,
            issuing_body: self.issuing_body,
            issue_date: self.issue_date,
            expiration_date: self.expiration_date,
            status,
            document_path: self.document_path,
            notes: self.notes,
            created_by: self.created_by,
            updated_by: self.updated_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

//! Company persistence operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::state::CompanyRecord;

/// Insert a new company record.
pub async fn insert(pool: &PgPool, record: &CompanyRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO companies (id, name, description, created_at)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(record.id)
    .bind(&record.name)
    .bind(&record.description)
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all companies from the database into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<CompanyRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CompanyRow>(
        "SELECT id, name, description, created_at FROM companies ORDER BY name",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(CompanyRow::into_record).collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct CompanyRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl CompanyRow {
    fn into_record(self) -> CompanyRecord {
        CompanyRecord {
            id: self.id,
            name: self.name,
            description: self.description,
            created_at: self.created_at,
        }
    }
}

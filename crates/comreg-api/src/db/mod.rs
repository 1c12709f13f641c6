//! # Database Persistence
//!
//! Optional PostgreSQL persistence behind the in-memory stores. Each
//! submodule owns one table; all functions take a `&PgPool`. Domain rules
//! (status derivation, access policy) are enforced at the application
//! layer, not in SQL.

pub mod audit;
pub mod companies;
pub mod licenses;
pub mod remittances;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Initialize the database pool from `DATABASE_URL`.
///
/// Returns `Ok(None)` when the variable is unset — the API then runs with
/// in-memory stores only. When set, connects, ensures the schema exists,
/// and returns the pool.
pub async fn init_pool() -> Result<Option<PgPool>, sqlx::Error> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::info!("DATABASE_URL not set — running with in-memory stores only");
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await?;

    ensure_schema(&pool).await?;
    tracing::info!("Database pool initialized");
    Ok(Some(pool))
}

/// Create the registry tables if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS companies (
             id UUID PRIMARY KEY,
             name TEXT NOT NULL UNIQUE,
             description TEXT,
             created_at TIMESTAMPTZ NOT NULL
         )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS licenses (
             id UUID PRIMARY KEY,
             company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
             license_type TEXT NOT NULL,
             issuing_body TEXT NOT NULL,
             issue_date DATE NOT NULL,
             expiration_date DATE NOT NULL,
             status TEXT NOT NULL,
             document_path TEXT,
             notes TEXT,
             created_by UUID,
             updated_by UUID,
             created_at TIMESTAMPTZ NOT NULL,
             updated_at TIMESTAMPTZ NOT NULL
         )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS remittances (
             id UUID PRIMARY KEY,
             company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
             remittance_type TEXT NOT NULL,
             period TEXT NOT NULL,
             month INT NOT NULL,
             year INT NOT NULL,
             amount DOUBLE PRECISION,
             proof_path TEXT,
             status TEXT NOT NULL,
             notes TEXT,
             created_by UUID,
             updated_by UUID,
             created_at TIMESTAMPTZ NOT NULL,
             updated_at TIMESTAMPTZ NOT NULL
         )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS audit_log (
             id UUID PRIMARY KEY,
             actor UUID,
             action TEXT NOT NULL,
             entity_type TEXT NOT NULL,
             entity_id UUID NOT NULL,
             details TEXT NOT NULL,
             created_at TIMESTAMPTZ NOT NULL
         )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

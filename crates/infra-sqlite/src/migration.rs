// Migration Runner

use salon_core::error::Result;
use sqlx::Connection;
use tracing::info;

use crate::error_map::map_sqlx_error;
use crate::pool::ConnectionPool;

/// Bring the database schema up to the current version.
///
/// Runs on one pooled connection; safe to call on every startup (applied
/// versions are recorded in `schema_version` and skipped on re-run).
pub async fn run_migrations(pool: &ConnectionPool) -> Result<()> {
    let mut conn = pool.acquire().await?;

    let table_exists: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='schema_version'",
    )
    .fetch_one(&mut *conn)
    .await
    .map_err(map_sqlx_error)?;

    let current_version: i64 = if table_exists > 0 {
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(&mut *conn)
            .await
            .map_err(map_sqlx_error)?
            .unwrap_or(0)
    } else {
        0
    };

    info!(current_version, "checking schema version");

    if current_version < 1 {
        info!("applying migration 001: initial schema");
        apply_migration(&mut conn, include_str!("../migrations/001_initial_schema.sql")).await?;
    }

    info!("schema up to date");
    Ok(())
}

/// Apply a single migration SQL file inside one transaction.
async fn apply_migration(conn: &mut sqlx::SqliteConnection, sql: &str) -> Result<()> {
    let mut tx = conn.begin().await.map_err(map_sqlx_error)?;

    // Split by semicolon and execute each statement, dropping comment lines
    for statement in sql.split(';') {
        let clean_statement: String = statement
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string();

        if !clean_statement.is_empty() {
            sqlx::query(&clean_statement)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
        }
    }

    tx.commit().await.map_err(map_sqlx_error)?;
    Ok(())
}

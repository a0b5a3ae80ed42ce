//! Schema definitions and migration utilities.
//!
//! The schema SQL is embedded at compile time and written to be idempotent,
//! so it runs on every startup.

use sqlx::PgPool;

use crate::error::{StoreError, StoreResult};

/// Embedded migration SQL for the resource tables (001_schema.sql).
pub const SCHEMA_MIGRATION: &str = include_str!("../../../migrations/001_schema.sql");

/// Tables the schema migration creates.
pub const TABLES: [&str; 3] = ["bookmarks", "folders", "notes"];

/// Run all pending migrations against the database.
///
/// # Errors
///
/// Returns an error if the migration fails to execute.
pub async fn run_migrations(pool: &PgPool) -> StoreResult<()> {
    tracing::info!("Running database migrations...");

    tracing::debug!("Running schema migration (001_schema.sql)...");
    sqlx::raw_sql(SCHEMA_MIGRATION)
        .execute(pool)
        .await
        .map_err(|e| StoreError::MigrationError(format!("Schema migration failed: {}", e)))?;

    tracing::info!("Migrations completed successfully");
    Ok(())
}

/// Check if the schema has been initialized.
///
/// Returns true if every resource table exists.
pub async fn is_schema_initialized(pool: &PgPool) -> StoreResult<bool> {
    let (count,): (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*)::bigint
        FROM information_schema.tables
        WHERE table_schema = current_schema() AND table_name = ANY($1)
        "#,
    )
    .bind(&TABLES[..])
    .fetch_one(pool)
    .await?;

    Ok(count == TABLES.len() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_creates_every_resource_table() {
        for table in TABLES {
            assert!(
                SCHEMA_MIGRATION.contains(&format!("CREATE TABLE IF NOT EXISTS {table}")),
                "missing table {table}"
            );
        }
    }

    #[test]
    fn test_schema_matches_resource_fields() {
        for resource in noteful_core::RESOURCES {
            assert!(TABLES.contains(&resource.table));
            for field in resource.fields {
                assert!(
                    SCHEMA_MIGRATION.contains(&format!("    {} ", field.name)),
                    "column {}.{} missing from schema",
                    resource.table,
                    field.name
                );
            }
        }
    }

    #[test]
    fn test_note_folder_is_not_a_foreign_key() {
        assert!(!SCHEMA_MIGRATION.contains("REFERENCES"));
    }
}

//! Database schema migrations.

use rusqlite::Connection;
use tracing::info;

use neon_core::error::NeonError;

/// Run all pending database migrations.
pub fn run_migrations(conn: &Connection) -> Result<(), NeonError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version     INTEGER PRIMARY KEY NOT NULL,
            name        TEXT NOT NULL,
            applied_at  INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );",
    )
    .map_err(|e| NeonError::Storage(format!("Failed to create migrations table: {}", e)))?;

    let current_version: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .map_err(|e| NeonError::Storage(format!("Failed to query migration version: {}", e)))?;

    if current_version < 1 {
        apply_v1(conn)?;
        info!("Applied migration v1: users");
    }

    Ok(())
}

/// Version 1: user accounts.
fn apply_v1(conn: &Connection) -> Result<(), NeonError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id              TEXT PRIMARY KEY NOT NULL,
            email           TEXT NOT NULL UNIQUE COLLATE NOCASE,
            password_hash   TEXT NOT NULL,
            first_name      TEXT NOT NULL DEFAULT '',
            last_name       TEXT NOT NULL DEFAULT '',
            age             INTEGER,
            occupation      TEXT NOT NULL
                            CHECK (occupation IN ('student', 'employee')),
            organization    TEXT NOT NULL DEFAULT '',
            wake_word       TEXT NOT NULL DEFAULT 'hey alexa',
            created_at      INTEGER NOT NULL DEFAULT (strftime('%s', 'now'))
        );

        INSERT INTO schema_migrations (version, name) VALUES (1, 'users');
        ",
    )
    .map_err(|e| NeonError::Storage(format!("Migration v1 failed: {}", e)))?;
    Ok(())
}

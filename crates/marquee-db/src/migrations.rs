//! Schema version management using `PRAGMA user_version`.

use anyhow::{Context, Result};
use rusqlite::Connection;

/// Current schema version.
const CURRENT_VERSION: u32 = 1;

/// Runs database migrations up to `CURRENT_VERSION`.
///
/// # Errors
///
/// Returns an error if any SQL statement fails.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let version: u32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read user_version")?;

    if version < 1 {
        migrate_v1(conn).context("migration to v1 failed")?;
    }

    if version < CURRENT_VERSION {
        tracing::info!(from = version, to = CURRENT_VERSION, "migrated favorites schema");
    }

    conn.pragma_update(None, "user_version", CURRENT_VERSION)
        .context("failed to update user_version")?;

    Ok(())
}

/// Migration to v1: create the `favorites` table.
fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS favorites (
            id            TEXT PRIMARY KEY NOT NULL,
            title         TEXT NOT NULL,
            poster_url    TEXT NOT NULL DEFAULT '',
            rating        REAL NOT NULL DEFAULT 0.0,
            year          INTEGER NOT NULL DEFAULT 0,
            description   TEXT NOT NULL DEFAULT '',
            kind          TEXT NOT NULL DEFAULT 'movie',
            favorited_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_favorites_favorited_at ON favorites(favorited_at);",
    )
    .context("failed to create favorites table")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_migrations_idempotent() {
        // Arrange
        let conn = Connection::open_in_memory().unwrap();

        // Act
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        // Assert
        let version: u32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }

    #[test]
    fn test_favorites_table_columns() {
        // Arrange
        let conn = Connection::open_in_memory().unwrap();

        // Act
        run_migrations(&conn).unwrap();

        // Assert
        let stmt = conn
            .prepare(
                "SELECT id, title, poster_url, rating, year, description, kind, favorited_at
                 FROM favorites LIMIT 0",
            )
            .unwrap();
        assert_eq!(stmt.column_count(), 8);
    }
}

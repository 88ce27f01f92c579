//! Favorites CRUD operations.

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row};

/// Columns selected for a [`FavoriteRecord`], in field order.
const SELECT_COLUMNS: &str =
    "SELECT id, title, poster_url, rating, year, description, kind, favorited_at FROM favorites";

/// A favorited catalog item as persisted.
///
/// Optional item fields are already defaulted: rating `0.0`, year `0`,
/// empty description and poster URL.
#[derive(Debug, Clone, PartialEq)]
pub struct FavoriteRecord {
    /// IMDb title ID (primary key).
    pub id: String,
    /// Display title.
    pub title: String,
    /// Poster image URL (empty when unknown).
    pub poster_url: String,
    /// Average rating (0.0 when unknown).
    pub rating: f64,
    /// Release year (0 when unknown).
    pub year: i32,
    /// Plot summary (empty when unknown).
    pub description: String,
    /// Item kind as stored (`movie` / `tvSeries`).
    pub kind: String,
    /// RFC 3339 timestamp of when the item was favorited.
    pub favorited_at: String,
}

/// Maps a row selected with `SELECT_COLUMNS`.
fn record_from_row(row: &Row<'_>) -> rusqlite::Result<FavoriteRecord> {
    Ok(FavoriteRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        poster_url: row.get(2)?,
        rating: row.get(3)?,
        year: row.get(4)?,
        description: row.get(5)?,
        kind: row.get(6)?,
        favorited_at: row.get(7)?,
    })
}

/// Inserts a favorite, replacing every field of an existing row with the same id.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn upsert_favorite(conn: &Connection, record: &FavoriteRecord) -> Result<()> {
    conn.execute(
        "INSERT INTO favorites (
            id, title, poster_url, rating, year, description, kind, favorited_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        ON CONFLICT(id) DO UPDATE SET
            title = excluded.title,
            poster_url = excluded.poster_url,
            rating = excluded.rating,
            year = excluded.year,
            description = excluded.description,
            kind = excluded.kind,
            favorited_at = excluded.favorited_at",
        rusqlite::params![
            record.id,
            record.title,
            record.poster_url,
            record.rating,
            record.year,
            record.description,
            record.kind,
            record.favorited_at,
        ],
    )
    .with_context(|| format!("failed to upsert favorite {}", record.id))?;
    Ok(())
}

/// Deletes a favorite. Returns `true` if a row was removed.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn delete_favorite(conn: &Connection, id: &str) -> Result<bool> {
    let rows = conn
        .execute("DELETE FROM favorites WHERE id = ?1", [id])
        .with_context(|| format!("failed to delete favorite {id}"))?;
    Ok(rows > 0)
}

/// Loads all favorites, oldest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn load_favorites(conn: &Connection) -> Result<Vec<FavoriteRecord>> {
    let sql = format!("{SELECT_COLUMNS} ORDER BY favorited_at, id");
    let mut stmt = conn
        .prepare(&sql)
        .context("failed to prepare favorites query")?;

    let rows = stmt
        .query_map([], record_from_row)
        .context("failed to query favorites")?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to read favorites rows")
}

/// Loads a single favorite by id.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn load_favorite(conn: &Connection, id: &str) -> Result<Option<FavoriteRecord>> {
    let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
    conn.query_row(&sql, [id], record_from_row)
        .optional()
        .with_context(|| format!("failed to load favorite {id}"))
}

/// Returns whether a favorite with `id` exists.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn favorite_exists(conn: &Connection, id: &str) -> Result<bool> {
    conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM favorites WHERE id = ?1)",
        [id],
        |row| row.get(0),
    )
    .with_context(|| format!("failed to check favorite {id}"))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;
    use crate::connection::open_in_memory;

    fn record(id: &str, title: &str, favorited_at: &str) -> FavoriteRecord {
        FavoriteRecord {
            id: String::from(id),
            title: String::from(title),
            poster_url: String::new(),
            rating: 8.5,
            year: 1999,
            description: String::new(),
            kind: String::from("movie"),
            favorited_at: String::from(favorited_at),
        }
    }

    #[test]
    fn test_upsert_and_load_favorite() {
        // Arrange
        let conn = open_in_memory().unwrap();
        let fav = record("tt0133093", "The Matrix", "2026-01-01T00:00:00.000Z");

        // Act
        upsert_favorite(&conn, &fav).unwrap();
        let loaded = load_favorite(&conn, "tt0133093").unwrap();

        // Assert
        assert_eq!(loaded, Some(fav));
    }

    #[test]
    fn test_upsert_replaces_existing_fields() {
        // Arrange
        let conn = open_in_memory().unwrap();
        upsert_favorite(&conn, &record("tt1", "Old", "2026-01-01T00:00:00.000Z")).unwrap();
        let mut updated = record("tt1", "New", "2026-02-01T00:00:00.000Z");
        updated.kind = String::from("tvSeries");

        // Act
        upsert_favorite(&conn, &updated).unwrap();

        // Assert
        let all = load_favorites(&conn).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "New");
        assert_eq!(all[0].kind, "tvSeries");
    }

    #[test]
    fn test_load_favorites_oldest_first() {
        // Arrange
        let conn = open_in_memory().unwrap();
        upsert_favorite(&conn, &record("tt2", "Second", "2026-03-02T00:00:00.000Z")).unwrap();
        upsert_favorite(&conn, &record("tt1", "First", "2026-03-01T00:00:00.000Z")).unwrap();

        // Act
        let all = load_favorites(&conn).unwrap();

        // Assert
        let ids: Vec<&str> = all.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["tt1", "tt2"]);
    }

    #[test]
    fn test_delete_favorite() {
        // Arrange
        let conn = open_in_memory().unwrap();
        upsert_favorite(&conn, &record("tt1", "Gone", "2026-01-01T00:00:00.000Z")).unwrap();

        // Act
        let removed = delete_favorite(&conn, "tt1").unwrap();
        let removed_again = delete_favorite(&conn, "tt1").unwrap();

        // Assert
        assert!(removed);
        assert!(!removed_again);
        assert!(!favorite_exists(&conn, "tt1").unwrap());
    }

    #[test]
    fn test_missing_favorite_is_none() {
        // Arrange
        let conn = open_in_memory().unwrap();

        // Act
        let loaded = load_favorite(&conn, "tt404").unwrap();

        // Assert
        assert_eq!(loaded, None);
        assert!(!favorite_exists(&conn, "tt404").unwrap());
    }
}

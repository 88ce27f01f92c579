//! Observable favorites store.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;
use tokio::sync::watch;

use super::connection::{open_db, open_in_memory};
use super::favorites::{
    FavoriteRecord, delete_favorite, favorite_exists, load_favorite, load_favorites,
    upsert_favorite,
};

/// Favorites table plus a change channel.
///
/// Every successful insert or effective delete re-reads the table and
/// publishes the full ordered list to all subscribers. New subscribers see
/// the current list immediately.
#[derive(Debug)]
pub struct FavoritesDb {
    /// Shared connection. Operations are short, so a blocking mutex suffices.
    conn: Mutex<Connection>,
    /// Latest full list.
    changes: watch::Sender<Vec<FavoriteRecord>>,
}

impl FavoritesDb {
    /// Wraps an already migrated connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial snapshot cannot be read.
    pub fn new(conn: Connection) -> Result<Self> {
        let initial = load_favorites(&conn).context("failed to load initial favorites")?;
        let (changes, _) = watch::channel(initial);
        Ok(Self {
            conn: Mutex::new(conn),
            changes,
        })
    }

    /// Opens the on-disk database (see [`open_db`]).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or read.
    pub fn open(dir: Option<&PathBuf>) -> Result<Self> {
        Self::new(open_db(dir)?)
    }

    /// Opens a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    pub fn in_memory() -> Result<Self> {
        Self::new(open_in_memory()?)
    }

    /// Subscribes to the full favorites list.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<FavoriteRecord>> {
        self.changes.subscribe()
    }

    /// Current favorites, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn all(&self) -> Result<Vec<FavoriteRecord>> {
        load_favorites(&*self.lock()?)
    }

    /// Returns whether `id` is a favorite.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn exists(&self, id: &str) -> Result<bool> {
        favorite_exists(&*self.lock()?, id)
    }

    /// Loads a favorite by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get(&self, id: &str) -> Result<Option<FavoriteRecord>> {
        load_favorite(&*self.lock()?, id)
    }

    /// Inserts or replaces a favorite and notifies subscribers.
    ///
    /// # Errors
    ///
    /// Returns an error if the write or the follow-up read fails.
    pub fn insert_or_replace(&self, record: &FavoriteRecord) -> Result<()> {
        let conn = self.lock()?;
        upsert_favorite(&conn, record)?;
        self.publish(&conn)
    }

    /// Deletes a favorite. Subscribers are notified only if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete or the follow-up read fails.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let removed = delete_favorite(&conn, id)?;
        if removed {
            self.publish(&conn)?;
        }
        Ok(removed)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("favorites connection lock poisoned"))
    }

    /// Re-reads the table and pushes it to subscribers.
    fn publish(&self, conn: &Connection) -> Result<()> {
        let all = load_favorites(conn).context("failed to reload favorites")?;
        tracing::debug!(count = all.len(), "favorites changed");
        self.changes.send_replace(all);
        Ok(())
    }
}

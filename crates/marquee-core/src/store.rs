//! `FavoritesStore` trait definition.
#![allow(clippy::future_not_send)]

use std::sync::Arc;

use anyhow::Result;
use marquee_db::{FavoriteRecord, FavoritesDb};
use tokio::sync::watch;

/// Durable, observable favorites collection.
///
/// Abstracts the favorites table for fake substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(FavoritesStore: Send)]
pub trait LocalFavoritesStore {
    /// Subscribes to the full list. The receiver holds the current list and
    /// changes after every insert and delete.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn observe_all(&self) -> Result<watch::Receiver<Vec<FavoriteRecord>>>;

    /// Returns whether `id` is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn exists(&self, id: &str) -> Result<bool>;

    /// Loads the record for `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    async fn get(&self, id: &str) -> Result<Option<FavoriteRecord>>;

    /// Inserts `record`, replacing any record with the same id.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    async fn insert_or_replace(&self, record: &FavoriteRecord) -> Result<()>;

    /// Deletes the record for `id`. Deleting a missing id is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    async fn delete(&self, id: &str) -> Result<()>;
}

impl FavoritesStore for FavoritesDb {
    async fn observe_all(&self) -> Result<watch::Receiver<Vec<FavoriteRecord>>> {
        Ok(self.subscribe())
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        Self::exists(self, id)
    }

    async fn get(&self, id: &str) -> Result<Option<FavoriteRecord>> {
        Self::get(self, id)
    }

    async fn insert_or_replace(&self, record: &FavoriteRecord) -> Result<()> {
        Self::insert_or_replace(self, record)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        Self::delete(self, id).map(|_| ())
    }
}

impl<T> FavoritesStore for Arc<T>
where
    T: FavoritesStore + Send + Sync,
{
    async fn observe_all(&self) -> Result<watch::Receiver<Vec<FavoriteRecord>>> {
        FavoritesStore::observe_all(&**self).await
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        FavoritesStore::exists(&**self, id).await
    }

    async fn get(&self, id: &str) -> Result<Option<FavoriteRecord>> {
        FavoritesStore::get(&**self, id).await
    }

    async fn insert_or_replace(&self, record: &FavoriteRecord) -> Result<()> {
        FavoritesStore::insert_or_replace(&**self, record).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        FavoritesStore::delete(&**self, id).await
    }
}

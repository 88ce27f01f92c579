//! Database module for favorited catalog items.
//!
//! Uses `rusqlite` (bundled `SQLite`) to persist favorites, and a
//! `tokio::sync::watch` channel to publish the full list after every change.

mod connection;
/// Favorites CRUD operations.
pub mod favorites;
mod migrations;
mod observable;
mod paths;

#[allow(clippy::module_name_repetitions)]
pub use connection::{open_db, open_in_memory};
pub use favorites::{
    FavoriteRecord, delete_favorite, favorite_exists, load_favorite, load_favorites,
    upsert_favorite,
};
pub use observable::FavoritesDb;
pub use paths::{AppDir, resolve_app_file};

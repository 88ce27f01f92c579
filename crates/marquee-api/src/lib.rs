//! API client library for marquee.
//!
//! Provides the catalog item model and a client for the IMDb chart
//! endpoints (top 250 and most popular, movies and TV).

/// IMDb chart API client.
pub mod imdb;

#[allow(clippy::module_name_repetitions)]
pub use imdb::{
    CatalogApi, CatalogClient, CatalogClientBuilder, CatalogError, Chart, Item, ItemKind,
    LocalCatalogApi,
};

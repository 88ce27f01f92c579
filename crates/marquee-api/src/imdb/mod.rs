//! IMDb chart API client module.
//!
//! Handles HTTP requests to the RapidAPI-hosted IMDb chart endpoints
//! and decodes them into catalog [`Item`]s.

mod api;
mod client;
mod error;
mod rate_limiter;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{CatalogApi, LocalCatalogApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{CatalogClient, CatalogClientBuilder};
pub use error::CatalogError;
pub use types::{Chart, Item, ItemKind};

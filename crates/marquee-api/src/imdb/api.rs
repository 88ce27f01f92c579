//! `CatalogApi` trait definition.
#![allow(clippy::future_not_send)]

use super::error::CatalogError;
use super::types::{Chart, Item};

/// Remote catalog trait.
///
/// Abstracts chart retrieval for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(CatalogApi: Send)]
pub trait LocalCatalogApi {
    /// Fetches every item of a chart, in chart order.
    ///
    /// An empty list is returned as-is; callers decide what it means.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the request fails, the server answers
    /// with a non-success status, or the body cannot be decoded.
    async fn fetch_chart(&self, chart: Chart) -> Result<Vec<Item>, CatalogError>;
}

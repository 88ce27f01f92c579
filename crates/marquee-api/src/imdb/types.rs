//! Catalog item model and chart identifiers.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Base URL for IMDb title pages.
const IMDB_TITLE_URL: &str = "https://www.imdb.com/title/";

// --- Chart ---

/// A remote chart served by the catalog API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Chart {
    /// Top 250 movies.
    TopMovies,
    /// Most popular movies.
    PopularMovies,
    /// Top 250 TV series.
    TopSeries,
    /// Most popular TV series.
    PopularSeries,
}

impl Chart {
    /// All charts, in browsing order.
    pub const ALL: [Self; 4] = [
        Self::TopMovies,
        Self::PopularMovies,
        Self::TopSeries,
        Self::PopularSeries,
    ];

    /// Endpoint path relative to the API base URL.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::TopMovies => "imdb/top250-movies",
            Self::PopularMovies => "imdb/most-popular-movies",
            Self::TopSeries => "imdb/top250-tv",
            Self::PopularSeries => "imdb/most-popular-tv",
        }
    }
}

impl fmt::Display for Chart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::TopMovies => "top-movies",
            Self::PopularMovies => "popular-movies",
            Self::TopSeries => "top-series",
            Self::PopularSeries => "popular-series",
        };
        f.write_str(label)
    }
}

// --- Item ---

/// Kind of catalog entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum ItemKind {
    /// Feature film (also the fallback for unknown types).
    #[default]
    #[serde(rename = "movie")]
    Movie,
    /// TV series or mini-series.
    #[serde(rename = "tvSeries")]
    Series,
}

impl ItemKind {
    /// Parses an API `type` string. Unknown values fall back to `Movie`.
    #[must_use]
    pub fn from_wire(raw: &str) -> Self {
        match raw {
            "tvSeries" | "tvMiniSeries" => Self::Series,
            _ => Self::Movie,
        }
    }

    /// Canonical string form, as stored in the favorites table.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Series => "tvSeries",
        }
    }
}

/// A single catalog entry (movie or series).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// IMDb title ID (e.g. `tt0068646`).
    pub id: String,
    /// Primary display title.
    #[serde(rename = "primaryTitle")]
    pub title: String,
    /// Original title (empty when the API omits it).
    #[serde(rename = "originalTitle", default)]
    pub original_title: String,
    /// Release year.
    #[serde(rename = "startYear", default)]
    pub year: Option<i32>,
    /// Plot summary.
    #[serde(default)]
    pub description: Option<String>,
    /// Poster image URL.
    #[serde(rename = "primaryImage", default)]
    pub poster_url: Option<String>,
    /// Average rating (0.0 - 10.0).
    #[serde(rename = "averageRating", default)]
    pub rating: Option<f64>,
    /// Movie or series.
    #[serde(rename = "type", default, deserialize_with = "deserialize_kind")]
    pub kind: ItemKind,
}

impl Item {
    /// IMDb page for this title.
    #[must_use]
    pub fn imdb_url(&self) -> String {
        format!("{IMDB_TITLE_URL}{}/", self.id)
    }

    /// Plain-text message for sharing this title.
    #[must_use]
    pub fn share_text(&self) -> String {
        format!("Check out {}! {}", self.title, self.imdb_url())
    }
}

/// Accepts a missing, null, or unknown `type` as [`ItemKind::Movie`].
fn deserialize_kind<'de, D>(deserializer: D) -> Result<ItemKind, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().map_or(ItemKind::Movie, ItemKind::from_wire))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;

    #[test]
    fn test_parse_chart_fixture() {
        // Arrange
        let json = include_str!("../../fixtures/top250_movies.json");

        // Act
        let items: Vec<Item> = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(items.len(), 3);
        let first = &items[0];
        assert_eq!(first.id, "tt0111161");
        assert_eq!(first.title, "The Shawshank Redemption");
        assert_eq!(first.year, Some(1994));
        assert_eq!(first.kind, ItemKind::Movie);
        assert!(first.poster_url.is_some());
    }

    #[test]
    fn test_parse_item_with_missing_optionals() {
        // Arrange
        let json = r#"{"id":"tt1","primaryTitle":"Bare"}"#;

        // Act
        let item: Item = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(item.original_title, "");
        assert_eq!(item.year, None);
        assert_eq!(item.rating, None);
        assert_eq!(item.description, None);
        assert_eq!(item.kind, ItemKind::Movie);
    }

    #[test]
    fn test_parse_item_with_null_type_defaults_to_movie() {
        // Arrange
        let json = r#"{"id":"tt1","primaryTitle":"X","type":null}"#;

        // Act
        let item: Item = serde_json::from_str(json).unwrap();

        // Assert
        assert_eq!(item.kind, ItemKind::Movie);
    }

    #[test]
    fn test_parse_series_kinds() {
        // Arrange & Act & Assert
        assert_eq!(ItemKind::from_wire("tvSeries"), ItemKind::Series);
        assert_eq!(ItemKind::from_wire("tvMiniSeries"), ItemKind::Series);
        assert_eq!(ItemKind::from_wire("movie"), ItemKind::Movie);
        assert_eq!(ItemKind::from_wire("videoGame"), ItemKind::Movie);
    }

    #[test]
    fn test_kind_as_str_is_parseable() {
        // Arrange & Act & Assert
        assert_eq!(ItemKind::from_wire(ItemKind::Series.as_str()), ItemKind::Series);
        assert_eq!(ItemKind::from_wire(ItemKind::Movie.as_str()), ItemKind::Movie);
    }

    #[test]
    fn test_imdb_url_and_share_text() {
        // Arrange
        let item: Item =
            serde_json::from_str(r#"{"id":"tt0068646","primaryTitle":"The Godfather"}"#).unwrap();

        // Act
        let url = item.imdb_url();
        let share = item.share_text();

        // Assert
        assert_eq!(url, "https://www.imdb.com/title/tt0068646/");
        assert!(share.contains("The Godfather"));
        assert!(share.contains(&url));
    }

    #[test]
    fn test_chart_paths_are_distinct() {
        // Arrange
        let mut paths: Vec<&str> = Chart::ALL.iter().map(|c| c.path()).collect();

        // Act
        paths.sort_unstable();
        paths.dedup();

        // Assert
        assert_eq!(paths.len(), Chart::ALL.len());
    }
}

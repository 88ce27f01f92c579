//! Browsing categories and the favorites kind filter.

use std::fmt;
use std::str::FromStr;

use anyhow::{Error, bail};
use marquee_api::{Chart, ItemKind};
use serde::{Deserialize, Serialize};

/// A browsing tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Top 250 movies.
    TopMovies,
    /// Most popular movies.
    PopularMovies,
    /// Top 250 TV series.
    TopSeries,
    /// Most popular TV series.
    PopularSeries,
    /// Locally stored favorites.
    Favorites,
}

impl Category {
    /// All categories, in tab order.
    pub const ALL: [Self; 5] = [
        Self::TopMovies,
        Self::PopularMovies,
        Self::TopSeries,
        Self::PopularSeries,
        Self::Favorites,
    ];

    /// Category at tab position `index`.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Remote chart backing this category. `None` for favorites.
    #[must_use]
    pub const fn chart(self) -> Option<Chart> {
        match self {
            Self::TopMovies => Some(Chart::TopMovies),
            Self::PopularMovies => Some(Chart::PopularMovies),
            Self::TopSeries => Some(Chart::TopSeries),
            Self::PopularSeries => Some(Chart::PopularSeries),
            Self::Favorites => None,
        }
    }

    /// Stable command-line name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TopMovies => "top-movies",
            Self::PopularMovies => "popular-movies",
            Self::TopSeries => "top-series",
            Self::PopularSeries => "popular-series",
            Self::Favorites => "favorites",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(category) = Self::ALL.into_iter().find(|c| c.name() == s) {
            return Ok(category);
        }
        if let Some(category) = s.parse::<usize>().ok().and_then(Self::from_index) {
            return Ok(category);
        }
        bail!(
            "unknown category '{s}' (expected one of: top-movies, popular-movies, top-series, popular-series, favorites)"
        )
    }
}

/// Secondary filter applied to the favorites list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindFilter {
    /// Movies and series.
    #[default]
    All,
    /// Movies only.
    Movie,
    /// Series only.
    Series,
}

impl KindFilter {
    /// Whether an item of `kind` passes this filter.
    #[must_use]
    pub const fn matches(self, kind: ItemKind) -> bool {
        match self {
            Self::All => true,
            Self::Movie => matches!(kind, ItemKind::Movie),
            Self::Series => matches!(kind, ItemKind::Series),
        }
    }
}

impl fmt::Display for KindFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::Movie => "movie",
            Self::Series => "series",
        })
    }
}

impl FromStr for KindFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "movie" => Ok(Self::Movie),
            "series" | "tvSeries" => Ok(Self::Series),
            other => bail!("unknown kind filter '{other}' (expected all, movie or series)"),
        }
    }
}

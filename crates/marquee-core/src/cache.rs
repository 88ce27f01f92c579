//! In-memory chart cache.

use std::collections::HashMap;

use marquee_api::{Chart, Item};

/// Last successfully fetched list per chart.
///
/// Entries only ever hold non-empty lists and live until [`clear`](Self::clear).
#[derive(Debug, Default)]
pub struct CategoryCache {
    entries: HashMap<Chart, Vec<Item>>,
}

impl CategoryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached list for `chart`.
    #[must_use]
    pub fn get(&self, chart: Chart) -> Option<&[Item]> {
        self.entries.get(&chart).map(Vec::as_slice)
    }

    /// Stores `items` for `chart`. An empty list is ignored so that it can
    /// never replace a good entry.
    pub fn put(&mut self, chart: Chart, items: Vec<Item>) {
        if items.is_empty() {
            return;
        }
        self.entries.insert(chart, items);
    }

    /// First cached item with `id`, searching every chart.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Item> {
        Chart::ALL
            .iter()
            .filter_map(|chart| self.entries.get(chart))
            .flatten()
            .find(|item| item.id == id)
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of populated charts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no chart is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//! Title search.

use marquee_api::Item;

/// Items whose title contains `query`, ignoring case, in their original order.
///
/// An empty query returns every item.
#[must_use]
pub fn filter_by_title(items: &[Item], query: &str) -> Vec<Item> {
    if query.is_empty() {
        return items.to_vec();
    }
    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|item| item.title.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

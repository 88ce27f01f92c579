//! Conversion between catalog items and persisted favorites.
//!
//! All defaulting of absent item fields happens here and nowhere else.

use chrono::{DateTime, SecondsFormat, Utc};
use marquee_api::{Item, ItemKind};
use marquee_db::FavoriteRecord;

/// Builds the persisted form of `item`, favorited at `now`.
///
/// Absent fields are defaulted: rating `0.0`, year `0`, empty description
/// and poster URL.
#[must_use]
pub fn favorite_record_from_item(item: &Item, now: DateTime<Utc>) -> FavoriteRecord {
    FavoriteRecord {
        id: item.id.clone(),
        title: item.title.clone(),
        poster_url: item.poster_url.clone().unwrap_or_default(),
        rating: item.rating.unwrap_or(0.0),
        year: item.year.unwrap_or(0),
        description: item.description.clone().unwrap_or_default(),
        kind: String::from(item.kind.as_str()),
        favorited_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

/// Restores an item from its persisted form.
///
/// The original title is not persisted and comes back empty. An empty poster
/// URL comes back as `None`; defaulted rating, year and description are kept
/// as stored.
#[must_use]
pub fn item_from_favorite_record(record: &FavoriteRecord) -> Item {
    Item {
        id: record.id.clone(),
        title: record.title.clone(),
        original_title: String::new(),
        year: Some(record.year),
        description: Some(record.description.clone()),
        poster_url: (!record.poster_url.is_empty()).then(|| record.poster_url.clone()),
        rating: Some(record.rating),
        kind: ItemKind::from_wire(&record.kind),
    }
}

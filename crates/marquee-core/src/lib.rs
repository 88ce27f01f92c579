//! State and cache coordination for the marquee catalog browser.
//!
//! [`Catalog`] decides, for every category switch, whether to reuse a cached
//! chart, fetch it remotely, or follow the favorites store; it publishes one
//! [`ViewState`] snapshot that presentation code observes.

mod cache;
mod category;
mod coordinator;
mod mapping;
mod search;
mod store;
mod view_state;

pub use cache::CategoryCache;
pub use category::{Category, KindFilter};
pub use coordinator::Catalog;
pub use mapping::{favorite_record_from_item, item_from_favorite_record};
pub use search::filter_by_title;
#[allow(clippy::module_name_repetitions)]
pub use store::{FavoritesStore, LocalFavoritesStore};
pub use view_state::ViewState;

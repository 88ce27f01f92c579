//! The snapshot presentation renders.

use marquee_api::Item;

/// Error shown when a chart could not be loaded (network, server, or empty body).
pub(crate) const LOAD_FAILED: &str = "Failed to load data";

/// Error shown when the favorites list is empty after filtering.
pub(crate) const NO_FAVORITES: &str = "No favorites here";

/// Error shown when the favorites store cannot be read.
pub(crate) const STORE_FAILED: &str = "Could not read favorites";

/// What the current category looks like right now.
///
/// Always replaced as a whole, so observers never see a loading flag from
/// one transition paired with items from another.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    /// A remote fetch is outstanding.
    pub loading: bool,
    /// Items to display, after search filtering.
    pub items: Vec<Item>,
    /// User-facing error message.
    pub error: Option<String>,
}

impl ViewState {
    /// Settled state showing `items`.
    #[must_use]
    pub const fn loaded(items: Vec<Item>) -> Self {
        Self {
            loading: false,
            items,
            error: None,
        }
    }

    /// Loading state that keeps showing `items`.
    #[must_use]
    pub const fn loading(items: Vec<Item>) -> Self {
        Self {
            loading: true,
            items,
            error: None,
        }
    }

    /// Settled error state that keeps showing `items`.
    #[must_use]
    pub fn failed(items: Vec<Item>, message: &str) -> Self {
        Self {
            loading: false,
            items,
            error: Some(String::from(message)),
        }
    }
}

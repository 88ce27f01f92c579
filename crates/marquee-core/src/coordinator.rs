//! `Catalog` - the per-session state coordinator.
//!
//! Owns the chart cache, the current category, the search query and the
//! favorites subscription, and publishes a [`ViewState`] after every
//! transition.
//!
//! Every category selection bumps a `generation` counter. Chart responses
//! and favorites emissions tagged with an older generation are dropped.
//!
//! Each chart request runs in its own task, which settles its single-flight
//! entry, fills the cache and publishes the outcome itself. Waiters only
//! await that task, so dropping a `select_category` future never leaves a
//! stale entry behind. [`Catalog::cancel_pending`] removes the entries, and a
//! request whose entry is gone neither caches nor publishes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use chrono::Utc;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use marquee_api::{CatalogApi, CatalogError, Chart, Item};
use marquee_db::FavoriteRecord;
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::instrument;

use crate::cache::CategoryCache;
use crate::category::{Category, KindFilter};
use crate::mapping::{favorite_record_from_item, item_from_favorite_record};
use crate::search::filter_by_title;
use crate::store::FavoritesStore;
use crate::view_state::{LOAD_FAILED, NO_FAVORITES, STORE_FAILED, ViewState};

/// Outcome of one remote chart request, shared by every waiter.
type FetchResult = Result<Vec<Item>, CatalogError>;

/// Resolves once a chart request task has published its outcome.
type PendingFetch = Shared<BoxFuture<'static, FetchResult>>;

/// A chart request that is still running.
struct InFlight {
    /// Identifies this request among successive requests for the same chart.
    id: u64,
    /// Generation of the latest selection waiting on this request.
    generation: u64,
    /// Resolves once the spawned request finishes.
    result: PendingFetch,
    /// Aborts the spawned request.
    abort: AbortHandle,
}

/// Mutable session state. Guarded by a single mutex that is never held
/// across an `.await`.
struct Session {
    /// Selected category, `None` until the first selection.
    category: Option<Category>,
    /// Bumped on every selection.
    generation: u64,
    /// Source of request ids.
    next_request_id: u64,
    /// Charts fetched so far.
    cache: CategoryCache,
    /// Unfiltered list of the active category.
    original: Vec<Item>,
    /// Active search query.
    query: String,
    /// Favorites kind filter.
    kind_filter: KindFilter,
    /// Latest list received from the favorites store.
    favorites: Vec<FavoriteRecord>,
    /// Task republishing favorites changes.
    subscription: Option<JoinHandle<()>>,
    /// Single-flight map.
    in_flight: HashMap<Chart, InFlight>,
}

impl Session {
    fn new(kind_filter: KindFilter) -> Self {
        Self {
            category: None,
            generation: 0,
            next_request_id: 0,
            cache: CategoryCache::new(),
            original: Vec::new(),
            query: String::new(),
            kind_filter,
            favorites: Vec::new(),
            subscription: None,
            in_flight: HashMap::new(),
        }
    }

    /// Starts a new selection and returns its generation.
    fn begin(&mut self, category: Category) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.category = Some(category);
        self.query.clear();
        self.stop_subscription();
        self.generation
    }

    fn stop_subscription(&mut self) {
        if let Some(handle) = self.subscription.take() {
            handle.abort();
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop_subscription();
        for request in self.in_flight.values() {
            request.abort.abort();
        }
    }
}

/// Shared coordinator state.
struct Inner<C, F> {
    api: Arc<C>,
    favorites: F,
    session: Mutex<Session>,
    view: watch::Sender<ViewState>,
    is_favorite: watch::Sender<bool>,
    selected_item: watch::Sender<Option<Item>>,
}

/// Per-session catalog coordinator.
///
/// Cheap to clone; clones share the same session.
pub struct Catalog<C, F> {
    inner: Arc<Inner<C, F>>,
}

impl<C, F> Clone for Catalog<C, F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C, F> std::fmt::Debug for Catalog<C, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.inner.lock();
        f.debug_struct("Catalog")
            .field("category", &session.category)
            .field("cached_charts", &session.cache.len())
            .field("query", &session.query)
            .finish_non_exhaustive()
    }
}

impl<C, F> Catalog<C, F>
where
    C: CatalogApi + Send + Sync + 'static,
    F: FavoritesStore + Send + Sync + 'static,
{
    /// Creates a coordinator with an empty cache and no selected category.
    #[must_use]
    pub fn new(api: C, favorites: F) -> Self {
        Self::with_kind_filter(api, favorites, KindFilter::All)
    }

    /// Creates a coordinator whose favorites filter starts at `kind_filter`.
    #[must_use]
    pub fn with_kind_filter(api: C, favorites: F, kind_filter: KindFilter) -> Self {
        let (view, _) = watch::channel(ViewState::default());
        let (is_favorite, _) = watch::channel(false);
        let (selected_item, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                api: Arc::new(api),
                favorites,
                session: Mutex::new(Session::new(kind_filter)),
                view,
                is_favorite,
                selected_item,
            }),
        }
    }

    // --- Observables ---

    /// Subscribes to the view state.
    #[must_use]
    pub fn view_state(&self) -> watch::Receiver<ViewState> {
        self.inner.view.subscribe()
    }

    /// Current view state.
    #[must_use]
    pub fn current_state(&self) -> ViewState {
        self.inner.view.borrow().clone()
    }

    /// Subscribes to the "current item is a favorite" flag.
    #[must_use]
    pub fn is_favorite(&self) -> watch::Receiver<bool> {
        self.inner.is_favorite.subscribe()
    }

    /// Subscribes to the item last resolved by [`get_item_by_id`](Self::get_item_by_id).
    #[must_use]
    pub fn selected_item(&self) -> watch::Receiver<Option<Item>> {
        self.inner.selected_item.subscribe()
    }

    /// Selected category, if any.
    #[must_use]
    pub fn selected_category(&self) -> Option<Category> {
        self.inner.lock().category
    }

    /// Active search query.
    #[must_use]
    pub fn search_query(&self) -> String {
        self.inner.lock().query.clone()
    }

    /// Active favorites kind filter.
    #[must_use]
    pub fn kind_filter(&self) -> KindFilter {
        self.inner.lock().kind_filter
    }

    // --- Operations ---

    /// Switches to `category`.
    ///
    /// Resolves once the state for this selection is published, or once a
    /// newer selection has made it irrelevant.
    #[instrument(skip(self))]
    pub async fn select_category(&self, category: Category) {
        match category.chart() {
            Some(chart) => Inner::select_chart(&self.inner, category, chart).await,
            None => Inner::select_favorites(&self.inner).await,
        }
    }

    /// Filters the displayed list by title. An empty query restores it.
    #[instrument(skip(self))]
    pub fn on_search_change(&self, query: &str) {
        let mut session = self.inner.lock();
        session.query = String::from(query);
        let items = filter_by_title(&session.original, query);
        let current = self.inner.view.borrow().clone();
        self.inner.view.send_replace(ViewState { items, ..current });
    }

    /// Changes the favorites kind filter.
    ///
    /// While favorites are shown the list is rebuilt from the last snapshot
    /// and the query is cleared; otherwise the filter applies on next entry.
    #[instrument(skip(self))]
    pub fn set_favorite_kind_filter(&self, filter: KindFilter) {
        let mut session = self.inner.lock();
        session.kind_filter = filter;
        if session.category == Some(Category::Favorites) && session.subscription.is_some() {
            session.query.clear();
            self.inner.publish_favorites(&mut session);
        }
    }

    /// Resolves an item from the cache, falling back to the favorites store.
    ///
    /// Also publishes the result as the selected item and refreshes the
    /// favorite flag for `id`.
    #[instrument(skip(self))]
    pub async fn get_item_by_id(&self, id: &str) -> Option<Item> {
        let cached = self.inner.lock().cache.find(id).cloned();
        let item = match cached {
            Some(item) => Some(item),
            None => match self.inner.favorites.get(id).await {
                Ok(record) => record.as_ref().map(item_from_favorite_record),
                Err(e) => {
                    tracing::warn!(id, error = %e, "favorites lookup failed");
                    None
                }
            },
        };
        self.inner.selected_item.send_replace(item.clone());
        self.check_favorite(id).await;
        item
    }

    /// Refreshes and returns the favorite flag for `id`.
    #[instrument(skip(self))]
    pub async fn check_favorite(&self, id: &str) -> bool {
        let exists = match self.inner.favorites.exists(id).await {
            Ok(exists) => exists,
            Err(e) => {
                tracing::warn!(id, error = %e, "favorite check failed");
                false
            }
        };
        self.inner.is_favorite.send_replace(exists);
        exists
    }

    /// Adds or removes `item` based on the current favorite flag and
    /// returns the new flag. On a store failure the flag is unchanged.
    #[instrument(skip_all, fields(id = %item.id))]
    pub async fn toggle_favorite(&self, item: &Item) -> bool {
        let was_favorite = *self.inner.is_favorite.borrow();
        let result = if was_favorite {
            self.inner.favorites.delete(&item.id).await
        } else {
            let record = favorite_record_from_item(item, Utc::now());
            self.inner.favorites.insert_or_replace(&record).await
        };
        match result {
            Ok(()) => {
                self.inner.is_favorite.send_replace(!was_favorite);
                tracing::info!(favorite = !was_favorite, "favorite toggled");
                !was_favorite
            }
            Err(e) => {
                tracing::warn!(error = %e, "favorite toggle failed");
                was_favorite
            }
        }
    }

    /// Abandons outstanding chart requests.
    ///
    /// Their results are discarded and a loading state is settled with the
    /// items it was showing. The favorites subscription is unaffected.
    #[instrument(skip(self))]
    pub fn cancel_pending(&self) {
        let mut session = self.inner.lock();
        for (chart, request) in session.in_flight.drain() {
            tracing::debug!(%chart, "cancelling chart request");
            request.abort.abort();
        }
        let current = self.inner.view.borrow().clone();
        if current.loading {
            self.inner.view.send_replace(ViewState::loaded(current.items));
        }
    }

    /// Drops every cached chart; the next selection of each fetches again.
    pub fn clear_cache(&self) {
        self.inner.lock().cache.clear();
    }
}

impl<C, F> Inner<C, F> {
    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C, F> Inner<C, F>
where
    C: CatalogApi + Send + Sync + 'static,
    F: FavoritesStore + Send + Sync + 'static,
{
    /// Cache hit: publish immediately. Miss: join or start the chart request
    /// and wait until it has settled.
    async fn select_chart(this: &Arc<Self>, category: Category, chart: Chart) {
        let pending = {
            let mut session = this.lock();
            let generation = session.begin(category);

            if let Some(items) = session.cache.get(chart) {
                let items = items.to_vec();
                tracing::debug!(%chart, count = items.len(), "chart served from cache");
                session.original.clone_from(&items);
                this.view.send_replace(ViewState::loaded(items));
                return;
            }

            let current_items = this.view.borrow().items.clone();
            this.view.send_replace(ViewState::loading(current_items));
            Self::request_chart(this, &mut session, chart, generation)
        };

        // The request task publishes before resolving.
        let _ = pending.await;
    }

    /// Joins the running request for `chart` or starts one.
    fn request_chart(
        this: &Arc<Self>,
        session: &mut Session,
        chart: Chart,
        generation: u64,
    ) -> PendingFetch {
        if let Some(running) = session.in_flight.get_mut(&chart) {
            tracing::debug!(%chart, "joining chart request already in flight");
            running.generation = generation;
            return running.result.clone();
        }

        let request_id = session.next_request_id;
        session.next_request_id = session.next_request_id.wrapping_add(1);

        let api = Arc::clone(&this.api);
        let inner = Arc::downgrade(this);
        let handle = tokio::spawn(async move {
            let result = api.fetch_chart(chart).await;
            if let Some(inner) = inner.upgrade() {
                inner.settle_chart(chart, request_id, &result);
            }
            result
        });
        let abort = handle.abort_handle();
        let result = async move {
            handle.await.unwrap_or_else(|e| {
                Err(CatalogError::Network(if e.is_cancelled() {
                    String::from("request cancelled")
                } else {
                    format!("request task failed: {e}")
                }))
            })
        }
        .boxed()
        .shared();

        session.in_flight.insert(
            chart,
            InFlight {
                id: request_id,
                generation,
                result: result.clone(),
                abort,
            },
        );
        tracing::debug!(%chart, request_id, "chart request started");
        result
    }

    /// Applies a finished chart request: clears its single-flight entry,
    /// caches a non-empty result and publishes if its selection is current.
    fn settle_chart(&self, chart: Chart, request_id: u64, result: &FetchResult) {
        let mut session = self.lock();

        let Some(generation) = session
            .in_flight
            .get(&chart)
            .filter(|running| running.id == request_id)
            .map(|running| running.generation)
        else {
            tracing::debug!(%chart, request_id, "dropping result of cancelled request");
            return;
        };
        session.in_flight.remove(&chart);

        let current = session.generation == generation;
        match result {
            Ok(items) if !items.is_empty() => {
                session.cache.put(chart, items.clone());
                if !current {
                    tracing::debug!(%chart, "discarding response for superseded selection");
                    return;
                }
                tracing::info!(%chart, count = items.len(), "chart loaded");
                let visible = filter_by_title(items, &session.query);
                session.original.clone_from(items);
                self.view.send_replace(ViewState::loaded(visible));
            }
            Ok(_) => {
                tracing::warn!(%chart, "chart came back empty");
                self.publish_load_failure(current);
            }
            Err(e) => {
                tracing::warn!(%chart, error = %e, network = e.is_network(), "chart request failed");
                self.publish_load_failure(current);
            }
        }
    }

    fn publish_load_failure(&self, current: bool) {
        if !current {
            return;
        }
        let items = self.view.borrow().items.clone();
        self.view.send_replace(ViewState::failed(items, LOAD_FAILED));
    }

    /// Subscribes to the favorites store and keeps republishing its changes.
    async fn select_favorites(this: &Arc<Self>) {
        let generation = this.lock().begin(Category::Favorites);

        let observed = this.favorites.observe_all().await;

        let mut session = this.lock();
        if session.generation != generation {
            return;
        }
        match observed {
            Ok(mut rx) => {
                session.favorites = rx.borrow_and_update().clone();
                this.publish_favorites(&mut session);
                let weak = Arc::downgrade(this);
                session.subscription = Some(tokio::spawn(async move {
                    follow_favorites(weak, rx, generation).await;
                }));
            }
            Err(e) => {
                tracing::warn!(error = %e, "favorites subscription failed");
                let items = this.view.borrow().items.clone();
                this.view.send_replace(ViewState::failed(items, STORE_FAILED));
            }
        }
    }

    /// Stores a new favorites snapshot. Returns `false` once the selection
    /// that started the subscription is gone.
    fn apply_favorites(&self, generation: u64, records: Vec<FavoriteRecord>) -> bool {
        let mut session = self.lock();
        if session.generation != generation {
            return false;
        }
        session.favorites = records;
        self.publish_favorites(&mut session);
        true
    }

    /// Rebuilds the favorites list from the last snapshot and publishes it.
    fn publish_favorites(&self, session: &mut Session) {
        let filter = session.kind_filter;
        session.original = session
            .favorites
            .iter()
            .map(item_from_favorite_record)
            .filter(|item| filter.matches(item.kind))
            .collect();
        let items = filter_by_title(&session.original, &session.query);
        let state = if session.original.is_empty() {
            ViewState::failed(items, NO_FAVORITES)
        } else {
            ViewState::loaded(items)
        };
        self.view.send_replace(state);
    }
}

/// Republishes favorites until the store closes, the coordinator is dropped,
/// or the selection changes.
async fn follow_favorites<C, F>(
    inner: Weak<Inner<C, F>>,
    mut rx: watch::Receiver<Vec<FavoriteRecord>>,
    generation: u64,
) where
    C: CatalogApi + Send + Sync + 'static,
    F: FavoritesStore + Send + Sync + 'static,
{
    while rx.changed().await.is_ok() {
        let records = rx.borrow_and_update().clone();
        let Some(inner) = inner.upgrade() else {
            break;
        };
        if !inner.apply_favorites(generation, records) {
            break;
        }
    }
    tracing::debug!(generation, "favorites subscription ended");
}

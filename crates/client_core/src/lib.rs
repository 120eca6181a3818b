use std::sync::Arc;

use shared::{
    domain::{CartLine, Lesson, LessonId},
    protocol::OrderReceipt,
};
use tokio::sync::{broadcast, Mutex};
use url::Url;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod derive;
pub mod filters;
pub mod gateway;

pub use cart::{Cart, CartOutcome, Divergence};
pub use catalog::{CatalogStore, FetchOutcome};
pub use checkout::{CustomerForm, SkipReason, SubmitOutcome, View};
pub use derive::CartSummaryEntry;
pub use filters::{FilterState, SortDirection, SortField, SortKey, StockFilter};
pub use gateway::{CatalogGateway, HttpCatalogGateway};

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub enum StorefrontEvent {
    CatalogReplaced { lessons: usize },
    LessonPatched { lesson_id: LessonId, spaces: u32 },
    CartChanged { lines: usize },
    CartReconciled { dropped: Vec<CartLine> },
    OrderSubmitted { receipt: OrderReceipt },
    Error(String),
}

struct StorefrontState {
    store: CatalogStore,
    cart: Cart,
    filters: FilterState,
    form: CustomerForm,
    view: View,
    loading: bool,
    last_error: Option<String>,
    fetch_sequence: u64,
    divergences: Vec<Divergence>,
    /// Seats removed while their reservation was still in flight; each is
    /// released only once that reservation is confirmed.
    deferred_releases: Vec<LessonId>,
}

/// Owned copy of everything the derived views read from.
#[derive(Debug, Clone)]
pub struct StorefrontSnapshot {
    pub store: CatalogStore,
    pub cart: Cart,
    pub filters: FilterState,
    pub form: CustomerForm,
    pub view: View,
    pub loading: bool,
    pub last_error: Option<String>,
}

impl StorefrontSnapshot {
    pub fn displayed_lessons(&self) -> Vec<Lesson> {
        derive::displayed_lessons(&self.store, &self.filters)
    }

    pub fn location_options(&self) -> Vec<String> {
        derive::location_options(&self.store)
    }

    pub fn cart_summary(&self) -> Vec<CartSummaryEntry> {
        derive::cart_summary(&self.cart, &self.store)
    }

    pub fn cart_total(&self) -> f64 {
        derive::cart_total(&self.cart)
    }

    pub fn valid_customer(&self) -> bool {
        derive::valid_customer(&self.form)
    }
}

/// Session façade tying the catalog snapshot, cart and checkout form to a
/// gateway. State sits behind one mutex that is never held across a gateway
/// call, so independent requests can be in flight together.
pub struct StorefrontClient {
    gateway: Arc<dyn CatalogGateway>,
    inner: Mutex<StorefrontState>,
    events: broadcast::Sender<StorefrontEvent>,
}

impl StorefrontClient {
    pub fn new(gateway: Arc<dyn CatalogGateway>) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            gateway,
            inner: Mutex::new(StorefrontState {
                store: CatalogStore::default(),
                cart: Cart::default(),
                filters: FilterState::default(),
                form: CustomerForm::default(),
                view: View::default(),
                loading: false,
                last_error: None,
                fetch_sequence: 0,
                divergences: Vec::new(),
                deferred_releases: Vec::new(),
            }),
            events,
        })
    }

    pub fn over_http(base_url: Url) -> Arc<Self> {
        Self::new(Arc::new(HttpCatalogGateway::new(base_url)))
    }

    pub async fn snapshot(&self) -> StorefrontSnapshot {
        let guard = self.inner.lock().await;
        StorefrontSnapshot {
            store: guard.store.clone(),
            cart: guard.cart.clone(),
            filters: guard.filters.clone(),
            form: guard.form.clone(),
            view: guard.view,
            loading: guard.loading,
            last_error: guard.last_error.clone(),
        }
    }

    pub async fn update_filters(&self, edit: impl FnOnce(&mut FilterState)) {
        let mut guard = self.inner.lock().await;
        edit(&mut guard.filters);
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<StorefrontEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

use chrono::{DateTime, Local};
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{TrackerError, TrackerResult};
use crate::models::{NewProduct, Product, ProductUrl, SortColumn, ViewState};
use crate::notify::{Confirm, Notifier};
use crate::storage::{Storage, StoreError};

pub const MSG_LOAD_FAILED: &str = "Failed to load products";
pub const MSG_CHECK_FAILED: &str = "Error checking URL";
pub const MSG_ALREADY_TRACKED: &str = "This product is already being tracked!";
pub const MSG_ADDED: &str = "Product added!";
pub const MSG_ADD_FAILED: &str = "Error adding product";
pub const MSG_CONFIRM_REMOVE: &str = "Are you sure you want to remove this product?";
pub const MSG_REMOVED: &str = "Product removed";
pub const MSG_REMOVE_FAILED: &str = "Error removing product";

/// Owns the locally cached product list and every read or write against
/// the store.
///
/// The cache is never patched: after each successful mutation the whole
/// list is fetched again. Mutations take `&mut self`, so a single
/// controller never has two of them in flight.
pub struct ProductListController {
    storage: Arc<dyn Storage>,
    notifier: Arc<dyn Notifier>,
    confirm: Arc<dyn Confirm>,
    products: Vec<Product>,
    pending_url: String,
    view: ViewState,
    last_refreshed: Option<DateTime<Local>>,
}

impl ProductListController {
    pub fn new(
        storage: Arc<dyn Storage>,
        notifier: Arc<dyn Notifier>,
        confirm: Arc<dyn Confirm>,
    ) -> Self {
        Self {
            storage,
            notifier,
            confirm,
            products: Vec::new(),
            pending_url: String::new(),
            view: ViewState::default(),
            last_refreshed: None,
        }
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn pending_url(&self) -> &str {
        &self.pending_url
    }

    pub fn set_pending_url(&mut self, draft: impl Into<String>) {
        self.pending_url = draft.into();
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn last_refreshed(&self) -> Option<DateTime<Local>> {
        self.last_refreshed
    }

    /// Replace the cached list with the store's. On failure the previous
    /// list stays in place.
    pub async fn refresh(&mut self) -> TrackerResult<()> {
        match self.storage.list_all().await {
            Ok(products) => {
                info!("Loaded {} tracked products", products.len());
                self.products = products;
                self.last_refreshed = Some(Local::now());
                Ok(())
            }
            Err(e) => {
                warn!("Refresh failed: {}", e);
                self.notifier.error(MSG_LOAD_FAILED);
                Err(TrackerError::Load(e))
            }
        }
    }

    /// Start tracking `raw_url`.
    ///
    /// Blank input is ignored (`Ok(None)`). The url is looked up first and
    /// rejected if it is already stored; the store's own uniqueness check
    /// backs this up for concurrent submissions.
    pub async fn add_product(&mut self, raw_url: &str) -> TrackerResult<Option<Product>> {
        let Some(url) = ProductUrl::parse(raw_url) else {
            return Ok(None);
        };

        match self.storage.fetch_one(&url).await {
            Ok(Some(_)) => {
                info!("Skipping {}: already tracked", url);
                self.notifier.error(MSG_ALREADY_TRACKED);
                return Err(TrackerError::Duplicate(url));
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Lookup of {} failed: {}", url, e);
                self.notifier.error(MSG_CHECK_FAILED);
                return Err(TrackerError::Lookup { url, source: e });
            }
        }

        let created = match self.storage.insert_one(&NewProduct::new(url.clone())).await {
            Ok(created) => created,
            Err(StoreError::Duplicate(url)) => {
                self.notifier.error(MSG_ALREADY_TRACKED);
                return Err(TrackerError::Duplicate(url));
            }
            Err(e) => {
                warn!("Insert of {} failed: {}", url, e);
                self.notifier.error(MSG_ADD_FAILED);
                return Err(TrackerError::Insert { url, source: e });
            }
        };

        info!("Now tracking {}", created.url);
        self.pending_url.clear();
        self.notifier.success(MSG_ADDED);
        // A failed reload has already been reported; the insert itself stands
        let _ = self.refresh().await;

        Ok(Some(created))
    }

    /// Submit the draft input. The draft is only cleared by a successful insert.
    pub async fn submit_pending(&mut self) -> TrackerResult<Option<Product>> {
        let draft = self.pending_url.clone();
        self.add_product(&draft).await
    }

    /// Stop tracking `url` after the user confirms. Returns `Ok(false)` when
    /// the prompt was declined.
    pub async fn remove_product(&mut self, url: &ProductUrl) -> TrackerResult<bool> {
        if !self.confirm.confirm(MSG_CONFIRM_REMOVE).await {
            info!("Removal of {} cancelled", url);
            return Ok(false);
        }

        if let Err(e) = self.storage.delete_one(url).await {
            warn!("Delete of {} failed: {}", url, e);
            self.notifier.error(MSG_REMOVE_FAILED);
            return Err(TrackerError::Remove {
                url: url.clone(),
                source: e,
            });
        }

        info!("Stopped tracking {}", url);
        self.notifier.success(MSG_REMOVED);
        let _ = self.refresh().await;

        Ok(true)
    }

    pub fn set_sort(&mut self, column: SortColumn) {
        self.view.set_sort(column);
    }

    pub fn set_in_stock_only(&mut self, in_stock_only: bool) {
        self.view.in_stock_only = in_stock_only;
    }

    pub fn toggle_in_stock_only(&mut self) {
        self.view.in_stock_only = !self.view.in_stock_only;
    }

    /// Rows to display, derived from the cached list and the view settings.
    pub fn visible_products(&self) -> Vec<&Product> {
        self.view.apply(&self.products)
    }
}

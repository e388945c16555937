//! Test doubles shared by the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use stock_tracker::models::{NewProduct, PriceYen, Product, ProductUrl};
use stock_tracker::notify::{AutoConfirm, Notifier};
use stock_tracker::storage::{InMemoryStorage, Storage, StoreError, StoreResult};
use stock_tracker::ProductListController;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Note {
    Success(String),
    Error(String),
}

/// Notifier that remembers every message.
#[derive(Default)]
pub struct RecordingNotifier {
    notes: Mutex<Vec<Note>>,
}

impl RecordingNotifier {
    pub fn notes(&self) -> Vec<Note> {
        self.notes.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<Note> {
        self.notes.lock().unwrap().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.notes.lock().unwrap().push(Note::Success(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.notes.lock().unwrap().push(Note::Error(message.to_string()));
    }
}

/// In-memory store whose operations can be switched to fail.
#[derive(Default)]
pub struct FlakyStorage {
    pub inner: InMemoryStorage,
    pub fail_list: AtomicBool,
    pub fail_fetch: AtomicBool,
    pub fail_insert: AtomicBool,
    pub fail_delete: AtomicBool,
    /// Pretend the lookup found nothing even when the row exists, like a
    /// concurrent insert landing between check and insert.
    pub blind_fetch: AtomicBool,
}

impl FlakyStorage {
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            inner: InMemoryStorage::with_products(products),
            ..Self::default()
        }
    }
}

fn offline() -> StoreError {
    StoreError::Transport("connection refused".to_string())
}

#[async_trait]
impl Storage for FlakyStorage {
    async fn list_all(&self) -> StoreResult<Vec<Product>> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(offline());
        }
        self.inner.list_all().await
    }

    async fn fetch_one(&self, url: &ProductUrl) -> StoreResult<Option<Product>> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(offline());
        }
        if self.blind_fetch.load(Ordering::SeqCst) {
            return Ok(None);
        }
        self.inner.fetch_one(url).await
    }

    async fn insert_one(&self, product: &NewProduct) -> StoreResult<Product> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(offline());
        }
        self.inner.insert_one(product).await
    }

    async fn delete_one(&self, url: &ProductUrl) -> StoreResult<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(offline());
        }
        self.inner.delete_one(url).await
    }
}

pub fn product(url: &str, in_stock: bool, price: Option<&str>) -> Product {
    Product {
        url: ProductUrl(url.to_string()),
        image: None,
        in_stock,
        price_yen: price.map(|p| PriceYen(p.to_string())),
    }
}

pub fn url(raw: &str) -> ProductUrl {
    ProductUrl(raw.to_string())
}

pub struct Harness {
    pub storage: Arc<FlakyStorage>,
    pub notifier: Arc<RecordingNotifier>,
    pub controller: ProductListController,
}

impl Harness {
    pub fn new(products: Vec<Product>) -> Self {
        Self::with_confirm(products, true)
    }

    pub fn with_confirm(products: Vec<Product>, answer: bool) -> Self {
        let storage = Arc::new(FlakyStorage::with_products(products));
        let notifier = Arc::new(RecordingNotifier::default());
        let controller = ProductListController::new(
            storage.clone(),
            notifier.clone(),
            Arc::new(AutoConfirm(answer)),
        );
        Self {
            storage,
            notifier,
            controller,
        }
    }

    pub fn fail(flag: &AtomicBool) {
        flag.store(true, Ordering::SeqCst);
    }
}

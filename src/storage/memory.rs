use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::models::{NewProduct, Product, ProductUrl};
use crate::storage::{Storage, StoreError, StoreResult};

/// Process-local store keeping rows in insertion order.
///
/// Enforces url uniqueness the same way the real table does. Used by the
/// `memory` backend and as a test double.
#[derive(Default)]
pub struct InMemoryStorage {
    rows: Mutex<Vec<Product>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with existing rows, e.g. ones the crawler has already priced.
    pub fn with_products(products: Vec<Product>) -> Self {
        Self {
            rows: Mutex::new(products),
        }
    }

    pub async fn snapshot(&self) -> Vec<Product> {
        self.rows.lock().await.clone()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn list_all(&self) -> StoreResult<Vec<Product>> {
        Ok(self.rows.lock().await.clone())
    }

    async fn fetch_one(&self, url: &ProductUrl) -> StoreResult<Option<Product>> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().find(|p| &p.url == url).cloned())
    }

    async fn insert_one(&self, product: &NewProduct) -> StoreResult<Product> {
        let mut rows = self.rows.lock().await;

        if rows.iter().any(|p| p.url == product.url) {
            return Err(StoreError::Duplicate(product.url.clone()));
        }

        let created = Product::from(product.clone());
        rows.push(created.clone());
        Ok(created)
    }

    async fn delete_one(&self, url: &ProductUrl) -> StoreResult<()> {
        let mut rows = self.rows.lock().await;
        let before = rows.len();
        rows.retain(|p| &p.url != url);

        if rows.len() == before {
            return Err(StoreError::NotFound(url.clone()));
        }
        Ok(())
    }
}

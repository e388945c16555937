use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewProduct, Product, ProductUrl};

mod memory;
mod rest;
mod sqlite;
pub use memory::InMemoryStorage;
pub use rest::RestStorage;
pub use sqlite::SqliteStorage;

/// Failures reported by a [`Storage`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or answered with an unexpected status.
    #[error("store request failed: {0}")]
    Transport(String),
    /// The store answered, but the payload did not match the product schema.
    #[error("malformed store response: {0}")]
    Malformed(String),
    #[error("{0} is already being tracked")]
    Duplicate(ProductUrl),
    #[error("{0} is not tracked")]
    NotFound(ProductUrl),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// The four operations the tracker needs from the `tracker` table.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Every tracked product, in store order.
    async fn list_all(&self) -> StoreResult<Vec<Product>>;
    /// Look a product up by url. A missing row is `Ok(None)`, not an error.
    async fn fetch_one(&self, url: &ProductUrl) -> StoreResult<Option<Product>>;
    async fn insert_one(&self, product: &NewProduct) -> StoreResult<Product>;
    async fn delete_one(&self, url: &ProductUrl) -> StoreResult<()>;
}

use async_trait::async_trait;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

use crate::models::{NewProduct, PriceYen, Product, ProductUrl};
use crate::storage::{Storage, StoreError, StoreResult};

/// Local SQLite copy of the `tracker` table.
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    pub async fn new(db_path: &str) -> StoreResult<Self> {
        let conn = Connection::open(db_path).map_err(|e| {
            StoreError::Transport(format!("failed to open SQLite database {}: {}", db_path, e))
        })?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub async fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory().map_err(transport)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Transport("SQLite connection lock poisoned".to_string()))
    }

    pub async fn migrate(&self) -> StoreResult<()> {
        let conn = self.lock()?;

        // `url` as primary key keeps uniqueness in the store, not just the client check
        conn.execute(
            "CREATE TABLE IF NOT EXISTS tracker (
                url TEXT PRIMARY KEY NOT NULL,
                image TEXT,
                in_stock INTEGER NOT NULL DEFAULT 0,
                price_yen TEXT
            )",
            [],
        )
        .map_err(transport)?;

        info!("Database migration completed");
        Ok(())
    }

    /// Load rows from a JSON array export of the `tracker` table.
    ///
    /// Existing urls are overwritten with the exported crawler fields, so the
    /// import can be re-run against a newer export.
    pub async fn import_from_json(&self, json_path: &str) -> StoreResult<usize> {
        if !Path::new(json_path).exists() {
            info!("No existing JSON file to import");
            return Ok(0);
        }

        let content = std::fs::read_to_string(json_path)
            .map_err(|e| StoreError::Transport(format!("failed to read {}: {}", json_path, e)))?;
        let products: Vec<Product> = serde_json::from_str(&content)
            .map_err(|e| StoreError::Malformed(format!("{}: {}", json_path, e)))?;

        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(transport)?;

        for product in &products {
            tx.execute(
                "INSERT INTO tracker (url, image, in_stock, price_yen) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(url) DO UPDATE SET
                    image = excluded.image,
                    in_stock = excluded.in_stock,
                    price_yen = excluded.price_yen",
                params![
                    product.url.as_str(),
                    product.image.as_deref(),
                    product.in_stock,
                    product.price_yen.as_ref().map(|p| p.0.as_str()),
                ],
            )
            .map_err(transport)?;
        }

        tx.commit().map_err(transport)?;
        info!("Imported {} products from {}", products.len(), json_path);
        Ok(products.len())
    }
}

fn transport(e: rusqlite::Error) -> StoreError {
    StoreError::Transport(e.to_string())
}

fn row_to_product(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        url: ProductUrl(row.get(0)?),
        image: row.get(1)?,
        in_stock: row.get(2)?,
        price_yen: row.get::<_, Option<String>>(3)?.map(PriceYen),
    })
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn list_all(&self) -> StoreResult<Vec<Product>> {
        let conn = self.lock()?;

        let mut stmt = conn
            .prepare("SELECT url, image, in_stock, price_yen FROM tracker ORDER BY rowid")
            .map_err(transport)?;
        let rows = stmt
            .query_map([], row_to_product)
            .map_err(transport)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| StoreError::Malformed(e.to_string()))?;

        Ok(rows)
    }

    async fn fetch_one(&self, url: &ProductUrl) -> StoreResult<Option<Product>> {
        let conn = self.lock()?;

        conn.query_row(
            "SELECT url, image, in_stock, price_yen FROM tracker WHERE url = ?1",
            params![url.as_str()],
            row_to_product,
        )
        .optional()
        .map_err(transport)
    }

    async fn insert_one(&self, product: &NewProduct) -> StoreResult<Product> {
        let conn = self.lock()?;

        match conn.execute(
            "INSERT INTO tracker (url, in_stock) VALUES (?1, ?2)",
            params![product.url.as_str(), product.in_stock],
        ) {
            Ok(_) => Ok(Product::from(product.clone())),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::Duplicate(product.url.clone()))
            }
            Err(e) => Err(transport(e)),
        }
    }

    async fn delete_one(&self, url: &ProductUrl) -> StoreResult<()> {
        let conn = self.lock()?;

        let deleted = conn
            .execute("DELETE FROM tracker WHERE url = ?1", params![url.as_str()])
            .map_err(transport)?;

        if deleted == 0 {
            return Err(StoreError::NotFound(url.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn url(raw: &str) -> ProductUrl {
        ProductUrl(raw.to_string())
    }

    async fn storage() -> SqliteStorage {
        let storage = SqliteStorage::in_memory().await.unwrap();
        storage.migrate().await.unwrap();
        storage
    }

    #[tokio::test]
    async fn insert_then_list_keeps_insertion_order() {
        let storage = storage().await;
        storage.insert_one(&NewProduct::new(url("https://b"))).await.unwrap();
        storage.insert_one(&NewProduct::new(url("https://a"))).await.unwrap();

        let rows = storage.list_all().await.unwrap();
        assert_eq!(
            rows.iter().map(|p| p.url.as_str()).collect::<Vec<_>>(),
            vec!["https://b", "https://a"]
        );
        assert!(rows.iter().all(|p| !p.in_stock && p.price_yen.is_none()));
    }

    #[tokio::test]
    async fn primary_key_rejects_duplicates() {
        let storage = storage().await;
        storage.insert_one(&NewProduct::new(url("https://a"))).await.unwrap();

        let err = storage
            .insert_one(&NewProduct::new(url("https://a")))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
        assert_eq!(storage.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn migrate_creates_only_product_columns() {
        let storage = storage().await;
        storage.migrate().await.unwrap();

        let conn = storage.lock().unwrap();
        let mut stmt = conn.prepare("PRAGMA table_info(tracker)").unwrap();
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .unwrap()
            .collect::<rusqlite::Result<Vec<_>>>()
            .unwrap();
        assert_eq!(columns, vec!["url", "image", "in_stock", "price_yen"]);
    }

    #[tokio::test]
    async fn fetch_and_delete() {
        let storage = storage().await;
        assert_eq!(storage.fetch_one(&url("https://a")).await.unwrap(), None);

        storage.insert_one(&NewProduct::new(url("https://a"))).await.unwrap();
        assert!(storage.fetch_one(&url("https://a")).await.unwrap().is_some());

        storage.delete_one(&url("https://a")).await.unwrap();
        assert_eq!(storage.fetch_one(&url("https://a")).await.unwrap(), None);

        let err = storage.delete_one(&url("https://a")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn import_from_json_upserts_crawler_fields() {
        let storage = storage().await;
        storage.insert_one(&NewProduct::new(url("https://a"))).await.unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"url": "https://a", "image": "https://img/a.png", "in_stock": true, "price_yen": "1,980"}},
                {{"url": "https://b", "image": null, "in_stock": false, "price_yen": null}}
            ]"#
        )
        .unwrap();

        let imported = storage
            .import_from_json(file.path().to_str().unwrap())
            .await
            .unwrap();
        assert_eq!(imported, 2);

        let a = storage.fetch_one(&url("https://a")).await.unwrap().unwrap();
        assert!(a.in_stock);
        assert_eq!(a.price_yen, Some(PriceYen("1,980".to_string())));
        assert_eq!(a.image.as_deref(), Some("https://img/a.png"));
        assert_eq!(storage.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn import_missing_file_is_noop() {
        let storage = storage().await;
        assert_eq!(
            storage.import_from_json("/nonexistent/tracker.json").await.unwrap(),
            0
        );
    }
}

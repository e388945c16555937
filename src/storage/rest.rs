use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::models::{NewProduct, Product, ProductUrl};
use crate::storage::{Storage, StoreError, StoreResult};

/// Postgres `unique_violation`.
const UNIQUE_VIOLATION_CODE: &str = "23505";
const RETURN_REPRESENTATION: &str = "return=representation";

/// Error body returned by PostgREST.
#[derive(Debug, Default, Deserialize)]
struct ApiError {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
}

/// The hosted `tracker` table, reached through its PostgREST endpoint
/// (`{base}/rest/v1/{table}`).
pub struct RestStorage {
    client: Client,
    endpoint: Url,
    key: String,
}

impl RestStorage {
    pub fn new(client: Client, base_url: &str, key: &str, table: &str) -> StoreResult<Self> {
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        let endpoint = Url::parse(&base)
            .and_then(|base| base.join(&format!("rest/v1/{}", table.trim())))
            .map_err(|e| StoreError::Transport(format!("invalid store url {}: {}", base_url, e)))?;

        Ok(Self {
            client,
            endpoint,
            key: key.to_string(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn request(&self, method: Method) -> RequestBuilder {
        self.client
            .request(method, self.endpoint.clone())
            .header("apikey", self.key.as_str())
            .header(AUTHORIZATION, format!("Bearer {}", self.key))
    }

    async fn send(&self, request: RequestBuilder) -> StoreResult<Response> {
        request
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))
    }

    async fn rows(response: Response) -> StoreResult<Vec<Product>> {
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        if body.trim().is_empty() || body.trim() == "null" {
            return Ok(Vec::new());
        }

        serde_json::from_str(&body).map_err(|e| StoreError::Malformed(e.to_string()))
    }

    async fn api_error(response: Response) -> (StatusCode, ApiError) {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let error = match serde_json::from_str::<ApiError>(&body) {
            Ok(error) => error,
            Err(_) => ApiError {
                message: Some(body),
                ..ApiError::default()
            },
        };
        (status, error)
    }
}

fn eq_filter(url: &ProductUrl) -> String {
    format!("eq.{}", url.as_str())
}

fn failure(status: StatusCode, error: &ApiError) -> StoreError {
    let message = error.message.as_deref().unwrap_or("no message");
    match (&error.code, &error.details) {
        (Some(code), Some(details)) => {
            StoreError::Transport(format!("{} [{}] {} ({})", status, code, message, details))
        }
        (Some(code), None) => StoreError::Transport(format!("{} [{}] {}", status, code, message)),
        _ => StoreError::Transport(format!("{} {}", status, message)),
    }
}

#[async_trait]
impl Storage for RestStorage {
    async fn list_all(&self) -> StoreResult<Vec<Product>> {
        let response = self
            .send(self.request(Method::GET).query(&[("select", "*")]))
            .await?;

        if !response.status().is_success() {
            let (status, error) = Self::api_error(response).await;
            warn!("Listing products failed with status {}", status);
            return Err(failure(status, &error));
        }

        let rows = Self::rows(response).await?;
        debug!("Store returned {} products", rows.len());
        Ok(rows)
    }

    async fn fetch_one(&self, url: &ProductUrl) -> StoreResult<Option<Product>> {
        // A filtered list rather than a single-object request: PostgREST
        // reports "no rows" and "several rows" with the same error code there
        let filter = eq_filter(url);
        let response = self
            .send(
                self.request(Method::GET)
                    .query(&[("select", "*"), ("url", filter.as_str()), ("limit", "1")]),
            )
            .await?;

        if !response.status().is_success() {
            let (status, error) = Self::api_error(response).await;
            warn!("Looking up {} failed with status {}", url, status);
            return Err(failure(status, &error));
        }

        let found = Self::rows(response).await?.into_iter().next();
        if found.is_none() {
            debug!("No stored product for {}", url);
        }
        Ok(found)
    }

    async fn insert_one(&self, product: &NewProduct) -> StoreResult<Product> {
        let response = self
            .send(
                self.request(Method::POST)
                    .header("Prefer", RETURN_REPRESENTATION)
                    .json(&[product]),
            )
            .await?;

        if !response.status().is_success() {
            let (status, error) = Self::api_error(response).await;
            if status == StatusCode::CONFLICT
                || error.code.as_deref() == Some(UNIQUE_VIOLATION_CODE)
            {
                return Err(StoreError::Duplicate(product.url.clone()));
            }
            warn!("Inserting {} failed with status {}", product.url, status);
            return Err(failure(status, &error));
        }

        Self::rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Malformed("insert returned no row".to_string()))
    }

    async fn delete_one(&self, url: &ProductUrl) -> StoreResult<()> {
        let filter = eq_filter(url);
        let response = self
            .send(
                self.request(Method::DELETE)
                    .query(&[("url", filter.as_str())])
                    .header("Prefer", RETURN_REPRESENTATION),
            )
            .await?;

        if !response.status().is_success() {
            let (status, error) = Self::api_error(response).await;
            warn!("Deleting {} failed with status {}", url, status);
            return Err(failure(status, &error));
        }

        if Self::rows(response).await?.is_empty() {
            return Err(StoreError::NotFound(url.clone()));
        }
        Ok(())
    }
}

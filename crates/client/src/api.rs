//! Catalog and stock lookups over HTTP.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use rocketshoes_cart::{Product, Stock};
use rocketshoes_core::ProductId;

use crate::config::ClientConfig;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("API error ({0}): {1}")]
    Status(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Read access to the remote product catalog and stock service.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// `GET products/{id}`
    async fn product(&self, id: ProductId) -> Result<Product, ApiError>;

    /// `GET stock/{id}`
    async fn stock(&self, id: ProductId) -> Result<Stock, ApiError>;
}

/// `reqwest`-backed catalog client.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    api_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpCatalog {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            token: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_token(api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Self::new(api_url)
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        match &config.auth_token {
            Some(token) => Self::with_token(&config.api_url, token),
            None => Self::new(&config.api_url),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        let mut req = self.client.get(&url);

        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        tracing::debug!(%url, "catalog request");
        let resp = req
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            return Err(ApiError::Status(status, resp.text().await.unwrap_or_default()));
        }

        resp.json().await.map_err(|e| ApiError::Parse(e.to_string()))
    }
}

#[async_trait]
impl CatalogApi for HttpCatalog {
    async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        self.get_json(&format!("products/{id}")).await
    }

    async fn stock(&self, id: ProductId) -> Result<Stock, ApiError> {
        self.get_json(&format!("stock/{id}")).await
    }
}

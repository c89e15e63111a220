//! Catalog API client.
//!
//! # Architecture
//!
//! - Plain JSON over `reqwest`; every request is bounded by the configured timeout
//! - Every list payload goes through [`shopnow_core::normalize`], so the
//!   client accepts bare arrays, paginated objects and `data` wrappers alike
//! - In-memory caching via `moka` for successful responses
//!
//! # Endpoints
//!
//! - `GET /api/categories/`
//! - `GET /api/products/?category=&max_price=&search=&page=`
//! - `GET /api/products/{id}/`
//!
//! # Example
//!
//! ```rust,ignore
//! use shopnow_storefront::catalog::CatalogClient;
//!
//! let client = CatalogClient::new(&config.catalog)?;
//! let page = client.fetch_products(&ProductFilter::default()).await?;
//! ```

mod cache;

use std::sync::Arc;

use moka::future::Cache;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use shopnow_core::{
    Category, PageInfo, Product, ProductFilter, ProductId, decode_records, page_info,
    unwrap_single,
};

use crate::config::CatalogConfig;

pub use cache::{CacheKey, CacheValue};

const CACHE_CAPACITY: u64 = 1000;

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed (connection refused, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("Catalog API returned {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    /// The body was not valid JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The requested record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An endpoint URL could not be built from the base URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl CatalogError {
    /// Short message safe to show to shoppers.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http(e) if e.is_timeout() => "Request timed out".to_string(),
            Self::Http(e) if e.is_connect() => "Catalog service unavailable".to_string(),
            Self::Http(_) | Self::Url(_) => "Network error".to_string(),
            Self::Status { status, .. } => {
                format!("Request failed with status code {}", status.as_u16())
            }
            Self::Parse(_) => "Invalid response from catalog".to_string(),
            Self::NotFound(_) => "Product not found".to_string(),
        }
    }
}

/// One page of the product listing.
#[derive(Debug, Clone, Default)]
pub struct ProductPage {
    pub products: Vec<Product>,
    /// Present when the API answered with a paginated envelope.
    pub page_info: Option<PageInfo>,
}

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the catalog API.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Option<Cache<CacheKey, CacheValue>>,
}

impl CatalogClient {
    /// Create a new catalog API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("shopnow-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = (!config.cache_ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(config.cache_ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// GET a JSON document from `path` (relative to the base URL).
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, CatalogError> {
        let mut url = self.inner.base_url.join(path)?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }

        debug!(url = %url, "Fetching from catalog API");

        let response = self.inner.client.get(url.clone()).send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                url = %url,
                body = %body.chars().take(200).collect::<String>(),
                "Catalog API returned non-success status"
            );
            return Err(CatalogError::Status {
                status,
                url: url.to_string(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse catalog API response"
            );
            CatalogError::Parse(e)
        })
    }

    async fn cached(&self, key: &CacheKey) -> Option<CacheValue> {
        let cache = self.inner.cache.as_ref()?;
        let hit = cache.get(key).await;
        if hit.is_some() {
            debug!(key = ?key, "Cache hit");
        }
        hit
    }

    async fn store(&self, key: CacheKey, value: CacheValue) {
        if let Some(cache) = &self.inner.cache {
            cache.insert(key, value).await;
        }
    }

    // =========================================================================
    // Category Methods
    // =========================================================================

    /// Get every category.
    ///
    /// An unrecognized payload yields an empty list, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, timeout, non-2xx status or a
    /// body that is not JSON.
    #[instrument(skip(self))]
    pub async fn fetch_categories(&self) -> Result<Vec<Category>, CatalogError> {
        let key = CacheKey::Categories;
        if let Some(CacheValue::Categories(categories)) = self.cached(&key).await {
            return Ok(categories);
        }

        let payload = self.get_json("api/categories/", &[]).await?;
        let categories: Vec<Category> = decode_records(&payload);

        debug!(count = categories.len(), "Fetched categories");
        self.store(key, CacheValue::Categories(categories.clone()))
            .await;
        Ok(categories)
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get the products matching `filter`.
    ///
    /// Empty filter values are omitted from the query.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, timeout, non-2xx status or a
    /// body that is not JSON.
    #[instrument(skip(self, filter), fields(query = %filter.to_query_string()))]
    pub async fn fetch_products(&self, filter: &ProductFilter) -> Result<ProductPage, CatalogError> {
        let query = filter.query_pairs();
        let key = CacheKey::Products(filter.to_query_string());
        if let Some(CacheValue::Products(page)) = self.cached(&key).await {
            return Ok(page);
        }

        let payload = self.get_json("api/products/", &query).await?;
        let page = ProductPage {
            products: decode_records(&payload),
            page_info: page_info(&payload),
        };

        debug!(count = page.products.len(), "Fetched products");
        self.store(key, CacheValue::Products(page.clone())).await;
        Ok(page)
    }

    /// Get a single product by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` on a 404 or when the payload holds no
    /// decodable product, and the usual transport errors otherwise.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn fetch_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.cached(&key).await {
            return Ok(*product);
        }

        let payload = match self.get_json(&format!("api/products/{id}/"), &[]).await {
            Err(CatalogError::Status { status, .. }) if status == reqwest::StatusCode::NOT_FOUND => {
                return Err(CatalogError::NotFound(format!("Product not found: {id}")));
            }
            other => other?,
        };

        let product = unwrap_single(&payload)
            .and_then(|record| serde_json::from_value::<Product>(record.clone()).ok())
            .ok_or_else(|| CatalogError::NotFound(format!("Product not found: {id}")))?;

        self.store(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// Check that the catalog API answers at all.
    ///
    /// Bypasses the cache.
    ///
    /// # Errors
    ///
    /// Returns the transport or status error of the probe request.
    pub async fn ping(&self) -> Result<(), CatalogError> {
        self.get_json("api/categories/", &[]).await.map(|_| ())
    }
}

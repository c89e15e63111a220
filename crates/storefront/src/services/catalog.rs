//! Catalog reads with offline fallback.
//!
//! Pages never fail because the catalog API is down. Each read returns a
//! [`CatalogView`]: the live data when the API answered, otherwise the
//! matching slice of [`shopnow_core::offline`] plus a notice for the page to
//! show.

use tracing::warn;

use shopnow_core::{Category, Product, ProductFilter, ProductId, offline};

use crate::catalog::{CatalogClient, CatalogError, ProductPage};

/// Notice shown on the home page when the API answers with no categories.
pub const NO_CATEGORIES_NOTICE: &str = "No categories found in response";

/// Data for a page plus an optional notice explaining a fallback.
#[derive(Debug, Clone)]
pub struct CatalogView<T> {
    pub data: T,
    /// Set when `data` came from the offline catalog.
    pub notice: Option<String>,
}

impl<T> CatalogView<T> {
    const fn live(data: T) -> Self {
        Self { data, notice: None }
    }

    const fn offline(data: T, notice: String) -> Self {
        Self {
            data,
            notice: Some(notice),
        }
    }

    /// Whether the data came from the offline catalog.
    #[must_use]
    pub const fn is_offline(&self) -> bool {
        self.notice.is_some()
    }
}

/// Categories for the home page grid.
///
/// Falls back to the offline categories on error and also when the API
/// returns an empty list.
pub async fn home_categories(client: &CatalogClient) -> CatalogView<Vec<Category>> {
    match client.fetch_categories().await {
        Ok(categories) if !categories.is_empty() => CatalogView::live(categories),
        Ok(_) => {
            warn!("Catalog API returned no categories, using offline catalog");
            CatalogView::offline(offline::categories(), NO_CATEGORIES_NOTICE.to_string())
        }
        Err(e) => fallback_categories(&e),
    }
}

/// Categories for the filter sidebar.
///
/// An empty list is shown as is; only a failed request falls back.
pub async fn sidebar_categories(client: &CatalogClient) -> CatalogView<Vec<Category>> {
    match client.fetch_categories().await {
        Ok(categories) => CatalogView::live(categories),
        Err(e) => fallback_categories(&e),
    }
}

fn fallback_categories(error: &CatalogError) -> CatalogView<Vec<Category>> {
    warn!(error = %error, "Failed to fetch categories, using offline catalog");
    CatalogView::offline(offline::categories(), error.user_message())
}

/// The product listing for `filter`.
///
/// On failure the offline products are filtered locally with the same
/// filter, so the page stays consistent with the controls the shopper set.
pub async fn products(client: &CatalogClient, filter: &ProductFilter) -> CatalogView<ProductPage> {
    match client.fetch_products(filter).await {
        Ok(page) => CatalogView::live(page),
        Err(e) => {
            warn!(error = %e, "Failed to fetch products, using offline catalog");
            let page = ProductPage {
                products: offline::products_matching(filter),
                page_info: None,
            };
            CatalogView::offline(page, e.user_message())
        }
    }
}

/// Outcome of a product detail lookup.
#[derive(Debug, Clone)]
pub enum ProductLookup {
    Found(CatalogView<Product>),
    /// No such product; `reason` is shown on the not-found page.
    Missing { reason: String },
}

/// A single product for the detail page.
///
/// A 404 from the API is final. Any other failure falls back to the offline
/// product with the same id, if there is one.
pub async fn product(client: &CatalogClient, id: ProductId) -> ProductLookup {
    match client.fetch_product(id).await {
        Ok(product) => ProductLookup::Found(CatalogView::live(product)),
        Err(e @ CatalogError::NotFound(_)) => ProductLookup::Missing {
            reason: e.user_message(),
        },
        Err(e) => {
            warn!(error = %e, product_id = %id, "Failed to fetch product, trying offline catalog");
            offline::product(id).map_or_else(
                || ProductLookup::Missing {
                    reason: e.user_message(),
                },
                |product| ProductLookup::Found(CatalogView::offline(product, e.user_message())),
            )
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::CatalogConfig;

    fn client(server: &MockServer) -> CatalogClient {
        CatalogClient::new(&CatalogConfig {
            base_url: Url::parse(&format!("{}/", server.uri())).unwrap(),
            timeout: Duration::from_millis(500),
            cache_ttl: Duration::ZERO,
        })
        .unwrap()
    }

    async fn failing_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_home_categories_empty_list_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/categories/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
            .mount(&server)
            .await;

        let view = home_categories(&client(&server)).await;
        assert_eq!(view.data.len(), 4);
        assert_eq!(view.notice.as_deref(), Some(NO_CATEGORIES_NOTICE));
    }

    #[tokio::test]
    async fn test_sidebar_categories_empty_list_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/categories/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let view = sidebar_categories(&client(&server)).await;
        assert!(view.data.is_empty());
        assert!(!view.is_offline());
    }

    #[tokio::test]
    async fn test_categories_error_falls_back() {
        let server = failing_server().await;
        let view = home_categories(&client(&server)).await;
        assert_eq!(view.data, offline::categories());
        assert_eq!(
            view.notice.as_deref(),
            Some("Request failed with status code 503")
        );
    }

    #[tokio::test]
    async fn test_products_error_filters_offline_catalog() {
        let server = failing_server().await;
        let filter = ProductFilter {
            category: Some("Clothing".to_string()),
            ..ProductFilter::default()
        };

        let view = products(&client(&server), &filter).await;
        assert!(view.is_offline());
        let names: Vec<&str> = view.data.products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Cotton T-Shirt"]);
    }

    #[tokio::test]
    async fn test_products_live_empty_list_has_no_notice() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 0, "results": [] })))
            .mount(&server)
            .await;

        let view = products(&client(&server), &ProductFilter::default()).await;
        assert!(view.data.products.is_empty());
        assert!(view.notice.is_none());
    }

    #[tokio::test]
    async fn test_product_falls_back_to_offline_product() {
        let server = failing_server().await;
        let ProductLookup::Found(view) = product(&client(&server), ProductId::new(2)).await else {
            panic!("expected offline product");
        };
        assert_eq!(view.data.name, "Smartphone");
        assert!(view.is_offline());
    }

    #[tokio::test]
    async fn test_product_unknown_offline_id_is_missing() {
        let server = failing_server().await;
        let lookup = product(&client(&server), ProductId::new(999)).await;
        assert!(matches!(lookup, ProductLookup::Missing { .. }));
    }

    #[tokio::test]
    async fn test_product_404_does_not_fall_back() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products/1/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let lookup = product(&client(&server), ProductId::new(1)).await;
        assert!(
            matches!(lookup, ProductLookup::Missing { ref reason } if reason == "Product not found")
        );
    }
}

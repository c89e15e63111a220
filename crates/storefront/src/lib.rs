//! `ShopNow` storefront library.
//!
//! Server-rendered catalog pages (Axum + Askama + HTMX) over a remote
//! catalog API, with a per-session shopping cart held in process memory.
//! The binary in `main.rs` only wires up tracing, Sentry and the listener;
//! everything else lives here so it can be tested against the real router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart_store;
pub mod catalog;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, extract::State, http::StatusCode, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Directory static assets are served from, relative to the crate root.
pub const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Build the full storefront router: routes, static files, sessions and
/// the request middleware stack.
///
/// Sentry layers are added by the binary, outermost.
pub fn build_app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::extract::Request| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the catalog API is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.catalog().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;
    use tower::ServiceExt;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::{CatalogConfig, StorefrontConfig};

    fn app_for(server: &MockServer) -> Router {
        let config = StorefrontConfig {
            catalog: CatalogConfig {
                base_url: Url::parse(&format!("{}/", server.uri())).unwrap(),
                timeout: Duration::from_millis(500),
                cache_ttl: Duration::ZERO,
            },
            ..StorefrontConfig::default()
        };
        build_app(AppState::new(config).unwrap())
    }

    async fn fetch(app: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockServer::start().await;
        let (status, headers, body) = fetch(app_for(&server), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
        assert!(headers.contains_key("x-request-id"));
        assert!(headers.contains_key("content-security-policy"));
    }

    #[tokio::test]
    async fn test_readiness_follows_catalog_api() {
        let server = MockServer::start().await;
        let (status, _, _) = fetch(app_for(&server), "/health/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        Mock::given(method("GET"))
            .and(path("/api/categories/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;
        let (status, _, _) = fetch(app_for(&server), "/health/ready").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_home_falls_back_to_offline_categories() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (status, _, body) = fetch(app_for(&server), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Request failed with status code 500"));
        assert!(body.contains("/products?category=Home%20%26%20Kitchen"));
    }

    #[tokio::test]
    async fn test_products_fragment_for_htmx() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 3, "name": "Cotton T-Shirt", "price": "24.99" }
            ])))
            .mount(&server)
            .await;

        let response = app_for(&server)
            .oneshot(
                Request::builder()
                    .uri("/products?search=shirt")
                    .header("HX-Request", "true")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();

        assert!(body.contains("href=\"/products/3\""));
        assert!(!body.contains("<html"));
    }

    #[tokio::test]
    async fn test_unknown_product_renders_not_found_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/products/42/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let (status, _, body) = fetch(app_for(&server), "/products/42").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Product Not Found"));
        assert!(body.contains("href=\"/products\""));

        let (status, _, _) = fetch(app_for(&server), "/products/not-a-number").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_empty_cart_page() {
        let server = MockServer::start().await;
        let (status, headers, body) = fetch(app_for(&server), "/cart").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Your cart is empty"));
        // Reading the cart must not start a session
        assert!(!headers.contains_key("set-cookie"));
    }
}

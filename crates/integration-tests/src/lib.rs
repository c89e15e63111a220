//! Integration tests for the `ShopNow` storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopnow-integration-tests
//! ```
//!
//! Each test drives the full storefront router in process against a
//! [`wiremock`] catalog API, so no running services are needed.
//!
//! # Test Categories
//!
//! - `catalog_pages` - Listing, detail and home pages over live and failing APIs
//! - `cart_flow` - Session cart mutations over HTTP, with and without HTMX

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use tower::ServiceExt;
use url::Url;
use wiremock::MockServer;

use shopnow_storefront::build_app;
use shopnow_storefront::config::{CatalogConfig, StorefrontConfig};
use shopnow_storefront::state::AppState;

/// A storefront wired to a mock catalog API, acting as one browser.
///
/// The session cookie from the first response that sets one is sent with
/// every later request.
pub struct TestContext {
    pub api: MockServer,
    app: Router,
    cookie: Option<String>,
}

/// A fully buffered response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Value of a response header as a string.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Number of product cards rendered in the body.
    pub fn product_cards(&self) -> usize {
        self.body.matches("data-product-card").count()
    }
}

impl TestContext {
    /// Start a mock catalog API and a storefront pointed at it.
    ///
    /// Response caching is off so each test sees exactly what it mocks.
    pub async fn new() -> Self {
        let api = MockServer::start().await;
        let config = StorefrontConfig {
            catalog: CatalogConfig {
                base_url: Url::parse(&format!("{}/", api.uri())).unwrap(),
                timeout: Duration::from_millis(500),
                cache_ttl: Duration::ZERO,
            },
            ..StorefrontConfig::default()
        };
        let app = build_app(AppState::new(config).unwrap());

        Self {
            api,
            app,
            cookie: None,
        }
    }

    /// Forget the session cookie, as a new browser would.
    pub fn clear_cookies(&mut self) {
        self.cookie = None;
    }

    /// `GET` a page.
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = self.request("GET", uri, false).body(Body::empty()).unwrap();
        self.send(request).await
    }

    /// `GET` a page the way htmx does.
    pub async fn get_htmx(&mut self, uri: &str) -> TestResponse {
        let request = self.request("GET", uri, true).body(Body::empty()).unwrap();
        self.send(request).await
    }

    /// `POST` an urlencoded form, optionally as an htmx request.
    pub async fn post_form(&mut self, uri: &str, form: &str, htmx: bool) -> TestResponse {
        let request = self
            .request("POST", uri, htmx)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();
        self.send(request).await
    }

    fn request(&self, method: &str, uri: &str, htmx: bool) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri);
        if htmx {
            builder = builder.header("HX-Request", "true");
        }
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            && let Some(pair) = set_cookie.split(';').next()
        {
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            headers,
            body: String::from_utf8(body.to_vec()).unwrap(),
        }
    }
}

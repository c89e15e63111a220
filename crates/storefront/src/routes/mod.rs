//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (category grid)
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (catalog API reachable)
//!
//! # Products
//! GET  /products               - Product listing (?category=&max_price=&search=&page=)
//! GET  /products/{id}          - Product detail
//!
//! # Cart (HTMX fragments, redirects for plain forms)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (returns cart_count fragment)
//! POST /cart/update            - Set quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove item (returns cart_items fragment)
//! POST /cart/clear             - Empty the cart (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout               - Order summary (payment is not wired up)
//! ```

pub mod cart;
pub mod home;
pub mod products;

use axum::{
    Router,
    http::HeaderMap,
    routing::{get, post},
};

use crate::state::AppState;

/// Header htmx sets on every request it issues.
const HX_REQUEST: &str = "hx-request";

/// Header htmx sets when restoring history from the server.
const HX_HISTORY_RESTORE_REQUEST: &str = "hx-history-restore-request";

/// Whether a request came from htmx and expects a fragment.
///
/// History restores need the full page even though htmx sends them.
pub fn is_htmx(headers: &HeaderMap) -> bool {
    let flag = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    };
    flag(HX_REQUEST) && !flag(HX_HISTORY_RESTORE_REQUEST)
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Catalog
        .nest("/products", product_routes())
        // Cart routes
        .nest("/cart", cart_routes())
        // Checkout summary
        .route("/checkout", get(cart::checkout))
}

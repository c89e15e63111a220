//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Every mutation answers an htmx request with a fragment and an
//! `HX-Trigger: cart-updated` header (the header badge listens for it), and
//! a plain form post with a redirect to the cart page, so the pages work
//! without JavaScript too.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use shopnow_core::{Cart, CartChange, LineItem, ProductId, format_amount};

use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::SessionCart;
use crate::routes::is_htmx;
use crate::services::catalog::{self, ProductLookup};
use crate::state::AppState;

/// Event name the cart badge refreshes on.
pub const CART_UPDATED_EVENT: &str = "cart-updated";

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: String,
    pub href: String,
    pub name: String,
    pub image_url: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
    /// Quantity the minus button submits (0 removes the line).
    pub decrement: i64,
    /// Quantity the plus button submits.
    pub increment: i64,
}

impl From<&LineItem> for CartItemView {
    fn from(line: &LineItem) -> Self {
        let quantity = line.quantity();
        Self {
            product_id: line.id.to_string(),
            href: format!("/products/{}", line.id),
            name: line.name.clone(),
            image_url: line.image_url.clone(),
            quantity,
            price: line.price.display(),
            line_price: format_amount(line.line_total()),
            decrement: i64::from(quantity) - 1,
            increment: i64::from(quantity) + 1,
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u64,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.lines().iter().map(CartItemView::from).collect(),
            subtotal: format_amount(cart.cart_total()),
            item_count: cart.item_count(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: ProductId,
    /// New quantity; zero or below removes the line.
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: ProductId,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

/// Checkout summary template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/checkout.html")]
pub struct CheckoutTemplate {
    pub cart: CartView,
}

fn log_change(change: CartChange) {
    match change {
        CartChange::Unchanged => tracing::debug!("Cart unchanged"),
        change => {
            tracing::info!(change = ?change, "Cart updated");
            add_breadcrumb("cart", &format!("{change:?}"), None);
        }
    }
}

/// Respond to a cart mutation that re-renders the line items.
fn items_response(headers: &HeaderMap, cart: CartView) -> Response {
    if is_htmx(headers) {
        (
            AppendHeaders([("HX-Trigger", CART_UPDATED_EVENT)]),
            CartItemsTemplate { cart },
        )
            .into_response()
    } else {
        Redirect::to("/cart").into_response()
    }
}

/// Display cart page.
#[instrument(skip(cart))]
pub async fn show(cart: SessionCart) -> Result<CartShowTemplate, AppError> {
    let cart = cart.read(|cart: &Cart| CartView::from(cart)).await?;
    Ok(CartShowTemplate { cart })
}

/// Add a product to the cart.
///
/// The product is looked up through the catalog (with offline fallback) so
/// the line carries the current name, price and image.
#[instrument(skip(state, cart, headers))]
pub async fn add(
    State(state): State<AppState>,
    mut cart: SessionCart,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response, AppError> {
    let product = match catalog::product(state.catalog(), form.product_id).await {
        ProductLookup::Found(view) => view.data,
        ProductLookup::Missing { reason } => return Err(AppError::NotFound(reason)),
    };

    let quantity = form.quantity.unwrap_or(1);
    let (change, count) = cart
        .update(|cart| (cart.add_to_cart(&product, quantity), cart.item_count()))
        .await?;
    log_change(change);

    if is_htmx(&headers) {
        // Return cart count with HTMX trigger to update other elements
        Ok((
            AppendHeaders([("HX-Trigger", CART_UPDATED_EVENT)]),
            CartCountTemplate { count },
        )
            .into_response())
    } else {
        Ok(Redirect::to("/cart").into_response())
    }
}

/// Set the quantity of a cart line.
#[instrument(skip(cart, headers))]
pub async fn update(
    mut cart: SessionCart,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response, AppError> {
    let (change, view) = cart
        .update(|cart| {
            let change = cart.update_quantity(form.product_id, form.quantity);
            (change, CartView::from(&*cart))
        })
        .await?;
    log_change(change);

    Ok(items_response(&headers, view))
}

/// Remove a line from the cart.
#[instrument(skip(cart, headers))]
pub async fn remove(
    mut cart: SessionCart,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response, AppError> {
    let (change, view) = cart
        .update(|cart| {
            let change = cart.remove_from_cart(form.product_id);
            (change, CartView::from(&*cart))
        })
        .await?;
    log_change(change);

    Ok(items_response(&headers, view))
}

/// Empty the cart.
#[instrument(skip(cart, headers))]
pub async fn clear(mut cart: SessionCart, headers: HeaderMap) -> Result<Response, AppError> {
    let (change, view) = cart
        .update(|cart| (cart.clear_cart(), CartView::from(&*cart)))
        .await?;
    log_change(change);

    Ok(items_response(&headers, view))
}

/// Get cart count badge (HTMX).
#[instrument(skip(cart))]
pub async fn count(cart: SessionCart) -> Result<CartCountTemplate, AppError> {
    let count = cart.read(Cart::item_count).await?;
    Ok(CartCountTemplate { count })
}

/// Display the checkout summary.
///
/// Payment is not wired up; an empty cart goes back to the cart page.
#[instrument(skip(cart))]
pub async fn checkout(cart: SessionCart) -> Result<Response, AppError> {
    let cart = cart.read(|cart: &Cart| CartView::from(cart)).await?;
    if cart.items.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }
    Ok(CheckoutTemplate { cart }.into_response())
}

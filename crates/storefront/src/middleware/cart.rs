//! Session cart extractor.
//!
//! Handlers never touch the [`CartStore`] directly; they take a
//! [`SessionCart`], which resolves the current session's cart.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use shopnow_core::Cart;

use crate::cart_store::{CartId, CartStore};
use crate::error::AppError;
use crate::middleware::session::keys;
use crate::state::AppState;

/// The shopping cart of the current session.
///
/// A session gets a cart id on its first mutation, so read-only visits do
/// not create sessions.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(mut cart: SessionCart) -> Result<String, AppError> {
///     cart.update(|cart| cart.clear_cart()).await?;
///     Ok("cleared".to_string())
/// }
/// ```
pub struct SessionCart {
    session: Session,
    carts: CartStore,
    id: Option<CartId>,
}

impl SessionCart {
    /// The cart id, if this session has one yet.
    #[must_use]
    pub const fn id(&self) -> Option<CartId> {
        self.id
    }

    /// Run `f` against the cart. Sessions without a cart see an empty one.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Cart` if the cart lock is poisoned.
    pub async fn read<R>(&self, f: impl FnOnce(&Cart) -> R) -> Result<R, AppError> {
        let handle = match self.id {
            Some(id) => self.carts.get(id).await,
            None => None,
        };

        match handle {
            Some(handle) => Ok(handle.read(f)?),
            None => Ok(f(&Cart::new())),
        }
    }

    /// Run `f` against the cart with write access, creating the cart (and
    /// storing its id in the session) if needed.
    ///
    /// The closure runs under the cart lock, so the whole mutation is one
    /// critical section.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the cart id cannot be stored, or
    /// `AppError::Cart` if the cart lock is poisoned.
    pub async fn update<R>(&mut self, f: impl FnOnce(&mut Cart) -> R) -> Result<R, AppError> {
        let id = match self.id {
            Some(id) => id,
            None => {
                let id = CartId::new();
                self.session.insert(keys::CART_ID, id).await?;
                tracing::debug!(cart_id = %id, "Created session cart");
                self.id = Some(id);
                id
            }
        };

        let handle = self.carts.get_or_create(id).await;
        Ok(handle.update(f)?)
    }
}

impl FromRequestParts<AppState> for SessionCart {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer not installed".to_string()))?;

        let id = match session.get::<CartId>(keys::CART_ID).await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(error = %e, "Unreadable cart id in session, starting a new cart");
                None
            }
        };

        Ok(Self {
            session,
            carts: state.carts().clone(),
            id,
        })
    }
}

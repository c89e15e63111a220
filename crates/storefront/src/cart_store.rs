//! Process-wide registry of session carts.
//!
//! Each browser session holds a [`CartId`]; the store maps it to the
//! session's [`Cart`]. Entries idle for longer than the session expiry are
//! evicted, so a cart goes away together with its session. Nothing is
//! persisted across restarts.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use moka::future::Cache;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shopnow_core::Cart;

/// Errors from cart access.
#[derive(Debug, Error)]
pub enum CartStoreError {
    /// A previous holder of the cart lock panicked.
    #[error("Cart lock poisoned")]
    LockPoisoned,
}

/// Identifier of a session cart, stored in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartId(Uuid);

impl CartId {
    /// A fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CartId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Shared handle to one session's cart.
///
/// All access goes through [`CartHandle::read`] and [`CartHandle::update`],
/// which hold the lock for the duration of a synchronous closure only.
#[derive(Debug, Clone, Default)]
pub struct CartHandle(Arc<Mutex<Cart>>);

impl CartHandle {
    /// Run `f` against the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartStoreError::LockPoisoned` if the lock is poisoned.
    pub fn read<R>(&self, f: impl FnOnce(&Cart) -> R) -> Result<R, CartStoreError> {
        let cart = self.0.lock().map_err(|_| CartStoreError::LockPoisoned)?;
        Ok(f(&cart))
    }

    /// Run `f` against the cart with write access.
    ///
    /// # Errors
    ///
    /// Returns `CartStoreError::LockPoisoned` if the lock is poisoned.
    pub fn update<R>(&self, f: impl FnOnce(&mut Cart) -> R) -> Result<R, CartStoreError> {
        let mut cart = self.0.lock().map_err(|_| CartStoreError::LockPoisoned)?;
        Ok(f(&mut cart))
    }
}

/// Registry of every live session cart.
#[derive(Clone)]
pub struct CartStore {
    carts: Cache<CartId, CartHandle>,
}

impl CartStore {
    /// Create an empty store whose carts expire after `idle` without access.
    #[must_use]
    pub fn new(idle: Duration) -> Self {
        Self {
            carts: Cache::builder().time_to_idle(idle).build(),
        }
    }

    /// The cart for `id`, if it is still live.
    pub async fn get(&self, id: CartId) -> Option<CartHandle> {
        self.carts.get(&id).await
    }

    /// The cart for `id`, created empty if missing.
    pub async fn get_or_create(&self, id: CartId) -> CartHandle {
        self.carts.get_with(id, async { CartHandle::default() }).await
    }

    /// Drop the cart for `id`.
    pub async fn remove(&self, id: CartId) {
        self.carts.invalidate(&id).await;
    }
}

//! Session middleware configuration.
//!
//! Sessions live in process memory, like the carts they point at; both are
//! lost on restart. The store is a moka cache, so sessions that go idle are
//! evicted instead of accumulating.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tower_sessions::cookie::time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, SessionStore};
use tower_sessions::{Expiry, SessionManagerLayer, cookie::SameSite, cookie::time};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "shopnow_session";

/// Upper bound on live sessions held in memory.
const MAX_SESSIONS: u64 = 100_000;

/// Session keys.
pub mod keys {
    /// Key for the session's [`CartId`](crate::cart_store::CartId).
    pub const CART_ID: &str = "cart_id";
}

/// In-memory session store with idle eviction and a capacity bound.
#[derive(Clone)]
pub struct MokaSessionStore {
    sessions: Cache<Id, Record>,
}

impl MokaSessionStore {
    /// Create a store that drops sessions idle for longer than `idle`.
    #[must_use]
    pub fn new(idle: Duration, max_sessions: u64) -> Self {
        Self {
            sessions: Cache::builder()
                .max_capacity(max_sessions)
                .time_to_idle(idle)
                .build(),
        }
    }
}

impl fmt::Debug for MokaSessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MokaSessionStore")
            .field("sessions", &self.sessions.entry_count())
            .finish()
    }
}

#[async_trait]
impl SessionStore for MokaSessionStore {
    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.sessions.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let Some(record) = self.sessions.get(session_id).await else {
            return Ok(None);
        };
        if record.expiry_date <= OffsetDateTime::now_utc() {
            self.sessions.invalidate(session_id).await;
            return Ok(None);
        }
        Ok(Some(record))
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.sessions.invalidate(session_id).await;
        Ok(())
    }
}

/// Create the session layer with an in-memory store.
///
/// Sessions expire after `config.session_expiry` of inactivity, the same
/// idle lifetime the cart store uses for carts.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MokaSessionStore> {
    let expiry_secs = i64::try_from(config.session_expiry.as_secs()).unwrap_or(i64::MAX);
    let store = MokaSessionStore::new(config.session_expiry, MAX_SESSIONS);

    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(time::Duration::seconds(expiry_secs)))
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

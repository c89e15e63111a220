//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions over a moka-backed store)
//! 5. Security headers (CSP, frame options, etc.)
//!
//! The [`SessionCart`] extractor sits on top of the session layer and hands
//! handlers the cart owned by the current session.

pub mod cart;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use cart::SessionCart;
pub use request_id::{RequestId, request_id_middleware};
pub use security_headers::security_headers_middleware;
pub use session::{MokaSessionStore, create_session_layer};

//! Business logic services for storefront.
//!
//! # Services
//!
//! - `catalog` - Catalog reads with offline fallback

pub mod catalog;

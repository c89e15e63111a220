//! ShopNow Core - Shared catalog types and client-side storefront state.
//!
//! This crate provides the pieces every storefront page depends on:
//! - [`types`] - Type-safe IDs, prices, catalog records and filter state
//! - [`normalize`] - Extraction of record lists from inconsistent API envelopes
//! - [`cart`] - The cart state machine (line items, quantities, totals)
//! - [`offline`] - The built-in demo catalog used when the API is unavailable
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP
//! clients, no locking. The storefront crate wraps these in its own
//! process-wide store and API client.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod normalize;
pub mod offline;
pub mod types;

pub use cart::{Cart, CartChange, LineItem};
pub use normalize::{Envelope, PageInfo, decode_records, normalize, page_info, safe_map, unwrap_single};
pub use types::*;

//! Core types for ShopNow.
//!
//! This module provides type-safe wrappers for catalog concepts.

pub mod filter;
pub mod id;
pub mod price;
pub mod product;

pub use filter::ProductFilter;
pub use id::*;
pub use price::{Price, PriceError, format_amount};
pub use product::{Category, CategoryRef, Product, slugify};

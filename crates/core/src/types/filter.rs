//! Catalog filter state.
//!
//! The filter is owned by the catalog page and mirrored into the URL query
//! string (`category`, `max_price`, `search`, `page`) so a filtered view can
//! be bookmarked and shared. Empty or unparseable values are treated as
//! absent rather than rejected, matching how the catalog API ignores them.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::Product;

/// Filters applied to the product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilter {
    /// Exact category name.
    #[serde(default, deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Inclusive upper price bound.
    #[serde(default, deserialize_with = "lenient_parse", skip_serializing_if = "Option::is_none")]
    pub max_price: Option<Decimal>,
    /// Case-insensitive text matched against name and description.
    #[serde(default, deserialize_with = "non_empty", skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// 1-based page of a paginated catalog.
    #[serde(default, deserialize_with = "lenient_parse", skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl ProductFilter {
    /// Whether any user-facing filter (category, price, search) is set.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.category.is_some() || self.max_price.is_some() || self.search.is_some()
    }

    /// Non-empty query parameters in canonical order.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(4);
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(max_price) = self.max_price {
            pairs.push(("max_price", max_price.normalize().to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(page) = self.page.filter(|&p| p > 1) {
            pairs.push(("page", page.to_string()));
        }
        pairs
    }

    /// URL-encoded query string without the leading `?` (empty when no filter).
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.query_pairs()
            .into_iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(&value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Catalog page URL for this filter.
    #[must_use]
    pub fn products_path(&self) -> String {
        let query = self.to_query_string();
        if query.is_empty() {
            "/products".to_string()
        } else {
            format!("/products?{query}")
        }
    }

    /// The same filter on another page.
    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: Some(page),
            ..self.clone()
        }
    }

    /// The same filter with the category toggled: selecting the active
    /// category clears it.
    #[must_use]
    pub fn toggle_category(&self, name: &str) -> Self {
        let category = if self.category.as_deref() == Some(name) {
            None
        } else {
            Some(name.to_string())
        };
        Self {
            category,
            page: None,
            ..self.clone()
        }
    }

    /// The same filter without a price bound.
    #[must_use]
    pub fn without_max_price(&self) -> Self {
        Self {
            max_price: None,
            page: None,
            ..self.clone()
        }
    }

    /// Whether a product passes this filter.
    ///
    /// Mirrors the catalog API: exact category name, `price <= max_price`,
    /// case-insensitive substring search over name and description. Used to
    /// filter the offline catalog locally.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(category) = &self.category
            && product.category_name() != Some(category.as_str())
        {
            return false;
        }

        if let Some(max_price) = self.max_price
            && product.price.amount() > max_price
        {
            return false;
        }

        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let in_name = product.name.to_lowercase().contains(&needle);
            let in_description = product.description.to_lowercase().contains(&needle);
            if !in_name && !in_description {
                return false;
            }
        }

        true
    }
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty()))
}

fn lenient_parse<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
{
    let value = non_empty(deserializer)?;
    Ok(value.and_then(|v| {
        let parsed = v.parse::<T>().ok();
        if parsed.is_none() {
            tracing::debug!(value = %v, "Ignoring unparseable filter value");
        }
        parsed
    }))
}

//! Catalog records served by the catalog API.

use serde::{Deserialize, Deserializer, Serialize};

use super::{CategoryId, Price, ProductId};

/// A product as returned by `GET /api/products/`.
///
/// Only `id` is required. Text fields default to empty and the optional
/// fields tolerate `null`, because the API omits them inconsistently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub price: Price,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "category_object")]
    pub category: Option<CategoryRef>,
}

impl Product {
    /// Name of the product's category, if it has one.
    #[must_use]
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }

    /// Storefront URL of the product detail page.
    #[must_use]
    pub fn path(&self) -> String {
        format!("/products/{}", self.id)
    }

    /// Image URL with empty strings treated as missing.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.image_url.as_deref().filter(|url| !url.trim().is_empty())
    }
}

/// The nested category object embedded in a product record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub name: String,
}

/// A category as returned by `GET /api/categories/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

impl Category {
    /// Create a category, deriving the slug from the name.
    #[must_use]
    pub fn new(id: CategoryId, name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = slugify(&name);
        Self { id, name, slug }
    }

    /// Catalog URL filtered to this category.
    #[must_use]
    pub fn products_path(&self) -> String {
        format!("/products?category={}", urlencoding::encode(&self.name))
    }
}

#[derive(Deserialize)]
struct RawCategory {
    id: CategoryId,
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    slug: String,
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawCategory::deserialize(deserializer)?;
        let slug = if raw.slug.is_empty() {
            slugify(&raw.name)
        } else {
            raw.slug
        };
        Ok(Self {
            id: raw.id,
            name: raw.name,
            slug,
        })
    }
}

/// Convert a display name into a URL slug.
///
/// Lowercases letters, drops characters that are neither alphanumeric,
/// whitespace nor `-`, and collapses runs of whitespace and dashes into one
/// `-`. `"Home & Kitchen"` becomes `"home-kitchen"`.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }

    slug
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Read the embedded category, tolerating bare foreign keys.
///
/// Only a `{ "name": ... }` object yields a category; ids, strings, `null`
/// and malformed objects become `None` rather than rejecting the product.
fn category_object<'de, D>(deserializer: D) -> Result<Option<CategoryRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

//! Built-in demo catalog.
//!
//! Every page falls back to this catalog when the catalog API is unreachable,
//! times out, or returns nothing usable. Keeping it in one place means the
//! home page, the filter sidebar, the listing and the detail page all show
//! the same categories and products while offline.

use rust_decimal::Decimal;

use crate::types::{Category, CategoryId, CategoryRef, Price, Product, ProductFilter, ProductId};

struct DemoProduct {
    id: i64,
    name: &'static str,
    category: &'static str,
    description: &'static str,
    cents: i64,
    image_url: &'static str,
}

const CATEGORIES: &[(i64, &str)] = &[
    (1, "Electronics"),
    (2, "Clothing"),
    (3, "Books"),
    (4, "Home & Kitchen"),
];

const PRODUCTS: &[DemoProduct] = &[
    DemoProduct {
        id: 1,
        name: "Wireless Headphones",
        category: "Electronics",
        description: "High-quality wireless headphones with noise cancellation",
        cents: 9999,
        image_url: "https://images.unsplash.com/photo-1505740420928-5e560c06d30e?w=400",
    },
    DemoProduct {
        id: 2,
        name: "Smartphone",
        category: "Electronics",
        description: "Latest smartphone with advanced features",
        cents: 69999,
        image_url: "https://images.unsplash.com/photo-1511707171634-5f897ff02aa9?w=400",
    },
    DemoProduct {
        id: 3,
        name: "Cotton T-Shirt",
        category: "Clothing",
        description: "Comfortable cotton t-shirt",
        cents: 2499,
        image_url: "https://images.unsplash.com/photo-1521572163474-6864f9cf17ab?w=400",
    },
    DemoProduct {
        id: 4,
        name: "Paperback Novel",
        category: "Books",
        description: "A bestselling novel in a lightweight paperback edition",
        cents: 1499,
        image_url: "https://images.unsplash.com/photo-1544947950-fa07a98d237f?w=400",
    },
    DemoProduct {
        id: 5,
        name: "Ceramic Mug",
        category: "Home & Kitchen",
        description: "Stoneware mug that keeps coffee warm",
        cents: 1299,
        image_url: "https://images.unsplash.com/photo-1514228742587-6b1558fcca3d?w=400",
    },
];

impl DemoProduct {
    fn to_product(&self) -> Product {
        Product {
            id: ProductId::new(self.id),
            name: self.name.to_string(),
            description: self.description.to_string(),
            price: Price::new(Decimal::new(self.cents, 2)).unwrap_or(Price::ZERO),
            image_url: Some(self.image_url.to_string()),
            category: Some(CategoryRef {
                name: self.category.to_string(),
            }),
        }
    }
}

/// Demo categories.
#[must_use]
pub fn categories() -> Vec<Category> {
    CATEGORIES
        .iter()
        .map(|&(id, name)| Category::new(CategoryId::new(id), name))
        .collect()
}

/// All demo products.
#[must_use]
pub fn products() -> Vec<Product> {
    PRODUCTS.iter().map(DemoProduct::to_product).collect()
}

/// Demo products that pass `filter`.
#[must_use]
pub fn products_matching(filter: &ProductFilter) -> Vec<Product> {
    PRODUCTS
        .iter()
        .map(DemoProduct::to_product)
        .filter(|p| filter.matches(p))
        .collect()
}

/// A single demo product.
#[must_use]
pub fn product(id: ProductId) -> Option<Product> {
    PRODUCTS
        .iter()
        .find(|p| p.id == id.as_i64())
        .map(DemoProduct::to_product)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_every_product_belongs_to_a_demo_category() {
        let names: HashSet<String> = categories().into_iter().map(|c| c.name).collect();
        for product in products() {
            let category = product.category_name().map(ToString::to_string);
            assert!(category.is_some_and(|c| names.contains(&c)));
        }
    }

    #[test]
    fn test_product_ids_are_unique() {
        let ids: HashSet<ProductId> = products().iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), products().len());
    }

    #[test]
    fn test_category_slugs() {
        let slugs: Vec<String> = categories().into_iter().map(|c| c.slug).collect();
        assert_eq!(slugs, vec!["electronics", "clothing", "books", "home-kitchen"]);
    }

    #[test]
    fn test_products_matching_filter() {
        let filter = ProductFilter {
            category: Some("Electronics".to_string()),
            ..ProductFilter::default()
        };
        let names: Vec<String> = products_matching(&filter).into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Wireless Headphones", "Smartphone"]);
    }

    #[test]
    fn test_product_lookup() {
        assert_eq!(
            product(ProductId::new(3)).map(|p| p.name),
            Some("Cotton T-Shirt".to_string())
        );
        assert!(product(ProductId::new(404)).is_none());
    }
}

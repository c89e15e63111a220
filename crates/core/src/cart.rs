//! Shopping cart state.
//!
//! A [`Cart`] is an ordered list of [`LineItem`]s with at most one line per
//! product. The mutation methods are the only write path and they maintain
//! two invariants:
//!
//! - no two lines share a product id
//! - every line has `quantity >= 1`
//!
//! Per line the state machine is:
//!
//! ```text
//! ABSENT --add_to_cart--------------------------> PRESENT(n)
//! PRESENT(n) --add_to_cart(k)-------------------> PRESENT(n + k)
//! PRESENT(n) --update_quantity(m > 0)-----------> PRESENT(m)
//! PRESENT(n) --update_quantity(m <= 0) | remove-> ABSENT
//! PRESENT(n) --clear_cart-----------------------> ABSENT
//! ```
//!
//! Operations on ids that are not in the cart are no-ops.

use rust_decimal::Decimal;

use crate::types::{Price, Product, ProductId};

/// One row of the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    /// The product id (one line per product).
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub image_url: Option<String>,
    quantity: u32,
}

impl LineItem {
    fn new(product: &Product, quantity: u32) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            image_url: product.image().map(ToString::to_string),
            quantity,
        }
    }

    /// Quantity of this product, always at least 1.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// `price * quantity`, unrounded, saturating at [`Decimal::MAX`].
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * self.quantity
    }
}

/// The transition a cart mutation took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    /// A new line was appended.
    Added { id: ProductId, quantity: u32 },
    /// An existing line's quantity grew.
    Incremented { id: ProductId, quantity: u32 },
    /// An existing line's quantity was set.
    QuantitySet { id: ProductId, quantity: u32 },
    /// A line was removed.
    Removed { id: ProductId },
    /// Every line was removed.
    Cleared { lines: usize },
    /// Nothing changed (unknown id or zero quantity).
    Unchanged,
}

/// A session's shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<LineItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add `quantity` of `product`.
    ///
    /// Increments the existing line for `product.id`, or appends a new line.
    /// Adding zero is a no-op. Quantities saturate at `u32::MAX`.
    pub fn add_to_cart(&mut self, product: &Product, quantity: u32) -> CartChange {
        if quantity == 0 {
            return CartChange::Unchanged;
        }

        if let Some(line) = self.line_mut(product.id) {
            line.quantity = line.quantity.saturating_add(quantity);
            return CartChange::Incremented {
                id: product.id,
                quantity: line.quantity,
            };
        }

        self.lines.push(LineItem::new(product, quantity));
        CartChange::Added {
            id: product.id,
            quantity,
        }
    }

    /// Set the quantity of a line; zero or below removes it.
    ///
    /// Values above `u32::MAX` are clamped.
    pub fn update_quantity(&mut self, id: ProductId, new_quantity: i64) -> CartChange {
        if new_quantity <= 0 {
            return self.remove_from_cart(id);
        }

        let quantity = u32::try_from(new_quantity).unwrap_or(u32::MAX);
        match self.line_mut(id) {
            Some(line) => {
                line.quantity = quantity;
                CartChange::QuantitySet { id, quantity }
            }
            None => CartChange::Unchanged,
        }
    }

    /// Remove the line for `id`, if present.
    pub fn remove_from_cart(&mut self, id: ProductId) -> CartChange {
        let before = self.lines.len();
        self.lines.retain(|line| line.id != id);
        if self.lines.len() == before {
            CartChange::Unchanged
        } else {
            CartChange::Removed { id }
        }
    }

    /// Remove every line.
    pub fn clear_cart(&mut self) -> CartChange {
        let lines = self.lines.len();
        self.lines.clear();
        CartChange::Cleared { lines }
    }

    /// Sum of `price * quantity` over all lines, unrounded, saturating at
    /// [`Decimal::MAX`].
    #[must_use]
    pub fn cart_total(&self) -> Decimal {
        self.lines
            .iter()
            .map(LineItem::line_total)
            .fold(Decimal::ZERO, |total, line| {
                total.checked_add(line).unwrap_or(Decimal::MAX)
            })
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    /// The line for `id`, if present.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&LineItem> {
        self.lines.iter().find(|line| line.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn line_mut(&mut self, id: ProductId) -> Option<&mut LineItem> {
        self.lines.iter_mut().find(|line| line.id == id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn product(id: i64, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            description: String::new(),
            price: Price::from_cents(cents).unwrap(),
            image_url: Some(format!("https://img.example/{id}.jpg")),
            category: None,
        }
    }

    fn assert_invariants(cart: &Cart) {
        let mut seen = HashSet::new();
        for line in cart.lines() {
            assert!(seen.insert(line.id), "duplicate line for {}", line.id);
            assert!(line.quantity() >= 1, "line {} has quantity 0", line.id);
        }
    }

    #[test]
    fn test_new_cart_is_empty() {
        let cart = Cart::new();
        assert!(cart.is_empty());
        assert_eq!(cart.cart_total(), Decimal::ZERO);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_huge_totals_saturate() {
        let mut huge = product(1, 0);
        huge.price = Price::new(Decimal::from_i128_with_scale(100_000_000_000_000_000_000, 0)).unwrap();
        let mut other = product(2, 0);
        other.price = huge.price;

        let mut cart = Cart::new();
        cart.add_to_cart(&huge, u32::MAX);
        cart.add_to_cart(&other, 1);

        assert_eq!(cart.lines()[0].line_total(), Decimal::MAX);
        assert_eq!(cart.cart_total(), Decimal::MAX);

        // The cart stays usable after an overflowing total
        cart.remove_from_cart(huge.id);
        assert_eq!(cart.cart_total(), huge.price.amount());
    }

    #[test]
    fn test_add_same_product_twice_increments() {
        let mut cart = Cart::new();
        let p = product(1, 1000);

        assert_eq!(
            cart.add_to_cart(&p, 1),
            CartChange::Added {
                id: p.id,
                quantity: 1
            }
        );
        assert_eq!(
            cart.add_to_cart(&p, 1),
            CartChange::Incremented {
                id: p.id,
                quantity: 2
            }
        );

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(p.id).unwrap().quantity(), 2);
    }

    #[test]
    fn test_add_copies_product_fields() {
        let mut cart = Cart::new();
        let p = product(9, 2499);
        cart.add_to_cart(&p, 3);

        let line = &cart.lines()[0];
        assert_eq!(line.id, p.id);
        assert_eq!(line.name, "Product 9");
        assert_eq!(line.price, p.price);
        assert_eq!(line.image_url.as_deref(), Some("https://img.example/9.jpg"));
        assert_eq!(line.line_total(), Decimal::new(7497, 2));
    }

    #[test]
    fn test_add_zero_is_noop() {
        let mut cart = Cart::new();
        assert_eq!(cart.add_to_cart(&product(1, 100), 0), CartChange::Unchanged);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_keeps_insertion_order() {
        let mut cart = Cart::new();
        cart.add_to_cart(&product(3, 100), 1);
        cart.add_to_cart(&product(1, 100), 1);
        cart.add_to_cart(&product(3, 100), 1);

        let ids: Vec<i64> = cart.lines().iter().map(|l| l.id.as_i64()).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_update_quantity_to_zero_removes() {
        let mut cart = Cart::new();
        let p = product(1, 1000);
        cart.add_to_cart(&p, 4);

        assert_eq!(cart.update_quantity(p.id, 0), CartChange::Removed { id: p.id });
        assert!(cart.get(p.id).is_none());
    }

    #[test]
    fn test_update_quantity_negative_removes() {
        let mut cart = Cart::new();
        let p = product(1, 1000);
        cart.add_to_cart(&p, 1);
        cart.update_quantity(p.id, -3);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_quantity_sets_value() {
        let mut cart = Cart::new();
        let p = product(1, 1000);
        cart.add_to_cart(&p, 1);

        assert_eq!(
            cart.update_quantity(p.id, 7),
            CartChange::QuantitySet {
                id: p.id,
                quantity: 7
            }
        );
        assert_eq!(cart.get(p.id).unwrap().quantity(), 7);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut cart = Cart::new();
        cart.add_to_cart(&product(1, 1000), 1);
        let before = cart.clone();

        assert_eq!(
            cart.update_quantity(ProductId::new(99), 5),
            CartChange::Unchanged
        );
        assert_eq!(
            cart.update_quantity(ProductId::new(99), 0),
            CartChange::Unchanged
        );
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.remove_from_cart(ProductId::new(5)),
            CartChange::Unchanged
        );
    }

    #[test]
    fn test_cart_total() {
        let mut cart = Cart::new();
        cart.add_to_cart(&product(1, 1000), 1);
        cart.add_to_cart(&product(2, 500), 3);
        assert_eq!(cart.cart_total(), Decimal::new(25, 0));
        assert_eq!(cart.item_count(), 4);
    }

    #[test]
    fn test_cart_total_is_not_rounded() {
        let mut cart = Cart::new();
        let mut p = product(1, 0);
        p.price = Price::new(Decimal::new(3333, 3)).unwrap();
        cart.add_to_cart(&p, 3);
        assert_eq!(cart.cart_total(), Decimal::new(9999, 3));
    }

    #[test]
    fn test_total_reflects_each_mutation() {
        let mut cart = Cart::new();
        let p = product(1, 250);
        cart.add_to_cart(&p, 2);
        assert_eq!(cart.cart_total(), Decimal::new(500, 2));
        cart.update_quantity(p.id, 1);
        assert_eq!(cart.cart_total(), Decimal::new(250, 2));
        cart.remove_from_cart(p.id);
        assert_eq!(cart.cart_total(), Decimal::ZERO);
    }

    #[test]
    fn test_clear_cart() {
        let mut cart = Cart::new();
        cart.add_to_cart(&product(1, 1000), 2);
        cart.add_to_cart(&product(2, 500), 1);

        assert_eq!(cart.clear_cart(), CartChange::Cleared { lines: 2 });
        assert!(cart.is_empty());
        assert_eq!(cart.cart_total(), Decimal::ZERO);
    }

    #[test]
    fn test_quantity_saturates() {
        let mut cart = Cart::new();
        let p = product(1, 1);
        cart.add_to_cart(&p, u32::MAX);
        cart.add_to_cart(&p, 5);
        assert_eq!(cart.get(p.id).unwrap().quantity(), u32::MAX);

        cart.update_quantity(p.id, i64::MAX);
        assert_eq!(cart.get(p.id).unwrap().quantity(), u32::MAX);
    }

    #[test]
    fn test_random_operation_sequences_keep_invariants() {
        let mut rng = StdRng::seed_from_u64(0x5EED);
        let products: Vec<Product> = (1..=6).map(|id| product(id, id * 100)).collect();

        for _ in 0..200 {
            let mut cart = Cart::new();
            for _ in 0..50 {
                let p = &products[rng.random_range(0..products.len())];
                match rng.random_range(0..4) {
                    0 => {
                        cart.add_to_cart(p, rng.random_range(0..4));
                    }
                    1 => {
                        cart.update_quantity(p.id, rng.random_range(-2..6));
                    }
                    2 => {
                        cart.remove_from_cart(p.id);
                    }
                    _ => {
                        cart.add_to_cart(p, 1);
                    }
                }
                assert_invariants(&cart);

                let expected: Decimal = cart
                    .lines()
                    .iter()
                    .map(|l| l.price.amount() * Decimal::from(l.quantity()))
                    .sum();
                assert_eq!(cart.cart_total(), expected);
            }
        }
    }
}

//! # Cart
//!
//! The cashier's in-progress order.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Cart Mutations                                  │
//! │                                                                         │
//! │  Cashier Action           Operation              Effect                 │
//! │  ──────────────           ─────────              ──────                 │
//! │                                                                         │
//! │  Click product ─────────► add_or_increment() ──► push or qty += n      │
//! │                                                                         │
//! │  "+" on a line ─────────► increment() ─────────► qty += n (≤ stock)    │
//! │                                                                         │
//! │  "−" on a line ─────────► decrement() ─────────► qty -= n, drop at ≤0  │
//! │                                                                         │
//! │  Cancel / paid ─────────► clear() ─────────────► lines.clear()         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Lines are unique by `product_id`; re-adding bumps the quantity.
//! - Every line has `quantity > 0`. A line that would reach zero is removed.
//! - A line never holds more units than the stock snapshot it was added with.
//! - A failed mutation leaves the cart unchanged.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::Product;

// =============================================================================
// Cart Line Item
// =============================================================================

/// One product in the cart.
///
/// The name, price and stock are frozen when the line is created, so the
/// cart keeps pricing consistently even if the catalog is refreshed.
/// The same shape is submitted as `cartItems` and read back on checkout
/// records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLineItem {
    #[serde(rename = "_id")]
    pub product_id: String,

    #[serde(rename = "namaProduk")]
    pub name: String,

    #[serde(rename = "harga")]
    pub unit_price: Money,

    pub quantity: i64,

    /// Stock the catalog reported when the line was added.
    #[serde(rename = "jumlah", default)]
    pub stock: i64,
}

impl CartLineItem {
    /// Freezes a product into a new line.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartLineItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.unit_price,
            quantity,
            stock: product.stock,
        }
    }

    /// unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// Ordered list of cart lines, keyed by product id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    lines: Vec<CartLineItem>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds `quantity` units of `product`, merging with an existing line.
    ///
    /// The resulting line quantity is checked against the product's
    /// current stock, so clicking a product twice cannot oversell it.
    pub fn add_or_increment(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        ensure_positive("quantity", quantity)?;

        match self.lines.iter_mut().find(|l| l.product_id == product.id) {
            Some(line) => {
                let requested = line.quantity.saturating_add(quantity);
                if requested > product.stock {
                    return Err(insufficient(&product.name, product.stock, requested));
                }
                line.quantity = requested;
                // Refresh the snapshot with what the catalog says now.
                line.stock = product.stock;
            }
            None => {
                if quantity > product.stock {
                    return Err(insufficient(&product.name, product.stock, quantity));
                }
                self.lines.push(CartLineItem::from_product(product, quantity));
            }
        }

        Ok(())
    }

    /// Raises the quantity of the line at `index` by `delta`.
    pub fn increment(&mut self, index: usize, delta: i64) -> CoreResult<()> {
        ensure_positive("delta", delta)?;

        let line = self
            .lines
            .get_mut(index)
            .ok_or(CoreError::LineNotFound { index })?;

        let requested = line.quantity.saturating_add(delta);
        if requested > line.stock {
            return Err(insufficient(&line.name, line.stock, requested));
        }
        line.quantity = requested;
        Ok(())
    }

    /// Lowers the quantity of the line at `index` by `delta`.
    ///
    /// When the result is zero or less the line is removed entirely, so the
    /// cart shrinks by exactly one.
    pub fn decrement(&mut self, index: usize, delta: i64) -> CoreResult<()> {
        ensure_positive("delta", delta)?;

        let line = self
            .lines
            .get_mut(index)
            .ok_or(CoreError::LineNotFound { index })?;

        let remaining = line.quantity.saturating_sub(delta);
        if remaining <= 0 {
            self.lines.remove(index);
        } else {
            line.quantity = remaining;
        }
        Ok(())
    }

    /// Removes the line at `index` regardless of its quantity.
    pub fn remove(&mut self, index: usize) -> CoreResult<CartLineItem> {
        if index >= self.lines.len() {
            return Err(CoreError::LineNotFound { index });
        }
        Ok(self.lines.remove(index))
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[CartLineItem] {
        &self.lines
    }

    /// Number of distinct products.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Σ line totals.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLineItem::line_total).sum()
    }
}

fn ensure_positive(field: &str, value: i64) -> CoreResult<()> {
    if value <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        }
        .into());
    }
    Ok(())
}

fn insufficient(product: &str, available: i64, requested: i64) -> CoreError {
    CoreError::InsufficientStock {
        product: product.to_string(),
        available,
        requested,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            code: format!("KD-{id}"),
            name: format!("Produk {id}"),
            description: String::new(),
            category: "Frozen".to_string(),
            unit_price: Money::from_rupiah(price),
            cost_price: Money::zero(),
            stock,
            image: None,
            created_at: None,
        }
    }

    #[test]
    fn test_add_new_product_grows_cart_by_one() {
        let mut cart = Cart::new();
        cart.add_or_increment(&product("1", 50_000, 10), 2).unwrap();
        assert_eq!(cart.len(), 1);

        cart.add_or_increment(&product("2", 20_000, 10), 1).unwrap();
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.lines()[1].product_id, "2");
    }

    #[test]
    fn test_add_existing_product_keeps_length() {
        let mut cart = Cart::new();
        let p = product("1", 50_000, 10);

        cart.add_or_increment(&p, 2).unwrap();
        cart.add_or_increment(&p, 3).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].quantity, 5);
        assert_eq!(cart.subtotal().rupiah(), 250_000);
    }

    #[test]
    fn test_add_rejects_more_than_stock() {
        let mut cart = Cart::new();
        let p = product("1", 50_000, 3);

        cart.add_or_increment(&p, 2).unwrap();
        let err = cart.add_or_increment(&p, 2).unwrap_err();

        assert_eq!(
            err,
            CoreError::InsufficientStock {
                product: "Produk 1".to_string(),
                available: 3,
                requested: 4,
            }
        );
        // Unchanged on failure.
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn test_add_rejects_non_positive_quantity() {
        let mut cart = Cart::new();
        let err = cart.add_or_increment(&product("1", 1_000, 5), 0).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_increment_bounded_by_stock_snapshot() {
        let mut cart = Cart::new();
        cart.add_or_increment(&product("1", 10_000, 2), 1).unwrap();

        cart.increment(0, 1).unwrap();
        assert_eq!(cart.lines()[0].quantity, 2);
        assert!(cart.increment(0, 1).is_err());
        assert_eq!(cart.increment(5, 1), Err(CoreError::LineNotFound { index: 5 }));
    }

    #[test]
    fn test_decrement_reduces_quantity() {
        let mut cart = Cart::new();
        cart.add_or_increment(&product("1", 10_000, 10), 3).unwrap();

        cart.decrement(0, 1).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
    }

    #[test]
    fn test_decrement_to_zero_removes_exactly_one_line() {
        let mut cart = Cart::new();
        cart.add_or_increment(&product("1", 10_000, 10), 1).unwrap();
        cart.add_or_increment(&product("2", 20_000, 10), 2).unwrap();
        cart.add_or_increment(&product("3", 30_000, 10), 1).unwrap();

        cart.decrement(1, 5).unwrap();

        assert_eq!(cart.len(), 2);
        let ids: Vec<_> = cart.lines().iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_decrement_unknown_index() {
        let mut cart = Cart::new();
        assert_eq!(cart.decrement(0, 1), Err(CoreError::LineNotFound { index: 0 }));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::new();
        cart.add_or_increment(&product("1", 10_000, 10), 1).unwrap();
        cart.add_or_increment(&product("2", 20_000, 10), 1).unwrap();

        let removed = cart.remove(0).unwrap();
        assert_eq!(removed.product_id, "1");
        assert_eq!(cart.len(), 1);

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Money::zero());
    }

    #[test]
    fn test_line_serializes_with_backend_names() {
        let line = CartLineItem::from_product(&product("1", 50_000, 4), 2);
        let json = serde_json::to_value(&line).unwrap();

        assert_eq!(json["_id"], "1");
        assert_eq!(json["namaProduk"], "Produk 1");
        assert_eq!(json["harga"], 50_000);
        assert_eq!(json["quantity"], 2);
        assert_eq!(json["jumlah"], 4);
    }
}

//! # Cart Commands
//!
//! Everything the cashier page does before pressing "Konfirmasi".
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Payment  │────►│ Checkout │       │
//! │  │  Cart    │     │          │     │  Form    │     │  Saved   │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                 │                              │
//! │                   add_to_cart       set_discount                        │
//! │                   increment_line    set_payment_method                  │
//! │                   decrement_line    set_amount_paid                     │
//! │                   remove_line       set_customer                        │
//! │                        │                 │                              │
//! │                        ▼                 ▼                              │
//! │                   clear_cart     confirm_checkout (checkout.rs)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every command returns the refreshed [`CartView`]. Edits made while a
//! checkout is being submitted are refused with a validation error.

use tracing::{debug, info};

use labodine_core::validation::normalize_customer_number;
use labodine_core::{DiscountPercent, Gender, PaymentMethod};

use crate::error::ApiError;
use crate::gateway::CatalogSource;
use crate::state::{CartState, CartView, CheckoutDraft};

pub fn get_cart(cart: &CartState) -> CartView {
    debug!("get_cart command");
    cart.view()
}

/// Adds a product, or more units of it, to the cart.
///
/// The product is looked up in the current catalog so the line freezes
/// today's price and stock.
pub async fn add_to_cart<C: CatalogSource>(
    catalog: &C,
    cart: &CartState,
    product_id: &str,
    quantity: Option<i64>,
) -> Result<CartView, ApiError> {
    let quantity = quantity.unwrap_or(1);
    debug!(product_id = %product_id, quantity = %quantity, "add_to_cart command");

    let product = catalog
        .list_products()
        .await?
        .into_iter()
        .find(|p| p.id == product_id)
        .ok_or_else(|| ApiError::not_found("Product", product_id))?;

    cart.with_cart_mut(|c| c.add_or_increment(&product, quantity))?;

    info!(product_id = %product_id, quantity = %quantity, "Added to cart");
    Ok(cart.view())
}

pub fn increment_line(cart: &CartState, index: usize, delta: Option<i64>) -> Result<CartView, ApiError> {
    let delta = delta.unwrap_or(1);
    debug!(index, delta, "increment_line command");
    cart.with_cart_mut(|c| c.increment(index, delta))?;
    Ok(cart.view())
}

/// Takes units off a line; the line disappears at zero.
pub fn decrement_line(cart: &CartState, index: usize, delta: Option<i64>) -> Result<CartView, ApiError> {
    let delta = delta.unwrap_or(1);
    debug!(index, delta, "decrement_line command");
    cart.with_cart_mut(|c| c.decrement(index, delta))?;
    Ok(cart.view())
}

pub fn remove_line(cart: &CartState, index: usize) -> Result<CartView, ApiError> {
    debug!(index, "remove_line command");
    let removed = cart.with_cart_mut(|c| c.remove(index))?;
    info!(product_id = %removed.product_id, "Removed from cart");
    Ok(cart.view())
}

pub fn clear_cart(cart: &CartState) -> Result<CartView, ApiError> {
    debug!("clear_cart command");
    cart.with_draft_mut(CheckoutDraft::reset)?;
    Ok(cart.view())
}

/// Discount as typed on the form; clamped into 0..=100.
pub fn set_discount(cart: &CartState, percent: i64) -> Result<CartView, ApiError> {
    debug!(percent, "set_discount command");
    cart.with_draft_mut(|d| d.discount = DiscountPercent::clamped(percent))?;
    Ok(cart.view())
}

/// Selects a payment method by wire tag. An empty tag clears the selection.
pub fn set_payment_method(cart: &CartState, tag: Option<&str>) -> Result<CartView, ApiError> {
    debug!(?tag, "set_payment_method command");
    let method = match tag.map(str::trim) {
        None | Some("") => None,
        Some(tag) => Some(tag.parse::<PaymentMethod>()?),
    };
    cart.with_draft_mut(|d| d.payment_method = method)?;
    Ok(cart.view())
}

/// Stores the tendered amount as typed; the view re-formats it.
pub fn set_amount_paid(cart: &CartState, raw: &str) -> Result<CartView, ApiError> {
    debug!(raw, "set_amount_paid command");
    cart.with_draft_mut(|d| d.amount_paid_raw = raw.to_string())?;
    Ok(cart.view())
}

/// Customer phone (digits only, at most 13) and gender.
pub fn set_customer(
    cart: &CartState,
    number: &str,
    gender: Option<&str>,
) -> Result<CartView, ApiError> {
    debug!("set_customer command");
    let gender = match gender.map(str::trim) {
        None | Some("") => None,
        Some(g) => Some(g.parse::<Gender>()?),
    };
    let number = normalize_customer_number(number);
    cart.with_draft_mut(|d| {
        d.customer_number = number;
        d.customer_gender = gender;
    })?;
    Ok(cart.view())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::gateway::{MemoryBackend, Snapshot};
    use labodine_core::Money;

    fn catalog() -> MemoryBackend {
        MemoryBackend::new(
            Snapshot::from_json(
                r#"{"products": [
                    {"_id": "p-1", "namaProduk": "Klappertart", "harga": 50000, "jumlah": 3},
                    {"_id": "p-2", "namaProduk": "Brownies", "harga": 35000, "jumlah": 10}
                ]}"#,
            )
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_add_to_cart_merges_lines() {
        let backend = catalog();
        let cart = CartState::new();

        add_to_cart(&backend, &cart, "p-1", None).await.unwrap();
        add_to_cart(&backend, &cart, "p-2", Some(2)).await.unwrap();
        let view = add_to_cart(&backend, &cart, "p-1", None).await.unwrap();

        assert_eq!(view.draft.cart.len(), 2);
        assert_eq!(view.draft.cart.lines()[0].quantity, 2);
        assert_eq!(view.quote.subtotal.rupiah(), 170_000);
    }

    #[tokio::test]
    async fn test_add_to_cart_respects_stock() {
        let backend = catalog();
        let cart = CartState::new();

        add_to_cart(&backend, &cart, "p-1", Some(3)).await.unwrap();
        let err = add_to_cart(&backend, &cart, "p-1", None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(cart.with_cart(|c| c.total_quantity()), 3);
    }

    #[tokio::test]
    async fn test_add_unknown_product() {
        let err = add_to_cart(&catalog(), &CartState::new(), "p-9", None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_line_edits() {
        let backend = catalog();
        let cart = CartState::new();
        add_to_cart(&backend, &cart, "p-2", Some(2)).await.unwrap();

        let view = increment_line(&cart, 0, Some(3)).unwrap();
        assert_eq!(view.total_quantity, 5);

        let view = decrement_line(&cart, 0, Some(5)).unwrap();
        assert!(view.draft.cart.is_empty());

        let err = remove_line(&cart, 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_payment_form() {
        let backend = catalog();
        let cart = CartState::new();
        add_to_cart(&backend, &cart, "p-1", Some(2)).await.unwrap();

        let view = set_discount(&cart, 150).unwrap();
        assert_eq!(view.quote.total, Money::zero());

        set_discount(&cart, 10).unwrap();
        set_payment_method(&cart, Some("tunai")).unwrap();
        let view = set_amount_paid(&cart, "Rp 100000").unwrap();
        assert_eq!(view.amount_paid_display, "100.000");
        assert_eq!(view.change_preview, Some(Money::from_rupiah(10_000)));

        assert!(set_payment_method(&cart, Some("cek")).is_err());

        let view = set_customer(&cart, "0812-3456-7890", Some("Wanita")).unwrap();
        assert_eq!(view.draft.customer_number, "081234567890");
        assert_eq!(view.draft.customer_gender, Some(Gender::Female));

        let view = clear_cart(&cart).unwrap();
        assert!(view.draft.cart.is_empty());
        assert_eq!(view.draft.payment_method, None);
    }

    #[tokio::test]
    async fn test_edits_refused_during_submit() {
        let backend = catalog();
        let cart = CartState::new();
        add_to_cart(&backend, &cart, "p-1", None).await.unwrap();

        let guard = cart.begin_submit().unwrap();
        for err in [
            add_to_cart(&backend, &cart, "p-2", None).await.unwrap_err(),
            increment_line(&cart, 0, None).unwrap_err(),
            set_discount(&cart, 20).unwrap_err(),
            set_amount_paid(&cart, "50.000").unwrap_err(),
            clear_cart(&cart).unwrap_err(),
        ] {
            assert_eq!(err.code, ErrorCode::ValidationError);
        }
        drop(guard);

        let view = get_cart(&cart);
        assert_eq!(view.draft.cart.len(), 1);
        assert_eq!(view.draft.discount, DiscountPercent::default());
        assert!(add_to_cart(&backend, &cart, "p-2", None).await.is_ok());
    }
}

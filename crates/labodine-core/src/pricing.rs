//! # Checkout Pricing Engine
//!
//! Turns a cart, a discount and the cashier's payment input into a priced
//! transaction, and decides whether that transaction can be confirmed.
//!
//! ## Pricing Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         price_checkout()                                │
//! │                                                                         │
//! │   Cart ──► compute_subtotal ──► Σ harga × quantity                      │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │   Discount% ► compute_discount_amount ──► floor(sub × pct / 100)        │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │            compute_total ──► max(sub − discount, 0)                     │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │   Method + "100.000" ──► validate_payment ──► compute_change            │
//! │                                                                         │
//! │   Failure order: EmptyCart → MissingPaymentMethod → InsufficientPayment │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The discount applies once, to the cart subtotal, never per line.
//! Everything here is synchronous and side-effect free.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{DiscountPercent, PaymentMethod};

pub use crate::money::{format_localized_amount, parse_localized_amount};

// =============================================================================
// Primitive Operations
// =============================================================================

/// Σ unit price × quantity over every line.
pub fn compute_subtotal(cart: &Cart) -> Money {
    cart.subtotal()
}

/// `floor(subtotal × percent / 100)`, truncating.
///
/// For a non-negative subtotal the result is always within `[0, subtotal]`.
pub fn compute_discount_amount(subtotal: Money, discount: DiscountPercent) -> Money {
    subtotal.clamp_non_negative().percent_floor(discount.value())
}

/// `max(subtotal − discount, 0)`.
pub fn compute_total(subtotal: Money, discount_amount: Money) -> Money {
    (subtotal - discount_amount).clamp_non_negative()
}

/// Change due to the customer. Only cash produces change; every other
/// method returns `None`.
///
/// The value can be negative while the tendered amount is still short; the
/// page shows it as is and [`validate_payment`] blocks confirmation.
pub fn compute_change(total: Money, amount_paid: Money, method: PaymentMethod) -> Option<Money> {
    method.is_cash().then(|| amount_paid - total)
}

/// Checks that the transaction can be confirmed.
pub fn validate_payment(
    method: Option<PaymentMethod>,
    amount_paid: Money,
    total: Money,
) -> CoreResult<()> {
    let method = method.ok_or(CoreError::MissingPaymentMethod)?;

    if method.is_cash() && amount_paid < total {
        return Err(CoreError::InsufficientPayment {
            total,
            paid: amount_paid,
        });
    }

    Ok(())
}

// =============================================================================
// Quote & Transaction Summary
// =============================================================================

/// Live totals shown under the cart while the cashier is still editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartQuote {
    pub subtotal: Money,
    pub discount_percent: DiscountPercent,
    pub discount_amount: Money,
    pub total: Money,
}

impl CartQuote {
    pub fn for_cart(cart: &Cart, discount: DiscountPercent) -> Self {
        let subtotal = compute_subtotal(cart);
        let discount_amount = compute_discount_amount(subtotal, discount);
        CartQuote {
            subtotal,
            discount_percent: discount,
            discount_amount,
            total: compute_total(subtotal, discount_amount),
        }
    }
}

/// A fully priced, payable transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    pub subtotal: Money,
    pub discount_percent: DiscountPercent,
    pub discount_amount: Money,
    pub total: Money,
    pub payment_method: PaymentMethod,
    /// Tendered amount, cash only.
    pub amount_paid: Option<Money>,
    /// Change due, cash only.
    pub change_due: Option<Money>,
}

/// Prices the cart and validates the payment in one pass.
///
/// `amount_paid_raw` is the tendered amount as typed (`"100.000"`); it is
/// ignored for non-cash methods.
///
/// ```rust
/// use labodine_core::cart::Cart;
/// use labodine_core::pricing::price_checkout;
/// use labodine_core::types::{DiscountPercent, PaymentMethod};
/// use labodine_core::CoreError;
///
/// let cart = Cart::new();
/// let result = price_checkout(&cart, DiscountPercent::zero(), Some(PaymentMethod::Cash), "0");
/// assert_eq!(result, Err(CoreError::EmptyCart));
/// ```
pub fn price_checkout(
    cart: &Cart,
    discount: DiscountPercent,
    method: Option<PaymentMethod>,
    amount_paid_raw: &str,
) -> CoreResult<TransactionSummary> {
    if cart.is_empty() {
        return Err(CoreError::EmptyCart);
    }

    let quote = CartQuote::for_cart(cart, discount);
    let amount_paid = Money::parse_localized(amount_paid_raw);

    validate_payment(method, amount_paid, quote.total)?;
    let method = method.ok_or(CoreError::MissingPaymentMethod)?;

    let (amount_paid, change_due) = if method.is_cash() {
        (
            Some(amount_paid),
            compute_change(quote.total, amount_paid, method),
        )
    } else {
        (None, None)
    };

    Ok(TransactionSummary {
        subtotal: quote.subtotal,
        discount_percent: quote.discount_percent,
        discount_amount: quote.discount_amount,
        total: quote.total,
        payment_method: method,
        amount_paid,
        change_due,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

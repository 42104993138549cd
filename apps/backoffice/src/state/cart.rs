//! # Cart State
//!
//! The cashier page's working draft: the cart plus everything typed on the
//! payment form.
//!
//! ## Thread Safety
//! The draft sits behind `Arc<Mutex<T>>`; commands hold the lock only for
//! the duration of a synchronous closure, never across an `.await`.
//! While a checkout is in flight every edit is refused, so nothing typed
//! during the submit is lost to the post-sale reset.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  Page Action              Command                 Draft Change          │
//! │  ───────────              ───────                 ────────────          │
//! │  Click product ─────────► add_to_cart() ────────► cart.add_or_increment │
//! │  + / − buttons ─────────► increment/decrement ──► cart.increment(i, n)  │
//! │  Trash icon ────────────► remove_line() ────────► cart.remove(i)        │
//! │  Diskon field ──────────► set_discount() ───────► discount (clamped)    │
//! │  Metode select ─────────► set_payment_method() ─► payment_method        │
//! │  Uang dibayar field ────► set_amount_paid() ────► amount_paid_raw       │
//! │  Konfirmasi ────────────► confirm_checkout() ───► SubmitGuard::complete │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use labodine_core::pricing::{compute_change, CartQuote};
use labodine_core::{Cart, DiscountPercent, Gender, Money, PaymentMethod};

use crate::error::ApiError;

/// Cart plus the payment form fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutDraft {
    pub cart: Cart,
    pub discount: DiscountPercent,
    pub payment_method: Option<PaymentMethod>,
    /// Tendered amount exactly as typed, e.g. `"100.000"`.
    pub amount_paid_raw: String,
    pub customer_number: String,
    pub customer_gender: Option<Gender>,
}

impl CheckoutDraft {
    pub fn quote(&self) -> CartQuote {
        CartQuote::for_cart(&self.cart, self.discount)
    }

    pub fn amount_paid(&self) -> Money {
        Money::parse_localized(&self.amount_paid_raw)
    }

    /// Change shown while typing; may be negative until enough is tendered.
    pub fn change_preview(&self) -> Option<Money> {
        let method = self.payment_method?;
        compute_change(self.quote().total, self.amount_paid(), method)
    }

    pub fn reset(&mut self) {
        *self = CheckoutDraft::default();
    }
}

/// Cart totals and form echo for the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub draft: CheckoutDraft,
    pub quote: CartQuote,
    pub total_quantity: i64,
    /// Tendered amount re-formatted with thousands separators.
    pub amount_paid_display: String,
    pub change_preview: Option<Money>,
}

impl From<&CheckoutDraft> for CartView {
    fn from(draft: &CheckoutDraft) -> Self {
        CartView {
            draft: draft.clone(),
            quote: draft.quote(),
            total_quantity: draft.cart.total_quantity(),
            amount_paid_display: draft.amount_paid().to_localized(),
            change_preview: draft.change_preview(),
        }
    }
}

/// Shared cart state.
#[derive(Debug, Default)]
pub struct CartState {
    draft: Arc<Mutex<CheckoutDraft>>,
    submitting: AtomicBool,
}

impl CartState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` with read access to the draft.
    ///
    /// A poisoned lock still holds a consistent draft (every mutation is a
    /// single core call), so the guard is recovered rather than propagated.
    pub fn with_draft<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&CheckoutDraft) -> R,
    {
        let draft = self.draft.lock().unwrap_or_else(PoisonError::into_inner);
        f(&draft)
    }

    /// Runs `f` with write access to the draft.
    ///
    /// Refused while a checkout is in flight: the submit works from a
    /// snapshot and clears the draft when it lands.
    pub fn with_draft_mut<F, R>(&self, f: F) -> Result<R, ApiError>
    where
        F: FnOnce(&mut CheckoutDraft) -> R,
    {
        let mut draft = self.draft.lock().unwrap_or_else(PoisonError::into_inner);
        if self.submitting.load(Ordering::Acquire) {
            return Err(ApiError::validation("Checkout sedang diproses"));
        }
        Ok(f(&mut draft))
    }

    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        self.with_draft(|d| f(&d.cart))
    }

    /// Runs a fallible cart edit; both its error and a busy cart surface
    /// as [`ApiError`].
    pub fn with_cart_mut<F, R, E>(&self, f: F) -> Result<R, ApiError>
    where
        F: FnOnce(&mut Cart) -> Result<R, E>,
        ApiError: From<E>,
    {
        self.with_draft_mut(|d| f(&mut d.cart))?
            .map_err(ApiError::from)
    }

    pub fn view(&self) -> CartView {
        self.with_draft(|d| CartView::from(d))
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Marks a checkout as in flight. `None` if one already is.
    pub fn begin_submit(&self) -> Option<SubmitGuard<'_>> {
        self.submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmitGuard { state: self })
    }
}

/// Clears the in-flight flag when dropped.
#[derive(Debug)]
pub struct SubmitGuard<'a> {
    state: &'a CartState,
}

impl SubmitGuard<'_> {
    /// Clears the draft for the next sale, then releases the flag.
    pub fn complete(self) {
        self.state
            .draft
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .reset();
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.state.submitting.store(false, Ordering::Release);
    }
}

//! # Checkout Confirmation
//!
//! What happens when the cashier presses "Konfirmasi Pembayaran".
//!
//! ## Transaction Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    confirm_checkout                                     │
//! │                                                                         │
//! │  1. price_checkout(draft) ──── EmptyCart / MissingPaymentMethod /       │
//! │         │                      InsufficientPayment ──► error, cart kept │
//! │         ▼                                                               │
//! │  2. CheckoutSink::submit_checkout ── rejected ──► error, cart kept      │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  3. StockSink::decrement_stock × line  (concurrent, one lock/product)   │
//! │         │   failures ──► warn! + CheckoutOutcome.stock_failures         │
//! │         ▼                                                               │
//! │  4. CustomerSink::record_visit   (skipped for walk-ins)                 │
//! │         │   failure ──► warn! + customer_recorded = false               │
//! │         ▼                                                               │
//! │  5. Receipt ──► ReceiptRenderer                                         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  6. Cart reset (edits were refused while steps 1-5 ran)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Once step 2 succeeds the sale exists; later failures are reported but
//! never undo it.

use chrono::Utc;
use futures_util::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use labodine_core::checkout::{CheckoutSubmission, CustomerMeta, StockDecrement};
use labodine_core::pricing::{price_checkout, TransactionSummary};
use labodine_core::session::cashier_name;
use labodine_core::{CheckoutRecord, Session, View};

use crate::error::ApiError;
use crate::gateway::{CheckoutSink, CustomerSink, StockSink};
use crate::receipt::{Receipt, ReceiptRenderer};
use crate::state::{CartState, CheckoutDraft, ConfigState, StockLocks};

/// A stock decrement the backend refused after the sale was saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockFailure {
    pub product_id: String,
    pub quantity: i64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOutcome {
    pub record: CheckoutRecord,
    pub summary: TransactionSummary,
    pub receipt: Receipt,
    /// Renderer output.
    pub printed: String,
    pub stock_failures: Vec<StockFailure>,
    pub customer_recorded: bool,
}

impl CheckoutOutcome {
    /// True when every follow-up write went through.
    pub fn is_clean(&self) -> bool {
        self.stock_failures.is_empty()
    }
}

/// Prices, submits and settles the current cart.
///
/// The session is optional: without one the configured fallback cashier
/// name is recorded.
pub async fn confirm_checkout<B, R>(
    backend: &B,
    cart: &CartState,
    locks: &StockLocks,
    config: &ConfigState,
    session: Option<&Session>,
    renderer: &R,
) -> Result<CheckoutOutcome, ApiError>
where
    B: CheckoutSink + StockSink + CustomerSink,
    R: ReceiptRenderer,
{
    debug!("confirm_checkout command");

    if let Some(session) = session {
        session.require(View::Cashier)?;
    }

    let submitting = cart
        .begin_submit()
        .ok_or_else(|| ApiError::validation("Checkout sedang diproses"))?;

    let draft = cart.with_draft(CheckoutDraft::clone);
    let summary = price_checkout(
        &draft.cart,
        draft.discount,
        draft.payment_method,
        &draft.amount_paid_raw,
    )?;
    let customer = CustomerMeta::new(&draft.customer_number, draft.customer_gender)?;
    let cashier = cashier_name(session, &config.store.cashier_fallback);

    let submission = CheckoutSubmission::new(
        Uuid::new_v4(),
        &draft.cart,
        &summary,
        &customer,
        cashier,
        Utc::now(),
        config.utc_offset(),
    );

    let record = backend.submit_checkout(&submission).await?;
    info!(
        checkout_id = %record.id,
        request_id = %submission.request_id,
        total = %summary.total,
        "Checkout saved"
    );

    let stock_failures = decrement_stock(backend, locks, &submission.stock_decrements()).await;

    let customer_recorded = if customer.is_walk_in() {
        false
    } else {
        match backend.record_visit(&submission.customer_visit()).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    checkout_id = %record.id,
                    customer_number = %customer.customer_number,
                    error = %e,
                    "Customer visit not recorded"
                );
                false
            }
        }
    };

    let receipt = Receipt::new(&config.store.name, &record.id, &submission, &summary);
    let printed = renderer.render(&receipt);

    submitting.complete();

    info!(
        checkout_id = %record.id,
        lines = receipt.lines.len(),
        stock_failures = stock_failures.len(),
        "Checkout completed"
    );

    Ok(CheckoutOutcome {
        record,
        summary,
        receipt,
        printed,
        stock_failures,
        customer_recorded,
    })
}

/// Sends every decrement concurrently, each under its product's lock.
async fn decrement_stock<S: StockSink>(
    sink: &S,
    locks: &StockLocks,
    decrements: &[StockDecrement],
) -> Vec<StockFailure> {
    let results = join_all(decrements.iter().map(|d| async move {
        let _held = locks.acquire(&d.product_id).await;
        (d, sink.decrement_stock(d).await)
    }))
    .await;

    results
        .into_iter()
        .filter_map(|(d, result)| match result {
            Ok(left) => {
                debug!(product_id = %d.product_id, left, "Stock decremented");
                None
            }
            Err(e) => {
                warn!(
                    product_id = %d.product_id,
                    quantity = d.quantity,
                    error = %e,
                    "Stock decrement failed after checkout"
                );
                Some(StockFailure {
                    product_id: d.product_id.clone(),
                    quantity: d.quantity,
                    message: e.to_string(),
                })
            }
        })
        .collect()
}

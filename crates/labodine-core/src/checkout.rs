//! # Checkout Payloads
//!
//! What gets sent once a transaction has been priced and validated.
//!
//! ```text
//! TransactionSummary + Cart + CustomerMeta
//!        │
//!        ├──► CheckoutSubmission   POST /api/checkout/checkout
//!        ├──► StockDecrement × n   POST /api/food/kurangi-stok   (per line)
//!        └──► CustomerVisit        POST /api/pelanggan/tambah
//! ```
//!
//! Building the payloads is pure: the request id and the clock are passed
//! in by the caller.

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::cart::{Cart, CartLineItem};
use crate::pricing::TransactionSummary;
use crate::types::{CheckoutRecord, DiscountPercent, Gender, PaymentMethod};
use crate::validation::{normalize_customer_number, validate_customer_number, ValidationResult};
use crate::money::Money;

// =============================================================================
// Customer Meta
// =============================================================================

/// Optional customer details captured on the checkout form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerMeta {
    pub customer_number: String,
    pub customer_gender: Option<Gender>,
}

impl CustomerMeta {
    /// Normalizes the typed phone number (digits only, at most 13).
    pub fn new(raw_number: &str, gender: Option<Gender>) -> ValidationResult<Self> {
        let customer_number = normalize_customer_number(raw_number);
        validate_customer_number(&customer_number)?;
        Ok(CustomerMeta {
            customer_number,
            customer_gender: gender,
        })
    }

    pub fn is_walk_in(&self) -> bool {
        self.customer_number.is_empty()
    }
}

// =============================================================================
// Submission
// =============================================================================

/// Body of the checkout request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSubmission {
    /// Client-generated id, lets the backend drop duplicate submits.
    #[ts(as = "String")]
    pub request_id: Uuid,
    pub cart_items: Vec<CartLineItem>,
    pub payment_method: PaymentMethod,
    pub customer_gender: Option<Gender>,
    pub customer_number: String,
    pub discount_percent: DiscountPercent,
    pub subtotal: Money,
    pub total: Money,
    #[serde(rename = "kasir")]
    pub cashier: String,
    /// Human-readable timestamp printed on the receipt.
    pub waktu_transaksi: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl CheckoutSubmission {
    pub fn new(
        request_id: Uuid,
        cart: &Cart,
        summary: &TransactionSummary,
        customer: &CustomerMeta,
        cashier: &str,
        at: DateTime<Utc>,
        offset: FixedOffset,
    ) -> Self {
        CheckoutSubmission {
            request_id,
            cart_items: cart.lines().to_vec(),
            payment_method: summary.payment_method,
            customer_gender: customer.customer_gender,
            customer_number: customer.customer_number.clone(),
            discount_percent: summary.discount_percent,
            subtotal: summary.subtotal,
            total: summary.total,
            cashier: cashier.to_string(),
            waktu_transaksi: format_transaction_time(at, offset),
            created_at: at,
        }
    }

    /// One decrement per line, in cart order.
    pub fn stock_decrements(&self) -> Vec<StockDecrement> {
        self.cart_items
            .iter()
            .map(|l| StockDecrement {
                product_id: l.product_id.clone(),
                quantity: l.quantity,
            })
            .collect()
    }

    pub fn customer_visit(&self) -> CustomerVisit {
        CustomerVisit {
            customer_number: self.customer_number.clone(),
            customer_gender: self.customer_gender,
            total: self.total,
        }
    }

    /// The record the backend stores for this submission.
    pub fn into_record(self, id: String) -> CheckoutRecord {
        CheckoutRecord {
            id,
            cart_items: self.cart_items,
            payment_method: self.payment_method,
            customer_gender: self.customer_gender,
            customer_number: self.customer_number,
            discount_percent: self.discount_percent,
            subtotal: self.subtotal,
            total: self.total,
            cashier: self.cashier,
            created_at: Some(self.created_at),
        }
    }
}

/// `{ id, jumlah }` body of a stock decrement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockDecrement {
    #[serde(rename = "id")]
    pub product_id: String,
    #[serde(rename = "jumlah")]
    pub quantity: i64,
}

/// Adds a purchase to the customer's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerVisit {
    pub customer_number: String,
    pub customer_gender: Option<Gender>,
    #[serde(rename = "totalTransaksi")]
    pub total: Money,
}

// =============================================================================
// Transaction Time
// =============================================================================

const DAYS: [&str; 7] = ["Senin", "Selasa", "Rabu", "Kamis", "Jumat", "Sabtu", "Minggu"];

const MONTHS: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// Renders `at` in the store's timezone, e.g. `Senin, 3 Maret 2025 pukul 14.05`.
pub fn format_transaction_time(at: DateTime<Utc>, offset: FixedOffset) -> String {
    let local = at.with_timezone(&offset);
    format!(
        "{}, {} {} {} pukul {:02}.{:02}",
        DAYS[local.weekday().num_days_from_monday() as usize],
        local.day(),
        MONTHS[local.month0() as usize],
        local.year(),
        local.hour(),
        local.minute(),
    )
}

//! # Receipts
//!
//! The receipt printed after a successful checkout, and the renderer seam.
//! PDF output lives outside this crate; [`TextReceiptRenderer`] produces
//! the plain-text form used by the CLI and the tests.
//!
//! ```text
//!                LABODINE
//! Tanggal : Senin, 3 Maret 2025 pukul 14.05
//! Kasir   : sinta
//! Pembeli : 081234567890
//! Gender  : Wanita
//! Metode  : Tunai
//! ----------------------------------------
//! Klappertart
//!   2 x 50.000                     100.000
//! ----------------------------------------
//! Subtotal                         100.000
//! Diskon (10%)                     -10.000
//! Total                          Rp 90.000
//! Dibayar                       Rp 100.000
//! Kembalian                      Rp 10.000
//! ```

use serde::{Deserialize, Serialize};

use labodine_core::checkout::CheckoutSubmission;
use labodine_core::pricing::TransactionSummary;
use labodine_core::{DiscountPercent, Gender, Money, PaymentMethod};

// =============================================================================
// Receipt Model
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptLine {
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub store_name: String,
    pub checkout_id: String,
    /// Tanggal, already in the store's timezone.
    pub transaction_time: String,
    pub cashier: String,
    /// Pembeli; empty for walk-ins.
    pub customer_number: String,
    pub customer_gender: Option<Gender>,
    pub payment_method: PaymentMethod,
    pub lines: Vec<ReceiptLine>,
    pub subtotal: Money,
    pub discount_percent: DiscountPercent,
    pub discount_amount: Money,
    pub total: Money,
    /// Cash only.
    pub amount_paid: Option<Money>,
    /// Cash only.
    pub change_due: Option<Money>,
}

impl Receipt {
    pub fn new(
        store_name: &str,
        checkout_id: &str,
        submission: &CheckoutSubmission,
        summary: &TransactionSummary,
    ) -> Self {
        Receipt {
            store_name: store_name.to_string(),
            checkout_id: checkout_id.to_string(),
            transaction_time: submission.waktu_transaksi.clone(),
            cashier: submission.cashier.clone(),
            customer_number: submission.customer_number.clone(),
            customer_gender: submission.customer_gender,
            payment_method: summary.payment_method,
            lines: submission
                .cart_items
                .iter()
                .map(|l| ReceiptLine {
                    name: l.name.clone(),
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                    line_total: l.line_total(),
                })
                .collect(),
            subtotal: summary.subtotal,
            discount_percent: summary.discount_percent,
            discount_amount: summary.discount_amount,
            total: summary.total,
            amount_paid: summary.amount_paid,
            change_due: summary.change_due,
        }
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Turns a receipt into printable output.
pub trait ReceiptRenderer: Send + Sync {
    fn render(&self, receipt: &Receipt) -> String;
}

/// Fixed-width text receipt.
#[derive(Debug, Clone)]
pub struct TextReceiptRenderer {
    pub width: usize,
    pub currency_symbol: String,
}

impl Default for TextReceiptRenderer {
    fn default() -> Self {
        TextReceiptRenderer {
            width: 40,
            currency_symbol: "Rp".to_string(),
        }
    }
}

impl TextReceiptRenderer {
    pub fn new(currency_symbol: impl Into<String>) -> Self {
        TextReceiptRenderer {
            currency_symbol: currency_symbol.into(),
            ..Self::default()
        }
    }

    fn row(&self, label: &str, value: &str) -> String {
        let used = label.chars().count() + value.chars().count();
        let pad = self.width.saturating_sub(used).max(1);
        format!("{}{}{}", label, " ".repeat(pad), value)
    }

    fn field(label: &str, value: &str) -> String {
        format!("{:<8}: {}", label, value)
    }

    fn centered(&self, text: &str) -> String {
        let pad = self.width.saturating_sub(text.chars().count()) / 2;
        format!("{}{}", " ".repeat(pad), text)
    }

    fn money(&self, amount: Money) -> String {
        format!("{} {}", self.currency_symbol, amount.to_localized())
    }
}

impl ReceiptRenderer for TextReceiptRenderer {
    fn render(&self, receipt: &Receipt) -> String {
        let rule = "-".repeat(self.width);
        let customer = if receipt.customer_number.is_empty() {
            "-"
        } else {
            receipt.customer_number.as_str()
        };
        let gender = receipt.customer_gender.map_or("-", |g| g.label());

        let mut out = vec![
            self.centered(&receipt.store_name.to_uppercase()),
            Self::field("Tanggal", &receipt.transaction_time),
            Self::field("Kasir", &receipt.cashier),
            Self::field("Pembeli", customer),
            Self::field("Gender", gender),
            Self::field("Metode", receipt.payment_method.label()),
            rule.clone(),
        ];

        for line in &receipt.lines {
            out.push(line.name.clone());
            out.push(self.row(
                &format!("  {} x {}", line.quantity, line.unit_price.to_localized()),
                &line.line_total.to_localized(),
            ));
        }

        out.push(rule.clone());
        out.push(self.row("Subtotal", &receipt.subtotal.to_localized()));
        out.push(self.row(
            &format!("Diskon ({})", receipt.discount_percent),
            &format!("-{}", receipt.discount_amount.to_localized()),
        ));
        out.push(self.row("Total", &self.money(receipt.total)));

        if let (Some(paid), Some(change)) = (receipt.amount_paid, receipt.change_due) {
            out.push(self.row("Dibayar", &self.money(paid)));
            out.push(self.row("Kembalian", &self.money(change)));
        }

        out.push(rule);
        out.push(self.centered("Terima kasih"));
        out.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receipt(method: PaymentMethod) -> Receipt {
        let cash = method.is_cash();
        Receipt {
            store_name: "Labodine".to_string(),
            checkout_id: "chk-1".to_string(),
            transaction_time: "Senin, 3 Maret 2025 pukul 14.05".to_string(),
            cashier: "sinta".to_string(),
            customer_number: String::new(),
            customer_gender: None,
            payment_method: method,
            lines: vec![ReceiptLine {
                name: "Klappertart".to_string(),
                quantity: 2,
                unit_price: Money::from_rupiah(50_000),
                line_total: Money::from_rupiah(100_000),
            }],
            subtotal: Money::from_rupiah(100_000),
            discount_percent: DiscountPercent::clamped(10),
            discount_amount: Money::from_rupiah(10_000),
            total: Money::from_rupiah(90_000),
            amount_paid: cash.then(|| Money::from_rupiah(100_000)),
            change_due: cash.then(|| Money::from_rupiah(10_000)),
        }
    }

    #[test]
    fn test_cash_receipt() {
        let text = TextReceiptRenderer::default().render(&receipt(PaymentMethod::Cash));
        assert!(text.contains("Pembeli : -"));
        assert!(text.contains("Metode  : Tunai"));
        assert!(text.contains("  2 x 50.000"));
        assert!(text.contains("Diskon (10%)"));
        assert!(text.contains("Rp 90.000"));
        assert!(text.contains("Kembalian"));

        let total_line = text.lines().find(|l| l.starts_with("Total")).unwrap();
        assert_eq!(total_line.chars().count(), 40);
    }

    #[test]
    fn test_non_cash_receipt_omits_change() {
        let text = TextReceiptRenderer::default().render(&receipt(PaymentMethod::Qris));
        assert!(text.contains("QRIS"));
        assert!(!text.contains("Dibayar"));
        assert!(!text.contains("Kembalian"));
    }
}

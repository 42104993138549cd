//! # Domain Types
//!
//! Records exchanged with the Labodine backend, plus the small value types
//! the checkout works with.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │ CheckoutRecord  │   │  PaymentMethod  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  _id            │   │  cartItems      │   │  tunai          │       │
//! │  │  namaProduk     │   │  paymentMethod  │   │  qris           │       │
//! │  │  harga / hpp    │   │  subtotal       │   │  transfer_*     │       │
//! │  │  jumlah (stock) │   │  total          │   │  ovo, gopay ... │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  RawMaterial    │   │  ExpenseEntry   │   │AttendanceRecord │       │
//! │  │  (Bahan Baku)   │   │  (Pengeluaran)  │   │  (Absen)        │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Names
//! The backend speaks Indonesian camelCase (`namaProduk`, `harga`, `jumlah`)
//! and Mongo-style `_id`. Rust fields use English names; serde renames keep
//! the wire shape intact so records round-trip unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::cart::CartLineItem;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;

// =============================================================================
// Payment Method
// =============================================================================

/// Payment methods offered at the cashier.
///
/// Serialized with the tags the backend stores (`tunai`, `transfer_bca`...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash. The only method with tendered amount and change.
    #[serde(rename = "tunai")]
    Cash,
    /// QRIS code scanned by the customer.
    Qris,
    TransferBca,
    TransferBri,
    TransferBni,
    TransferMandiri,
    Ovo,
    Gopay,
    Dana,
    #[serde(rename = "shopeepay")]
    ShopeePay,
}

/// The family a payment method belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    Cash,
    BankTransfer,
    EWallet,
    QrCode,
}

impl PaymentMethod {
    /// Every method, in the order the cashier's drop-down lists them.
    pub const ALL: [PaymentMethod; 10] = [
        PaymentMethod::Cash,
        PaymentMethod::Qris,
        PaymentMethod::TransferBca,
        PaymentMethod::TransferBri,
        PaymentMethod::TransferBni,
        PaymentMethod::TransferMandiri,
        PaymentMethod::Ovo,
        PaymentMethod::Gopay,
        PaymentMethod::Dana,
        PaymentMethod::ShopeePay,
    ];

    /// Returns the wire tag (`tunai`, `qris`, ...).
    pub const fn tag(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "tunai",
            PaymentMethod::Qris => "qris",
            PaymentMethod::TransferBca => "transfer_bca",
            PaymentMethod::TransferBri => "transfer_bri",
            PaymentMethod::TransferBni => "transfer_bni",
            PaymentMethod::TransferMandiri => "transfer_mandiri",
            PaymentMethod::Ovo => "ovo",
            PaymentMethod::Gopay => "gopay",
            PaymentMethod::Dana => "dana",
            PaymentMethod::ShopeePay => "shopeepay",
        }
    }

    /// Returns the label shown in the drop-down.
    pub const fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Tunai",
            PaymentMethod::Qris => "QRIS (Scan Barcode)",
            PaymentMethod::TransferBca => "Transfer Bank - BCA",
            PaymentMethod::TransferBri => "Transfer Bank - BRI",
            PaymentMethod::TransferBni => "Transfer Bank - BNI",
            PaymentMethod::TransferMandiri => "Transfer Bank - Mandiri",
            PaymentMethod::Ovo => "OVO",
            PaymentMethod::Gopay => "GoPay",
            PaymentMethod::Dana => "DANA",
            PaymentMethod::ShopeePay => "ShopeePay",
        }
    }

    pub const fn kind(&self) -> PaymentKind {
        match self {
            PaymentMethod::Cash => PaymentKind::Cash,
            PaymentMethod::Qris => PaymentKind::QrCode,
            PaymentMethod::TransferBca
            | PaymentMethod::TransferBri
            | PaymentMethod::TransferBni
            | PaymentMethod::TransferMandiri => PaymentKind::BankTransfer,
            PaymentMethod::Ovo
            | PaymentMethod::Gopay
            | PaymentMethod::Dana
            | PaymentMethod::ShopeePay => PaymentKind::EWallet,
        }
    }

    /// Only cash collects a tendered amount and gives change.
    #[inline]
    pub const fn is_cash(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_lowercase();
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.tag() == tag)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "paymentMethod".to_string(),
                allowed: PaymentMethod::ALL.iter().map(|m| m.tag().to_string()).collect(),
            })
    }
}

// =============================================================================
// Discount Percent
// =============================================================================

/// A whole-number discount in `[0, 100]`.
///
/// On the wire it is a bare number; deserializing goes through
/// [`DiscountPercent::new`], so out-of-range values are rejected.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[serde(try_from = "i64", into = "u8")]
#[ts(export)]
pub struct DiscountPercent(u8);

impl DiscountPercent {
    /// Maximum discount.
    pub const MAX: u8 = 100;

    /// Strict constructor: rejects values outside `[0, 100]`.
    pub fn new(percent: i64) -> CoreResult<Self> {
        if !(0..=Self::MAX as i64).contains(&percent) {
            return Err(CoreError::InvalidDiscount(percent));
        }
        Ok(DiscountPercent(percent as u8))
    }

    /// Form input path: clamps into `[0, 100]` instead of rejecting.
    pub fn clamped(percent: i64) -> Self {
        DiscountPercent(percent.clamp(0, Self::MAX as i64) as u8)
    }

    /// No discount.
    #[inline]
    pub const fn zero() -> Self {
        DiscountPercent(0)
    }

    #[inline]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for DiscountPercent {
    type Error = CoreError;

    fn try_from(percent: i64) -> CoreResult<Self> {
        DiscountPercent::new(percent)
    }
}

impl From<DiscountPercent> for u8 {
    fn from(discount: DiscountPercent) -> Self {
        discount.0
    }
}

impl fmt::Display for DiscountPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

// =============================================================================
// Customer Gender
// =============================================================================

/// Customer gender as captured on the checkout form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Gender {
    #[serde(rename = "Pria")]
    Male,
    #[serde(rename = "Wanita")]
    Female,
}

impl Gender {
    pub const fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Pria",
            Gender::Female => "Wanita",
        }
    }
}

impl FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pria" | "male" | "l" => Ok(Gender::Male),
            "wanita" | "female" | "p" => Ok(Gender::Female),
            _ => Err(ValidationError::NotAllowed {
                field: "customerGender".to_string(),
                allowed: vec!["Pria".to_string(), "Wanita".to_string()],
            }),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A sellable product (`/api/food/list`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,

    /// Business code (kodeProduk).
    #[serde(rename = "kodeProduk", default)]
    pub code: String,

    #[serde(rename = "namaProduk")]
    pub name: String,

    #[serde(rename = "keterangan", default)]
    pub description: String,

    /// Category label, e.g. "Frozen" or "Hampers".
    #[serde(rename = "kategori", default)]
    pub category: String,

    /// Sale price (harga).
    #[serde(rename = "harga")]
    pub unit_price: Money,

    /// Cost-of-goods base price (HPP).
    #[serde(rename = "hpp", default)]
    pub cost_price: Money,

    /// Units in stock (jumlah).
    #[serde(rename = "jumlah", default)]
    pub stock: i64,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(rename = "createdAt", default)]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Sale price minus HPP.
    pub fn margin(&self) -> Money {
        self.unit_price - self.cost_price
    }

    /// Stock strictly below `threshold`.
    #[inline]
    pub fn is_low_stock(&self, threshold: i64) -> bool {
        self.stock < threshold
    }

    /// Checks whether `quantity` units can be taken from stock.
    pub fn can_sell(&self, quantity: i64) -> bool {
        quantity > 0 && quantity <= self.stock
    }
}

// =============================================================================
// Raw Material (Bahan Baku)
// =============================================================================

/// Raw-material stock line (`/api/bahanBaku/daftarBahanBaku`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RawMaterial {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "namaBarang")]
    pub name: String,

    #[serde(rename = "jumlah", default)]
    pub quantity: i64,

    /// Unit of measure (kg, pcs, liter...).
    #[serde(rename = "satuan", default)]
    pub unit: String,

    /// How the stock came in (jenisPemasukan), e.g. "Pembelian".
    #[serde(rename = "jenisPemasukan", default)]
    pub entry_kind: String,

    #[serde(rename = "keterangan", default)]
    pub note: String,

    /// Date the stock was received (tanggal).
    #[serde(rename = "tanggal", default)]
    #[ts(as = "Option<String>")]
    pub date: Option<DateTime<Utc>>,

    #[serde(rename = "createdAt", default)]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Checkout Record
// =============================================================================

/// A submitted checkout as listed by `/api/checkout/daftarCheckout`.
///
/// Checkouts are the income side of every report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRecord {
    #[serde(rename = "_id")]
    pub id: String,

    pub cart_items: Vec<CartLineItem>,

    pub payment_method: PaymentMethod,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub customer_gender: Option<Gender>,

    #[serde(default)]
    pub customer_number: String,

    #[serde(default)]
    pub discount_percent: DiscountPercent,

    pub subtotal: Money,

    pub total: Money,

    /// Cashier username (kasir).
    #[serde(rename = "kasir", default)]
    pub cashier: String,

    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

impl CheckoutRecord {
    /// Total units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.cart_items.iter().map(|i| i.quantity).sum()
    }

    /// Case-insensitive match of `needle` against any line's product name.
    pub fn mentions_product(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.cart_items
            .iter()
            .any(|i| i.name.to_lowercase().contains(&needle))
    }
}

// =============================================================================
// Expense Entry (Pengeluaran)
// =============================================================================

/// An expense ledger entry (`/api/pengeluaran/daftarPengeluaran`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ExpenseEntry {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "namaPengeluaran")]
    pub name: String,

    /// The backend stores this field as either a number or a numeric string.
    #[serde(rename = "jumlah", deserialize_with = "lenient_amount")]
    pub amount: Money,

    #[serde(rename = "jenisPengeluaran", default)]
    pub kind: String,

    #[serde(rename = "keterangan", default)]
    pub note: String,

    #[serde(rename = "tanggal", default)]
    #[ts(as = "Option<String>")]
    pub date: Option<DateTime<Utc>>,
}

// =============================================================================
// Attendance (Absen)
// =============================================================================

/// Attendance status an employee can be marked with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum AttendanceStatus {
    #[serde(rename = "hadir")]
    Present,
    #[serde(rename = "izin")]
    Excused,
    #[serde(rename = "sakit")]
    Sick,
    #[serde(rename = "alpa")]
    Absent,
}

impl FromStr for AttendanceStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hadir" => Ok(AttendanceStatus::Present),
            "izin" => Ok(AttendanceStatus::Excused),
            "sakit" => Ok(AttendanceStatus::Sick),
            "alpa" => Ok(AttendanceStatus::Absent),
            _ => Err(ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: ["hadir", "izin", "sakit", "alpa"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }),
        }
    }
}

/// One attendance mark (`/api/pegawai/absen`).
///
/// The status is kept as the raw string: old entries carry capitalised or
/// unknown values, and the recap simply skips what it cannot parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    #[serde(rename = "_id", default)]
    pub id: String,

    pub employee_id: String,

    #[serde(default)]
    pub employee_name: String,

    pub status: String,

    #[serde(rename = "keterangan", default)]
    pub note: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl AttendanceRecord {
    /// Parsed status, if recognised.
    pub fn parsed_status(&self) -> Option<AttendanceStatus> {
        self.status.parse().ok()
    }
}

// =============================================================================
// Customer (Pelanggan)
// =============================================================================

/// A customer captured at checkout (`/api/pelanggan/daftar`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(rename = "_id", default)]
    pub id: String,

    pub customer_number: String,

    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub customer_gender: Option<Gender>,

    /// Lifetime spend (totalTransaksi).
    #[serde(rename = "totalTransaksi", default)]
    pub total_spent: Money,
}

// =============================================================================
// Serde Helpers
// =============================================================================

/// Treats `""` and `null` as `None`; parses anything else with `FromStr`.
fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Accepts `15000`, `"15000"` or `"15.000"`.
fn lenient_amount<'de, D>(deserializer: D) -> Result<Money, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Int(n) => Money::from_rupiah(n),
        Raw::Float(f) => Money::from_rupiah(f.trunc() as i64),
        Raw::Text(s) => Money::parse_localized(&s),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payment_method_tags() {
        assert_eq!(PaymentMethod::Cash.tag(), "tunai");
        assert_eq!("transfer_bca".parse::<PaymentMethod>().unwrap(), PaymentMethod::TransferBca);
        assert_eq!("SHOPEEPAY".parse::<PaymentMethod>().unwrap(), PaymentMethod::ShopeePay);
        assert!("bitcoin".parse::<PaymentMethod>().is_err());

        let json = serde_json::to_string(&PaymentMethod::Cash).unwrap();
        assert_eq!(json, "\"tunai\"");
        let back: PaymentMethod = serde_json::from_str("\"transfer_mandiri\"").unwrap();
        assert_eq!(back, PaymentMethod::TransferMandiri);
    }

    #[test]
    fn test_payment_method_serde_matches_tag() {
        for method in PaymentMethod::ALL {
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, format!("\"{}\"", method.tag()));
        }
    }

    #[test]
    fn test_payment_kinds() {
        assert_eq!(PaymentMethod::Cash.kind(), PaymentKind::Cash);
        assert_eq!(PaymentMethod::Qris.kind(), PaymentKind::QrCode);
        assert_eq!(PaymentMethod::TransferBni.kind(), PaymentKind::BankTransfer);
        assert_eq!(PaymentMethod::Gopay.kind(), PaymentKind::EWallet);
        assert!(PaymentMethod::Cash.is_cash());
        assert!(!PaymentMethod::Dana.is_cash());
    }

    #[test]
    fn test_discount_percent() {
        assert_eq!(DiscountPercent::new(10).unwrap().value(), 10);
        assert_eq!(DiscountPercent::new(101), Err(CoreError::InvalidDiscount(101)));
        assert_eq!(DiscountPercent::new(-1), Err(CoreError::InvalidDiscount(-1)));
        assert_eq!(DiscountPercent::clamped(150).value(), 100);
        assert_eq!(DiscountPercent::clamped(-20).value(), 0);
    }

    #[test]
    fn test_discount_percent_wire_format_is_checked() {
        let d: DiscountPercent = serde_json::from_str("10").unwrap();
        assert_eq!(d.value(), 10);
        assert_eq!(serde_json::to_string(&d).unwrap(), "10");

        assert!(serde_json::from_str::<DiscountPercent>("101").is_err());
        assert!(serde_json::from_str::<DiscountPercent>("150").is_err());
        assert!(serde_json::from_str::<DiscountPercent>("-5").is_err());

        let mut record = json!({
            "_id": "c-1",
            "cartItems": [],
            "paymentMethod": "tunai",
            "discountPercent": 10,
            "subtotal": 0,
            "total": 0
        });
        assert!(serde_json::from_value::<CheckoutRecord>(record.clone()).is_ok());
        record["discountPercent"] = json!(150);
        assert!(serde_json::from_value::<CheckoutRecord>(record).is_err());
    }

    #[test]
    fn test_product_from_backend_json() {
        let product: Product = serde_json::from_value(json!({
            "_id": "p-1",
            "kodeProduk": "KLP-01",
            "namaProduk": "Klappertart Mini",
            "keterangan": "Isi 6",
            "kategori": "Frozen",
            "harga": 50000,
            "hpp": 32000,
            "jumlah": 12,
            "image": "klp.png",
            "createdAt": "2025-03-01T08:00:00Z"
        }))
        .unwrap();

        assert_eq!(product.name, "Klappertart Mini");
        assert_eq!(product.unit_price.rupiah(), 50_000);
        assert_eq!(product.margin().rupiah(), 18_000);
        assert!(!product.is_low_stock(10));
        assert!(product.can_sell(12));
        assert!(!product.can_sell(13));
    }

    #[test]
    fn test_checkout_record_with_empty_gender() {
        let record: CheckoutRecord = serde_json::from_value(json!({
            "_id": "c-1",
            "cartItems": [
                { "_id": "p-1", "namaProduk": "Klappertart Mini", "harga": 50000, "quantity": 2 }
            ],
            "paymentMethod": "qris",
            "customerGender": "",
            "customerNumber": "",
            "discountPercent": 0,
            "subtotal": 100000,
            "total": 100000,
            "kasir": "sinta"
        }))
        .unwrap();

        assert_eq!(record.customer_gender, None);
        assert_eq!(record.total_quantity(), 2);
        assert!(record.mentions_product("klapper"));
        assert!(!record.mentions_product("brownies"));
    }

    #[test]
    fn test_expense_amount_accepts_strings() {
        let entry: ExpenseEntry = serde_json::from_value(json!({
            "_id": "e-1",
            "namaPengeluaran": "Gas LPG",
            "jumlah": "150000",
            "jenisPengeluaran": "Operasional"
        }))
        .unwrap();
        assert_eq!(entry.amount.rupiah(), 150_000);

        let entry: ExpenseEntry = serde_json::from_value(json!({
            "_id": "e-2",
            "namaPengeluaran": "Tepung",
            "jumlah": 75000
        }))
        .unwrap();
        assert_eq!(entry.amount.rupiah(), 75_000);
    }

    #[test]
    fn test_attendance_status_parsing() {
        assert_eq!("Hadir".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::Present);
        assert_eq!("alpa".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::Absent);
        assert!("cuti".parse::<AttendanceStatus>().is_err());
    }
}

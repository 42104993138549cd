//! # Backend Gateway
//!
//! The REST backend is reached only through the traits in this module.
//! Each trait covers one slice of the backend the pages talk to.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Gateway Traits                                       │
//! │                                                                         │
//! │  CatalogSource   GET  /api/food/list                     products       │
//! │                  GET  /api/bahanBaku/daftarBahanBaku     raw materials  │
//! │  CheckoutSink    POST /api/checkout/checkout             submit         │
//! │  StockSink       POST /api/food/kurangi-stok             product stock  │
//! │                  POST /api/bahanBaku/kurangiBahanBaku    stock-out      │
//! │  CustomerSink    POST /api/pelanggan/tambah              customer visit │
//! │  LedgerSource    GET  /api/checkout/daftarCheckout       checkouts      │
//! │                  GET  /api/pengeluaran/daftarPengeluaran expenses       │
//! │                  GET  /api/pegawai/absen                 attendance     │
//! │                  GET  /api/pelanggan/daftar              customers      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every response body is read as an [`ApiEnvelope`] first; [`settle`]
//! turns it into a [`GatewayResult`]. [`MemoryBackend`] implements every
//! trait for tests and the report CLI.

mod memory;

pub use memory::{MemoryBackend, Snapshot};

use std::future::Future;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use labodine_core::checkout::{CheckoutSubmission, CustomerVisit, StockDecrement};
use labodine_core::envelope::ApiEnvelope;
use labodine_core::{
    AttendanceRecord, CheckoutRecord, Customer, ExpenseEntry, Product, RawMaterial,
};

use crate::error::{GatewayError, GatewayResult};

// =============================================================================
// Envelope Boundary
// =============================================================================

/// Turns a validated envelope into a result; rejections keep their message.
pub fn settle<T>(envelope: ApiEnvelope<T>) -> GatewayResult<T> {
    envelope
        .into_result()
        .map_err(|message| GatewayError::Rejected { message })
}

/// Decodes a raw response body and settles it.
pub fn decode_body<T: DeserializeOwned>(body: &str) -> GatewayResult<T> {
    settle(ApiEnvelope::decode(body)?)
}

// =============================================================================
// Payloads
// =============================================================================

/// Body of a raw-material stock-out (barang keluar).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMaterialStockOut {
    #[serde(rename = "namaBarang")]
    pub name: String,
    #[serde(rename = "jumlah")]
    pub quantity: i64,
    #[serde(rename = "satuan")]
    pub unit: String,
    /// Why the stock left, e.g. "Produksi" (jenisPengeluaran).
    #[serde(rename = "jenisPengeluaran")]
    pub kind: String,
    #[serde(rename = "tanggal")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "keterangan", default)]
    pub note: String,
}

// =============================================================================
// Collaborator Traits
// =============================================================================

pub trait CatalogSource: Send + Sync {
    fn list_products(&self) -> impl Future<Output = GatewayResult<Vec<Product>>> + Send;

    fn list_raw_materials(&self) -> impl Future<Output = GatewayResult<Vec<RawMaterial>>> + Send;
}

pub trait CheckoutSink: Send + Sync {
    /// Stores the checkout and returns the record as saved.
    fn submit_checkout(
        &self,
        submission: &CheckoutSubmission,
    ) -> impl Future<Output = GatewayResult<CheckoutRecord>> + Send;
}

pub trait StockSink: Send + Sync {
    /// Takes sold units off a product. Returns the stock left.
    fn decrement_stock(
        &self,
        decrement: &StockDecrement,
    ) -> impl Future<Output = GatewayResult<i64>> + Send;

    /// Takes units of a raw material out of storage. Returns the quantity left.
    fn take_raw_material(
        &self,
        stock_out: &RawMaterialStockOut,
    ) -> impl Future<Output = GatewayResult<i64>> + Send;
}

pub trait CustomerSink: Send + Sync {
    fn record_visit(&self, visit: &CustomerVisit) -> impl Future<Output = GatewayResult<()>> + Send;
}

pub trait LedgerSource: Send + Sync {
    fn list_checkouts(&self) -> impl Future<Output = GatewayResult<Vec<CheckoutRecord>>> + Send;

    fn list_expenses(&self) -> impl Future<Output = GatewayResult<Vec<ExpenseEntry>>> + Send;

    fn list_attendance(&self) -> impl Future<Output = GatewayResult<Vec<AttendanceRecord>>> + Send;

    fn list_customers(&self) -> impl Future<Output = GatewayResult<Vec<Customer>>> + Send;
}

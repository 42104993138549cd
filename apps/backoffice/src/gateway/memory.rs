//! # In-Memory Backend
//!
//! Implements every gateway trait over a [`Snapshot`] held in memory.
//! Used by the tests and by the report CLI, which loads the snapshot from
//! a JSON file.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    MemoryBackend                                        │
//! │                                                                         │
//! │   trait call ──► apply_*() ──► ApiEnvelope<T> ──► settle() ──► Result   │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │            RwLock<Snapshot>                                             │
//! │            products, rawMaterials, checkouts,                           │
//! │            expenses, attendance, customers                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock decrements read, wait `latency`, then write back, like a REST
//! backend doing read-modify-write. Concurrent callers must serialize
//! per product themselves.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use labodine_core::checkout::{CheckoutSubmission, CustomerVisit, StockDecrement};
use labodine_core::envelope::{ApiEnvelope, EnvelopeError};
use labodine_core::{
    AttendanceRecord, CheckoutRecord, Customer, ExpenseEntry, Product, RawMaterial,
};

use super::{
    settle, CatalogSource, CheckoutSink, CustomerSink, LedgerSource, RawMaterialStockOut,
    StockSink,
};
use crate::error::{GatewayError, GatewayResult};

// =============================================================================
// Snapshot
// =============================================================================

/// Everything the backend would list, in one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub raw_materials: Vec<RawMaterial>,
    #[serde(default)]
    pub checkouts: Vec<CheckoutRecord>,
    #[serde(default)]
    pub expenses: Vec<ExpenseEntry>,
    #[serde(default)]
    pub attendance: Vec<AttendanceRecord>,
    #[serde(default)]
    pub customers: Vec<Customer>,
}

impl Snapshot {
    pub fn from_json(json: &str) -> GatewayResult<Self> {
        serde_json::from_str(json)
            .map_err(EnvelopeError::from)
            .map_err(GatewayError::from)
    }

    pub fn load(path: &Path) -> GatewayResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| GatewayError::Unavailable(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&contents)
    }
}

// =============================================================================
// Backend
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryBackend {
    data: RwLock<Snapshot>,
    /// Request id → stored checkout id.
    submitted: RwLock<HashMap<Uuid, String>>,
    next_id: AtomicU64,
    latency: Option<Duration>,
    offline: bool,
    checkout_rejection: Option<String>,
    failing_products: HashSet<String>,
}

impl MemoryBackend {
    pub fn new(snapshot: Snapshot) -> Self {
        MemoryBackend {
            data: RwLock::new(snapshot),
            ..Self::default()
        }
    }

    /// Delay between reading and writing stock.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Every call fails as if the server were down.
    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    /// Checkouts are answered with `{ ok: false, message }`.
    pub fn rejecting_checkouts(mut self, message: impl Into<String>) -> Self {
        self.checkout_rejection = Some(message.into());
        self
    }

    /// Stock decrements for this product are rejected.
    pub fn failing_stock_for(mut self, product_id: impl Into<String>) -> Self {
        self.failing_products.insert(product_id.into());
        self
    }

    /// Copy of the current data.
    pub async fn snapshot(&self) -> Snapshot {
        self.data.read().await.clone()
    }

    fn reachable(&self) -> GatewayResult<()> {
        if self.offline {
            return Err(GatewayError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    async fn list<T: Clone>(&self, pick: impl FnOnce(&Snapshot) -> &Vec<T>) -> GatewayResult<Vec<T>> {
        self.reachable()?;
        let data = self.data.read().await;
        settle(ApiEnvelope::ok(pick(&data).clone()))
    }

    async fn apply_checkout(&self, submission: &CheckoutSubmission) -> ApiEnvelope<CheckoutRecord> {
        if let Some(message) = &self.checkout_rejection {
            return ApiEnvelope::err(message.clone());
        }

        let mut submitted = self.submitted.write().await;
        let mut data = self.data.write().await;

        if let Some(id) = submitted.get(&submission.request_id) {
            debug!(request_id = %submission.request_id, "Duplicate checkout submit");
            if let Some(existing) = data.checkouts.iter().find(|c| &c.id == id) {
                return ApiEnvelope::ok(existing.clone());
            }
        }

        let id = self.next_id("chk");
        let record = submission.clone().into_record(id.clone());
        submitted.insert(submission.request_id, id);
        data.checkouts.push(record.clone());
        ApiEnvelope::ok(record)
    }

    async fn apply_decrement(&self, decrement: &StockDecrement) -> ApiEnvelope<i64> {
        if self.failing_products.contains(&decrement.product_id) {
            return ApiEnvelope::err("Gagal mengurangi stok");
        }

        let current = {
            let data = self.data.read().await;
            match data.products.iter().find(|p| p.id == decrement.product_id) {
                Some(p) => p.stock,
                None => return ApiEnvelope::err("Produk tidak ditemukan"),
            }
        };

        if current < decrement.quantity {
            return ApiEnvelope::err("Stok tidak cukup");
        }

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let remaining = current - decrement.quantity;
        let mut data = self.data.write().await;
        match data.products.iter_mut().find(|p| p.id == decrement.product_id) {
            Some(p) => {
                p.stock = remaining;
                ApiEnvelope::ok(remaining)
            }
            None => ApiEnvelope::err("Produk tidak ditemukan"),
        }
    }

    async fn apply_stock_out(&self, stock_out: &RawMaterialStockOut) -> ApiEnvelope<i64> {
        let mut data = self.data.write().await;
        let Some(material) = data
            .raw_materials
            .iter_mut()
            .find(|m| m.name == stock_out.name)
        else {
            return ApiEnvelope::err("Bahan baku tidak ditemukan");
        };

        if material.quantity < stock_out.quantity {
            return ApiEnvelope::err("Stok tidak cukup");
        }
        material.quantity -= stock_out.quantity;
        ApiEnvelope::ok(material.quantity)
    }

    async fn apply_visit(&self, visit: &CustomerVisit) -> ApiEnvelope<()> {
        let mut data = self.data.write().await;
        match data
            .customers
            .iter_mut()
            .find(|c| c.customer_number == visit.customer_number)
        {
            Some(customer) => {
                customer.total_spent = customer.total_spent + visit.total;
                if visit.customer_gender.is_some() {
                    customer.customer_gender = visit.customer_gender;
                }
            }
            None => {
                let id = self.next_id("cus");
                data.customers.push(Customer {
                    id,
                    customer_number: visit.customer_number.clone(),
                    customer_gender: visit.customer_gender,
                    total_spent: visit.total,
                });
            }
        }
        ApiEnvelope::ok(())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl CatalogSource for MemoryBackend {
    async fn list_products(&self) -> GatewayResult<Vec<Product>> {
        self.list(|d| &d.products).await
    }

    async fn list_raw_materials(&self) -> GatewayResult<Vec<RawMaterial>> {
        self.list(|d| &d.raw_materials).await
    }
}

impl CheckoutSink for MemoryBackend {
    async fn submit_checkout(&self, submission: &CheckoutSubmission) -> GatewayResult<CheckoutRecord> {
        self.reachable()?;
        settle(self.apply_checkout(submission).await)
    }
}

impl StockSink for MemoryBackend {
    async fn decrement_stock(&self, decrement: &StockDecrement) -> GatewayResult<i64> {
        self.reachable()?;
        settle(self.apply_decrement(decrement).await)
    }

    async fn take_raw_material(&self, stock_out: &RawMaterialStockOut) -> GatewayResult<i64> {
        self.reachable()?;
        settle(self.apply_stock_out(stock_out).await)
    }
}

impl CustomerSink for MemoryBackend {
    async fn record_visit(&self, visit: &CustomerVisit) -> GatewayResult<()> {
        self.reachable()?;
        settle(self.apply_visit(visit).await)
    }
}

impl LedgerSource for MemoryBackend {
    async fn list_checkouts(&self) -> GatewayResult<Vec<CheckoutRecord>> {
        self.list(|d| &d.checkouts).await
    }

    async fn list_expenses(&self) -> GatewayResult<Vec<ExpenseEntry>> {
        self.list(|d| &d.expenses).await
    }

    async fn list_attendance(&self) -> GatewayResult<Vec<AttendanceRecord>> {
        self.list(|d| &d.attendance).await
    }

    async fn list_customers(&self) -> GatewayResult<Vec<Customer>> {
        self.list(|d| &d.customers).await
    }
}

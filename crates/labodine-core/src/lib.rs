//! # labodine-core: Pure Back-Office Logic for Labodine
//!
//! Everything the Labodine pages compute, as pure functions over in-memory
//! records. No I/O happens here.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Labodine Back Office                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Pages (browser)                              │   │
//! │  │   Kasir ──► Checkout ──► Daftar Pemasukan ──► Laporan Keuangan  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              apps/backoffice (loaders + commands)               │   │
//! │  │     load_income_page, confirm_checkout, add_to_cart, ...       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ labodine-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │  money  │ │  cart   │ │ pricing │ │ listing │ │ reports │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO CLOCK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 REST backend (external)                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer rupiah and the `1.250.000` display format
//! - [`types`] - Backend records (Product, RawMaterial, CheckoutRecord, ...)
//! - [`cart`] - Cart mutation
//! - [`pricing`] - Subtotal, discount, total, change, payment validation
//! - [`checkout`] - Submission payloads built from a priced cart
//! - [`listing`] - Filter / sort / paginate for every list page
//! - [`reports`] - Dashboard, financial report, attendance recap
//! - [`envelope`] - Typed backend result envelope
//! - [`session`] - Signed-in user context
//! - [`validation`] - Form checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use labodine_core::cart::Cart;
//! use labodine_core::pricing::price_checkout;
//! use labodine_core::types::{DiscountPercent, PaymentMethod, Product};
//! use labodine_core::Money;
//!
//! let product = Product {
//!     id: "p-1".into(),
//!     code: "KLP-01".into(),
//!     name: "Klappertart".into(),
//!     description: String::new(),
//!     category: "Frozen".into(),
//!     unit_price: Money::from_rupiah(50_000),
//!     cost_price: Money::from_rupiah(30_000),
//!     stock: 10,
//!     image: None,
//!     created_at: None,
//! };
//!
//! let mut cart = Cart::new();
//! cart.add_or_increment(&product, 2).unwrap();
//!
//! let discount = DiscountPercent::new(10).unwrap();
//! let summary = price_checkout(&cart, discount, Some(PaymentMethod::Cash), "100.000").unwrap();
//!
//! assert_eq!(summary.total.rupiah(), 90_000);
//! assert_eq!(summary.change_due, Some(Money::from_rupiah(10_000)));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod envelope;
pub mod error;
pub mod listing;
pub mod money;
pub mod pricing;
pub mod reports;
pub mod session;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLineItem};
pub use envelope::ApiEnvelope;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use session::{Role, Session, View};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Products and raw materials below this stock raise a low-stock notice.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Raw materials at or below this quantity are "rendah" on the stock filter.
pub const RAW_MATERIAL_LOW_LEVEL: i64 = 5;

/// Indonesian mobile numbers top out at 13 digits.
pub const MAX_CUSTOMER_NUMBER_LEN: usize = 13;

/// Rows in the dashboard leaderboards and "recently added".
pub const DASHBOARD_TOP_N: usize = 5;

/// Entries previewed per side on the financial report.
pub const REPORT_PREVIEW_LEN: usize = 5;

pub const PRODUCT_PAGE_SIZE: usize = 8;
pub const RAW_MATERIAL_PAGE_SIZE: usize = 8;

/// Income and expense lists.
pub const LEDGER_PAGE_SIZE: usize = 15;

//! # Back-Office Commands
//!
//! Everything a page can ask for.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── cart.rs      ◄─── Cart editing and the payment form
//! ├── checkout.rs  ◄─── confirm_checkout (submit, stock, customer, receipt)
//! ├── stock.rs     ◄─── Raw-material stock-out
//! └── views.rs     ◄─── Page loaders (lists, dashboard, reports)
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  load_income_page(                                                      │
//! │      ledger: &impl LedgerSource,  ◄── backend (HTTP or MemoryBackend)   │
//! │      config: &ConfigState,        ◄── page sizes, thresholds            │
//! │      session: &Session,           ◄── role check                        │
//! │      query: IncomeQuery,          ◄── page filters                      │
//! │  ) -> Result<IncomePageView, ApiError>                                  │
//! │         │                                                               │
//! │         ├── session.require(View::Income)?                              │
//! │         ├── ledger.list_checkouts().await?                              │
//! │         └── labodine_core::listing (pure)                               │
//! │                                                                         │
//! │  Every failure leaves as an ApiError { code, message }.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cart;
pub mod checkout;
pub mod stock;
pub mod views;

//! # State Module
//!
//! Separate state types instead of one `AppState`; each command takes only
//! the state it needs.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌─────────────┐ │
//! │  │  CartState   │  │ SessionState │  │ ConfigState  │  │ StockLocks  │ │
//! │  │              │  │              │  │              │  │             │ │
//! │  │  Arc<Mutex<  │  │  RwLock<     │  │  store       │  │  product id │ │
//! │  │  Checkout-   │  │   Option<    │  │  backend     │  │   → async   │ │
//! │  │   Draft>>    │  │   Session>>  │  │  pages/stock │  │     Mutex   │ │
//! │  └──────────────┘  └──────────────┘  └──────────────┘  └─────────────┘ │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • CartState: exclusive access, never held across .await               │
//! │  • SessionState: many readers, one writer on sign-in/out               │
//! │  • ConfigState: read-only after startup                                │
//! │  • StockLocks: held across the backend decrement call                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod config;
mod session;
mod stock;

pub use cart::{CartState, CartView, CheckoutDraft, SubmitGuard};
pub use config::{BackendSettings, ConfigState, PageSettings, StockSettings, StoreSettings};
pub use session::SessionState;
pub use stock::{StockLockGuard, StockLocks};

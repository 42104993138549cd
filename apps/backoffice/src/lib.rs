//! # Labodine Back-Office Library
//!
//! Orchestration around `labodine-core`: state, backend gateways, page
//! loaders and the checkout flow.
//!
//! ## Module Organization
//! ```text
//! labodine_backoffice/
//! ├── lib.rs          ◄─── You are here (exports, tracing setup)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── cart.rs     ◄─── Checkout draft + submit guard
//! │   ├── config.rs   ◄─── labodine.toml + LABODINE_* overrides
//! │   ├── session.rs  ◄─── Signed-in user
//! │   └── stock.rs    ◄─── Per-product stock locks
//! ├── gateway/
//! │   ├── mod.rs      ◄─── Backend traits, envelope handling
//! │   └── memory.rs   ◄─── In-memory backend (tests, CLI snapshots)
//! ├── commands/
//! │   ├── cart.rs     ◄─── Cart editing
//! │   ├── checkout.rs ◄─── confirm_checkout
//! │   ├── stock.rs    ◄─── Raw-material stock-out
//! │   └── views.rs    ◄─── Page loaders
//! ├── receipt.rs      ◄─── Receipt model + text renderer
//! └── error.rs        ◄─── ApiError and friends
//! ```

pub mod commands;
pub mod error;
pub mod gateway;
pub mod receipt;
pub mod state;

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=labodine=trace` - Show trace for labodine crates only
/// - Default: INFO, DEBUG for labodine crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,labodine=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

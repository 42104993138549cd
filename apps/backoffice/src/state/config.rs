//! # Configuration State
//!
//! Back-office settings, loaded once at startup.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     LABODINE_STORE_NAME=Labodine                                       │
//! │     LABODINE_BACKEND_URL=https://api.labodine.id                       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/labodine/labodine.toml (Linux)                           │
//! │     ~/Library/Application Support/id.labodine.backoffice/ (macOS)      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # labodine.toml
//! [store]
//! name = "Labodine"
//! cashier_fallback = "Kasir"
//! currency_symbol = "Rp"
//! utc_offset_hours = 7
//!
//! [backend]
//! base_url = "http://localhost:5000"
//!
//! [pages]
//! product_page_size = 8
//! raw_material_page_size = 8
//! ledger_page_size = 15
//! report_preview_len = 5
//!
//! [stock]
//! low_stock_threshold = 10
//! raw_material_low_level = 5
//! ```
//!
//! Read-only after startup, so no lock is needed.

use std::path::PathBuf;

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use labodine_core::reports::DashboardOptions;
use labodine_core::session::DEFAULT_CASHIER_NAME;

use crate::error::{ConfigError, ConfigResult};

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Printed at the top of receipts.
    #[serde(default = "default_store_name")]
    pub name: String,

    /// Cashier name when nobody is signed in.
    #[serde(default = "default_cashier_fallback")]
    pub cashier_fallback: String,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Store timezone for receipt timestamps. Jakarta (WIB) is +7.
    #[serde(default = "default_utc_offset")]
    pub utc_offset_hours: i32,
}

fn default_store_name() -> String {
    "Labodine".to_string()
}

fn default_cashier_fallback() -> String {
    DEFAULT_CASHIER_NAME.to_string()
}

fn default_currency_symbol() -> String {
    "Rp".to_string()
}

fn default_utc_offset() -> i32 {
    7
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: default_store_name(),
            cashier_fallback: default_cashier_fallback(),
            currency_symbol: default_currency_symbol(),
            utc_offset_hours: default_utc_offset(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

impl Default for BackendSettings {
    fn default() -> Self {
        BackendSettings {
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSettings {
    #[serde(default = "default_product_page_size")]
    pub product_page_size: usize,
    #[serde(default = "default_raw_material_page_size")]
    pub raw_material_page_size: usize,
    /// Income and expense lists.
    #[serde(default = "default_ledger_page_size")]
    pub ledger_page_size: usize,
    /// Rows previewed per side on the financial report.
    #[serde(default = "default_report_preview_len")]
    pub report_preview_len: usize,
}

fn default_product_page_size() -> usize {
    labodine_core::PRODUCT_PAGE_SIZE
}
fn default_raw_material_page_size() -> usize {
    labodine_core::RAW_MATERIAL_PAGE_SIZE
}
fn default_ledger_page_size() -> usize {
    labodine_core::LEDGER_PAGE_SIZE
}
fn default_report_preview_len() -> usize {
    labodine_core::REPORT_PREVIEW_LEN
}

impl Default for PageSettings {
    fn default() -> Self {
        PageSettings {
            product_page_size: default_product_page_size(),
            raw_material_page_size: default_raw_material_page_size(),
            ledger_page_size: default_ledger_page_size(),
            report_preview_len: default_report_preview_len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSettings {
    /// Below this, products and raw materials raise a dashboard notice.
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i64,
    /// At or below this, a raw material is "rendah".
    #[serde(default = "default_raw_material_low_level")]
    pub raw_material_low_level: i64,
    /// Rows in the dashboard leaderboard.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_low_stock_threshold() -> i64 {
    labodine_core::LOW_STOCK_THRESHOLD
}
fn default_raw_material_low_level() -> i64 {
    labodine_core::RAW_MATERIAL_LOW_LEVEL
}
fn default_top_n() -> usize {
    labodine_core::DASHBOARD_TOP_N
}

impl Default for StockSettings {
    fn default() -> Self {
        StockSettings {
            low_stock_threshold: default_low_stock_threshold(),
            raw_material_low_level: default_raw_material_low_level(),
            top_n: default_top_n(),
        }
    }
}

// =============================================================================
// Config State
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigState {
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub backend: BackendSettings,
    #[serde(default)]
    pub pages: PageSettings,
    #[serde(default)]
    pub stock: StockSettings,
}

impl ConfigState {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (labodine.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = Self::from_toml(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.normalize();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        let pages = &self.pages;
        for (field, size) in [
            ("product_page_size", pages.product_page_size),
            ("raw_material_page_size", pages.raw_material_page_size),
            ("ledger_page_size", pages.ledger_page_size),
        ] {
            if size == 0 {
                return Err(ConfigError::Invalid(format!(
                    "{} must be greater than 0",
                    field
                )));
            }
        }

        if !(-12..=14).contains(&self.store.utc_offset_hours) {
            return Err(ConfigError::Invalid(format!(
                "utc_offset_hours must be between -12 and 14, got {}",
                self.store.utc_offset_hours
            )));
        }

        if self.stock.low_stock_threshold < 0 || self.stock.raw_material_low_level < 0 {
            return Err(ConfigError::Invalid(
                "stock thresholds cannot be negative".into(),
            ));
        }

        let url = Url::parse(&self.backend.base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", self.backend.base_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(format!(
                "Backend URL must start with http:// or https://, got: {}",
                self.backend.base_url
            )));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `LABODINE_*` overrides from `lookup`. Unparseable numbers
    /// are ignored with a warning.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("LABODINE_STORE_NAME") {
            self.store.name = name;
        }

        if let Some(name) = lookup("LABODINE_CASHIER_NAME") {
            self.store.cashier_fallback = name;
        }

        if let Some(url) = lookup("LABODINE_BACKEND_URL") {
            debug!(url = %url, "Overriding backend URL from environment");
            self.backend.base_url = url;
        }

        override_number(&lookup, "LABODINE_UTC_OFFSET", &mut self.store.utc_offset_hours);
        override_number(
            &lookup,
            "LABODINE_PRODUCT_PAGE_SIZE",
            &mut self.pages.product_page_size,
        );
        override_number(
            &lookup,
            "LABODINE_RAW_MATERIAL_PAGE_SIZE",
            &mut self.pages.raw_material_page_size,
        );
        override_number(&lookup, "LABODINE_LEDGER_PAGE_SIZE", &mut self.pages.ledger_page_size);
        override_number(
            &lookup,
            "LABODINE_LOW_STOCK_THRESHOLD",
            &mut self.stock.low_stock_threshold,
        );
    }

    fn normalize(&mut self) {
        let trimmed = self.backend.base_url.trim().trim_end_matches('/');
        self.backend.base_url = trimmed.to_string();
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("id", "labodine", "backoffice")
            .map(|dirs| dirs.config_dir().join("labodine.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Store timezone. Out-of-range offsets fall back to UTC.
    pub fn utc_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.store.utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix())
    }

    pub fn dashboard_options(&self) -> DashboardOptions {
        DashboardOptions {
            low_stock_threshold: self.stock.low_stock_threshold,
            top_n: self.stock.top_n,
        }
    }

    /// `base_url` joined with an API path.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.backend.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

fn override_number<F, T>(lookup: &F, key: &str, target: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    if let Some(raw) = lookup(key) {
        match raw.trim().parse() {
            Ok(value) => *target = value,
            Err(_) => warn!(key, value = %raw, "Ignoring unparseable override"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = ConfigState::default();
        assert_eq!(config.pages.ledger_page_size, 15);
        assert_eq!(config.store.cashier_fallback, "Kasir");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ConfigState::from_toml(
            r#"
            [store]
            name = "Labodine Bandung"

            [pages]
            ledger_page_size = 20
            "#,
        )
        .unwrap();
        assert_eq!(config.store.name, "Labodine Bandung");
        assert_eq!(config.store.currency_symbol, "Rp");
        assert_eq!(config.pages.ledger_page_size, 20);
        assert_eq!(config.pages.product_page_size, 8);
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let mut config = ConfigState::default();
        config.pages.product_page_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_backend_url_validation() {
        let mut config = ConfigState::default();
        config.backend.base_url = "ftp://files".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));

        config.backend.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("LABODINE_STORE_NAME", "Labodine Jogja"),
            ("LABODINE_BACKEND_URL", "https://api.labodine.id/"),
            ("LABODINE_LEDGER_PAGE_SIZE", "25"),
            ("LABODINE_UTC_OFFSET", "eight"),
        ]);
        let mut config = ConfigState::default();
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));
        config.normalize();

        assert_eq!(config.store.name, "Labodine Jogja");
        assert_eq!(config.backend.base_url, "https://api.labodine.id");
        assert_eq!(config.pages.ledger_page_size, 25);
        // unparseable value left the default in place
        assert_eq!(config.store.utc_offset_hours, 7);
        assert_eq!(
            config.endpoint("/api/food/list"),
            "https://api.labodine.id/api/food/list"
        );
    }

    #[test]
    fn test_utc_offset() {
        let config = ConfigState::default();
        assert_eq!(config.utc_offset().local_minus_utc(), 7 * 3600);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = ConfigState::load(Some(PathBuf::from("/nonexistent/labodine.toml"))).unwrap();
        assert_eq!(config.store.name, "Labodine");
    }

    #[test]
    fn test_toml_serialization() {
        let toml_str = toml::to_string_pretty(&ConfigState::default()).unwrap();
        assert!(toml_str.contains("[store]"));
        assert!(toml_str.contains("[pages]"));
    }
}

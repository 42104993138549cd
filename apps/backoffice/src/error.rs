//! # Error Types
//!
//! Errors raised by the orchestration layer and the unified [`ApiError`]
//! handed back to the pages.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Back Office                        │
//! │                                                                         │
//! │  labodine-core            gateway                 config                │
//! │  ─────────────            ───────                 ──────                │
//! │  ValidationError          GatewayError            ConfigError           │
//! │        │                    • Rejected{message}     • Io                │
//! │        ▼                    • Unavailable           • Parse             │
//! │  CoreError                  • Decode                • Invalid           │
//! │        │                    • NotFound                                  │
//! │        │                        │                       │               │
//! │        └────────────────────────┼───────────────────────┘               │
//! │                                 ▼                                       │
//! │                  ApiError { code, message }                             │
//! │                                 │                                       │
//! │                                 ▼                                       │
//! │   { "code": "PAYMENT_ERROR", "message": "Uang tidak mencukupi ..." }    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here is fatal and nothing is retried: the page shows the
//! message and the user decides.

use serde::Serialize;
use thiserror::Error;

use labodine_core::envelope::EnvelopeError;
use labodine_core::{CoreError, ValidationError};

// =============================================================================
// Gateway Errors
// =============================================================================

/// Failures talking to the REST backend.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The backend answered `{ ok: false, message }`.
    #[error("{message}")]
    Rejected { message: String },

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Unreadable backend response: {0}")]
    Decode(#[from] EnvelopeError),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
}

pub type GatewayResult<T> = Result<T, GatewayError>;

// =============================================================================
// Config Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// API Error
// =============================================================================

/// Error returned from loaders and commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: p-42"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Form input or cart rule violated
    ValidationError,

    /// Missing payment method or not enough cash
    PaymentError,

    /// Record not found
    NotFound,

    /// Role may not open the page
    Unauthorized,

    /// Backend rejected or could not be reached
    GatewayError,

    /// Anything else
    InternalError,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::InternalError, message)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MissingPaymentMethod | CoreError::InsufficientPayment { .. } => {
                ApiError::new(ErrorCode::PaymentError, err.to_string())
            }
            CoreError::Forbidden { .. } => ApiError::new(ErrorCode::Unauthorized, err.to_string()),
            CoreError::LineNotFound { index } => {
                ApiError::not_found("Cart line", &index.to_string())
            }
            CoreError::InvalidDiscount(_)
            | CoreError::EmptyCart
            | CoreError::InsufficientStock { .. }
            | CoreError::Validation(_) => ApiError::validation(err.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound { entity, id } => ApiError::not_found(entity, &id),
            GatewayError::Rejected { message } => ApiError::new(ErrorCode::GatewayError, message),
            GatewayError::Unavailable(e) => {
                tracing::error!("Backend unavailable: {}", e);
                ApiError::new(ErrorCode::GatewayError, "Server tidak dapat dihubungi")
            }
            GatewayError::Decode(e) => {
                tracing::error!("Backend response decode failed: {}", e);
                ApiError::new(ErrorCode::GatewayError, "Respons server tidak valid")
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::internal(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use labodine_core::{Money, Role, View};

    #[test]
    fn test_payment_errors_map_to_payment_code() {
        let err = ApiError::from(CoreError::InsufficientPayment {
            total: Money::from_rupiah(90_000),
            paid: Money::from_rupiah(50_000),
        });
        assert_eq!(err.code, ErrorCode::PaymentError);

        let err = ApiError::from(CoreError::MissingPaymentMethod);
        assert_eq!(err.code, ErrorCode::PaymentError);
    }

    #[test]
    fn test_forbidden_maps_to_unauthorized() {
        let err = ApiError::from(CoreError::Forbidden {
            role: Role::Pegawai,
            view: View::PendingUsers,
        });
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[test]
    fn test_rejection_keeps_backend_message() {
        let err = ApiError::from(GatewayError::Rejected {
            message: "Stok tidak cukup".to_string(),
        });
        assert_eq!(err.code, ErrorCode::GatewayError);
        assert_eq!(err.message, "Stok tidak cukup");
    }

    #[test]
    fn test_serialized_shape() {
        let err = ApiError::not_found("Product", "p-42");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Product not found: p-42");
        assert_eq!(err.to_string(), "[NotFound] Product not found: p-42");
    }
}

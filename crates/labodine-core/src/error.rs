//! # Error Types
//!
//! Domain-specific error types for labodine-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  labodine-core errors (this file)                                      │
//! │  ├── CoreError        - Checkout / cart rule violations                │
//! │  └── ValidationError  - Form input failures                            │
//! │                                                                         │
//! │  backoffice errors (app crate)                                         │
//! │  ├── GatewayError     - Collaborator failures (REST side)              │
//! │  └── ApiError         - What the page sees (code + message)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Page                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant here is a local, recoverable condition: the cashier fixes
//! the input and presses the button again.

use thiserror::Error;

use crate::money::Money;
use crate::session::{Role, View};

// =============================================================================
// Core Error
// =============================================================================

/// Checkout and cart rule violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Confirmation attempted without choosing a payment method.
    #[error("Payment method is required")]
    MissingPaymentMethod,

    /// Cash tendered is less than the total due.
    ///
    /// ## User Workflow
    /// ```text
    /// Total: Rp 90.000
    /// Tendered (tunai): Rp 50.000
    ///      │
    ///      ▼
    /// InsufficientPayment { total: 90000, paid: 50000 }
    ///      │
    ///      ▼
    /// UI shows: "Uang tidak mencukupi"
    /// ```
    #[error("Insufficient payment: total {total}, paid {paid}")]
    InsufficientPayment { total: Money, paid: Money },

    /// Discount percent outside [0, 100].
    #[error("Discount must be between 0 and 100 percent, got {0}")]
    InvalidDiscount(i64),

    /// Confirmation attempted with an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Requested quantity exceeds the stock the catalog reported.
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// A cart line index that does not exist.
    #[error("No cart line at index {index}")]
    LineNotFound { index: usize },

    /// The signed-in role may not open this view.
    #[error("Role {role:?} cannot access {view:?}")]
    Forbidden { role: Role, view: View },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors raised by form handlers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., unknown payment tag, bad date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product: "Klappertart Mini".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Klappertart Mini: available 3, requested 5"
        );

        let err = CoreError::InsufficientPayment {
            total: Money::from_rupiah(90_000),
            paid: Money::from_rupiah(50_000),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient payment: total Rp 90.000, paid Rp 50.000"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}

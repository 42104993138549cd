//! # Validation
//!
//! Form-level checks run before anything is sent to the backend.
//!
//! ## Usage
//! ```rust
//! use labodine_core::validation::{normalize_customer_number, validate_stock_out};
//!
//! assert_eq!(normalize_customer_number("0812-3456-7890"), "081234567890");
//! assert!(validate_stock_out(3, 10).is_ok());
//! assert!(validate_stock_out(11, 10).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{ExpenseEntry, Product, RawMaterial};
use crate::MAX_CUSTOMER_NUMBER_LEN;

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Categories offered on the product form.
pub const PRODUCT_CATEGORIES: [&str; 5] = [
    "Hampers",
    "Frozen",
    "Paket Mini Frozen",
    "Paket Matang",
    "Hampers Neela Klappertart",
];

const MAX_NAME_LEN: usize = 200;
const MAX_CODE_LEN: usize = 50;

// =============================================================================
// String Validators
// =============================================================================

fn require(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    require("namaProduk", name, MAX_NAME_LEN)
}

/// Product code: letters, digits, `-` and `_`.
pub fn validate_product_code(code: &str) -> ValidationResult<()> {
    require("kodeProduk", code, MAX_CODE_LEN)?;

    if !code
        .trim()
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "kodeProduk".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

pub fn validate_category(category: &str) -> ValidationResult<()> {
    if PRODUCT_CATEGORIES.contains(&category) {
        return Ok(());
    }
    Err(ValidationError::NotAllowed {
        field: "kategori".to_string(),
        allowed: PRODUCT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
    })
}

// =============================================================================
// Customer Number
// =============================================================================

/// Keeps digits only and cuts to the maximum phone length, the way the
/// checkout field filters keystrokes.
pub fn normalize_customer_number(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_digit)
        .take(MAX_CUSTOMER_NUMBER_LEN)
        .collect()
}

/// An empty number is allowed; walk-in customers leave it blank.
pub fn validate_customer_number(number: &str) -> ValidationResult<()> {
    if !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "customerNumber".to_string(),
            reason: "must contain digits only".to_string(),
        });
    }
    if number.len() > MAX_CUSTOMER_NUMBER_LEN {
        return Err(ValidationError::TooLong {
            field: "customerNumber".to_string(),
            max: MAX_CUSTOMER_NUMBER_LEN,
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "jumlah".to_string(),
        });
    }
    Ok(())
}

/// A stock-out may not take more than what is on hand.
pub fn validate_stock_out(requested: i64, available: i64) -> ValidationResult<()> {
    validate_quantity(requested)?;
    if requested > available {
        return Err(ValidationError::OutOfRange {
            field: "jumlah".to_string(),
            min: 1,
            max: available,
        });
    }
    Ok(())
}

pub fn validate_non_negative(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_product_code(&product.code)?;
    validate_product_name(&product.name)?;
    validate_category(&product.category)?;
    validate_non_negative("harga", product.unit_price)?;
    validate_non_negative("hpp", product.cost_price)?;
    if product.stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "jumlah".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

pub fn validate_raw_material(material: &RawMaterial) -> ValidationResult<()> {
    require("namaBarang", &material.name, MAX_NAME_LEN)?;
    require("satuan", &material.unit, MAX_CODE_LEN)?;
    validate_quantity(material.quantity)
}

pub fn validate_expense(entry: &ExpenseEntry) -> ValidationResult<()> {
    require("namaPengeluaran", &entry.name, MAX_NAME_LEN)?;
    if !entry.amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "jumlah".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

//! Money calculation utilities using rust_decimal for precision
//!
//! All monetary calculations are done using `Decimal` internally, then
//! converted to `f64` for storage/serialization.

use rust_decimal::prelude::*;
use shared::error::AppError;

/// Rounding strategy for monetary values (2 decimal places, half-up)
pub const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed price per item (€1,000,000)
pub const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per line
pub const MAX_QUANTITY: i32 = 9999;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Compare two monetary values within [`MONEY_TOLERANCE`]
#[inline]
pub fn money_eq(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() <= MONEY_TOLERANCE
}

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
pub fn require_finite(value: f64, field_name: &str) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::validation(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Validate a monetary amount: finite, non-negative, within bounds
pub fn validate_price(value: f64, field_name: &str) -> Result<(), AppError> {
    require_finite(value, field_name)?;
    if value < 0.0 {
        return Err(AppError::validation(format!(
            "{} must be non-negative, got {}",
            field_name, value
        )));
    }
    if value > MAX_PRICE {
        return Err(AppError::validation(format!(
            "{} exceeds maximum allowed ({}), got {}",
            field_name, MAX_PRICE, value
        )));
    }
    Ok(())
}

/// Validate a line quantity: positive and within bounds
pub fn validate_quantity(quantity: i32) -> Result<(), AppError> {
    if quantity <= 0 {
        return Err(AppError::validation(format!(
            "quantity must be positive, got {}",
            quantity
        )));
    }
    if quantity > MAX_QUANTITY {
        return Err(AppError::validation(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, quantity
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_two_places() {
        assert_eq!(to_f64(to_decimal(10.005)), 10.01);
        assert_eq!(to_f64(to_decimal(10.004)), 10.0);
        assert_eq!(to_f64(to_decimal(0.1) + to_decimal(0.2)), 0.3);
    }

    #[test]
    fn test_money_eq_tolerance() {
        assert!(money_eq(to_decimal(10.00), to_decimal(10.01)));
        assert!(!money_eq(to_decimal(10.00), to_decimal(10.02)));
    }

    #[test]
    fn test_require_finite() {
        assert!(require_finite(1.0, "price").is_ok());
        assert!(require_finite(f64::NAN, "price").is_err());
        assert!(require_finite(f64::INFINITY, "price").is_err());
    }

    #[test]
    fn test_validate_price_bounds() {
        assert!(validate_price(0.0, "price").is_ok());
        assert!(validate_price(-1.0, "price").is_err());
        assert!(validate_price(MAX_PRICE + 1.0, "price").is_err());
    }

    #[test]
    fn test_validate_quantity_bounds() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(MAX_QUANTITY + 1).is_err());
    }
}

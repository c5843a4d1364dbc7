//! Money arithmetic utilities using rust_decimal for precision
//!
//! All monetary calculations run on `Decimal` internally and convert back to
//! `f64` only at the storage/serialization boundary, rounded half-up to cents.

use crate::db::models::OrderLine;
use crate::utils::AppError;
use rust_decimal::prelude::*;

/// Rounding precision for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed price per line
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per line
const MAX_QUANTITY: i64 = 9999;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded half-up to cents
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Round a Decimal amount to cents, half-up
#[inline]
pub fn round_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Round a stored f64 amount to cents, half-up
#[inline]
pub fn round2(value: f64) -> f64 {
    to_f64(to_decimal(value))
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

/// Validate an order line before pricing
pub fn validate_line(line: &OrderLine) -> Result<(), AppError> {
    // Price must be finite and non-negative
    require_finite(line.price, "price")?;
    if line.price < 0.0 {
        return Err(AppError::validation(format!(
            "price must be non-negative, got {}",
            line.price
        )));
    }
    if line.price > MAX_PRICE {
        return Err(AppError::validation(format!(
            "price exceeds maximum allowed ({}), got {}",
            MAX_PRICE, line.price
        )));
    }

    // Quantity must be positive and within bounds
    if line.quantity < 1 {
        return Err(AppError::validation(format!(
            "quantity must be positive, got {}",
            line.quantity
        )));
    }
    if line.quantity > MAX_QUANTITY {
        return Err(AppError::validation(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, line.quantity
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(price: f64, quantity: i64) -> OrderLine {
        OrderLine {
            menu_item: "menu_item:x".parse().unwrap(),
            name: "item".into(),
            quantity,
            price,
            special_instructions: None,
            is_complimentary: false,
        }
    }

    #[test]
    fn decimal_addition_avoids_float_drift() {
        // Classic floating point problem: 0.1 + 0.2 != 0.3
        let sum_f64 = 0.1_f64 + 0.2_f64;
        assert_ne!(sum_f64, 0.3);

        let sum_dec = to_decimal(0.1) + to_decimal(0.2);
        assert_eq!(to_f64(sum_dec), 0.3);
    }

    #[test]
    fn rounding_is_half_up_on_exact_midpoints() {
        // (0.145 * 100).round() / 100 on binary f64 lands on 0.14
        assert_eq!(round2(0.145), 0.15);
        assert_eq!(round2(0.144), 0.14);
        assert_eq!(round2(2.675), 2.68);
    }

    #[test]
    fn accumulation_of_cents_is_exact() {
        let mut total = Decimal::ZERO;
        for _ in 0..1000 {
            total += to_decimal(0.01);
        }
        assert_eq!(to_f64(total), 10.0);
    }

    #[test]
    fn nan_price_is_rejected() {
        assert!(validate_line(&line(f64::NAN, 1)).is_err());
    }

    #[test]
    fn infinite_price_is_rejected() {
        assert!(validate_line(&line(f64::INFINITY, 1)).is_err());
        assert!(validate_line(&line(f64::NEG_INFINITY, 1)).is_err());
    }

    #[test]
    fn negative_price_is_rejected() {
        assert!(validate_line(&line(-1.0, 1)).is_err());
    }

    #[test]
    fn price_above_maximum_is_rejected() {
        assert!(validate_line(&line(MAX_PRICE + 1.0, 1)).is_err());
        assert!(validate_line(&line(MAX_PRICE, 1)).is_ok());
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        assert!(validate_line(&line(10.0, 0)).is_err());
        assert!(validate_line(&line(10.0, -2)).is_err());
        assert!(validate_line(&line(10.0, MAX_QUANTITY + 1)).is_err());
        assert!(validate_line(&line(10.0, 1)).is_ok());
    }
}

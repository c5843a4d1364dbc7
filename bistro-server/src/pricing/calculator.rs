//! Order Price Calculator
//!
//! Calculate the items subtotal and apply the tier discount.
//!
//! # Calculation Steps
//! 1. Validate every line (finite non-negative price, positive quantity)
//! 2. Sum quantity × unit price over non-complimentary lines
//! 3. Apply the tier discount percentage to the subtotal
//! 4. Round half-up to cents at the f64 boundary
//!
//! The delivery fee is NOT part of this calculation; it is computed by the
//! delivery estimator and never discounted by tier percentage.

use rust_decimal::prelude::*;

use crate::core::config::Policy;
use crate::db::models::{OrderLine, VipTier};
use crate::pricing::money;
use crate::utils::AppResult;

/// Result of order price calculation
#[derive(Debug, Clone, PartialEq)]
pub struct PricingOutcome {
    /// Sum of all chargeable line totals
    pub subtotal: f64,
    /// Tier discount percentage applied (0 for non-VIP)
    pub discount_percent: f64,
    /// Discount amount in currency units
    pub discount_amount: f64,
    /// Subtotal after discount, rounded to cents
    pub total: f64,
}

/// Discount percentage granted by a tier
pub fn tier_discount_percent(tier: Option<VipTier>, policy: &Policy) -> f64 {
    match tier {
        Some(VipTier::Silver) => policy.silver_discount_percent,
        Some(VipTier::Gold) => policy.gold_discount_percent,
        Some(VipTier::Platinum) => policy.platinum_discount_percent,
        None => 0.0,
    }
}

/// Calculate the order total for a set of lines and an effective tier.
///
/// Every line is validated before any arithmetic runs; a NaN, negative or
/// out-of-range price fails the whole calculation. Complimentary lines are
/// priced at zero and never contribute to the subtotal.
pub fn calculate_order_price(
    lines: &[OrderLine],
    tier: Option<VipTier>,
    policy: &Policy,
) -> AppResult<PricingOutcome> {
    for line in lines {
        money::validate_line(line)?;
    }

    let subtotal: Decimal = lines
        .iter()
        .filter(|l| !l.is_complimentary)
        .map(|l| money::to_decimal(l.price) * Decimal::from(l.quantity))
        .sum();
    let subtotal = money::round_cents(subtotal);

    let discount_percent = tier_discount_percent(tier, policy);
    let discount_amount = money::round_cents(
        subtotal * money::to_decimal(discount_percent) / Decimal::ONE_HUNDRED,
    );
    let total = subtotal - discount_amount;

    Ok(PricingOutcome {
        subtotal: money::to_f64(subtotal),
        discount_percent,
        discount_amount: money::to_f64(discount_amount),
        total: money::to_f64(total),
    })
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
    fn subtotal_sums_quantity_times_price() {
        let lines = vec![line(12.0, 2), line(3.5, 1)];
        let outcome = calculate_order_price(&lines, None, &Policy::default()).unwrap();
        assert_eq!(outcome.subtotal, 27.5);
        assert_eq!(outcome.discount_percent, 0.0);
        assert_eq!(outcome.total, 27.5);
    }

    #[test]
    fn platinum_gets_ten_percent_off() {
        let lines = vec![line(25.0, 1)];
        let outcome =
            calculate_order_price(&lines, Some(VipTier::Platinum), &Policy::default()).unwrap();
        assert_eq!(outcome.discount_amount, 2.5);
        assert_eq!(outcome.total, 22.5);
    }

    #[test]
    fn gold_gets_five_percent_off() {
        let lines = vec![line(40.0, 1)];
        let outcome =
            calculate_order_price(&lines, Some(VipTier::Gold), &Policy::default()).unwrap();
        assert_eq!(outcome.discount_amount, 2.0);
        assert_eq!(outcome.total, 38.0);
    }

    #[test]
    fn silver_discount_is_zero_by_default() {
        let lines = vec![line(40.0, 1)];
        let outcome =
            calculate_order_price(&lines, Some(VipTier::Silver), &Policy::default()).unwrap();
        assert_eq!(outcome.total, 40.0);
    }

    #[test]
    fn complimentary_lines_are_free() {
        let mut free = line(0.0, 1);
        free.is_complimentary = true;
        let lines = vec![line(10.0, 1), free];
        let outcome =
            calculate_order_price(&lines, Some(VipTier::Platinum), &Policy::default()).unwrap();
        assert_eq!(outcome.subtotal, 10.0);
        assert_eq!(outcome.total, 9.0);
    }

    #[test]
    fn rounding_is_half_up_to_cents() {
        let lines = vec![line(0.335, 1)];
        let outcome = calculate_order_price(&lines, None, &Policy::default()).unwrap();
        assert_eq!(outcome.subtotal, 0.34);
    }

    #[test]
    fn half_cent_discount_rounds_away_from_zero() {
        // 10% of 1.45 lands exactly on the half-cent midpoint 0.145
        let lines = vec![line(1.45, 1)];
        let outcome =
            calculate_order_price(&lines, Some(VipTier::Platinum), &Policy::default()).unwrap();
        assert_eq!(outcome.discount_amount, 0.15);
        assert_eq!(outcome.total, 1.3);
    }

    #[test]
    fn nan_price_fails_the_calculation() {
        let lines = vec![line(f64::NAN, 1)];
        assert!(calculate_order_price(&lines, None, &Policy::default()).is_err());
    }

    #[test]
    fn negative_price_fails_the_calculation() {
        let lines = vec![line(-5.0, 1)];
        assert!(calculate_order_price(&lines, None, &Policy::default()).is_err());
    }

    #[test]
    fn zero_quantity_fails_the_calculation() {
        let lines = vec![line(10.0, 0)];
        assert!(calculate_order_price(&lines, None, &Policy::default()).is_err());
    }
}

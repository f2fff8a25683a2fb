//! Refund policy for cancelled orders

use crate::pricing::{to_decimal, to_f64};
use rust_decimal::Decimal;

/// Refund percentage by hours elapsed since the order was placed.
///
/// TODO: the policy note for the first band says 100% but the table has
/// always paid 50%; keep the table until product confirms which is right.
pub fn refund_percentage(hours_elapsed: f64) -> u32 {
    if hours_elapsed <= 1.0 {
        50
    } else if hours_elapsed <= 3.0 {
        50
    } else if hours_elapsed <= 6.0 {
        25
    } else {
        0
    }
}

/// Refund amount for an order total, rounded to cents
pub fn refund_amount(total: f64, created_at_ms: i64, now_ms: i64) -> f64 {
    let hours = (now_ms - created_at_ms).max(0) as f64 / 3_600_000.0;
    let percentage = refund_percentage(hours);
    to_f64(to_decimal(total) * Decimal::from(percentage) / Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR_MS: i64 = 3_600_000;

    #[test]
    fn test_refund_bands() {
        assert_eq!(refund_percentage(0.5), 50);
        assert_eq!(refund_percentage(2.0), 50);
        assert_eq!(refund_percentage(5.0), 25);
        assert_eq!(refund_percentage(7.0), 0);
    }

    #[test]
    fn test_refund_amount_rounding() {
        assert_eq!(refund_amount(100.0, 0, HOUR_MS / 2), 50.0);
        assert_eq!(refund_amount(99.99, 0, 5 * HOUR_MS), 25.0);
        assert_eq!(refund_amount(100.0, 0, 10 * HOUR_MS), 0.0);
        // Clock skew never produces a negative elapsed time
        assert_eq!(refund_amount(100.0, HOUR_MS, 0), 50.0);
    }
}

//! Cart aggregate totals
//!
//! Recomputes subtotal, delivery fee, tax, discount breakdown, and the
//! final total on every mutation. Flash-sale savings are already embedded
//! in each line's sale price, so they are reported as a breakdown row but
//! never subtracted from the total a second time.

use crate::db::models::Offer;
use crate::pricing::money::{to_decimal, to_f64};
use rust_decimal::prelude::*;
use shared::cart::{CartLine, CartSnapshot, DiscountLine};
use shared::offer::OfferType;
use std::collections::HashMap;

/// Delivery fee charged when the cart has no branch
pub const DEFAULT_DELIVERY_FEE: f64 = 5.00;

/// Flat tax applied to the subtotal
const TAX_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2); // 0.10

/// One line's charged subtotal: discounted unit price times quantity.
///
/// Returns None for a corrupt line (non-finite or negative money fields,
/// non-positive quantity); the caller excludes it and logs.
pub fn line_subtotal(line: &CartLine) -> Option<Decimal> {
    if line.is_free {
        return Some(Decimal::ZERO);
    }
    let unit = line.effective_unit_price();
    if !unit.is_finite() || unit < 0.0 || line.quantity <= 0 {
        return None;
    }
    Some(to_decimal(unit) * Decimal::from(line.quantity))
}

/// One line's undiscounted subtotal (same corrupt-line contract)
pub fn line_original_subtotal(line: &CartLine) -> Option<Decimal> {
    if line.is_free {
        return Some(Decimal::ZERO);
    }
    if !line.unit_price.is_finite() || line.unit_price < 0.0 || line.quantity <= 0 {
        return None;
    }
    Some(to_decimal(line.unit_price) * Decimal::from(line.quantity))
}

/// Sum of line subtotals, excluding corrupt lines fail-closed.
///
/// An excluded line is a recoverable defect, not a fatal error: the
/// estimated excluded amount is logged at warn for investigation.
pub fn cart_subtotal(cart: &CartSnapshot) -> Decimal {
    let mut subtotal = Decimal::ZERO;
    for line in &cart.lines {
        match line_subtotal(line) {
            Some(amount) => subtotal += amount,
            None => {
                tracing::warn!(
                    cart_id = %cart.cart_id,
                    line_id = %line.line_id,
                    unit_price = line.unit_price,
                    quantity = line.quantity,
                    "excluding corrupt line from totals"
                );
            }
        }
    }
    subtotal
}

/// Pre-discount total: subtotal + delivery fee + 10% tax on subtotal.
/// This is the value min_spend thresholds are checked against.
pub fn pre_discount_total(cart: &CartSnapshot, delivery_fee: f64) -> Decimal {
    let subtotal = cart_subtotal(cart);
    subtotal + to_decimal(delivery_fee) + subtotal * TAX_RATE
}

/// Recompute the snapshot's totals block in place.
///
/// `offer_records` maps applied offer ids to their current catalog rows;
/// an applied offer with no record contributes nothing.
pub fn recompute_totals(
    cart: &mut CartSnapshot,
    offer_records: &HashMap<String, Offer>,
    delivery_fee: f64,
    now_ms: i64,
) {
    let subtotal = cart_subtotal(cart);
    let fee = to_decimal(delivery_fee);
    let tax = subtotal * TAX_RATE;
    let base_total = subtotal + fee + tax;

    let mut discounts: Vec<DiscountLine> = Vec::new();
    let mut cart_level_discount = Decimal::ZERO;

    // Flash-sale savings: already reflected in the subtotal, reported
    // against the applied flash offer's code but never re-subtracted
    let mut flash_savings = Decimal::ZERO;
    for line in cart.lines.iter().filter(|l| !l.is_free) {
        if let (Some(original), Some(charged)) = (line_original_subtotal(line), line_subtotal(line))
            && original > charged
        {
            flash_savings += original - charged;
        }
    }
    if flash_savings > Decimal::ZERO
        && let Some(flash) = cart
            .offers
            .iter()
            .find(|o| o.offer_type == OfferType::FlashSale)
    {
        discounts.push(DiscountLine {
            code: flash.code.clone(),
            amount: to_f64(flash_savings),
        });
    }

    // Cart-level discounts from the other applied offers
    for applied in &cart.offers {
        if applied.offer_type == OfferType::FlashSale {
            continue;
        }
        let Some(offer) = offer_records.get(&applied.offer_id) else {
            continue;
        };
        if !offer.is_currently_active(now_ms) {
            continue;
        }
        if let Some(min_spend) = offer.min_spend
            && base_total < to_decimal(min_spend)
        {
            continue;
        }

        let amount = match offer.offer_type {
            OfferType::Flat => offer
                .discount_value
                .map(|v| to_decimal(v).min(base_total))
                .unwrap_or(Decimal::ZERO),
            OfferType::Percentage => offer
                .discount_value
                .map(|v| {
                    let potential = base_total * to_decimal(v) / Decimal::ONE_HUNDRED;
                    match offer.max_discount {
                        Some(cap) => potential.min(to_decimal(cap)),
                        None => potential,
                    }
                })
                .unwrap_or(Decimal::ZERO),
            // BOGO/FREE_ITEM grant lines, FREE_DELIVERY has no monetary row
            _ => Decimal::ZERO,
        };
        if amount > Decimal::ZERO {
            discounts.push(DiscountLine {
                code: offer.code.clone(),
                amount: to_f64(amount),
            });
            cart_level_discount += amount;
        }
    }

    cart.subtotal = to_f64(subtotal);
    cart.delivery_fee = to_f64(fee);
    cart.tax_amount = to_f64(tax);
    cart.discounts = discounts;
    cart.total = to_f64(base_total - cart_level_discount);
}

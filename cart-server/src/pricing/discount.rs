//! Discount resolution
//!
//! One pure function turns an original price plus a discount spec and an
//! optional cap into the discounted price; the flash-sale price path and
//! the customization-snapshot path both go through it.

use crate::db::models::Offer;
use crate::pricing::money::to_decimal;
use rust_decimal::prelude::*;
use shared::cart::LineKind;

/// A discount to apply: percentage of the price, or a flat amount
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscountSpec {
    pub value: Decimal,
    pub is_percentage: bool,
}

impl DiscountSpec {
    pub fn percentage(value: Decimal) -> Self {
        Self {
            value,
            is_percentage: true,
        }
    }

    pub fn flat(value: Decimal) -> Self {
        Self {
            value,
            is_percentage: false,
        }
    }
}

/// Cap on the discount, taken from the customization header's own
/// max_discount settings
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DiscountCap {
    #[default]
    None,
    /// max_discount expressed as a percentage of the price
    Percentage(Decimal),
    /// max_discount expressed as a flat amount
    Flat(Decimal),
}

/// Apply a discount spec to a price, honoring the cap.
///
/// - Percentage discounts are capped by a percentage cap (the effective
///   percentage is clamped); a flat cap does not bound them.
/// - Flat discounts are capped by either kind: a percentage cap bounds
///   them at that share of the price, a flat cap bounds them directly.
/// - The result never goes below zero.
pub fn resolve_discounted_price(original: Decimal, spec: DiscountSpec, cap: DiscountCap) -> Decimal {
    let amount = if spec.is_percentage {
        let mut pct = spec.value;
        if let DiscountCap::Percentage(max_pct) = cap {
            pct = pct.min(max_pct);
        }
        original * pct / Decimal::ONE_HUNDRED
    } else {
        let mut flat = spec.value;
        match cap {
            DiscountCap::Percentage(max_pct) => {
                flat = flat.min(original * max_pct / Decimal::ONE_HUNDRED);
            }
            DiscountCap::Flat(max_flat) => {
                flat = flat.min(max_flat);
            }
            DiscountCap::None => {}
        }
        flat
    };
    (original - amount).max(Decimal::ZERO)
}

/// Whether the active flash sale discounts the given catalog item.
///
/// With an explicit applicable set, the item must be listed and either
/// level must carry a discount value. With an empty set the sale is
/// store-wide but only covers items declaring their own discount.
pub fn flash_sale_covers(offer: &Offer, kind: &LineKind, has_own_discount: bool) -> bool {
    let (set, id) = match kind {
        LineKind::Product { product_id } => (&offer.applicable_products, product_id),
        LineKind::Deal { deal_id } => (&offer.applicable_deals, deal_id),
    };
    if set.is_empty() {
        has_own_discount
    } else {
        set.iter().any(|item| item == id) && (has_own_discount || offer.discount_value.is_some())
    }
}

/// Flash-sale price for an item the offer covers: the item-level discount
/// wins over the offer-level one, with the percentage flag taken from the
/// same level
pub fn item_flash_price(
    original: Decimal,
    own_discount: Option<f64>,
    own_is_percentage: bool,
    offer: &Offer,
) -> Decimal {
    let spec = match own_discount {
        Some(value) => DiscountSpec {
            value: to_decimal(value),
            is_percentage: own_is_percentage,
        },
        None => match offer.discount_value {
            Some(value) => DiscountSpec {
                value: to_decimal(value),
                is_percentage: offer.is_percentage,
            },
            None => return original,
        },
    };
    resolve_discounted_price(original, spec, DiscountCap::None)
}

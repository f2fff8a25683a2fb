//! Unit price resolution for cart lines
//!
//! Lines carry client-supplied price snapshots for their selections; the
//! resolver aggregates those into per-unit original and sale prices. It
//! never re-derives catalog prices, but it validates every money input.

use crate::db::models::Offer;
use crate::pricing::discount::{flash_sale_covers, item_flash_price};
use crate::pricing::money::{to_decimal, to_f64, validate_price};
use rust_decimal::prelude::*;
use shared::cart::{CustomizationSelection, ExpandableSelection, LineKind};
use shared::error::{AppError, AppResult};

/// Catalog context needed to price one line
#[derive(Debug, Clone, Default)]
pub struct PricingInputs<'a> {
    /// Product base price; unused for deal lines
    pub base_price: f64,
    /// Caller-supplied composed total; required for deal lines
    pub deal_total: Option<f64>,
    /// The single currently active flash-sale offer, if any
    pub flash_sale: Option<&'a Offer>,
    /// The item's own flash_sale_discount
    pub own_discount: Option<f64>,
    /// Whether the item's own discount is a percentage
    pub own_is_percentage: bool,
}

/// Resolved per-unit prices for a line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPrices {
    pub unit_price: f64,
    /// Set only when an active flash sale reduces the line
    pub unit_sale_price: Option<f64>,
}

/// Compute a line's original and sale unit prices.
///
/// - Free lines are always zero.
/// - Product lines sum their customization snapshots, falling back to the
///   product's base price when no customization carries a price; the sale
///   side is populated only while the product is covered by the active
///   flash sale. Expandable add-ons are added to both sides (add-ons are
///   never discounted).
/// - Deal lines use the caller-supplied composed total plus add-ons; deal
///   flash pricing is already embedded in that total.
pub fn resolve_unit_prices(
    kind: &LineKind,
    is_free: bool,
    customizations: &[CustomizationSelection],
    extras: &[ExpandableSelection],
    inputs: &PricingInputs<'_>,
) -> AppResult<ResolvedPrices> {
    if is_free {
        return Ok(ResolvedPrices {
            unit_price: 0.0,
            unit_sale_price: None,
        });
    }

    for selection in customizations {
        validate_price(selection.price, "customization price")?;
        validate_price(selection.original_price, "customization original_price")?;
    }
    let mut extras_total = Decimal::ZERO;
    for extra in extras {
        validate_price(extra.price, "expandable choice price")?;
        extras_total += to_decimal(extra.price);
    }

    match kind {
        LineKind::Product { .. } => {
            validate_price(inputs.base_price, "product price")?;
            let base = to_decimal(inputs.base_price);

            let mut original: Decimal = customizations
                .iter()
                .map(|c| to_decimal(c.original_price))
                .sum();
            if original.is_zero() {
                original = base;
            }

            let on_sale = inputs
                .flash_sale
                .map(|offer| flash_sale_covers(offer, kind, inputs.own_discount.is_some()))
                .unwrap_or(false);

            let sale = if on_sale {
                let mut sale: Decimal = customizations.iter().map(|c| to_decimal(c.price)).sum();
                if sale.is_zero() {
                    // inputs.flash_sale is Some whenever on_sale holds
                    if let Some(offer) = inputs.flash_sale {
                        sale = item_flash_price(
                            base,
                            inputs.own_discount,
                            inputs.own_is_percentage,
                            offer,
                        );
                    }
                }
                Some(to_f64(sale + extras_total))
            } else {
                None
            };

            Ok(ResolvedPrices {
                unit_price: to_f64(original + extras_total),
                unit_sale_price: sale,
            })
        }
        LineKind::Deal { .. } => {
            let total = inputs
                .deal_total
                .ok_or_else(|| AppError::validation("total_price is required for deal items"))?;
            validate_price(total, "total_price")?;
            Ok(ResolvedPrices {
                unit_price: to_f64(to_decimal(total) + extras_total),
                unit_sale_price: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::offer::OfferType;

    fn product_kind() -> LineKind {
        LineKind::Product {
            product_id: "p1".into(),
        }
    }

    fn custom(price: f64, original: f64) -> CustomizationSelection {
        CustomizationSelection {
            choice_id: "c1".into(),
            deal_product_id: None,
            price,
            original_price: original,
        }
    }

    fn extra(price: f64) -> ExpandableSelection {
        ExpandableSelection {
            choice_id: "e1".into(),
            deal_product_id: None,
            price,
        }
    }

    fn flash_offer() -> Offer {
        Offer {
            offer_type: OfferType::FlashSale,
            discount_value: Some(10.0),
            is_percentage: true,
            ..Offer::template("FLASH10")
        }
    }

    #[test]
    fn test_free_line_is_zero() {
        let prices = resolve_unit_prices(
            &product_kind(),
            true,
            &[custom(9.0, 10.0)],
            &[],
            &PricingInputs::default(),
        )
        .unwrap();
        assert_eq!(prices.unit_price, 0.0);
        assert_eq!(prices.unit_sale_price, None);
    }

    #[test]
    fn test_product_falls_back_to_base_price() {
        let inputs = PricingInputs {
            base_price: 100.0,
            ..Default::default()
        };
        let prices = resolve_unit_prices(&product_kind(), false, &[], &[], &inputs).unwrap();
        assert_eq!(prices.unit_price, 100.0);
        assert_eq!(prices.unit_sale_price, None);
    }

    #[test]
    fn test_product_sums_customizations() {
        let inputs = PricingInputs {
            base_price: 100.0,
            ..Default::default()
        };
        let prices = resolve_unit_prices(
            &product_kind(),
            false,
            &[custom(5.0, 5.0), custom(7.5, 7.5)],
            &[extra(2.0)],
            &inputs,
        )
        .unwrap();
        assert_eq!(prices.unit_price, 14.5);
        assert_eq!(prices.unit_sale_price, None);
    }

    #[test]
    fn test_flash_sale_from_base_price() {
        let offer = flash_offer();
        let inputs = PricingInputs {
            base_price: 100.0,
            flash_sale: Some(&offer),
            own_discount: Some(10.0),
            own_is_percentage: true,
            ..Default::default()
        };
        let prices = resolve_unit_prices(&product_kind(), false, &[], &[], &inputs).unwrap();
        assert_eq!(prices.unit_price, 100.0);
        assert_eq!(prices.unit_sale_price, Some(90.0));
    }

    #[test]
    fn test_flash_sale_from_customization_snapshots() {
        let offer = flash_offer();
        let inputs = PricingInputs {
            base_price: 100.0,
            flash_sale: Some(&offer),
            own_discount: Some(10.0),
            own_is_percentage: true,
            ..Default::default()
        };
        // add-ons join both sides undiscounted
        let prices = resolve_unit_prices(
            &product_kind(),
            false,
            &[custom(90.0, 100.0)],
            &[extra(3.0)],
            &inputs,
        )
        .unwrap();
        assert_eq!(prices.unit_price, 103.0);
        assert_eq!(prices.unit_sale_price, Some(93.0));
    }

    #[test]
    fn test_no_sale_without_coverage() {
        let offer = flash_offer();
        let inputs = PricingInputs {
            base_price: 100.0,
            flash_sale: Some(&offer),
            // store-wide sale but no own discount: not covered
            own_discount: None,
            ..Default::default()
        };
        let prices = resolve_unit_prices(&product_kind(), false, &[], &[], &inputs).unwrap();
        assert_eq!(prices.unit_sale_price, None);
    }

    #[test]
    fn test_deal_requires_total_price() {
        let kind = LineKind::Deal { deal_id: "d1".into() };
        let err = resolve_unit_prices(&kind, false, &[], &[], &PricingInputs::default());
        assert!(err.is_err());

        let inputs = PricingInputs {
            deal_total: Some(25.0),
            ..Default::default()
        };
        let prices = resolve_unit_prices(&kind, false, &[], &[extra(2.5)], &inputs).unwrap();
        assert_eq!(prices.unit_price, 27.5);
        assert_eq!(prices.unit_sale_price, None);
    }

    #[test]
    fn test_rejects_non_finite_snapshot() {
        let inputs = PricingInputs {
            base_price: 100.0,
            ..Default::default()
        };
        let err = resolve_unit_prices(
            &product_kind(),
            false,
            &[custom(f64::NAN, 10.0)],
            &[],
            &inputs,
        );
        assert!(err.is_err());
    }
}

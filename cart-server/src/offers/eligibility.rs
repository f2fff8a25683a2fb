//! Offer eligibility engine
//!
//! Partitions the active offer set into offers a cart can use right now
//! and offers within the near-unlock spend gap. Pure over the snapshot
//! and the offer rows the caller fetched.

use crate::carts::totals::pre_discount_total;
use crate::db::models::Offer;
use crate::pricing::{flash_sale_covers, to_decimal};
use rust_decimal::Decimal;
use shared::cart::CartSnapshot;
use shared::offer::AvailableOffers;
use std::collections::{HashMap, HashSet};

/// Caller-resolved facts the engines need beyond the snapshot itself
#[derive(Debug)]
pub struct EligibilityContext<'a> {
    pub now_ms: i64,
    /// The cart's owner, if bound
    pub user_id: Option<&'a str>,
    /// Per-offer redemption counts for that user, keyed by offer id
    pub user_usage: &'a HashMap<String, i64>,
    /// Catalog ids of items declaring their own flash-sale discount
    pub own_discount_items: &'a HashSet<String>,
}

/// Where an offer lands relative to its spend threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SpendStatus {
    Available,
    NearUnlock,
    OutOfReach,
}

/// Usage-limit gates shared by listing and application
pub(crate) fn passes_usage_limits(offer: &Offer, ctx: &EligibilityContext) -> bool {
    if offer.usage_exhausted() {
        return false;
    }
    if let (Some(_), Some(limit)) = (ctx.user_id, offer.effective_per_user_limit()) {
        let used = ctx
            .user_usage
            .get(&offer.id_string())
            .copied()
            .unwrap_or(0);
        if used >= limit {
            return false;
        }
    }
    true
}

/// Whether a flash-sale offer reaches at least one non-free line.
///
/// An explicit applicable set matches listed items; an empty set falls
/// back to items declaring their own flash-sale discount.
pub(crate) fn flash_sale_matches(
    offer: &Offer,
    cart: &CartSnapshot,
    ctx: &EligibilityContext,
) -> bool {
    cart.paid_lines().any(|line| {
        let own = ctx.own_discount_items.contains(line.kind.catalog_id());
        flash_sale_covers(offer, &line.kind, own)
    })
}

/// Min-spend partition against the pre-discount total.
///
/// The near-unlock gap defaults to min_spend itself, so an offer with no
/// explicit threshold is listed from the first item onward.
pub(crate) fn spend_status(offer: &Offer, total: Decimal) -> SpendStatus {
    let Some(min_spend) = offer.min_spend else {
        return SpendStatus::Available;
    };
    let min_spend_dec = to_decimal(min_spend);
    if total >= min_spend_dec {
        return SpendStatus::Available;
    }
    let gap = min_spend_dec - total;
    let window = to_decimal(offer.near_unlock_threshold.unwrap_or(min_spend));
    if gap <= window {
        SpendStatus::NearUnlock
    } else {
        SpendStatus::OutOfReach
    }
}

/// List the offers this cart can use now and the ones within reach.
///
/// Already-applied offers never re-appear. Flash-sale offers with zero
/// matching lines are excluded entirely, not demoted to near-unlock.
pub fn available_offers(
    cart: &CartSnapshot,
    offers: &[Offer],
    delivery_fee: f64,
    ctx: &EligibilityContext,
) -> AvailableOffers {
    let total = pre_discount_total(cart, delivery_fee);
    let mut result = AvailableOffers::default();

    for offer in offers {
        if !offer.is_currently_active(ctx.now_ms) {
            continue;
        }
        if cart.has_offer(&offer.id_string()) {
            continue;
        }
        if !passes_usage_limits(offer, ctx) {
            continue;
        }
        if offer.offer_type.is_flash_sale() && !flash_sale_matches(offer, cart, ctx) {
            continue;
        }
        match spend_status(offer, total) {
            SpendStatus::Available => result.available.push(offer.summary()),
            SpendStatus::NearUnlock => result.near_unlock.push(offer.summary()),
            SpendStatus::OutOfReach => {}
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::cart::{CartLine, LineKind};
    use shared::offer::OfferType;

    fn paid_line(product_id: &str, unit: f64, qty: i32) -> CartLine {
        CartLine {
            line_id: format!("line-{product_id}"),
            kind: LineKind::Product {
                product_id: product_id.to_string(),
            },
            quantity: qty,
            is_free: false,
            granted_by: None,
            unit_price: unit,
            unit_sale_price: None,
            customizations: vec![],
            extras: vec![],
        }
    }

    fn cart_with(lines: Vec<CartLine>) -> CartSnapshot {
        let mut cart = CartSnapshot::new("cart-1".to_string());
        cart.lines = lines;
        cart
    }

    fn ctx<'a>(
        usage: &'a HashMap<String, i64>,
        own: &'a HashSet<String>,
    ) -> EligibilityContext<'a> {
        EligibilityContext {
            now_ms: chrono::Utc::now().timestamp_millis(),
            user_id: Some("user-1"),
            user_usage: usage,
            own_discount_items: own,
        }
    }

    #[test]
    fn test_min_spend_partition() {
        // 100 * 1 + 5 fee + 10 tax = 115 pre-discount
        let cart = cart_with(vec![paid_line("p1", 100.0, 1)]);
        let usage = HashMap::new();
        let own = HashSet::new();
        let offers = vec![
            Offer {
                discount_value: Some(10.0),
                ..Offer::template("NO-MIN")
            },
            Offer {
                discount_value: Some(20.0),
                min_spend: Some(100.0),
                near_unlock_threshold: Some(100.0),
                ..Offer::template("MET")
            },
            Offer {
                discount_value: Some(30.0),
                min_spend: Some(150.0),
                near_unlock_threshold: Some(150.0),
                ..Offer::template("NEAR")
            },
            Offer {
                discount_value: Some(40.0),
                min_spend: Some(500.0),
                near_unlock_threshold: Some(50.0),
                ..Offer::template("FAR")
            },
        ];

        let listed = available_offers(&cart, &offers, 5.0, &ctx(&usage, &own));
        let available: Vec<_> = listed.available.iter().map(|o| o.code.as_str()).collect();
        let near: Vec<_> = listed.near_unlock.iter().map(|o| o.code.as_str()).collect();
        assert_eq!(available, vec!["NO-MIN", "MET"]);
        assert_eq!(near, vec!["NEAR"]);
    }

    #[test]
    fn test_applied_and_limited_offers_excluded() {
        let mut cart = cart_with(vec![paid_line("p1", 100.0, 1)]);
        let applied = Offer {
            discount_value: Some(5.0),
            ..Offer::template("APPLIED")
        };
        cart.offers.push(shared::cart::AppliedOffer {
            offer_id: applied.id_string(),
            code: applied.code.clone(),
            offer_type: applied.offer_type,
            applied_by_user: true,
            applied_at: 0,
        });

        let exhausted = Offer {
            discount_value: Some(5.0),
            usage_limit: Some(1),
            usage_count: 1,
            ..Offer::template("EXHAUSTED")
        };
        let voucher = Offer {
            discount_value: Some(5.0),
            usage_scope: shared::offer::UsageScope::SingleUser,
            ..Offer::template("USED-VOUCHER")
        };
        let mut usage = HashMap::new();
        usage.insert(voucher.id_string(), 1);
        let own = HashSet::new();

        let listed = available_offers(
            &cart,
            &[applied, exhausted, voucher],
            5.0,
            &ctx(&usage, &own),
        );
        assert!(listed.available.is_empty());
        assert!(listed.near_unlock.is_empty());
    }

    #[test]
    fn test_flash_sale_requires_matching_line() {
        let cart = cart_with(vec![paid_line("p1", 100.0, 1)]);
        let usage = HashMap::new();

        let scoped = Offer {
            offer_type: OfferType::FlashSale,
            discount_value: Some(10.0),
            is_percentage: true,
            applicable_products: vec!["p9".into()],
            min_spend: Some(1000.0),
            near_unlock_threshold: Some(1000.0),
            ..Offer::template("FLASH")
        };

        // No matching line: excluded even from near_unlock
        let own = HashSet::new();
        let listed = available_offers(
            &cart,
            std::slice::from_ref(&scoped),
            5.0,
            &ctx(&usage, &own),
        );
        assert!(listed.available.is_empty());
        assert!(listed.near_unlock.is_empty());

        // Matching line but below min_spend: partitions like any other type
        let matching = Offer {
            applicable_products: vec!["p1".into()],
            ..scoped
        };
        let listed = available_offers(&cart, &[matching], 5.0, &ctx(&usage, &own));
        assert!(listed.available.is_empty());
        assert_eq!(listed.near_unlock.len(), 1);
    }

    #[test]
    fn test_flash_sale_storewide_uses_own_discount_items() {
        let cart = cart_with(vec![paid_line("p1", 100.0, 1)]);
        let usage = HashMap::new();
        let storewide = Offer {
            offer_type: OfferType::FlashSale,
            discount_value: Some(10.0),
            is_percentage: true,
            ..Offer::template("FLASH-ALL")
        };

        let own = HashSet::new();
        let listed = available_offers(
            &cart,
            std::slice::from_ref(&storewide),
            5.0,
            &ctx(&usage, &own),
        );
        assert!(listed.available.is_empty());

        let own: HashSet<String> = ["p1".to_string()].into();
        let listed = available_offers(
            &cart,
            std::slice::from_ref(&storewide),
            5.0,
            &ctx(&usage, &own),
        );
        assert_eq!(listed.available.len(), 1);
    }
}

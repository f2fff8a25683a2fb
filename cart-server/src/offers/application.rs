//! Offer application engine
//!
//! Manual apply/remove, auto-offer reconciliation, and the free-line
//! bookkeeping for BOGO/FREE_ITEM offers. At most one manually-applied
//! offer holds per cart; auto offers coexist with it.

use crate::carts::totals::pre_discount_total;
use crate::db::models::Offer;
use crate::offers::eligibility::{
    flash_sale_matches, passes_usage_limits, spend_status, EligibilityContext, SpendStatus,
};
use crate::pricing::to_decimal;
use shared::cart::{AppliedOffer, CartLine, CartSnapshot, LineKind};
use shared::error::{AppError, AppResult, ErrorCode};
use std::collections::HashMap;

/// Manually apply an offer to the cart.
///
/// Rejects with the specific ineligibility reason; on success evicts any
/// previously applied manual offer together with its free lines.
pub fn apply_manual(
    cart: &mut CartSnapshot,
    offer: &Offer,
    delivery_fee: f64,
    ctx: &EligibilityContext,
) -> AppResult<()> {
    let offer_id = offer.id_string();
    if cart.has_offer(&offer_id) {
        return Err(AppError::invalid_request("Offer is already applied"));
    }
    if !offer.is_currently_active(ctx.now_ms) {
        return Err(AppError::ineligible_offer(
            ErrorCode::OfferExpired,
            format!("Offer {} is expired or inactive", offer.code),
        ));
    }
    if offer.usage_exhausted() {
        return Err(AppError::ineligible_offer(
            ErrorCode::OfferUsageLimitReached,
            format!("Offer {} has reached its usage limit", offer.code),
        ));
    }
    if !passes_usage_limits(offer, ctx) {
        return Err(AppError::ineligible_offer(
            ErrorCode::OfferUserLimitReached,
            format!("Redemption limit reached for offer {}", offer.code),
        ));
    }
    if offer.offer_type.is_flash_sale() && !flash_sale_matches(offer, cart, ctx) {
        return Err(AppError::ineligible_offer(
            ErrorCode::OfferNotApplicable,
            format!("Offer {} does not apply to any item in the cart", offer.code),
        ));
    }
    if let Some(min_spend) = offer.min_spend
        && pre_discount_total(cart, delivery_fee) < to_decimal(min_spend)
    {
        return Err(AppError::ineligible_offer(
            ErrorCode::OfferBelowMinSpend,
            format!("Cart total is below the {min_spend:.2} minimum for {}", offer.code),
        )
        .with_detail("min_spend", min_spend));
    }

    evict_manual(cart);

    cart.offers.push(AppliedOffer {
        offer_id: offer_id.clone(),
        code: offer.code.clone(),
        offer_type: offer.offer_type,
        applied_by_user: true,
        applied_at: ctx.now_ms,
    });
    if offer.offer_type.grants_free_items() {
        sync_free_lines(cart, offer, true);
    }
    Ok(())
}

/// Remove a manually-applied offer and its injected free lines.
///
/// Auto-applied offers are system-owned and not user-removable.
pub fn remove_manual(cart: &mut CartSnapshot, offer_id: &str) -> AppResult<()> {
    let Some(applied) = cart.applied_offer(offer_id) else {
        return Err(AppError::ineligible_offer(
            ErrorCode::OfferNotRemovable,
            "Offer is not applied to this cart",
        ));
    };
    if !applied.applied_by_user {
        return Err(AppError::ineligible_offer(
            ErrorCode::OfferNotRemovable,
            "Automatically applied offers cannot be removed",
        ));
    }
    detach_offer(cart, offer_id);
    Ok(())
}

/// Reconcile auto-applied offers after any subtotal-changing mutation.
///
/// Three passes over the snapshot: drop auto offers that no longer
/// qualify, re-sync free lines of every surviving free-item offer, then
/// attach newly qualifying auto offers. `offer_records` must cover the
/// applied offers and every active auto-apply candidate.
pub fn reconcile_auto(
    cart: &mut CartSnapshot,
    offer_records: &HashMap<String, Offer>,
    delivery_fee: f64,
    ctx: &EligibilityContext,
) {
    let total = pre_discount_total(cart, delivery_fee);

    // Drop phase
    let applied: Vec<AppliedOffer> = cart.offers.clone();
    for entry in &applied {
        if entry.applied_by_user {
            continue;
        }
        let keep = match offer_records.get(&entry.offer_id) {
            None => {
                tracing::warn!(
                    cart_id = %cart.cart_id,
                    offer_id = %entry.offer_id,
                    "applied offer has no catalog record, dropping"
                );
                false
            }
            Some(offer) => {
                offer.is_currently_active(ctx.now_ms)
                    && spend_status(offer, total) == SpendStatus::Available
                    && (!offer.offer_type.is_flash_sale() || flash_sale_matches(offer, cart, ctx))
            }
        };
        if !keep {
            detach_offer(cart, &entry.offer_id);
        }
    }

    // Sync phase: free lines of surviving BOGO/FREE_ITEM offers, manual
    // ones included
    let surviving: Vec<String> = cart
        .offers
        .iter()
        .filter(|o| o.offer_type.grants_free_items())
        .map(|o| o.offer_id.clone())
        .collect();
    for offer_id in surviving {
        if let Some(offer) = offer_records.get(&offer_id) {
            let meets_min_spend = spend_status(offer, total) == SpendStatus::Available;
            sync_free_lines(cart, offer, meets_min_spend);
        }
    }

    // Apply phase: newly qualifying auto offers, in code order for
    // deterministic snapshots
    let mut candidates: Vec<&Offer> = offer_records
        .values()
        .filter(|o| o.auto_apply && !cart.has_offer(&o.id_string()))
        .collect();
    candidates.sort_by(|a, b| a.code.cmp(&b.code));
    for offer in candidates {
        if !offer.is_currently_active(ctx.now_ms) {
            continue;
        }
        if !passes_usage_limits(offer, ctx) {
            continue;
        }
        if offer.offer_type.is_flash_sale() && !flash_sale_matches(offer, cart, ctx) {
            continue;
        }
        if spend_status(offer, total) != SpendStatus::Available {
            continue;
        }
        cart.offers.push(AppliedOffer {
            offer_id: offer.id_string(),
            code: offer.code.clone(),
            offer_type: offer.offer_type,
            applied_by_user: false,
            applied_at: ctx.now_ms,
        });
        if offer.offer_type.grants_free_items() {
            sync_free_lines(cart, offer, true);
        }
    }
}

/// Remove the current manual offer (if any) and its free lines
fn evict_manual(cart: &mut CartSnapshot) {
    let manual_ids: Vec<String> = cart.manual_offers().map(|o| o.offer_id.clone()).collect();
    for offer_id in manual_ids {
        detach_offer(cart, &offer_id);
    }
}

/// Drop an applied offer row together with the free lines it granted
fn detach_offer(cart: &mut CartSnapshot, offer_id: &str) {
    cart.offers.retain(|o| o.offer_id != offer_id);
    cart.lines
        .retain(|l| !(l.is_free && l.granted_by.as_deref() == Some(offer_id)));
}

/// Bring the free lines granted by one offer in line with its rules.
///
/// BOGO mirrors the paid quantity of each listed item and deletes the
/// free line when no paid counterpart remains. FREE_ITEM holds a fixed
/// quantity per listed item while min_spend is met, correcting drift in
/// place, and withholds its free lines below min_spend.
fn sync_free_lines(cart: &mut CartSnapshot, offer: &Offer, meets_min_spend: bool) {
    let offer_id = offer.id_string();
    let granted: Vec<LineKind> = offer
        .free_products
        .iter()
        .map(|id| LineKind::Product {
            product_id: id.clone(),
        })
        .chain(offer.free_deals.iter().map(|id| LineKind::Deal {
            deal_id: id.clone(),
        }))
        .collect();

    for kind in granted {
        let wanted = if offer.offer_type.grants_free_items() && !meets_min_spend {
            0
        } else if offer.offer_type == shared::offer::OfferType::Bogo {
            cart.paid_lines()
                .filter(|l| l.kind == kind)
                .map(|l| l.quantity)
                .sum()
        } else {
            offer.free_item_quantity
        };

        let existing = cart
            .lines
            .iter()
            .position(|l| l.is_free && l.granted_by.as_deref() == Some(&offer_id) && l.kind == kind);

        match (existing, wanted) {
            (Some(index), 0) => {
                cart.lines.remove(index);
            }
            (Some(index), qty) => {
                cart.lines[index].quantity = qty;
            }
            (None, 0) => {}
            (None, qty) => {
                cart.lines.push(free_line(kind.clone(), qty, &offer_id));
            }
        }
    }
}

/// Zero-priced free line granted by an offer
fn free_line(kind: LineKind, quantity: i32, offer_id: &str) -> CartLine {
    CartLine {
        line_id: uuid::Uuid::new_v4().to_string(),
        kind,
        quantity,
        is_free: true,
        granted_by: Some(offer_id.to_string()),
        unit_price: 0.0,
        unit_sale_price: None,
        customizations: vec![],
        extras: vec![],
    }
}

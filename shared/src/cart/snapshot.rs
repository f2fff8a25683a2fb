//! Cart snapshot - the persisted cart aggregate with computed totals

use super::types::{AppliedOffer, CartLine, DiscountLine};
use serde::{Deserialize, Serialize};

/// Cart snapshot - lines, applied offers, and the computed totals block.
///
/// Totals are recomputed by the server on every mutation; the stored
/// values are authoritative for readers and for order finalization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartSnapshot {
    /// Cart ID (assigned by server)
    pub cart_id: String,
    /// Owning user; None while the cart is anonymous
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Branch determining the delivery fee
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,
    /// Cart lines, paid lines first
    pub lines: Vec<CartLine>,
    /// Offers currently attached to the cart
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub offers: Vec<AppliedOffer>,
    /// Sum of line subtotals (discounted where a sale price applies)
    pub subtotal: f64,
    /// Branch delivery fee, or the default when no branch is set
    pub delivery_fee: f64,
    /// Tax on the subtotal
    pub tax_amount: f64,
    /// Discount breakdown rows by offer code
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub discounts: Vec<DiscountLine>,
    /// Final total after cart-level discounts
    pub total: f64,
    /// Creation timestamp (ms)
    pub created_at: i64,
    /// Last update timestamp (ms)
    pub updated_at: i64,
}

impl CartSnapshot {
    /// Create a new empty cart
    pub fn new(cart_id: String) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            cart_id,
            user_id: None,
            branch_id: None,
            lines: Vec::new(),
            offers: Vec::new(),
            subtotal: 0.0,
            delivery_fee: 0.0,
            tax_amount: 0.0,
            discounts: Vec::new(),
            total: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the cart has no owning user yet
    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none()
    }

    /// Paid (non-free) lines
    pub fn paid_lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter().filter(|line| !line.is_free)
    }

    /// Lines injected by BOGO/FREE_ITEM offers
    pub fn free_lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter().filter(|line| line.is_free)
    }

    /// Whether any paid line remains
    pub fn has_paid_lines(&self) -> bool {
        self.lines.iter().any(|line| !line.is_free)
    }

    /// Find a line by id
    pub fn line(&self, line_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.line_id == line_id)
    }

    /// Find an attached offer by offer id
    pub fn applied_offer(&self, offer_id: &str) -> Option<&AppliedOffer> {
        self.offers.iter().find(|offer| offer.offer_id == offer_id)
    }

    /// Whether the given offer is attached to this cart
    pub fn has_offer(&self, offer_id: &str) -> bool {
        self.applied_offer(offer_id).is_some()
    }

    /// Offers the user applied explicitly
    pub fn manual_offers(&self) -> impl Iterator<Item = &AppliedOffer> {
        self.offers.iter().filter(|offer| offer.applied_by_user)
    }
}

impl Default for CartSnapshot {
    fn default() -> Self {
        Self::new(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::types::LineKind;

    fn line(line_id: &str, is_free: bool) -> CartLine {
        CartLine {
            line_id: line_id.to_string(),
            kind: LineKind::Product {
                product_id: "p1".into(),
            },
            quantity: 1,
            is_free,
            granted_by: None,
            unit_price: 10.0,
            unit_sale_price: None,
            customizations: vec![],
            extras: vec![],
        }
    }

    #[test]
    fn test_new_cart_is_empty_and_anonymous() {
        let cart = CartSnapshot::new("c1".into());
        assert!(cart.is_anonymous());
        assert!(cart.lines.is_empty());
        assert!(!cart.has_paid_lines());
        assert_eq!(cart.total, 0.0);
    }

    #[test]
    fn test_paid_and_free_partition() {
        let mut cart = CartSnapshot::new("c1".into());
        cart.lines.push(line("a", false));
        cart.lines.push(line("b", true));
        cart.lines.push(line("c", false));

        assert_eq!(cart.paid_lines().count(), 2);
        assert_eq!(cart.free_lines().count(), 1);
        assert!(cart.has_paid_lines());
        assert!(cart.line("b").unwrap().is_free);
        assert!(cart.line("missing").is_none());
    }
}

//! Offer Module
//!
//! Shared offer enums and the client-facing offer listing types.

use serde::{Deserialize, Serialize};

/// Promotional offer type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferType {
    /// Percentage discount on the cart total
    Percentage,
    /// Flat discount on the cart total
    Flat,
    /// Buy one get one: mirrors paid line quantities with free lines
    Bogo,
    /// Waives the delivery fee (no monetary discount row)
    FreeDelivery,
    /// Grants a fixed quantity of free items above a spend threshold
    FreeItem,
    /// Time-boxed item-level sale; at most one active at a time
    FlashSale,
}

impl OfferType {
    /// Offer types that inject free cart lines
    pub fn grants_free_items(&self) -> bool {
        matches!(self, Self::Bogo | Self::FreeItem)
    }

    /// Offer types that produce a cart-level monetary discount row
    pub fn is_cart_discount(&self) -> bool {
        matches!(self, Self::Percentage | Self::Flat)
    }

    pub fn is_flash_sale(&self) -> bool {
        matches!(self, Self::FlashSale)
    }
}

/// Who may redeem an offer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UsageScope {
    /// A voucher bound to a single user
    SingleUser,
    /// A shared promo code
    MultiUser,
    /// An app-wide offer
    #[default]
    Unlimited,
}

/// Offer fields exposed to clients in eligibility listings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OfferSummary {
    /// Offer ID
    pub offer_id: String,
    /// Redeem code
    pub code: String,
    /// Offer type
    pub offer_type: OfferType,
    /// Marketing description
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_spend: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_discount: Option<f64>,
    /// End of the validity window (ms)
    pub valid_until: i64,
    /// Whether the system attaches this offer automatically
    #[serde(default)]
    pub auto_apply: bool,
}

/// Eligibility listing: offers usable now vs. offers within reach
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AvailableOffers {
    /// Offers the cart qualifies for right now
    pub available: Vec<OfferSummary>,
    /// Offers within the near-unlock spend gap of qualifying
    pub near_unlock: Vec<OfferSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offer_type_serde() {
        assert_eq!(
            serde_json::to_string(&OfferType::FlashSale).unwrap(),
            "\"FLASH_SALE\""
        );
        assert_eq!(
            serde_json::to_string(&OfferType::FreeDelivery).unwrap(),
            "\"FREE_DELIVERY\""
        );
        let back: OfferType = serde_json::from_str("\"BOGO\"").unwrap();
        assert_eq!(back, OfferType::Bogo);
    }

    #[test]
    fn test_offer_type_predicates() {
        assert!(OfferType::Bogo.grants_free_items());
        assert!(OfferType::FreeItem.grants_free_items());
        assert!(!OfferType::Flat.grants_free_items());

        assert!(OfferType::Percentage.is_cart_discount());
        assert!(OfferType::Flat.is_cart_discount());
        assert!(!OfferType::FlashSale.is_cart_discount());
        assert!(OfferType::FlashSale.is_flash_sale());
    }

    #[test]
    fn test_usage_scope_default() {
        assert_eq!(UsageScope::default(), UsageScope::Unlimited);
        assert_eq!(
            serde_json::to_string(&UsageScope::SingleUser).unwrap(),
            "\"SINGLE_USER\""
        );
    }
}

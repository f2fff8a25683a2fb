//! Shared types for cart lines and cart mutations

use crate::error::AppError;
use crate::offer::OfferType;
use serde::{Deserialize, Serialize};

// ============================================================================
// Line Identity
// ============================================================================

/// What a cart line sells: exactly one product or one deal.
///
/// Constructed through [`LineKind::from_ids`] so the product/deal mutual
/// exclusivity holds by construction instead of being re-validated later.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineKind {
    Product { product_id: String },
    Deal { deal_id: String },
}

impl LineKind {
    /// Build from the optional id pair of a request, enforcing exactly one
    pub fn from_ids(
        product_id: Option<String>,
        deal_id: Option<String>,
    ) -> Result<Self, AppError> {
        match (product_id, deal_id) {
            (Some(product_id), None) => Ok(Self::Product { product_id }),
            (None, Some(deal_id)) => Ok(Self::Deal { deal_id }),
            (Some(_), Some(_)) => Err(AppError::validation(
                "Provide either product_id or deal_id, not both",
            )),
            (None, None) => Err(AppError::validation("Product or Deal ID required")),
        }
    }

    /// Identity token used in line signatures, e.g. "Product-42" or "Deal-7"
    pub fn signature_token(&self) -> String {
        match self {
            Self::Product { product_id } => format!("Product-{}", product_id),
            Self::Deal { deal_id } => format!("Deal-{}", deal_id),
        }
    }

    /// The referenced catalog id, regardless of kind
    pub fn catalog_id(&self) -> &str {
        match self {
            Self::Product { product_id } => product_id,
            Self::Deal { deal_id } => deal_id,
        }
    }

    pub fn is_product(&self) -> bool {
        matches!(self, Self::Product { .. })
    }

    pub fn is_deal(&self) -> bool {
        matches!(self, Self::Deal { .. })
    }
}

// ============================================================================
// Selections
// ============================================================================

/// A customization choice attached to a line, with prices snapshotted at
/// the time the line was added
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomizationSelection {
    /// Customization choice ID
    pub choice_id: String,
    /// For deal lines: the deal component this choice customizes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_product_id: Option<String>,
    /// Effective price at add time (flash-sale discount already applied)
    pub price: f64,
    /// Undiscounted price at add time
    pub original_price: f64,
}

/// An expandable add-on attached to a line. Add-ons are never discounted,
/// so a single price snapshot suffices.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpandableSelection {
    /// Expandable choice ID
    pub choice_id: String,
    /// For deal lines: the deal component this add-on extends
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_product_id: Option<String>,
    /// Price snapshot at add time
    pub price: f64,
}

// ============================================================================
// Cart Line
// ============================================================================

/// One line in a cart: a product or deal configuration with quantity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    /// Line ID (assigned by server)
    pub line_id: String,
    /// Product or deal this line sells
    #[serde(flatten)]
    pub kind: LineKind,
    /// Quantity (>= 1)
    pub quantity: i32,
    /// Injected by BOGO/FREE_ITEM offers; free lines are never priced
    #[serde(default)]
    pub is_free: bool,
    /// For free lines: the offer that injected this line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granted_by: Option<String>,
    /// Per-unit price before discounts
    pub unit_price: f64,
    /// Per-unit price under an active flash sale, when one applies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_sale_price: Option<f64>,
    /// Customization selections with price snapshots
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub customizations: Vec<CustomizationSelection>,
    /// Expandable add-on selections
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extras: Vec<ExpandableSelection>,
}

impl CartLine {
    /// Per-unit price actually charged: the sale price when present,
    /// otherwise the original
    pub fn effective_unit_price(&self) -> f64 {
        self.unit_sale_price.unwrap_or(self.unit_price)
    }

    /// Whether a flash sale reduced this line below its original price
    pub fn is_discounted(&self) -> bool {
        self.unit_sale_price
            .map(|sale| sale < self.unit_price)
            .unwrap_or(false)
    }
}

// ============================================================================
// Applied Offers and Discounts
// ============================================================================

/// An offer attached to a cart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppliedOffer {
    /// Offer ID
    pub offer_id: String,
    /// Offer code snapshot
    pub code: String,
    /// Offer type snapshot
    pub offer_type: OfferType,
    /// True when the user applied this offer explicitly; false for
    /// auto-applied offers
    #[serde(default)]
    pub applied_by_user: bool,
    /// Timestamp (ms) when the offer was attached
    pub applied_at: i64,
}

/// One row of the cart's discount breakdown
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscountLine {
    /// Code of the offer this discount came from
    pub code: String,
    /// Discount amount
    pub amount: f64,
}

// ============================================================================
// Request Types
// ============================================================================

fn default_quantity() -> i32 {
    1
}

/// Add-item request body.
///
/// Selection prices are client-supplied snapshots taken from the catalog
/// listing at add time; the server keeps them internally consistent on
/// aggregation but does not re-derive them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddItemInput {
    /// Target cart; a new cart is created when absent or unknown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cart_id: Option<String>,
    /// Branch for a newly created cart (ignored for existing carts)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<String>,
    /// Composed deal total; required for deal lines, ignored for products
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_price: Option<f64>,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub customizations: Vec<CustomizationSelection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expandable_choices: Vec<ExpandableSelection>,
}

/// Replace-item request body: the line's new content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateItemInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_price: Option<f64>,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub customizations: Vec<CustomizationSelection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expandable_choices: Vec<ExpandableSelection>,
}

/// Quantity-only update body
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuantityUpdate {
    pub quantity: i32,
}

/// Apply-offer request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyOfferInput {
    pub offer_id: String,
}

/// Merge request body: the anonymous cart to bind to the authenticated user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeCartInput {
    pub cart_id: String,
}

// ============================================================================
// Mutation Outcomes
// ============================================================================

/// Outcome of a cart mutation: the updated snapshot, or deletion of the
/// whole cart when the mutation removed its last paid line
#[derive(Debug, Clone, PartialEq)]
pub enum CartUpdate {
    Updated(super::snapshot::CartSnapshot),
    Deleted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_kind_from_ids() {
        let kind = LineKind::from_ids(Some("7".into()), None).unwrap();
        assert_eq!(
            kind,
            LineKind::Product {
                product_id: "7".into()
            }
        );
        assert_eq!(kind.signature_token(), "Product-7");
        assert!(kind.is_product());

        let kind = LineKind::from_ids(None, Some("3".into())).unwrap();
        assert_eq!(kind.signature_token(), "Deal-3");
        assert!(kind.is_deal());
        assert_eq!(kind.catalog_id(), "3");
    }

    #[test]
    fn test_line_kind_rejects_both_and_neither() {
        assert!(LineKind::from_ids(Some("1".into()), Some("2".into())).is_err());
        assert!(LineKind::from_ids(None, None).is_err());
    }

    #[test]
    fn test_line_kind_serde_shape() {
        let kind = LineKind::Product {
            product_id: "7".into(),
        };
        let json = serde_json::to_string(&kind).unwrap();
        assert_eq!(json, r#"{"kind":"PRODUCT","product_id":"7"}"#);

        let back: LineKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, kind);
    }

    #[test]
    fn test_effective_unit_price() {
        let mut line = CartLine {
            line_id: "l1".into(),
            kind: LineKind::Product {
                product_id: "7".into(),
            },
            quantity: 2,
            is_free: false,
            granted_by: None,
            unit_price: 100.0,
            unit_sale_price: None,
            customizations: vec![],
            extras: vec![],
        };
        assert_eq!(line.effective_unit_price(), 100.0);
        assert!(!line.is_discounted());

        line.unit_sale_price = Some(90.0);
        assert_eq!(line.effective_unit_price(), 90.0);
        assert!(line.is_discounted());
    }

    #[test]
    fn test_add_item_input_defaults() {
        let json = r#"{"product_id":"7"}"#;
        let input: AddItemInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.quantity, 1);
        assert!(input.customizations.is_empty());
        assert!(input.expandable_choices.is_empty());
    }
}

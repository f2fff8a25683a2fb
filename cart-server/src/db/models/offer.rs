//! Offer model
//!
//! Promotional rules: cart-level discounts, free-item grants, and the
//! single time-boxed flash sale.

use super::serde_thing;
use serde::{Deserialize, Serialize};
use shared::error::AppError;
use shared::offer::{OfferSummary, OfferType, UsageScope};
use surrealdb::sql::Thing;

/// Offer entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    #[serde(default, with = "serde_thing::option")]
    pub id: Option<Thing>,
    /// Redeem code, unique across offers
    pub code: String,
    pub offer_type: OfferType,
    #[serde(default)]
    pub description: String,
    /// PERCENTAGE: percent of base total; FLAT: amount. Also the
    /// offer-level fallback for flash sales.
    #[serde(default)]
    pub discount_value: Option<f64>,
    #[serde(default)]
    pub min_spend: Option<f64>,
    #[serde(default)]
    pub max_discount: Option<f64>,
    /// Validity window (ms since epoch)
    pub valid_from: i64,
    pub valid_until: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub auto_apply: bool,
    /// Spend gap within which a below-min-spend offer is still listed;
    /// defaults to min_spend on save
    #[serde(default)]
    pub near_unlock_threshold: Option<f64>,
    #[serde(default)]
    pub is_percentage: bool,
    /// Global redemption cap
    #[serde(default)]
    pub usage_limit: Option<i64>,
    #[serde(default)]
    pub usage_count: i64,
    #[serde(default)]
    pub usage_scope: UsageScope,
    #[serde(default)]
    pub per_user_limit: Option<i64>,
    /// Flash-sale scoping; empty means store-wide
    #[serde(default)]
    pub applicable_products: Vec<String>,
    #[serde(default)]
    pub applicable_deals: Vec<String>,
    /// Items granted by BOGO/FREE_ITEM
    #[serde(default)]
    pub free_products: Vec<String>,
    #[serde(default)]
    pub free_deals: Vec<String>,
    #[serde(default = "default_free_quantity")]
    pub free_item_quantity: i32,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub created_at: i64,
}

impl Offer {
    pub fn id_string(&self) -> String {
        serde_thing::id_string(&self.id)
    }

    /// Active flag and validity window check
    pub fn is_currently_active(&self, now_ms: i64) -> bool {
        self.is_active && self.valid_from <= now_ms && now_ms <= self.valid_until
    }

    /// Whether the global usage limit is exhausted
    pub fn usage_exhausted(&self) -> bool {
        self.usage_limit
            .map(|limit| self.usage_count >= limit)
            .unwrap_or(false)
    }

    /// Per-user redemption cap: the explicit limit, or 1 for
    /// single-user-scoped offers
    pub fn effective_per_user_limit(&self) -> Option<i64> {
        self.per_user_limit.or(match self.usage_scope {
            UsageScope::SingleUser => Some(1),
            _ => None,
        })
    }

    /// Persistence hooks applied on create and update:
    /// near_unlock_threshold falls back to min_spend, and flash sales
    /// always auto-apply.
    pub fn apply_save_defaults(&mut self) {
        if self.near_unlock_threshold.is_none() {
            self.near_unlock_threshold = self.min_spend;
        }
        if self.offer_type.is_flash_sale() {
            self.auto_apply = true;
        }
    }

    /// Field consistency checks shared by create and update
    pub fn validate(&self) -> Result<(), AppError> {
        if self.code.trim().is_empty() {
            return Err(AppError::validation("Offer code is required"));
        }
        if self.valid_until <= self.valid_from {
            return Err(AppError::validation("valid_until must be after valid_from"));
        }
        match self.offer_type {
            OfferType::Percentage | OfferType::Flat => {
                let value = self.discount_value.ok_or_else(|| {
                    AppError::validation("discount_value is required for this offer type")
                })?;
                if !value.is_finite() || value <= 0.0 {
                    return Err(AppError::validation("discount_value must be positive"));
                }
                if self.offer_type == OfferType::Percentage && value > 100.0 {
                    return Err(AppError::validation(
                        "percentage discount cannot exceed 100",
                    ));
                }
            }
            OfferType::Bogo | OfferType::FreeItem => {
                if self.free_products.is_empty() && self.free_deals.is_empty() {
                    return Err(AppError::validation(
                        "BOGO/FREE_ITEM offers need at least one free product or deal",
                    ));
                }
                if self.free_item_quantity <= 0 {
                    return Err(AppError::validation("free_item_quantity must be positive"));
                }
            }
            OfferType::FreeDelivery | OfferType::FlashSale => {}
        }
        Ok(())
    }

    /// Client-facing listing fields
    pub fn summary(&self) -> OfferSummary {
        OfferSummary {
            offer_id: self.id_string(),
            code: self.code.clone(),
            offer_type: self.offer_type,
            description: self.description.clone(),
            discount_value: self.discount_value,
            min_spend: self.min_spend,
            max_discount: self.max_discount,
            valid_until: self.valid_until,
            auto_apply: self.auto_apply,
        }
    }

    /// Baseline offer for tests; callers override the fields under test
    #[cfg(test)]
    pub fn template(code: &str) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: Some(Thing::from(("offer", code))),
            code: code.to_string(),
            offer_type: OfferType::Flat,
            description: String::new(),
            discount_value: None,
            min_spend: None,
            max_discount: None,
            valid_from: now - 3_600_000,
            valid_until: now + 3_600_000,
            is_active: true,
            auto_apply: false,
            near_unlock_threshold: None,
            is_percentage: false,
            usage_limit: None,
            usage_count: 0,
            usage_scope: UsageScope::Unlimited,
            per_user_limit: None,
            applicable_products: Vec::new(),
            applicable_deals: Vec::new(),
            free_products: Vec::new(),
            free_deals: Vec::new(),
            free_item_quantity: 1,
            branch: None,
            created_at: now,
        }
    }
}

/// Offer create DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferCreate {
    pub code: String,
    pub offer_type: OfferType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub discount_value: Option<f64>,
    #[serde(default)]
    pub min_spend: Option<f64>,
    #[serde(default)]
    pub max_discount: Option<f64>,
    pub valid_from: i64,
    pub valid_until: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub auto_apply: bool,
    #[serde(default)]
    pub near_unlock_threshold: Option<f64>,
    #[serde(default)]
    pub is_percentage: bool,
    #[serde(default)]
    pub usage_limit: Option<i64>,
    #[serde(default)]
    pub usage_scope: UsageScope,
    #[serde(default)]
    pub per_user_limit: Option<i64>,
    #[serde(default)]
    pub applicable_products: Vec<String>,
    #[serde(default)]
    pub applicable_deals: Vec<String>,
    #[serde(default)]
    pub free_products: Vec<String>,
    #[serde(default)]
    pub free_deals: Vec<String>,
    #[serde(default = "default_free_quantity")]
    pub free_item_quantity: i32,
    #[serde(default)]
    pub branch: Option<String>,
}

/// Offer update DTO; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OfferUpdate {
    pub code: Option<String>,
    pub description: Option<String>,
    pub discount_value: Option<f64>,
    pub min_spend: Option<f64>,
    pub max_discount: Option<f64>,
    pub valid_from: Option<i64>,
    pub valid_until: Option<i64>,
    pub is_active: Option<bool>,
    pub auto_apply: Option<bool>,
    pub near_unlock_threshold: Option<f64>,
    pub is_percentage: Option<bool>,
    pub usage_limit: Option<i64>,
    pub usage_scope: Option<UsageScope>,
    pub per_user_limit: Option<i64>,
    pub applicable_products: Option<Vec<String>>,
    pub applicable_deals: Option<Vec<String>>,
    pub free_products: Option<Vec<String>>,
    pub free_deals: Option<Vec<String>>,
    pub free_item_quantity: Option<i32>,
    pub branch: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_free_quantity() -> i32 {
    1
}

//! Offer Repository

use super::{strip_table_prefix, BaseRepository, RepoError, RepoResult};
use crate::db::models::{Offer, OfferCreate, OfferUpdate};
use surrealdb::engine::local::Db;
use surrealdb::Surreal;

const TABLE: &str = "offer";

#[derive(Clone)]
pub struct OfferRepository {
    base: BaseRepository,
}

impl OfferRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_all(&self) -> RepoResult<Vec<Offer>> {
        let offers: Vec<Offer> = self
            .base
            .db()
            .query("SELECT * FROM offer ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(offers)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Offer>> {
        let pure_id = strip_table_prefix(TABLE, id);
        let offer: Option<Offer> = self.base.db().select((TABLE, pure_id)).await?;
        Ok(offer)
    }

    pub async fn find_by_code(&self, code: &str) -> RepoResult<Option<Offer>> {
        let code_owned = code.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM offer WHERE code = $code LIMIT 1")
            .bind(("code", code_owned))
            .await?;
        let offers: Vec<Offer> = result.take(0)?;
        Ok(offers.into_iter().next())
    }

    /// All offers whose window covers `now_ms` and that are flagged active
    pub async fn find_active(&self, now_ms: i64) -> RepoResult<Vec<Offer>> {
        let offers: Vec<Offer> = self
            .base
            .db()
            .query(
                "SELECT * FROM offer \
                 WHERE is_active = true AND valid_from <= $now AND valid_until >= $now",
            )
            .bind(("now", now_ms))
            .await?
            .take(0)?;
        Ok(offers)
    }

    /// The single currently active flash sale, if any
    pub async fn find_active_flash_sale(&self, now_ms: i64) -> RepoResult<Option<Offer>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM offer \
                 WHERE offer_type = 'FLASH_SALE' AND is_active = true \
                   AND valid_from <= $now AND valid_until >= $now \
                 ORDER BY valid_from DESC LIMIT 1",
            )
            .bind(("now", now_ms))
            .await?;
        let offers: Vec<Offer> = result.take(0)?;
        Ok(offers.into_iter().next())
    }

    /// Create a new offer, applying the save-time defaults
    pub async fn create(&self, data: OfferCreate) -> RepoResult<Offer> {
        if self.find_by_code(&data.code).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Offer '{}' already exists",
                data.code
            )));
        }

        let mut offer = Offer {
            id: None,
            code: data.code,
            offer_type: data.offer_type,
            description: data.description,
            discount_value: data.discount_value,
            min_spend: data.min_spend,
            max_discount: data.max_discount,
            valid_from: data.valid_from,
            valid_until: data.valid_until,
            is_active: data.is_active,
            auto_apply: data.auto_apply,
            near_unlock_threshold: data.near_unlock_threshold,
            is_percentage: data.is_percentage,
            usage_limit: data.usage_limit,
            usage_count: 0,
            usage_scope: data.usage_scope,
            per_user_limit: data.per_user_limit,
            applicable_products: data.applicable_products,
            applicable_deals: data.applicable_deals,
            free_products: data.free_products,
            free_deals: data.free_deals,
            free_item_quantity: data.free_item_quantity,
            branch: data.branch,
            created_at: chrono::Utc::now().timestamp_millis(),
        };
        offer.apply_save_defaults();
        offer
            .validate()
            .map_err(|e| RepoError::Validation(e.message))?;

        let created: Option<Offer> = self.base.db().create(TABLE).content(offer).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create offer".to_string()))
    }

    /// Update an offer; save-time defaults are re-applied to the result
    pub async fn update(&self, id: &str, data: OfferUpdate) -> RepoResult<Offer> {
        let pure_id = strip_table_prefix(TABLE, id);
        let mut offer = self
            .find_by_id(pure_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Offer {} not found", id)))?;

        if let Some(ref new_code) = data.code
            && new_code != &offer.code
            && self.find_by_code(new_code).await?.is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Offer '{}' already exists",
                new_code
            )));
        }

        if let Some(code) = data.code {
            offer.code = code;
        }
        if let Some(description) = data.description {
            offer.description = description;
        }
        if data.discount_value.is_some() {
            offer.discount_value = data.discount_value;
        }
        if data.min_spend.is_some() {
            offer.min_spend = data.min_spend;
        }
        if data.max_discount.is_some() {
            offer.max_discount = data.max_discount;
        }
        if let Some(valid_from) = data.valid_from {
            offer.valid_from = valid_from;
        }
        if let Some(valid_until) = data.valid_until {
            offer.valid_until = valid_until;
        }
        if let Some(is_active) = data.is_active {
            offer.is_active = is_active;
        }
        if let Some(auto_apply) = data.auto_apply {
            offer.auto_apply = auto_apply;
        }
        if data.near_unlock_threshold.is_some() {
            offer.near_unlock_threshold = data.near_unlock_threshold;
        }
        if let Some(is_percentage) = data.is_percentage {
            offer.is_percentage = is_percentage;
        }
        if data.usage_limit.is_some() {
            offer.usage_limit = data.usage_limit;
        }
        if let Some(usage_scope) = data.usage_scope {
            offer.usage_scope = usage_scope;
        }
        if data.per_user_limit.is_some() {
            offer.per_user_limit = data.per_user_limit;
        }
        if let Some(applicable_products) = data.applicable_products {
            offer.applicable_products = applicable_products;
        }
        if let Some(applicable_deals) = data.applicable_deals {
            offer.applicable_deals = applicable_deals;
        }
        if let Some(free_products) = data.free_products {
            offer.free_products = free_products;
        }
        if let Some(free_deals) = data.free_deals {
            offer.free_deals = free_deals;
        }
        if let Some(free_item_quantity) = data.free_item_quantity {
            offer.free_item_quantity = free_item_quantity;
        }
        if data.branch.is_some() {
            offer.branch = data.branch;
        }

        offer.apply_save_defaults();
        offer
            .validate()
            .map_err(|e| RepoError::Validation(e.message))?;

        let updated: Option<Offer> = self
            .base
            .db()
            .update((TABLE, pure_id))
            .content(offer)
            .await?;
        updated.ok_or_else(|| RepoError::Database("Failed to update offer".to_string()))
    }

    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let pure_id = strip_table_prefix(TABLE, id);
        let deleted: Option<Offer> = self.base.db().delete((TABLE, pure_id)).await?;
        Ok(deleted.is_some())
    }

    /// Increment the global redemption counter by one
    pub async fn increment_usage(&self, id: &str) -> RepoResult<()> {
        let pure_id = strip_table_prefix(TABLE, id).to_string();
        self.base
            .db()
            .query("UPDATE type::thing('offer', $id) SET usage_count += 1")
            .bind(("id", pure_id))
            .await?;
        Ok(())
    }
}

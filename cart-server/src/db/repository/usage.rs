//! User offer usage repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::UserOfferUsage;
use std::collections::HashMap;
use surrealdb::engine::local::Db;
use surrealdb::Surreal;

const TABLE: &str = "user_offer_usage";

#[derive(Clone)]
pub struct UserOfferUsageRepository {
    base: BaseRepository,
}

impl UserOfferUsageRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find(&self, user_id: &str, offer_id: &str) -> RepoResult<Option<UserOfferUsage>> {
        let user = user_id.to_string();
        let offer = offer_id.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user_offer_usage WHERE user_id = $user AND offer_id = $offer LIMIT 1")
            .bind(("user", user))
            .bind(("offer", offer))
            .await?;
        let rows: Vec<UserOfferUsage> = result.take(0)?;
        Ok(rows.into_iter().next())
    }

    /// All redemption counts for one user, keyed by offer id
    pub async fn counts_for_user(&self, user_id: &str) -> RepoResult<HashMap<String, i64>> {
        let user = user_id.to_string();
        let rows: Vec<UserOfferUsage> = self
            .base
            .db()
            .query("SELECT * FROM user_offer_usage WHERE user_id = $user")
            .bind(("user", user))
            .await?
            .take(0)?;
        Ok(rows
            .into_iter()
            .map(|row| (row.offer_id, row.usage_count))
            .collect())
    }

    /// Increment the (user, offer) counter, creating the row on first use
    pub async fn increment(&self, user_id: &str, offer_id: &str) -> RepoResult<UserOfferUsage> {
        let now = chrono::Utc::now().timestamp_millis();
        match self.find(user_id, offer_id).await? {
            Some(existing) => {
                let id = existing
                    .id
                    .as_ref()
                    .map(|t| t.id.to_raw())
                    .ok_or_else(|| RepoError::Database("usage row without id".to_string()))?;
                let updated: Option<UserOfferUsage> = self
                    .base
                    .db()
                    .update((TABLE, id))
                    .content(UserOfferUsage {
                        usage_count: existing.usage_count + 1,
                        last_used: now,
                        ..existing
                    })
                    .await?;
                updated.ok_or_else(|| RepoError::Database("Failed to update usage".to_string()))
            }
            None => {
                let row = UserOfferUsage {
                    id: None,
                    user_id: user_id.to_string(),
                    offer_id: offer_id.to_string(),
                    usage_count: 1,
                    last_used: now,
                };
                let created: Option<UserOfferUsage> =
                    self.base.db().create(TABLE).content(row).await?;
                created.ok_or_else(|| RepoError::Database("Failed to create usage".to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_memory;

    #[tokio::test]
    async fn test_increment_creates_then_counts() {
        let db = connect_memory().await.unwrap();
        let repo = UserOfferUsageRepository::new(db);

        repo.increment("u1", "offer-a").await.unwrap();
        repo.increment("u1", "offer-a").await.unwrap();
        repo.increment("u1", "offer-b").await.unwrap();
        repo.increment("u2", "offer-a").await.unwrap();

        let counts = repo.counts_for_user("u1").await.unwrap();
        assert_eq!(counts.get("offer-a"), Some(&2));
        assert_eq!(counts.get("offer-b"), Some(&1));
        assert_eq!(counts.len(), 2);
    }
}

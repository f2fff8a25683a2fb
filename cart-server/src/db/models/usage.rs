//! Per-user offer redemption counters

use super::serde_thing;
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

/// Redemption counter for one (user, offer) pair; incremented at order
/// finalization, read by the eligibility engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserOfferUsage {
    #[serde(default, with = "serde_thing::option")]
    pub id: Option<Thing>,
    pub user_id: String,
    pub offer_id: String,
    #[serde(default)]
    pub usage_count: i64,
    /// Last redemption timestamp (ms)
    #[serde(default)]
    pub last_used: i64,
}

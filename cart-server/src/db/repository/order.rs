//! Order Repository

use super::{strip_table_prefix, BaseRepository, RepoError, RepoResult};
use crate::db::models::{Order, OrderStatus};
use surrealdb::engine::local::Db;
use surrealdb::Surreal;

const TABLE: &str = "order";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let created: Option<Order> = self.base.db().create(TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let pure_id = strip_table_prefix(TABLE, id);
        let order: Option<Order> = self.base.db().select((TABLE, pure_id)).await?;
        Ok(order)
    }

    /// Mark an order cancelled and record the refund granted
    pub async fn cancel(&self, id: &str, refund_amount: f64) -> RepoResult<Order> {
        let pure_id = strip_table_prefix(TABLE, id);
        let mut order = self
            .find_by_id(pure_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))?;

        order.status = OrderStatus::Cancelled;
        order.refund_amount = Some(refund_amount);

        let updated: Option<Order> = self
            .base
            .db()
            .update((TABLE, pure_id))
            .content(order)
            .await?;
        updated.ok_or_else(|| RepoError::Database("Failed to update order".to_string()))
    }
}

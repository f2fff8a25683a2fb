//! Order model: the frozen result of cart finalization

use super::serde_thing;
use serde::{Deserialize, Serialize};
use shared::cart::CartLine;
use surrealdb::sql::Thing;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Placed, not yet handed to fulfilment; cancellable
    Pending,
    /// Cancelled by the user; refund computed from elapsed time
    Cancelled,
    /// Fulfilment finished
    Completed,
}

impl OrderStatus {
    pub fn is_cancellable(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }
}

/// Discount row copied from the cart at finalization
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDiscount {
    pub offer_id: String,
    pub code: String,
    pub amount: f64,
}

/// Order entity with embedded lines and discount breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, with = "serde_thing::option")]
    pub id: Option<Thing>,
    pub user_id: String,
    #[serde(default)]
    pub branch_id: Option<String>,
    pub status: OrderStatus,
    /// Lines as they stood in the cart, per-unit prices included
    pub lines: Vec<CartLine>,
    #[serde(default)]
    pub discounts: Vec<OrderDiscount>,
    pub subtotal: f64,
    pub discount_amount: f64,
    pub delivery_fee: f64,
    pub tax_amount: f64,
    pub total_amount: f64,
    /// Set when the order is cancelled
    #[serde(default)]
    pub refund_amount: Option<f64>,
    pub created_at: i64,
}

impl Order {
    pub fn id_string(&self) -> String {
        serde_thing::id_string(&self.id)
    }
}

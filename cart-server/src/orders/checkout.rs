//! Order finalization and cancellation
//!
//! Finalization detaches the cart atomically, freezes its totals into an
//! Order document, and bumps the usage counters of every offer that did
//! something for the order. The cart's deletion is what makes double
//! submission safe: the second call simply finds no cart.

use crate::carts::CartsManager;
use crate::db::models::{Order, OrderDiscount, OrderStatus};
use crate::db::repository::{OfferRepository, OrderRepository, UserOfferUsageRepository};
use crate::orders::refund::refund_amount;
use crate::pricing::{to_decimal, to_f64};
use shared::cart::CartSnapshot;
use shared::error::{AppError, AppResult, ErrorCode};
use surrealdb::engine::local::Db;
use surrealdb::Surreal;

/// Order finalization facade used by the HTTP handlers
#[derive(Clone)]
pub struct CheckoutService {
    carts: CartsManager,
    orders: OrderRepository,
    offers: OfferRepository,
    usage: UserOfferUsageRepository,
}

impl CheckoutService {
    pub fn new(carts: CartsManager, db: Surreal<Db>) -> Self {
        Self {
            carts,
            orders: OrderRepository::new(db.clone()),
            offers: OfferRepository::new(db.clone()),
            usage: UserOfferUsageRepository::new(db),
        }
    }

    /// Turn a cart into an order.
    ///
    /// The cart is taken (deleted) first; if persisting the order fails
    /// the cart is put back so the user can retry.
    pub async fn finalize(&self, user_id: &str, cart_id: &str) -> AppResult<Order> {
        let cart = self.carts.take_cart(Some(user_id), cart_id)?;

        match self.persist_order(user_id, &cart).await {
            Ok(order) => {
                tracing::info!(
                    order_id = %order.id_string(),
                    cart_id,
                    total = order.total_amount,
                    "order placed"
                );
                Ok(order)
            }
            Err(err) => {
                if let Err(restore_err) = self.carts.restore_cart(&cart) {
                    tracing::error!(
                        cart_id,
                        error = %restore_err,
                        "failed to restore cart after finalization error"
                    );
                }
                Err(err)
            }
        }
    }

    pub async fn get_order(&self, user_id: &str, order_id: &str) -> AppResult<Order> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .filter(|o| o.user_id == user_id)
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
        Ok(order)
    }

    /// Cancel a pending order; the refund follows the elapsed-time bands
    pub async fn cancel_order(&self, user_id: &str, order_id: &str) -> AppResult<Order> {
        let order = self.get_order(user_id, order_id).await?;
        if !order.status.is_cancellable() {
            return Err(AppError::new(ErrorCode::OrderNotCancellable));
        }
        let now_ms = chrono::Utc::now().timestamp_millis();
        let refund = refund_amount(order.total_amount, order.created_at, now_ms);
        let cancelled = self.orders.cancel(order_id, refund).await?;
        tracing::info!(order_id, refund, "order cancelled");
        Ok(cancelled)
    }

    async fn persist_order(&self, user_id: &str, cart: &CartSnapshot) -> AppResult<Order> {
        let discounts: Vec<OrderDiscount> = cart
            .discounts
            .iter()
            .map(|row| OrderDiscount {
                offer_id: cart
                    .offers
                    .iter()
                    .find(|o| o.code == row.code)
                    .map(|o| o.offer_id.clone())
                    .unwrap_or_default(),
                code: row.code.clone(),
                amount: row.amount,
            })
            .collect();

        // What was actually subtracted from base_total; flash savings are
        // embedded in the subtotal and not part of this
        let discount_amount = to_f64(
            to_decimal(cart.subtotal) + to_decimal(cart.delivery_fee)
                + to_decimal(cart.tax_amount)
                - to_decimal(cart.total),
        );

        let order = self
            .orders
            .create(Order {
                id: None,
                user_id: user_id.to_string(),
                branch_id: cart.branch_id.clone(),
                status: OrderStatus::Pending,
                lines: cart.lines.clone(),
                discounts: discounts.clone(),
                subtotal: cart.subtotal,
                discount_amount,
                delivery_fee: cart.delivery_fee,
                tax_amount: cart.tax_amount,
                total_amount: cart.total,
                refund_amount: None,
                created_at: chrono::Utc::now().timestamp_millis(),
            })
            .await?;

        // One usage tick per offer that contributed a positive discount
        // row or granted free items
        for applied in &cart.offers {
            let contributed = applied.offer_type.grants_free_items()
                || discounts
                    .iter()
                    .any(|d| d.offer_id == applied.offer_id && d.amount > 0.0);
            if !contributed {
                continue;
            }
            self.offers.increment_usage(&applied.offer_id).await?;
            self.usage.increment(user_id, &applied.offer_id).await?;
        }

        Ok(order)
    }
}

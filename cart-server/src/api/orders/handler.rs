//! Order API Handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::api::identity::UserId;
use crate::core::ServerState;
use crate::db::models::Order;
use shared::error::AppResult;

#[derive(Debug, Deserialize)]
pub struct FinalizeInput {
    pub cart_id: String,
}

/// POST /api/orders - freeze a cart into an order
pub async fn finalize(
    State(state): State<ServerState>,
    user: UserId,
    Json(input): Json<FinalizeInput>,
) -> AppResult<Json<Order>> {
    let user_id = user.require()?;
    let order = state.checkout.finalize(user_id, &input.cart_id).await?;
    Ok(Json(order))
}

/// GET /api/orders/:id
pub async fn get_order(
    State(state): State<ServerState>,
    user: UserId,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let user_id = user.require()?;
    let order = state.checkout.get_order(user_id, &id).await?;
    Ok(Json(order))
}

/// POST /api/orders/:id/cancel
pub async fn cancel_order(
    State(state): State<ServerState>,
    user: UserId,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let user_id = user.require()?;
    let order = state.checkout.cancel_order(user_id, &id).await?;
    Ok(Json(order))
}

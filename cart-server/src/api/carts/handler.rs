//! Cart API handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::api::identity::UserId;
use crate::core::ServerState;
use shared::cart::{
    AddItemInput, ApplyOfferInput, CartSnapshot, CartUpdate, MergeCartInput, QuantityUpdate,
    UpdateItemInput,
};
use shared::error::AppResult;
use shared::offer::AvailableOffers;

/// Mutation outcome: the updated cart, or the cart-deleted signal when
/// the last paid line went away
#[derive(Debug, Serialize)]
pub struct MutationResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cart: Option<CartSnapshot>,
}

impl From<CartUpdate> for MutationResponse {
    fn from(update: CartUpdate) -> Self {
        match update {
            CartUpdate::Updated(cart) => Self {
                status: "updated",
                cart: Some(cart),
            },
            CartUpdate::Deleted => Self {
                status: "cart_deleted",
                cart: None,
            },
        }
    }
}

/// POST /api/carts/items - add an item, creating the cart when needed
pub async fn add_item(
    State(state): State<ServerState>,
    user: UserId,
    Json(input): Json<AddItemInput>,
) -> AppResult<Json<CartSnapshot>> {
    let cart = state.carts.add_item(user.as_deref(), input).await?;
    Ok(Json(cart))
}

/// GET /api/carts/:cart_id
pub async fn get_cart(
    State(state): State<ServerState>,
    user: UserId,
    Path(cart_id): Path<String>,
) -> AppResult<Json<CartSnapshot>> {
    let cart = state.carts.get_cart(user.as_deref(), &cart_id)?;
    Ok(Json(cart))
}

/// PUT /api/carts/:cart_id/items/:line_id - replace a line's selections
pub async fn update_item(
    State(state): State<ServerState>,
    user: UserId,
    Path((cart_id, line_id)): Path<(String, String)>,
    Json(input): Json<UpdateItemInput>,
) -> AppResult<Json<MutationResponse>> {
    let outcome = state
        .carts
        .update_item(user.as_deref(), &cart_id, &line_id, input)
        .await?;
    Ok(Json(outcome.into()))
}

/// PUT /api/carts/:cart_id/items/:line_id/quantity
pub async fn set_quantity(
    State(state): State<ServerState>,
    user: UserId,
    Path((cart_id, line_id)): Path<(String, String)>,
    Json(input): Json<QuantityUpdate>,
) -> AppResult<Json<MutationResponse>> {
    let outcome = state
        .carts
        .set_quantity(user.as_deref(), &cart_id, &line_id, input.quantity)
        .await?;
    Ok(Json(outcome.into()))
}

/// DELETE /api/carts/:cart_id/items/:line_id
pub async fn remove_item(
    State(state): State<ServerState>,
    user: UserId,
    Path((cart_id, line_id)): Path<(String, String)>,
) -> AppResult<Json<MutationResponse>> {
    let outcome = state
        .carts
        .remove_item(user.as_deref(), &cart_id, &line_id)
        .await?;
    Ok(Json(outcome.into()))
}

/// GET /api/carts/:cart_id/offers/available
pub async fn available_offers(
    State(state): State<ServerState>,
    user: UserId,
    Path(cart_id): Path<String>,
) -> AppResult<Json<AvailableOffers>> {
    let offers = state
        .carts
        .available_offers(user.as_deref(), &cart_id)
        .await?;
    Ok(Json(offers))
}

/// POST /api/carts/:cart_id/offers - apply an offer manually
pub async fn apply_offer(
    State(state): State<ServerState>,
    user: UserId,
    Path(cart_id): Path<String>,
    Json(input): Json<ApplyOfferInput>,
) -> AppResult<Json<CartSnapshot>> {
    let cart = state
        .carts
        .apply_offer(user.as_deref(), &cart_id, &input.offer_id)
        .await?;
    Ok(Json(cart))
}

/// DELETE /api/carts/:cart_id/offers/:offer_id
pub async fn remove_offer(
    State(state): State<ServerState>,
    user: UserId,
    Path((cart_id, offer_id)): Path<(String, String)>,
) -> AppResult<Json<CartSnapshot>> {
    let cart = state
        .carts
        .remove_offer(user.as_deref(), &cart_id, &offer_id)
        .await?;
    Ok(Json(cart))
}

/// POST /api/carts/merge - bind an anonymous cart to the signed-in user
pub async fn merge(
    State(state): State<ServerState>,
    user: UserId,
    Json(input): Json<MergeCartInput>,
) -> AppResult<Json<CartSnapshot>> {
    let user_id = user.require()?;
    let cart = state.carts.merge_cart(user_id, &input.cart_id).await?;
    Ok(Json(cart))
}

//! Offer API Handlers

use axum::{
    extract::{Path, State},
    Json,
};

use crate::core::ServerState;
use crate::db::models::{Offer, OfferCreate, OfferUpdate};
use crate::db::repository::OfferRepository;
use shared::error::{AppError, AppResult, ErrorCode};

/// GET /api/offers - list all offers, newest first
pub async fn list_offers(State(state): State<ServerState>) -> AppResult<Json<Vec<Offer>>> {
    let repo = OfferRepository::new(state.db.clone());
    let offers = repo.find_all().await?;
    Ok(Json(offers))
}

/// GET /api/offers/:id
pub async fn get_offer(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Offer>> {
    let repo = OfferRepository::new(state.db.clone());
    let offer = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OfferNotFound))?;
    Ok(Json(offer))
}

/// GET /api/offers/code/:code - look up an offer by its redeem code
pub async fn find_by_code(
    State(state): State<ServerState>,
    Path(code): Path<String>,
) -> AppResult<Json<Offer>> {
    let repo = OfferRepository::new(state.db.clone());
    let offer = repo
        .find_by_code(&code)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OfferNotFound))?;
    Ok(Json(offer))
}

/// GET /api/offers/flash-sale - the currently active flash sale, if any
pub async fn active_flash_sale(
    State(state): State<ServerState>,
) -> AppResult<Json<Option<Offer>>> {
    let repo = OfferRepository::new(state.db.clone());
    let now = chrono::Utc::now().timestamp_millis();
    let offer = repo.find_active_flash_sale(now).await?;
    Ok(Json(offer))
}

/// POST /api/offers
pub async fn create_offer(
    State(state): State<ServerState>,
    Json(payload): Json<OfferCreate>,
) -> AppResult<Json<Offer>> {
    let repo = OfferRepository::new(state.db.clone());
    let offer = repo.create(payload).await?;
    Ok(Json(offer))
}

/// PUT /api/offers/:id
pub async fn update_offer(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<OfferUpdate>,
) -> AppResult<Json<Offer>> {
    let repo = OfferRepository::new(state.db.clone());
    let offer = repo.update(&id, payload).await?;
    Ok(Json(offer))
}

/// DELETE /api/offers/:id
pub async fn delete_offer(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = OfferRepository::new(state.db.clone());
    let deleted = repo.delete(&id).await?;
    if !deleted {
        return Err(AppError::new(ErrorCode::OfferNotFound));
    }
    Ok(Json(true))
}

//! Offer API Module

mod handler;

use crate::core::ServerState;
use axum::{routing::get, Router};

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/offers", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list_offers).post(handler::create_offer))
        .route("/flash-sale", get(handler::active_flash_sale))
        .route(
            "/{id}",
            get(handler::get_offer)
                .put(handler::update_offer)
                .delete(handler::delete_offer),
        )
        .route("/code/{code}", get(handler::find_by_code))
}

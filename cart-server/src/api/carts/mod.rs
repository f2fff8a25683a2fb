//! Cart API module

mod handler;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/carts", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/items", post(handler::add_item))
        .route("/merge", post(handler::merge))
        .route("/{cart_id}", get(handler::get_cart))
        .route(
            "/{cart_id}/items/{line_id}",
            put(handler::update_item).delete(handler::remove_item),
        )
        .route(
            "/{cart_id}/items/{line_id}/quantity",
            put(handler::set_quantity),
        )
        .route("/{cart_id}/offers/available", get(handler::available_offers))
        .route("/{cart_id}/offers", post(handler::apply_offer))
        .route("/{cart_id}/offers/{offer_id}", delete(handler::remove_offer))
}

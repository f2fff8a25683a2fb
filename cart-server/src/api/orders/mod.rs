//! Order API Module

mod handler;

use crate::core::ServerState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::finalize))
        .route("/{id}", get(handler::get_order))
        .route("/{id}/cancel", post(handler::cancel_order))
}

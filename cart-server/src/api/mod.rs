//! API Route Modules
//!
//! - [`health`] - liveness check
//! - [`carts`] - cart lines, eligibility listing, manual offers
//! - [`offers`] - offer administration
//! - [`orders`] - finalization and cancellation

pub mod carts;
pub mod health;
pub mod identity;
pub mod offers;
pub mod orders;

pub use identity::UserId;

use crate::core::ServerState;
use axum::Router;

/// Build the Axum router (without state)
pub fn router() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(carts::router())
        .merge(offers::router())
        .merge(orders::router())
}

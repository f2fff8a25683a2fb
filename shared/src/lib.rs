//! Shared types for the ordering backend
//!
//! Common types used across crates: cart snapshots and mutation DTOs,
//! offer enums, and the unified error system.

pub mod cart;
pub mod error;
pub mod offer;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use cart::{CartSnapshot, CartUpdate};
pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use offer::{OfferType, UsageScope};

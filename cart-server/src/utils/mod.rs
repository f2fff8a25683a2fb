//! Utility Module
//!
//! - [`logger`] - tracing subscriber setup
//! - Re-exports of the shared error types used by handlers

pub mod logger;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};

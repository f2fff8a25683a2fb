//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::CartNotFound
            | Self::CartItemNotFound
            | Self::OfferNotFound
            | Self::OrderNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists | Self::WriteConflict => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated => StatusCode::UNAUTHORIZED,

            // 500 Internal Server Error
            Self::InternalError | Self::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

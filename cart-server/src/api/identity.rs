//! Identity extraction
//!
//! The gateway in front of this service resolves the bearer credential
//! and forwards an opaque user id in a trusted header. Anonymous
//! requests simply omit it.

use axum::extract::FromRequestParts;
use http::request::Parts;
use shared::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The requesting user, if authenticated
#[derive(Debug, Clone)]
pub struct UserId(pub Option<String>);

impl UserId {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// The user id, or NotAuthenticated for anonymous requests
    pub fn require(&self) -> Result<&str, AppError> {
        self.as_deref().ok_or_else(AppError::not_authenticated)
    }
}

impl<S> FromRequestParts<S> for UserId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(str::to_string);
        Ok(UserId(user))
    }
}

//! Unified error codes for the ordering backend
//!
//! This module defines all error codes used across the server and its clients.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 4xxx: Cart errors
//! - 5xxx: Offer errors
//! - 6xxx: Order errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,

    // ==================== 4xxx: Cart ====================
    /// Cart not found
    CartNotFound = 4001,
    /// Cart line not found
    CartItemNotFound = 4002,
    /// Cart has no paid lines
    CartEmpty = 4003,

    // ==================== 5xxx: Offer ====================
    /// Offer not found
    OfferNotFound = 5001,
    /// Offer is outside its validity window or flagged inactive
    OfferExpired = 5002,
    /// Cart total is below the offer's minimum spend
    OfferBelowMinSpend = 5003,
    /// Offer has reached its global usage limit
    OfferUsageLimitReached = 5004,
    /// User has reached their redemption limit for this offer
    OfferUserLimitReached = 5005,
    /// Offer was not applied by the user, so it cannot be removed
    OfferNotRemovable = 5006,
    /// Offer does not match any line in the cart
    OfferNotApplicable = 5007,

    // ==================== 6xxx: Order ====================
    /// Order not found
    OrderNotFound = 6001,
    /// Order can no longer be cancelled
    OrderNotCancellable = 6002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Concurrent write conflict that persisted after retry
    WriteConflict = 9401,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",

            // Cart
            ErrorCode::CartNotFound => "Cart not found",
            ErrorCode::CartItemNotFound => "Cart item not found",
            ErrorCode::CartEmpty => "Cart has no items",

            // Offer
            ErrorCode::OfferNotFound => "Offer not found",
            ErrorCode::OfferExpired => "Offer expired or inactive",
            ErrorCode::OfferBelowMinSpend => "Cart total too low for this offer",
            ErrorCode::OfferUsageLimitReached => "Offer usage limit reached",
            ErrorCode::OfferUserLimitReached => "User redemption limit reached",
            ErrorCode::OfferNotRemovable => "Offer not applied or not removable",
            ErrorCode::OfferNotApplicable => "Offer does not apply to any item in the cart",

            // Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::OrderNotCancellable => "Order can no longer be cancelled",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::WriteConflict => "Concurrent update conflict, please retry",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),

            // Cart
            4001 => Ok(ErrorCode::CartNotFound),
            4002 => Ok(ErrorCode::CartItemNotFound),
            4003 => Ok(ErrorCode::CartEmpty),

            // Offer
            5001 => Ok(ErrorCode::OfferNotFound),
            5002 => Ok(ErrorCode::OfferExpired),
            5003 => Ok(ErrorCode::OfferBelowMinSpend),
            5004 => Ok(ErrorCode::OfferUsageLimitReached),
            5005 => Ok(ErrorCode::OfferUserLimitReached),
            5006 => Ok(ErrorCode::OfferNotRemovable),
            5007 => Ok(ErrorCode::OfferNotApplicable),

            // Order
            6001 => Ok(ErrorCode::OrderNotFound),
            6002 => Ok(ErrorCode::OrderNotCancellable),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9401 => Ok(ErrorCode::WriteConflict),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        // General
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::Unknown.code(), 1);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::AlreadyExists.code(), 4);
        assert_eq!(ErrorCode::InvalidRequest.code(), 5);

        // Auth
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);

        // Cart
        assert_eq!(ErrorCode::CartNotFound.code(), 4001);
        assert_eq!(ErrorCode::CartItemNotFound.code(), 4002);
        assert_eq!(ErrorCode::CartEmpty.code(), 4003);

        // Offer
        assert_eq!(ErrorCode::OfferNotFound.code(), 5001);
        assert_eq!(ErrorCode::OfferExpired.code(), 5002);
        assert_eq!(ErrorCode::OfferBelowMinSpend.code(), 5003);
        assert_eq!(ErrorCode::OfferUsageLimitReached.code(), 5004);
        assert_eq!(ErrorCode::OfferUserLimitReached.code(), 5005);
        assert_eq!(ErrorCode::OfferNotRemovable.code(), 5006);
        assert_eq!(ErrorCode::OfferNotApplicable.code(), 5007);

        // Order
        assert_eq!(ErrorCode::OrderNotFound.code(), 6001);
        assert_eq!(ErrorCode::OrderNotCancellable.code(), 6002);

        // System
        assert_eq!(ErrorCode::InternalError.code(), 9001);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
        assert_eq!(ErrorCode::WriteConflict.code(), 9401);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::Unknown.is_success());
        assert!(!ErrorCode::CartNotFound.is_success());
        assert!(!ErrorCode::InternalError.is_success());
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(0), Ok(ErrorCode::Success));
        assert_eq!(ErrorCode::try_from(1001), Ok(ErrorCode::NotAuthenticated));
        assert_eq!(ErrorCode::try_from(4001), Ok(ErrorCode::CartNotFound));
        assert_eq!(ErrorCode::try_from(5003), Ok(ErrorCode::OfferBelowMinSpend));
        assert_eq!(ErrorCode::try_from(9001), Ok(ErrorCode::InternalError));
        assert_eq!(ErrorCode::try_from(9401), Ok(ErrorCode::WriteConflict));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(10000), Err(InvalidErrorCode(10000)));
        assert_eq!(ErrorCode::try_from(1234), Err(InvalidErrorCode(1234)));
    }

    #[test]
    fn test_from_error_code_to_u16() {
        let code: u16 = ErrorCode::Success.into();
        assert_eq!(code, 0);

        let code: u16 = ErrorCode::OfferExpired.into();
        assert_eq!(code, 5002);

        let code: u16 = ErrorCode::InternalError.into();
        assert_eq!(code, 9001);
    }

    #[test]
    fn test_serialize() {
        let code = ErrorCode::NotFound;
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "3");

        let code = ErrorCode::CartNotFound;
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "4001");

        let code = ErrorCode::Success;
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "0");
    }

    #[test]
    fn test_deserialize() {
        let code: ErrorCode = serde_json::from_str("0").unwrap();
        assert_eq!(code, ErrorCode::Success);

        let code: ErrorCode = serde_json::from_str("4001").unwrap();
        assert_eq!(code, ErrorCode::CartNotFound);

        let code: ErrorCode = serde_json::from_str("5006").unwrap();
        assert_eq!(code, ErrorCode::OfferNotRemovable);
    }

    #[test]
    fn test_deserialize_invalid() {
        let result: Result<ErrorCode, _> = serde_json::from_str("999");
        assert!(result.is_err());

        let result: Result<ErrorCode, _> = serde_json::from_str("10000");
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::Success), "0");
        assert_eq!(format!("{}", ErrorCode::NotFound), "3");
        assert_eq!(format!("{}", ErrorCode::CartNotFound), "4001");
        assert_eq!(format!("{}", ErrorCode::InternalError), "9001");
    }

    #[test]
    fn test_message() {
        assert_eq!(
            ErrorCode::Success.message(),
            "Operation completed successfully"
        );
        assert_eq!(ErrorCode::NotFound.message(), "Resource not found");
        assert_eq!(ErrorCode::CartNotFound.message(), "Cart not found");
        assert_eq!(
            ErrorCode::OfferExpired.message(),
            "Offer expired or inactive"
        );
        assert_eq!(ErrorCode::InternalError.message(), "Internal server error");
    }

    #[test]
    fn test_invalid_error_code_display() {
        let err = InvalidErrorCode(999);
        assert_eq!(format!("{}", err), "invalid error code: 999");
    }

    #[test]
    fn test_roundtrip() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::NotAuthenticated,
            ErrorCode::CartNotFound,
            ErrorCode::OfferUserLimitReached,
            ErrorCode::OrderNotCancellable,
            ErrorCode::InternalError,
        ];

        for code in codes {
            let json = serde_json::to_string(&code).unwrap();
            let parsed: ErrorCode = serde_json::from_str(&json).unwrap();
            assert_eq!(code, parsed);
        }
    }

    #[test]
    fn test_hash() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(ErrorCode::Success);
        set.insert(ErrorCode::NotFound);
        set.insert(ErrorCode::Success); // Duplicate

        assert_eq!(set.len(), 2);
        assert!(set.contains(&ErrorCode::Success));
        assert!(set.contains(&ErrorCode::NotFound));
    }
}

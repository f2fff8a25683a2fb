//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 4xxx: Cart errors
/// - 5xxx: Offer errors
/// - 6xxx: Order errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Cart errors (4xxx)
    Cart,
    /// Offer errors (5xxx)
    Offer,
    /// Order errors (6xxx)
    Order,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            4000..5000 => Self::Cart,
            5000..6000 => Self::Offer,
            6000..7000 => Self::Order,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Cart => "cart",
            Self::Offer => "offer",
            Self::Order => "order",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(5), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);

        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(1999), ErrorCategory::Auth);

        assert_eq!(ErrorCategory::from_code(4001), ErrorCategory::Cart);
        assert_eq!(ErrorCategory::from_code(5001), ErrorCategory::Offer);
        assert_eq!(ErrorCategory::from_code(6001), ErrorCategory::Order);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(10000), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::Success.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::NotAuthenticated.category(), ErrorCategory::Auth);
        assert_eq!(ErrorCode::CartNotFound.category(), ErrorCategory::Cart);
        assert_eq!(ErrorCode::OfferExpired.category(), ErrorCategory::Offer);
        assert_eq!(ErrorCode::OrderNotFound.category(), ErrorCategory::Order);
        assert_eq!(ErrorCode::InternalError.category(), ErrorCategory::System);
        assert_eq!(ErrorCode::WriteConflict.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_name() {
        assert_eq!(ErrorCategory::General.name(), "general");
        assert_eq!(ErrorCategory::Auth.name(), "auth");
        assert_eq!(ErrorCategory::Cart.name(), "cart");
        assert_eq!(ErrorCategory::Offer.name(), "offer");
        assert_eq!(ErrorCategory::Order.name(), "order");
        assert_eq!(ErrorCategory::System.name(), "system");
    }

    #[test]
    fn test_category_serialize() {
        let category = ErrorCategory::Offer;
        let json = serde_json::to_string(&category).unwrap();
        assert_eq!(json, "\"offer\"");

        let category = ErrorCategory::Cart;
        let json = serde_json::to_string(&category).unwrap();
        assert_eq!(json, "\"cart\"");
    }

    #[test]
    fn test_category_deserialize() {
        let category: ErrorCategory = serde_json::from_str("\"cart\"").unwrap();
        assert_eq!(category, ErrorCategory::Cart);

        let category: ErrorCategory = serde_json::from_str("\"system\"").unwrap();
        assert_eq!(category, ErrorCategory::System);
    }
}

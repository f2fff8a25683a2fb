//! Pricing Module
//!
//! Line-item price resolution for carts. All arithmetic runs on
//! `Decimal` internally and is stored/serialized as `f64`.

pub mod discount;
pub mod money;
pub mod resolver;

pub use discount::{flash_sale_covers, resolve_discounted_price, DiscountCap, DiscountSpec};
pub use money::{to_decimal, to_f64, MAX_PRICE, MAX_QUANTITY, MONEY_TOLERANCE};
pub use resolver::{resolve_unit_prices, PricingInputs, ResolvedPrices};

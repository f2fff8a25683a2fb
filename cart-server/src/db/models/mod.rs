//! Database Models

// Serde helpers
pub mod serde_thing;

// Catalog
pub mod catalog;

// Offers
pub mod offer;
pub mod usage;

// Orders
pub mod order;

// Re-exports
pub use catalog::{Branch, BranchCreate, Deal, DealCreate, DealProduct, Product, ProductCreate};
pub use offer::{Offer, OfferCreate, OfferUpdate};
pub use order::{Order, OrderDiscount, OrderStatus};
pub use usage::UserOfferUsage;

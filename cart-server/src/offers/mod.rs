//! Offer engines
//!
//! Eligibility listing and offer application/reconciliation over a cart
//! snapshot. Both engines are pure over the snapshot and the offer rows
//! the caller fetched; persistence stays in the cart manager.

pub mod application;
pub mod eligibility;

pub use application::{apply_manual, reconcile_auto, remove_manual};
pub use eligibility::{available_offers, EligibilityContext};

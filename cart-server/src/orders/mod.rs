//! Order finalization: checkout, lookup, cancellation, refunds.

pub mod checkout;
pub mod refund;

pub use checkout::CheckoutService;

//! Cart Module
//!
//! This module provides the shared cart types:
//! - Lines: product/deal cart lines with selection price snapshots
//! - Snapshots: the persisted cart aggregate with computed totals
//! - Requests: mutation request bodies and outcomes

pub mod snapshot;
pub mod types;

// Re-exports
pub use snapshot::CartSnapshot;
pub use types::*;

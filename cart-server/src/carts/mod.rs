//! Cart aggregate: storage, signatures, totals, and the manager that
//! ties them to the catalog and offer engines.

pub mod manager;
pub mod signature;
pub mod storage;
pub mod totals;

pub use manager::CartsManager;
pub use storage::CartStore;

#[cfg(test)]
mod tests;

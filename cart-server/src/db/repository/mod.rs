//! Repository Module
//!
//! CRUD access to the embedded SurrealDB tables.

pub mod catalog;
pub mod offer;
pub mod order;
pub mod usage;

// Re-exports
pub use catalog::{BranchRepository, DealRepository, ProductRepository};
pub use offer::OfferRepository;
pub use order::OrderRepository;
pub use usage::UserOfferUsageRepository;

use shared::error::AppError;
use surrealdb::engine::local::Db;
use surrealdb::Surreal;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::not_found(msg),
            RepoError::Duplicate(msg) => AppError::already_exists(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => AppError::database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Strip a "table:" prefix from an id if present, so both the raw key
/// and the full record id are accepted
pub(crate) fn strip_table_prefix<'a>(table: &str, id: &'a str) -> &'a str {
    match id.split_once(':') {
        Some((tb, rest)) if tb == table => rest,
        _ => id,
    }
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

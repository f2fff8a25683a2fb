//! Database Module
//!
//! Embedded SurrealDB for catalog, offers, usage counters, and orders.
//! Cart state lives in the redb store (`crate::carts::storage`).

pub mod models;
pub mod repository;

use shared::error::AppError;
use std::path::Path;
use surrealdb::engine::local::{Db, Mem, RocksDb};
use surrealdb::Surreal;

const NAMESPACE: &str = "ordering";
const DATABASE: &str = "main";

/// Open the on-disk database under the given directory
pub async fn connect(dir: &Path) -> Result<Surreal<Db>, AppError> {
    let db: Surreal<Db> = Surreal::new::<RocksDb>(dir)
        .await
        .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
    db.use_ns(NAMESPACE)
        .use_db(DATABASE)
        .await
        .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;
    tracing::info!(path = %dir.display(), "Database connection established");
    Ok(db)
}

/// Open an in-memory database (for testing)
pub async fn connect_memory() -> Result<Surreal<Db>, AppError> {
    let db: Surreal<Db> = Surreal::new::<Mem>(())
        .await
        .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
    db.use_ns(NAMESPACE)
        .use_db(DATABASE)
        .await
        .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;
    Ok(db)
}

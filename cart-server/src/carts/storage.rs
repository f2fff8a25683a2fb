//! redb-based cart store
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `carts` | `cart_id` | `CartSnapshot` | Current cart state |
//! | `user_carts` | `user_id` | `cart_id` | Owner index |
//!
//! Every cart mutation runs inside one write transaction: load, mutate,
//! save, commit. redb serializes writers, which is strictly stronger than
//! the required per-cart boundary; at this scale that is fine and it makes
//! the dedup check race-free.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use shared::cart::CartSnapshot;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Cart snapshots: key = cart_id, value = JSON-serialized CartSnapshot
const CARTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("carts");

/// Owner index: key = user_id, value = cart_id
const USER_CARTS_TABLE: TableDefinition<&str, &str> = TableDefinition::new("user_carts");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cart not found: {0}")]
    CartNotFound(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for shared::error::AppError {
    fn from(err: StorageError) -> Self {
        use shared::error::{AppError, ErrorCode};
        match err {
            StorageError::CartNotFound(id) => {
                AppError::with_message(ErrorCode::CartNotFound, format!("Cart {id} not found"))
            }
            other => AppError::database(other.to_string()),
        }
    }
}

/// Cart storage backed by redb
#[derive(Clone)]
pub struct CartStore {
    db: Arc<Database>,
}

impl CartStore {
    /// Open or create the database at the given path.
    ///
    /// redb commits with immediate durability: once `commit()` returns the
    /// snapshot is persistent and the file is in a consistent state.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    fn init_tables(&self) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(CARTS_TABLE)?;
            let _ = write_txn.open_table(USER_CARTS_TABLE)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction (the per-cart atomic boundary)
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Within a write transaction ==========

    /// Load a cart inside the write transaction
    pub fn load_in(
        &self,
        txn: &WriteTransaction,
        cart_id: &str,
    ) -> StorageResult<Option<CartSnapshot>> {
        let table = txn.open_table(CARTS_TABLE)?;
        match table.get(cart_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Persist a cart inside the write transaction, maintaining the
    /// owner index
    pub fn save_in(&self, txn: &WriteTransaction, cart: &CartSnapshot) -> StorageResult<()> {
        let bytes = serde_json::to_vec(cart)?;
        {
            let mut table = txn.open_table(CARTS_TABLE)?;
            table.insert(cart.cart_id.as_str(), bytes.as_slice())?;
        }
        if let Some(user_id) = &cart.user_id {
            let mut index = txn.open_table(USER_CARTS_TABLE)?;
            index.insert(user_id.as_str(), cart.cart_id.as_str())?;
        }
        Ok(())
    }

    /// Delete a cart inside the write transaction; clears the owner index
    /// entry when it points at this cart
    pub fn delete_in(&self, txn: &WriteTransaction, cart_id: &str) -> StorageResult<bool> {
        let removed = {
            let mut table = txn.open_table(CARTS_TABLE)?;
            let removed: Option<CartSnapshot> = match table.remove(cart_id)? {
                Some(guard) => Some(serde_json::from_slice(guard.value())?),
                None => None,
            };
            removed
        };
        let Some(cart) = removed else {
            return Ok(false);
        };
        if let Some(user_id) = &cart.user_id {
            let mut index = txn.open_table(USER_CARTS_TABLE)?;
            let points_here = index
                .get(user_id.as_str())?
                .map(|guard| guard.value() == cart_id)
                .unwrap_or(false);
            if points_here {
                index.remove(user_id.as_str())?;
            }
        }
        Ok(true)
    }

    /// The cart currently bound to a user, if any
    pub fn user_cart_in(
        &self,
        txn: &WriteTransaction,
        user_id: &str,
    ) -> StorageResult<Option<String>> {
        let index = txn.open_table(USER_CARTS_TABLE)?;
        Ok(index.get(user_id)?.map(|guard| guard.value().to_string()))
    }

    // ========== Read-only ==========

    /// Load a cart outside any mutation
    pub fn load(&self, cart_id: &str) -> StorageResult<Option<CartSnapshot>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CARTS_TABLE)?;
        match table.get(cart_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }
}

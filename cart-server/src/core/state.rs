use surrealdb::engine::local::Db;
use surrealdb::Surreal;

use crate::carts::{CartStore, CartsManager};
use crate::core::Config;
use crate::orders::CheckoutService;
use shared::error::{AppError, AppResult};

/// Shared server state handed to every handler
///
/// | Field | Type | Purpose |
/// |-------|------|---------|
/// | config | Config | immutable configuration |
/// | db | Surreal<Db> | catalog, offers, usage, orders |
/// | carts | CartsManager | cart mutations over the redb store |
/// | checkout | CheckoutService | cart-to-order finalization |
///
/// Cloning is cheap; all components share their inner handles.
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: Surreal<Db>,
    pub carts: CartsManager,
    pub checkout: CheckoutService,
}

impl ServerState {
    /// Initialize the state in dependency order: work directory layout,
    /// SurrealDB, the redb cart store, then the managers on top
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        config
            .ensure_work_dir_structure()
            .map_err(|e| AppError::internal(format!("Failed to create work directory: {e}")))?;

        let db = crate::db::connect(&config.database_dir()).await?;

        let store = CartStore::open(config.cart_store_path())
            .map_err(|e| AppError::internal(format!("Failed to open cart store: {e}")))?;

        let carts = CartsManager::new(store, db.clone());
        let checkout = CheckoutService::new(carts.clone(), db.clone());

        Ok(Self {
            config: config.clone(),
            db,
            carts,
            checkout,
        })
    }
}

//! Cart Server - online ordering backend
//!
//! # Architecture
//!
//! - **Carts** (`carts`): redb-backed cart store with per-cart atomic
//!   write transactions and signature-based line deduplication
//! - **Pricing** (`pricing`): unit price resolution and flash-sale
//!   discount math on `rust_decimal`
//! - **Offers** (`offers`): eligibility listing, manual application,
//!   and automatic reconciliation of promotional offers
//! - **Orders** (`orders`): cart finalization, refunds, cancellation
//! - **Database** (`db`): embedded SurrealDB for catalog, offers,
//!   usage counters, and orders
//! - **HTTP API** (`api`): RESTful interface over Axum
//!
//! # Module layout
//!
//! ```text
//! cart-server/src/
//! ├── core/          # config, state, server
//! ├── api/           # HTTP routes and handlers
//! ├── carts/         # cart store and mutation manager
//! ├── pricing/       # price resolution
//! ├── offers/        # offer engine
//! ├── orders/        # checkout and refunds
//! ├── db/            # database layer
//! └── utils/         # logging and shared helpers
//! ```

pub mod api;
pub mod carts;
pub mod core;
pub mod db;
pub mod offers;
pub mod orders;
pub mod pricing;
pub mod utils;

// Re-export public types
pub use carts::{CartStore, CartsManager};
pub use core::{Config, Server, ServerState};
pub use orders::CheckoutService;
pub use utils::{ApiResponse, AppError, AppResult, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// Load .env and initialize logging from the resulting environment
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenv::dotenv();

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());

    Ok(())
}

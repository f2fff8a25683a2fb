//! Catalog repositories: read lookups plus create-for-seeding

use super::{strip_table_prefix, BaseRepository, RepoError, RepoResult};
use crate::db::models::{Branch, BranchCreate, Deal, DealCreate, Product, ProductCreate};
use surrealdb::engine::local::Db;
use surrealdb::Surreal;

const PRODUCT_TABLE: &str = "product";
const DEAL_TABLE: &str = "deal";
const BRANCH_TABLE: &str = "branch";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let pure_id = strip_table_prefix(PRODUCT_TABLE, id);
        let product: Option<Product> = self.base.db().select((PRODUCT_TABLE, pure_id)).await?;
        Ok(product)
    }

    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        let product = Product {
            id: None,
            title: data.title,
            description: data.description,
            price: data.price,
            is_customizable: data.is_customizable,
            flash_sale_discount: data.flash_sale_discount,
            flash_sale_is_percentage: data.flash_sale_is_percentage,
            created_at: chrono::Utc::now().timestamp_millis(),
        };
        let created: Option<Product> = self.base.db().create(PRODUCT_TABLE).content(product).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }
}

#[derive(Clone)]
pub struct DealRepository {
    base: BaseRepository,
}

impl DealRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Deal>> {
        let pure_id = strip_table_prefix(DEAL_TABLE, id);
        let deal: Option<Deal> = self.base.db().select((DEAL_TABLE, pure_id)).await?;
        Ok(deal)
    }

    pub async fn create(&self, data: DealCreate) -> RepoResult<Deal> {
        let deal = Deal {
            id: None,
            title: data.title,
            description: data.description,
            price: data.price,
            is_expandable: data.is_expandable,
            is_active: true,
            flash_sale_discount: data.flash_sale_discount,
            flash_sale_is_percentage: data.flash_sale_is_percentage,
            created_at: chrono::Utc::now().timestamp_millis(),
        };
        let created: Option<Deal> = self.base.db().create(DEAL_TABLE).content(deal).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create deal".to_string()))
    }
}

#[derive(Clone)]
pub struct BranchRepository {
    base: BaseRepository,
}

impl BranchRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Branch>> {
        let pure_id = strip_table_prefix(BRANCH_TABLE, id);
        let branch: Option<Branch> = self.base.db().select((BRANCH_TABLE, pure_id)).await?;
        Ok(branch)
    }

    pub async fn create(&self, data: BranchCreate) -> RepoResult<Branch> {
        let branch = Branch {
            id: None,
            name: data.name,
            delivery_fee: data.delivery_fee,
        };
        let created: Option<Branch> = self.base.db().create(BRANCH_TABLE).content(branch).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create branch".to_string()))
    }
}

//! Catalog models: products, deals, deal components, branches
//!
//! The engine only reads the catalog; create DTOs exist for seeding and
//! tests. Catalog administration is handled elsewhere.

use super::serde_thing;
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(default, with = "serde_thing::option")]
    pub id: Option<Thing>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Base price, used when a line has no priced customizations
    pub price: f64,
    #[serde(default)]
    pub is_customizable: bool,
    /// Item-level flash-sale discount; overrides the offer-level value
    #[serde(default)]
    pub flash_sale_discount: Option<f64>,
    #[serde(default)]
    pub flash_sale_is_percentage: bool,
    #[serde(default)]
    pub created_at: i64,
}

impl Product {
    pub fn id_string(&self) -> String {
        serde_thing::id_string(&self.id)
    }
}

/// Product create DTO (seeding/tests)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub is_customizable: bool,
    #[serde(default)]
    pub flash_sale_discount: Option<f64>,
    #[serde(default)]
    pub flash_sale_is_percentage: bool,
}

/// Deal entity: a composed bundle priced as a whole
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deal {
    #[serde(default, with = "serde_thing::option")]
    pub id: Option<Thing>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub is_expandable: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub flash_sale_discount: Option<f64>,
    #[serde(default)]
    pub flash_sale_is_percentage: bool,
    #[serde(default)]
    pub created_at: i64,
}

impl Deal {
    pub fn id_string(&self) -> String {
        serde_thing::id_string(&self.id)
    }
}

/// Deal create DTO (seeding/tests)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealCreate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub is_expandable: bool,
    #[serde(default)]
    pub flash_sale_discount: Option<f64>,
    #[serde(default)]
    pub flash_sale_is_percentage: bool,
}

/// Component of a deal; customizations on deal lines reference it so a
/// deal of several products can carry distinct selections per component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealProduct {
    #[serde(default, with = "serde_thing::option")]
    pub id: Option<Thing>,
    #[serde(with = "serde_thing")]
    pub deal: Thing,
    #[serde(with = "serde_thing")]
    pub product: Thing,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

/// Branch entity; determines the delivery fee
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    #[serde(default, with = "serde_thing::option")]
    pub id: Option<Thing>,
    pub name: String,
    pub delivery_fee: f64,
}

impl Branch {
    pub fn id_string(&self) -> String {
        serde_thing::id_string(&self.id)
    }
}

/// Branch create DTO (seeding/tests)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchCreate {
    pub name: String,
    pub delivery_fee: f64,
}

fn default_true() -> bool {
    true
}

fn default_quantity() -> i32 {
    1
}

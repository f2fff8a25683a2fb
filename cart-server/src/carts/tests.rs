//! End-to-end cart scenarios against in-memory storage

use crate::carts::{CartStore, CartsManager};
use crate::db::connect_memory;
use crate::db::models::{OfferCreate, ProductCreate};
use crate::db::repository::{OfferRepository, ProductRepository};
use shared::cart::{AddItemInput, CartUpdate, CustomizationSelection, UpdateItemInput};
use shared::error::ErrorCode;
use shared::offer::{OfferType, UsageScope};

struct Fixture {
    manager: CartsManager,
    products: ProductRepository,
    offers: OfferRepository,
}

async fn fixture() -> Fixture {
    let db = connect_memory().await.unwrap();
    let store = CartStore::open_in_memory().unwrap();
    Fixture {
        manager: CartsManager::new(store, db.clone()),
        products: ProductRepository::new(db.clone()),
        offers: OfferRepository::new(db),
    }
}

impl Fixture {
    async fn product(&self, price: f64, flash_discount: Option<f64>) -> String {
        self.products
            .create(ProductCreate {
                title: "Burger".into(),
                description: None,
                price,
                is_customizable: false,
                flash_sale_discount: flash_discount,
                flash_sale_is_percentage: true,
            })
            .await
            .unwrap()
            .id_string()
    }

    async fn offer(&self, create: OfferCreate) -> String {
        self.offers.create(create).await.unwrap().id_string()
    }
}

fn offer_create(code: &str, offer_type: OfferType) -> OfferCreate {
    let now = chrono::Utc::now().timestamp_millis();
    OfferCreate {
        code: code.to_string(),
        offer_type,
        description: String::new(),
        discount_value: None,
        min_spend: None,
        max_discount: None,
        valid_from: now - 1_000,
        valid_until: now + 3_600_000,
        is_active: true,
        auto_apply: false,
        near_unlock_threshold: None,
        is_percentage: false,
        usage_limit: None,
        usage_scope: UsageScope::default(),
        per_user_limit: None,
        applicable_products: vec![],
        applicable_deals: vec![],
        free_products: vec![],
        free_deals: vec![],
        free_item_quantity: 1,
        branch: None,
    }
}

fn add_product(product_id: &str, cart_id: Option<&str>, quantity: i32) -> AddItemInput {
    AddItemInput {
        cart_id: cart_id.map(str::to_string),
        branch_id: None,
        product_id: Some(product_id.to_string()),
        deal_id: None,
        total_price: None,
        quantity,
        customizations: vec![],
        expandable_choices: vec![],
    }
}

#[tokio::test]
async fn test_baseline_totals_without_offers() {
    let fx = fixture().await;
    let product = fx.product(100.0, None).await;

    let cart = fx.manager.add_item(None, add_product(&product, None, 2)).await.unwrap();

    assert_eq!(cart.subtotal, 200.0);
    assert_eq!(cart.delivery_fee, 5.0);
    assert_eq!(cart.tax_amount, 20.0);
    assert!(cart.discounts.is_empty());
    assert_eq!(cart.total, 225.0);
}

#[tokio::test]
async fn test_manual_flat_offer_reduces_total() {
    let fx = fixture().await;
    let product = fx.product(100.0, None).await;
    let mut create = offer_create("FLAT20", OfferType::Flat);
    create.discount_value = Some(20.0);
    create.min_spend = Some(100.0);
    let offer_id = fx.offer(create).await;

    let cart = fx.manager.add_item(None, add_product(&product, None, 2)).await.unwrap();
    let cart = fx.manager.apply_offer(None, &cart.cart_id, &offer_id).await.unwrap();

    assert_eq!(cart.discounts.len(), 1);
    assert_eq!(cart.discounts[0].code, "FLAT20");
    assert_eq!(cart.discounts[0].amount, 20.0);
    assert_eq!(cart.total, 205.0);
}

#[tokio::test]
async fn test_flash_sale_savings_not_double_counted() {
    let fx = fixture().await;
    // Store-wide flash sale covering items with their own 10% discount
    let product = fx.product(100.0, Some(10.0)).await;
    let mut create = offer_create("FLASH10", OfferType::FlashSale);
    create.discount_value = Some(10.0);
    create.is_percentage = true;
    fx.offer(create).await;

    let cart = fx.manager.add_item(None, add_product(&product, None, 2)).await.unwrap();

    // Flash sale auto-applied, sale price embedded in the subtotal
    assert!(cart.offers.iter().any(|o| o.code == "FLASH10"));
    assert_eq!(cart.lines[0].unit_sale_price, Some(90.0));
    assert_eq!(cart.subtotal, 180.0);
    assert_eq!(cart.tax_amount, 18.0);
    // Savings reported against the flash code, total not reduced again
    assert_eq!(cart.discounts.len(), 1);
    assert_eq!(cart.discounts[0].code, "FLASH10");
    assert_eq!(cart.discounts[0].amount, 20.0);
    assert_eq!(cart.total, 203.0);
}

#[tokio::test]
async fn test_same_configuration_merges_into_one_line() {
    let fx = fixture().await;
    let product = fx.product(50.0, None).await;

    let custom = CustomizationSelection {
        choice_id: "extra-cheese".into(),
        deal_product_id: None,
        price: 52.0,
        original_price: 52.0,
    };
    let mut first = add_product(&product, None, 1);
    first.customizations = vec![custom.clone()];
    let cart = fx.manager.add_item(None, first).await.unwrap();

    let mut second = add_product(&product, Some(&cart.cart_id), 1);
    second.customizations = vec![custom];
    let cart = fx.manager.add_item(None, second).await.unwrap();

    assert_eq!(cart.lines.len(), 1);
    assert_eq!(cart.lines[0].quantity, 2);

    // A different configuration stays separate
    let cart = fx
        .manager
        .add_item(None, add_product(&product, Some(&cart.cart_id), 1))
        .await
        .unwrap();
    assert_eq!(cart.lines.len(), 2);
}

#[tokio::test]
async fn test_update_item_merges_into_matching_line() {
    let fx = fixture().await;
    let product = fx.product(50.0, None).await;

    let custom = CustomizationSelection {
        choice_id: "no-onion".into(),
        deal_product_id: None,
        price: 50.0,
        original_price: 50.0,
    };
    let mut with_custom = add_product(&product, None, 1);
    with_custom.customizations = vec![custom];
    let cart = fx.manager.add_item(None, with_custom).await.unwrap();
    let cart = fx
        .manager
        .add_item(None, add_product(&product, Some(&cart.cart_id), 2))
        .await
        .unwrap();
    assert_eq!(cart.lines.len(), 2);

    // Editing the customized line to the plain configuration collapses
    // both into one
    let edited = cart.lines.iter().find(|l| !l.customizations.is_empty()).unwrap();
    let update = UpdateItemInput {
        product_id: Some(product.clone()),
        deal_id: None,
        total_price: None,
        quantity: 1,
        customizations: vec![],
        expandable_choices: vec![],
    };
    let outcome = fx
        .manager
        .update_item(None, &cart.cart_id, &edited.line_id, update)
        .await
        .unwrap();
    let CartUpdate::Updated(cart) = outcome else {
        panic!("cart should survive the edit");
    };
    assert_eq!(cart.lines.len(), 1);
    assert_eq!(cart.lines[0].quantity, 3);
}

#[tokio::test]
async fn test_removing_last_paid_line_deletes_cart() {
    let fx = fixture().await;
    let product = fx.product(100.0, None).await;
    let mut create = offer_create("BOGO", OfferType::Bogo);
    create.auto_apply = true;
    create.free_products = vec![product.clone()];
    fx.offer(create).await;

    let cart = fx.manager.add_item(None, add_product(&product, None, 1)).await.unwrap();
    assert_eq!(cart.free_lines().count(), 1);
    let paid = cart.paid_lines().next().unwrap().line_id.clone();

    let outcome = fx.manager.remove_item(None, &cart.cart_id, &paid).await.unwrap();
    assert_eq!(outcome, CartUpdate::Deleted);

    let err = fx.manager.get_cart(None, &cart.cart_id).unwrap_err();
    assert_eq!(err.code, ErrorCode::CartNotFound);
}

#[tokio::test]
async fn test_quantity_change_drops_offer_below_min_spend() {
    let fx = fixture().await;
    let product = fx.product(100.0, None).await;
    let mut create = offer_create("AUTO20", OfferType::Flat);
    create.discount_value = Some(20.0);
    create.min_spend = Some(200.0);
    create.auto_apply = true;
    fx.offer(create).await;

    let cart = fx.manager.add_item(None, add_product(&product, None, 2)).await.unwrap();
    assert!(cart.offers.iter().any(|o| o.code == "AUTO20"));
    assert_eq!(cart.total, 205.0);

    let line_id = cart.lines[0].line_id.clone();
    let outcome = fx
        .manager
        .set_quantity(None, &cart.cart_id, &line_id, 1)
        .await
        .unwrap();
    let CartUpdate::Updated(cart) = outcome else {
        panic!("cart should survive");
    };
    assert!(cart.offers.is_empty());
    assert_eq!(cart.total, 115.0);
}

#[tokio::test]
async fn test_merge_binds_cart_and_replaces_previous() {
    let fx = fixture().await;
    let product = fx.product(30.0, None).await;

    let first = fx.manager.add_item(Some("user-1"), add_product(&product, None, 1)).await.unwrap();
    assert_eq!(first.user_id.as_deref(), Some("user-1"));

    // Anonymous cart built on another device
    let anon = fx.manager.add_item(None, add_product(&product, None, 2)).await.unwrap();
    assert!(anon.user_id.is_none());

    let merged = fx.manager.merge_cart("user-1", &anon.cart_id).await.unwrap();
    assert_eq!(merged.user_id.as_deref(), Some("user-1"));
    assert_eq!(merged.cart_id, anon.cart_id);

    // The previous cart is gone, the merged one is readable by its owner
    let err = fx.manager.get_cart(Some("user-1"), &first.cart_id).unwrap_err();
    assert_eq!(err.code, ErrorCode::CartNotFound);
    let cart = fx.manager.get_cart(Some("user-1"), &merged.cart_id).unwrap();
    assert_eq!(cart.lines[0].quantity, 2);

    // Someone else's cart stays invisible
    let err = fx.manager.get_cart(Some("user-2"), &merged.cart_id).unwrap_err();
    assert_eq!(err.code, ErrorCode::CartNotFound);
}

#[tokio::test]
async fn test_available_offers_partition() {
    let fx = fixture().await;
    let product = fx.product(100.0, None).await;

    let mut met = offer_create("MET", OfferType::Flat);
    met.discount_value = Some(10.0);
    met.min_spend = Some(100.0);
    fx.offer(met).await;

    let mut near = offer_create("NEAR", OfferType::Flat);
    near.discount_value = Some(30.0);
    near.min_spend = Some(150.0);
    fx.offer(near).await;

    let cart = fx.manager.add_item(None, add_product(&product, None, 1)).await.unwrap();
    // pre-discount total 115.00
    let listed = fx.manager.available_offers(None, &cart.cart_id).await.unwrap();
    assert_eq!(listed.available.len(), 1);
    assert_eq!(listed.available[0].code, "MET");
    assert_eq!(listed.near_unlock.len(), 1);
    assert_eq!(listed.near_unlock[0].code, "NEAR");
}

#[tokio::test]
async fn test_take_cart_removes_it_atomically() {
    let fx = fixture().await;
    let product = fx.product(100.0, None).await;

    let cart = fx.manager.add_item(None, add_product(&product, None, 1)).await.unwrap();
    let taken = fx.manager.take_cart(None, &cart.cart_id).unwrap();
    assert_eq!(taken.cart_id, cart.cart_id);

    let err = fx.manager.get_cart(None, &cart.cart_id).unwrap_err();
    assert_eq!(err.code, ErrorCode::CartNotFound);

    // Downstream failure path: the cart can be put back
    fx.manager.restore_cart(&taken).unwrap();
    assert!(fx.manager.get_cart(None, &cart.cart_id).is_ok());
}

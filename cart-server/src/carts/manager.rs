//! Cart manager
//!
//! Orchestrates every cart mutation: catalog and offer rows are gathered
//! up front, then the mutation runs inside one redb write transaction
//! (load, mutate, reconcile auto offers, recompute totals, save). The
//! signature cache is consulted as a merge hint only and rebuilt from the
//! committed state.

use crate::carts::signature::{line_signature, signature_of, SignatureCache};
use crate::carts::storage::CartStore;
use crate::carts::totals::{recompute_totals, DEFAULT_DELIVERY_FEE};
use crate::db::models::Offer;
use crate::db::repository::{
    BranchRepository, DealRepository, OfferRepository, ProductRepository,
    UserOfferUsageRepository,
};
use crate::offers::{apply_manual, available_offers, reconcile_auto, remove_manual};
use crate::offers::eligibility::EligibilityContext;
use crate::pricing::{resolve_unit_prices, PricingInputs};
use crate::pricing::money::{validate_quantity, MAX_QUANTITY};
use redb::WriteTransaction;
use shared::cart::{
    AddItemInput, CartLine, CartSnapshot, CartUpdate, LineKind, UpdateItemInput,
};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::offer::AvailableOffers;
use std::collections::{HashMap, HashSet};
use surrealdb::engine::local::Db;
use surrealdb::Surreal;

/// Everything a mutation needs beyond the snapshot itself, fetched
/// before the write transaction opens
struct MutationContext {
    now_ms: i64,
    delivery_fee: f64,
    /// Active offers plus the rows of currently applied offers, by id
    offer_records: HashMap<String, Offer>,
    flash_sale: Option<Offer>,
    user_usage: HashMap<String, i64>,
    own_discount_items: HashSet<String>,
}

impl MutationContext {
    fn eligibility<'a>(&'a self, user_id: Option<&'a str>) -> EligibilityContext<'a> {
        EligibilityContext {
            now_ms: self.now_ms,
            user_id,
            user_usage: &self.user_usage,
            own_discount_items: &self.own_discount_items,
        }
    }
}

/// Catalog facts needed to price one line
struct LinePricing {
    base_price: f64,
    deal_total: Option<f64>,
    own_discount: Option<f64>,
    own_is_percentage: bool,
}

/// Cart orchestration facade used by the HTTP handlers
#[derive(Clone)]
pub struct CartsManager {
    store: CartStore,
    signatures: std::sync::Arc<SignatureCache>,
    products: ProductRepository,
    deals: DealRepository,
    branches: BranchRepository,
    offers: OfferRepository,
    usage: UserOfferUsageRepository,
}

impl CartsManager {
    pub fn new(store: CartStore, db: Surreal<Db>) -> Self {
        Self {
            store,
            signatures: std::sync::Arc::new(SignatureCache::new()),
            products: ProductRepository::new(db.clone()),
            deals: DealRepository::new(db.clone()),
            branches: BranchRepository::new(db.clone()),
            offers: OfferRepository::new(db.clone()),
            usage: UserOfferUsageRepository::new(db),
        }
    }

    // ========== Reads ==========

    /// Load a cart as last committed
    pub fn get_cart(&self, user_id: Option<&str>, cart_id: &str) -> AppResult<CartSnapshot> {
        let cart = self
            .store
            .load(cart_id)?
            .ok_or_else(|| AppError::new(ErrorCode::CartNotFound))?;
        authorize(&cart, user_id)?;
        Ok(cart)
    }

    /// List offers the cart can use now, and those within reach
    pub async fn available_offers(
        &self,
        user_id: Option<&str>,
        cart_id: &str,
    ) -> AppResult<AvailableOffers> {
        let cart = self.get_cart(user_id, cart_id)?;
        let ctx = self
            .gather(Some(&cart), None, cart.branch_id.as_deref(), user_id)
            .await?;
        let mut offers: Vec<Offer> = ctx.offer_records.values().cloned().collect();
        offers.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(available_offers(
            &cart,
            &offers,
            ctx.delivery_fee,
            &ctx.eligibility(user_id),
        ))
    }

    // ========== Mutations ==========

    /// Add an item, creating the cart when no known cart id is given.
    ///
    /// A paid line with the same signature absorbs the quantity instead
    /// of a second line appearing.
    pub async fn add_item(
        &self,
        user_id: Option<&str>,
        input: AddItemInput,
    ) -> AppResult<CartSnapshot> {
        let kind = LineKind::from_ids(input.product_id.clone(), input.deal_id.clone())?;
        validate_quantity(input.quantity)?;

        let existing = match input.cart_id.as_deref() {
            Some(id) => self.store.load(id)?,
            None => None,
        };
        let branch_hint = existing
            .as_ref()
            .and_then(|c| c.branch_id.as_deref())
            .or(input.branch_id.as_deref());
        let ctx = self
            .gather(existing.as_ref(), Some(&kind), branch_hint, user_id)
            .await?;
        let pricing = self.line_pricing(&kind, input.total_price).await?;

        let prices = resolve_unit_prices(
            &kind,
            false,
            &input.customizations,
            &input.expandable_choices,
            &PricingInputs {
                base_price: pricing.base_price,
                deal_total: pricing.deal_total,
                flash_sale: ctx.flash_sale.as_ref(),
                own_discount: pricing.own_discount,
                own_is_percentage: pricing.own_is_percentage,
            },
        )?;
        let signature = line_signature(&kind, &input.customizations, &input.expandable_choices);

        let outcome = self.write_with_retry(|| {
            let txn = self.store.begin_write()?;
            let mut cart = match input.cart_id.as_deref() {
                Some(id) => self.store.load_in(&txn, id)?,
                None => None,
            }
            .unwrap_or_else(|| {
                let mut cart = CartSnapshot::new(uuid::Uuid::new_v4().to_string());
                cart.user_id = user_id.map(str::to_string);
                cart.branch_id = input.branch_id.clone();
                tracing::info!(cart_id = %cart.cart_id, "created cart");
                cart
            });
            authorize(&cart, user_id)?;

            // Cache hint first, always verified against the lines just
            // loaded inside this transaction
            let target = self
                .signatures
                .lookup(&cart.cart_id, &signature)
                .and_then(|line_id| {
                    cart.lines.iter().position(|l| {
                        l.line_id == line_id && !l.is_free && signature_of(l) == signature
                    })
                })
                .or_else(|| {
                    cart.lines
                        .iter()
                        .position(|l| !l.is_free && signature_of(l) == signature)
                });
            match target {
                Some(index) => {
                    let merged = cart.lines[index].quantity.saturating_add(input.quantity);
                    cart.lines[index].quantity = merged.min(MAX_QUANTITY);
                }
                None => cart.lines.push(CartLine {
                    line_id: uuid::Uuid::new_v4().to_string(),
                    kind: kind.clone(),
                    quantity: input.quantity,
                    is_free: false,
                    granted_by: None,
                    unit_price: prices.unit_price,
                    unit_sale_price: prices.unit_sale_price,
                    customizations: input.customizations.clone(),
                    extras: input.expandable_choices.clone(),
                }),
            }

            self.finish_in(txn, cart, &ctx, user_id)
        })?;

        match outcome {
            CartUpdate::Updated(cart) => Ok(cart),
            // add_item always leaves at least one paid line
            CartUpdate::Deleted => Err(AppError::internal("cart vanished while adding an item")),
        }
    }

    /// Replace a line's selections; re-priced and re-deduplicated
    pub async fn update_item(
        &self,
        user_id: Option<&str>,
        cart_id: &str,
        line_id: &str,
        input: UpdateItemInput,
    ) -> AppResult<CartUpdate> {
        let kind = LineKind::from_ids(input.product_id.clone(), input.deal_id.clone())?;
        validate_quantity(input.quantity)?;

        let existing = self.store.load(cart_id)?;
        let branch_hint = existing.as_ref().and_then(|c| c.branch_id.as_deref());
        let ctx = self
            .gather(existing.as_ref(), Some(&kind), branch_hint, user_id)
            .await?;
        let pricing = self.line_pricing(&kind, input.total_price).await?;

        let prices = resolve_unit_prices(
            &kind,
            false,
            &input.customizations,
            &input.expandable_choices,
            &PricingInputs {
                base_price: pricing.base_price,
                deal_total: pricing.deal_total,
                flash_sale: ctx.flash_sale.as_ref(),
                own_discount: pricing.own_discount,
                own_is_percentage: pricing.own_is_percentage,
            },
        )?;
        let signature = line_signature(&kind, &input.customizations, &input.expandable_choices);

        self.write_with_retry(|| {
            let txn = self.store.begin_write()?;
            let mut cart = self.load_cart_in(&txn, cart_id)?;
            authorize(&cart, user_id)?;

            let index = paid_line_index(&cart, line_id)?;
            let merge_target = cart.lines.iter().position(|l| {
                l.line_id != line_id && !l.is_free && signature_of(l) == signature
            });
            match merge_target {
                Some(other) => {
                    let merged = cart.lines[other].quantity.saturating_add(input.quantity);
                    cart.lines[other].quantity = merged.min(MAX_QUANTITY);
                    cart.lines.remove(index);
                }
                None => {
                    let line = &mut cart.lines[index];
                    line.kind = kind.clone();
                    line.quantity = input.quantity;
                    line.unit_price = prices.unit_price;
                    line.unit_sale_price = prices.unit_sale_price;
                    line.customizations = input.customizations.clone();
                    line.extras = input.expandable_choices.clone();
                }
            }

            self.finish_in(txn, cart, &ctx, user_id)
        })
    }

    /// Set a line's quantity; zero removes it. Removing the last paid
    /// line deletes the cart.
    pub async fn set_quantity(
        &self,
        user_id: Option<&str>,
        cart_id: &str,
        line_id: &str,
        quantity: i32,
    ) -> AppResult<CartUpdate> {
        if quantity != 0 {
            validate_quantity(quantity)?;
        }

        let existing = self.store.load(cart_id)?;
        let branch_hint = existing.as_ref().and_then(|c| c.branch_id.as_deref());
        let ctx = self
            .gather(existing.as_ref(), None, branch_hint, user_id)
            .await?;

        self.write_with_retry(|| {
            let txn = self.store.begin_write()?;
            let mut cart = self.load_cart_in(&txn, cart_id)?;
            authorize(&cart, user_id)?;

            let index = paid_line_index(&cart, line_id)?;
            if quantity == 0 {
                cart.lines.remove(index);
            } else {
                cart.lines[index].quantity = quantity;
            }

            self.finish_in(txn, cart, &ctx, user_id)
        })
    }

    /// Remove a paid line outright; same semantics as quantity zero
    pub async fn remove_item(
        &self,
        user_id: Option<&str>,
        cart_id: &str,
        line_id: &str,
    ) -> AppResult<CartUpdate> {
        self.set_quantity(user_id, cart_id, line_id, 0).await
    }

    /// Manually apply an offer; at most one manual offer per cart
    pub async fn apply_offer(
        &self,
        user_id: Option<&str>,
        cart_id: &str,
        offer_id: &str,
    ) -> AppResult<CartSnapshot> {
        let offer = self
            .offers
            .find_by_id(offer_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::OfferNotFound))?;

        let existing = self.store.load(cart_id)?;
        let branch_hint = existing.as_ref().and_then(|c| c.branch_id.as_deref());
        let mut ctx = self
            .gather(existing.as_ref(), None, branch_hint, user_id)
            .await?;
        ctx.offer_records
            .entry(offer.id_string())
            .or_insert_with(|| offer.clone());

        let outcome = self.write_with_retry(|| {
            let txn = self.store.begin_write()?;
            let mut cart = self.load_cart_in(&txn, cart_id)?;
            authorize(&cart, user_id)?;
            apply_manual(&mut cart, &offer, ctx.delivery_fee, &ctx.eligibility(user_id))?;
            self.finish_in(txn, cart, &ctx, user_id)
        })?;

        match outcome {
            CartUpdate::Updated(cart) => Ok(cart),
            CartUpdate::Deleted => Err(AppError::new(ErrorCode::CartNotFound)),
        }
    }

    /// Remove a manually-applied offer
    pub async fn remove_offer(
        &self,
        user_id: Option<&str>,
        cart_id: &str,
        offer_id: &str,
    ) -> AppResult<CartSnapshot> {
        let existing = self.store.load(cart_id)?;
        let branch_hint = existing.as_ref().and_then(|c| c.branch_id.as_deref());
        let ctx = self
            .gather(existing.as_ref(), None, branch_hint, user_id)
            .await?;

        let outcome = self.write_with_retry(|| {
            let txn = self.store.begin_write()?;
            let mut cart = self.load_cart_in(&txn, cart_id)?;
            authorize(&cart, user_id)?;
            remove_manual(&mut cart, offer_id)?;
            self.finish_in(txn, cart, &ctx, user_id)
        })?;

        match outcome {
            CartUpdate::Updated(cart) => Ok(cart),
            CartUpdate::Deleted => Err(AppError::new(ErrorCode::CartNotFound)),
        }
    }

    /// Bind an anonymous cart to the authenticated user.
    ///
    /// A cart the user already owns is a no-op; a cart owned by someone
    /// else is invisible. The user's previous cart, if different, is
    /// replaced.
    pub async fn merge_cart(&self, user_id: &str, cart_id: &str) -> AppResult<CartSnapshot> {
        let existing = self.store.load(cart_id)?;
        let branch_hint = existing.as_ref().and_then(|c| c.branch_id.as_deref());
        let ctx = self
            .gather(existing.as_ref(), None, branch_hint, Some(user_id))
            .await?;

        let outcome = self.write_with_retry(|| {
            let txn = self.store.begin_write()?;
            let mut cart = self.load_cart_in(&txn, cart_id)?;
            match &cart.user_id {
                Some(owner) if owner == user_id => {}
                Some(_) => return Err(AppError::new(ErrorCode::CartNotFound)),
                None => {
                    if let Some(previous) = self.store.user_cart_in(&txn, user_id)?
                        && previous != cart_id
                    {
                        self.store.delete_in(&txn, &previous)?;
                        self.signatures.invalidate(&previous);
                        tracing::info!(
                            user_id,
                            cart_id = %previous,
                            "replaced previous cart on merge"
                        );
                    }
                    cart.user_id = Some(user_id.to_string());
                }
            }
            self.finish_in(txn, cart, &ctx, Some(user_id))
        })?;

        match outcome {
            CartUpdate::Updated(cart) => Ok(cart),
            CartUpdate::Deleted => Err(AppError::new(ErrorCode::CartNotFound)),
        }
    }

    /// Atomically detach a cart for order finalization: the snapshot is
    /// returned as last committed and the cart ceases to exist.
    pub fn take_cart(&self, user_id: Option<&str>, cart_id: &str) -> AppResult<CartSnapshot> {
        self.write_with_retry(|| {
            let txn = self.store.begin_write()?;
            let cart = self.load_cart_in(&txn, cart_id)?;
            authorize(&cart, user_id)?;
            if !cart.has_paid_lines() {
                return Err(AppError::new(ErrorCode::CartEmpty));
            }
            self.store.delete_in(&txn, cart_id)?;
            txn.commit().map_err(crate::carts::storage::StorageError::from)?;
            self.signatures.invalidate(cart_id);
            Ok(cart)
        })
    }

    /// Put a taken cart back (finalization failed downstream)
    pub fn restore_cart(&self, cart: &CartSnapshot) -> AppResult<()> {
        let txn = self.store.begin_write()?;
        self.store.save_in(&txn, cart)?;
        txn.commit().map_err(crate::carts::storage::StorageError::from)?;
        self.signatures.store(&cart.cart_id, &cart.lines);
        Ok(())
    }

    // ========== Internals ==========

    async fn gather(
        &self,
        cart: Option<&CartSnapshot>,
        extra_kind: Option<&LineKind>,
        branch_id: Option<&str>,
        user_id: Option<&str>,
    ) -> AppResult<MutationContext> {
        let now_ms = chrono::Utc::now().timestamp_millis();

        let mut offer_records: HashMap<String, Offer> = HashMap::new();
        for offer in self.offers.find_active(now_ms).await? {
            offer_records.insert(offer.id_string(), offer);
        }
        if let Some(cart) = cart {
            for applied in &cart.offers {
                if !offer_records.contains_key(&applied.offer_id)
                    && let Some(offer) = self.offers.find_by_id(&applied.offer_id).await?
                {
                    offer_records.insert(applied.offer_id.clone(), offer);
                }
            }
        }
        let flash_sale = self.offers.find_active_flash_sale(now_ms).await?;

        let user_usage = match user_id {
            Some(user) => self.usage.counts_for_user(user).await?,
            None => HashMap::new(),
        };

        let mut kinds: HashSet<LineKind> = HashSet::new();
        if let Some(cart) = cart {
            kinds.extend(cart.paid_lines().map(|l| l.kind.clone()));
        }
        if let Some(kind) = extra_kind {
            kinds.insert(kind.clone());
        }
        let mut own_discount_items = HashSet::new();
        for kind in &kinds {
            let has_own = match kind {
                LineKind::Product { product_id } => self
                    .products
                    .find_by_id(product_id)
                    .await?
                    .map(|p| p.flash_sale_discount.is_some())
                    .unwrap_or(false),
                LineKind::Deal { deal_id } => self
                    .deals
                    .find_by_id(deal_id)
                    .await?
                    .map(|d| d.flash_sale_discount.is_some())
                    .unwrap_or(false),
            };
            if has_own {
                own_discount_items.insert(kind.catalog_id().to_string());
            }
        }

        let delivery_fee = match branch_id {
            Some(branch) => self
                .branches
                .find_by_id(branch)
                .await?
                .map(|b| b.delivery_fee)
                .unwrap_or(DEFAULT_DELIVERY_FEE),
            None => DEFAULT_DELIVERY_FEE,
        };

        Ok(MutationContext {
            now_ms,
            delivery_fee,
            offer_records,
            flash_sale,
            user_usage,
            own_discount_items,
        })
    }

    async fn line_pricing(
        &self,
        kind: &LineKind,
        total_price: Option<f64>,
    ) -> AppResult<LinePricing> {
        match kind {
            LineKind::Product { product_id } => {
                let product = self
                    .products
                    .find_by_id(product_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Product"))?;
                Ok(LinePricing {
                    base_price: product.price,
                    deal_total: None,
                    own_discount: product.flash_sale_discount,
                    own_is_percentage: product.flash_sale_is_percentage,
                })
            }
            LineKind::Deal { deal_id } => {
                let deal = self
                    .deals
                    .find_by_id(deal_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Deal"))?;
                if !deal.is_active {
                    return Err(AppError::invalid_request("Deal is no longer available"));
                }
                Ok(LinePricing {
                    base_price: deal.price,
                    deal_total: total_price,
                    own_discount: deal.flash_sale_discount,
                    own_is_percentage: deal.flash_sale_is_percentage,
                })
            }
        }
    }

    /// Reconcile, recompute totals, persist, commit, refresh the cache.
    /// Deletes the cart instead when no paid lines remain.
    fn finish_in(
        &self,
        txn: WriteTransaction,
        mut cart: CartSnapshot,
        ctx: &MutationContext,
        user_id: Option<&str>,
    ) -> AppResult<CartUpdate> {
        if !cart.has_paid_lines() {
            self.store.delete_in(&txn, &cart.cart_id)?;
            txn.commit().map_err(crate::carts::storage::StorageError::from)?;
            self.signatures.invalidate(&cart.cart_id);
            tracing::info!(cart_id = %cart.cart_id, "cart deleted, no paid lines remain");
            return Ok(CartUpdate::Deleted);
        }

        reconcile_auto(
            &mut cart,
            &ctx.offer_records,
            ctx.delivery_fee,
            &ctx.eligibility(user_id),
        );
        recompute_totals(&mut cart, &ctx.offer_records, ctx.delivery_fee, ctx.now_ms);
        cart.updated_at = ctx.now_ms;

        self.store.save_in(&txn, &cart)?;
        txn.commit().map_err(crate::carts::storage::StorageError::from)?;
        self.signatures.store(&cart.cart_id, &cart.lines);
        Ok(CartUpdate::Updated(cart))
    }

    fn load_cart_in(&self, txn: &WriteTransaction, cart_id: &str) -> AppResult<CartSnapshot> {
        self.store
            .load_in(txn, cart_id)?
            .ok_or_else(|| AppError::new(ErrorCode::CartNotFound))
    }

    /// Run a write once, retrying a single time on storage failure;
    /// domain errors are deterministic and surface immediately
    fn write_with_retry<T>(&self, op: impl Fn() -> AppResult<T>) -> AppResult<T> {
        match op() {
            Err(err) if err.code == ErrorCode::DatabaseError => {
                tracing::warn!(error = %err, "cart write failed, retrying once");
                op().map_err(|err| AppError::with_message(ErrorCode::WriteConflict, err.message))
            }
            other => other,
        }
    }
}

/// Anonymous carts are open to whoever holds the id; owned carts are
/// invisible to everyone but their owner
fn authorize(cart: &CartSnapshot, user_id: Option<&str>) -> AppResult<()> {
    match &cart.user_id {
        Some(owner) if Some(owner.as_str()) != user_id => {
            Err(AppError::new(ErrorCode::CartNotFound))
        }
        _ => Ok(()),
    }
}

fn paid_line_index(cart: &CartSnapshot, line_id: &str) -> AppResult<usize> {
    cart.lines
        .iter()
        .position(|l| l.line_id == line_id && !l.is_free)
        .ok_or_else(|| AppError::new(ErrorCode::CartItemNotFound))
}

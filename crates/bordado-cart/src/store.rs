//! # Cart Store
//!
//! The stateful core of the storefront: the authoritative in-memory list of
//! line items, with every mutation gated by the stock guard and the
//! integrity validator.
//!
//! ## Mutation Flow
//! ```text
//! caller ──► add / update_quantity / remove / clear
//!                │
//!                ▼
//!        lock cart lines (mutations serialize here)
//!                │
//!                ▼
//!        catalog lookups (awaited; failure ⇒ deny, fail-closed)
//!                │
//!                ▼
//!        StockGuard + IntegrityValidator on the candidate state
//!                │
//!        ┌───────┴────────┐
//!        ▼                ▼
//!   Err(reason)      apply + enqueue persist + push snapshot
//!   state untouched
//! ```
//!
//! The mutex is held across the catalog await, so each validate-then-apply
//! sequence is atomic with respect to other cart operations. Reads derive
//! totals through the pricing engine; persistence is enqueued to the
//! serialized writer and never blocks the caller.

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot, watch, Mutex};
use tracing::{info, warn};

use bordado_core::money::Money;
use bordado_core::pricing::{self, CartTotals, PricingConfig};
use bordado_core::types::{
    generate_line_id, Coupon, LineItem, OrderItem, Product, VariantKey, VariantSelection,
};
use bordado_core::{coupon, integrity, stock};

use crate::cache::{ProductCache, DEFAULT_PRODUCT_TTL};
use crate::checkout;
use crate::error::CartError;
use crate::persist::{spawn_writer, PersistJob};
use crate::providers::{CartStorage, ProductCatalog, ProviderError};
use crate::snapshot::{AddItem, CartSnapshot, PersistedCart};

// =============================================================================
// Cart Store
// =============================================================================

/// The stateful cart core.
///
/// One instance per session, passed by handle to whichever component needs
/// it; subscribers receive immutable snapshots through [`subscribe`].
///
/// [`subscribe`]: CartStore::subscribe
pub struct CartStore<C: ProductCatalog> {
    catalog: C,
    cache: ProductCache,
    config: PricingConfig,
    lines: Mutex<Vec<LineItem>>,
    snapshot_tx: watch::Sender<CartSnapshot>,
    persist_tx: mpsc::UnboundedSender<PersistJob>,
}

impl<C: ProductCatalog> CartStore<C> {
    /// Opens the store, restoring persisted state.
    ///
    /// The durable cart is read once. If any single persisted item fails the
    /// integrity validator the *entire* cart is discarded and the durable
    /// copy cleared; likewise for a payload that cannot be decoded. A
    /// transient storage read failure starts the session empty without
    /// touching the durable copy.
    pub async fn open<S>(catalog: C, storage: S, config: PricingConfig) -> CartStore<C>
    where
        S: CartStorage + 'static,
    {
        let lines = match storage.load().await {
            Ok(Some(persisted)) => match integrity::validate_all(&persisted.items, &config) {
                Ok(()) => {
                    info!(lines = persisted.items.len(), "restored persisted cart");
                    persisted.items
                }
                Err((index, error)) => {
                    warn!(index, %error, "persisted cart failed validation, resetting cart");
                    if let Err(error) = storage.clear().await {
                        warn!(%error, "failed to clear invalidated cart state");
                    }
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(ProviderError::Corrupt(detail)) => {
                warn!(%detail, "persisted cart payload is corrupt, resetting cart");
                if let Err(error) = storage.clear().await {
                    warn!(%error, "failed to clear corrupt cart state");
                }
                Vec::new()
            }
            Err(error) => {
                warn!(%error, "could not read persisted cart, starting empty");
                Vec::new()
            }
        };

        let (snapshot_tx, _) = watch::channel(build_snapshot(&lines, &config));
        let persist_tx = spawn_writer(storage);

        CartStore {
            catalog,
            cache: ProductCache::new(DEFAULT_PRODUCT_TTL),
            config,
            lines: Mutex::new(lines),
            snapshot_tx,
            persist_tx,
        }
    }

    /// Returns the pricing configuration this store quotes with.
    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds a product to the cart.
    ///
    /// Embroidered items merge into an existing line with the same product,
    /// color and size (quantities sum, still subject to the quantity ceiling
    /// and the stock ceiling); customizable items always append a new,
    /// independent line. On any denial the cart is unchanged.
    pub async fn add(&self, request: AddItem) -> Result<CartSnapshot, CartError> {
        let mut lines = self.lines.lock().await;

        match request {
            AddItem::Embroidered {
                product_id,
                color,
                size,
                quantity,
            } => {
                integrity::check_quantity_bound(quantity)?;

                let product = self.product(&product_id).await?;
                if !product.requires_stock() {
                    return Err(CartError::KindMismatch { product_id });
                }
                if product.variant_stock(&color, &size).is_none() {
                    return Err(bordado_core::StockError::UnknownVariant {
                        product_id,
                        color,
                        size,
                    }
                    .into());
                }

                let key = VariantKey {
                    product_id: product.id().to_string(),
                    color: color.clone(),
                    size: size.clone(),
                };

                // Authoritative stock, fetched inside the lock: fail-closed
                let available = self
                    .catalog
                    .stock(&key.product_id, &key.color, &key.size)
                    .await
                    .map_err(|e| CartError::from_catalog(&key.product_id, e))?;
                let in_cart = stock::committed_quantity(&lines, &key);
                stock::check_availability(&key, available, in_cart, quantity)?;

                if let Some(pos) = lines
                    .iter()
                    .position(|line| line.variant_key().as_ref() == Some(&key))
                {
                    // Merge: the price stays frozen from the first add
                    let merged = lines[pos].quantity + quantity;
                    integrity::check_quantity_bound(merged)?;

                    let candidate = with_quantity(&lines[pos], merged);
                    integrity::validate(&candidate, &self.config)?;
                    lines[pos] = candidate;
                } else {
                    if lines.len() >= bordado_core::MAX_CART_LINES {
                        return Err(CartError::cart_full());
                    }
                    let candidate = self.new_line(
                        product,
                        Some(VariantSelection { color, size }),
                        quantity,
                    );
                    integrity::validate(&candidate, &self.config)?;
                    lines.push(candidate);
                }
            }

            AddItem::Customizable {
                product_id,
                personalization,
                quantity,
            } => {
                integrity::check_quantity_bound(quantity)?;

                let mut product = self.product(&product_id).await?;
                if product.requires_stock() {
                    return Err(CartError::KindMismatch { product_id });
                }
                product.personalize(&personalization);

                if lines.len() >= bordado_core::MAX_CART_LINES {
                    return Err(CartError::cart_full());
                }
                let candidate = self.new_line(product, None, quantity);
                integrity::validate(&candidate, &self.config)?;
                lines.push(candidate);
            }
        }

        Ok(self.commit(&lines))
    }

    /// Changes the quantity of an existing line.
    ///
    /// The stock ceiling is re-checked for embroidered lines and the
    /// quantity bound always applies; zero is a rejection, not a removal.
    /// On any denial the cart is unchanged.
    pub async fn update_quantity(
        &self,
        line_id: &str,
        quantity: i64,
    ) -> Result<CartSnapshot, CartError> {
        let mut lines = self.lines.lock().await;

        integrity::check_quantity_bound(quantity)?;

        let pos = lines
            .iter()
            .position(|line| line.id == line_id)
            .ok_or_else(|| CartError::LineNotFound(line_id.to_string()))?;

        if let Some(key) = lines[pos].variant_key() {
            let available = self
                .catalog
                .stock(&key.product_id, &key.color, &key.size)
                .await
                .map_err(|e| CartError::from_catalog(&key.product_id, e))?;
            // Quantity committed by other lines of the same variant
            let elsewhere = stock::committed_quantity(&lines, &key) - lines[pos].quantity;
            stock::check_availability(&key, available, elsewhere, quantity)?;
        }

        let candidate = with_quantity(&lines[pos], quantity);
        integrity::validate(&candidate, &self.config)?;
        lines[pos] = candidate;

        Ok(self.commit(&lines))
    }

    /// Removes a line. Unconditional: removing an absent line is a no-op.
    pub async fn remove(&self, line_id: &str) -> CartSnapshot {
        let mut lines = self.lines.lock().await;
        let before = lines.len();
        lines.retain(|line| line.id != line_id);

        if lines.len() == before {
            build_snapshot(&lines, &self.config)
        } else {
            self.commit(&lines)
        }
    }

    /// Empties the cart. Unconditional.
    pub async fn clear(&self) -> CartSnapshot {
        let mut lines = self.lines.lock().await;
        lines.clear();
        self.commit(&lines)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Returns an immutable snapshot of the current cart with derived totals.
    pub async fn snapshot(&self) -> CartSnapshot {
        let lines = self.lines.lock().await;
        build_snapshot(&lines, &self.config)
    }

    /// Subscribes to cart snapshots.
    ///
    /// The receiver always holds the latest snapshot; every successful
    /// mutation publishes a new one.
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Prices the cart for checkout with an optional coupon and the shipping
    /// rate quoted by the external shipping collaborator.
    ///
    /// Coupon eligibility is validated against the current subtotal at `now`
    /// before pricing; an ineligible coupon denies the quote.
    pub async fn checkout_quote(
        &self,
        applied_coupon: Option<&Coupon>,
        shipping_rate: Money,
        now: DateTime<Utc>,
    ) -> Result<CartTotals, CartError> {
        let lines = self.lines.lock().await;

        if let Some(coupon) = applied_coupon {
            let subtotal = pricing::subtotal(&lines, &self.config);
            coupon::can_apply(coupon, subtotal, now)?;
        }

        Ok(pricing::quote(
            &lines,
            applied_coupon,
            shipping_rate,
            &self.config,
        ))
    }

    /// Freezes the current lines into immutable order item snapshots for the
    /// order-submission collaborator.
    pub async fn to_order_items(&self) -> Vec<OrderItem> {
        let lines = self.lines.lock().await;
        checkout::freeze_order_items(&lines, &self.config)
    }

    /// Waits until every persistence write enqueued so far has been
    /// attempted. Used on shutdown and in tests.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.persist_tx.send(PersistJob::Flush(tx)).is_ok() {
            let _ = rx.await;
        }
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Fetches a product definition, via the TTL cache.
    async fn product(&self, product_id: &str) -> Result<Product, CartError> {
        if let Some(product) = self.cache.get(product_id) {
            return Ok(product);
        }
        match self.catalog.product(product_id).await {
            Ok(product) => {
                self.cache.insert(product.clone());
                Ok(product)
            }
            Err(error) => Err(CartError::from_catalog(product_id, error)),
        }
    }

    /// Builds a freshly priced line from a catalog snapshot.
    fn new_line(
        &self,
        product: Product,
        selection: Option<VariantSelection>,
        quantity: i64,
    ) -> LineItem {
        let unit = pricing::unit_price(&product, &self.config);
        LineItem {
            id: generate_line_id(),
            product,
            selection,
            quantity,
            unit_price_cents: unit.cents(),
            line_total_cents: unit.multiply_quantity(quantity).clamp_non_negative().cents(),
            added_at: Utc::now(),
        }
    }

    /// Publishes the post-mutation state: enqueue the durable write, push the
    /// snapshot to subscribers, hand it back to the caller.
    fn commit(&self, lines: &[LineItem]) -> CartSnapshot {
        let persisted = PersistedCart {
            items: lines.to_vec(),
        };
        if self.persist_tx.send(PersistJob::Save(persisted)).is_err() {
            warn!("persistence writer is gone, cart changes are session-only");
        }

        let snapshot = build_snapshot(lines, &self.config);
        self.snapshot_tx.send_replace(snapshot.clone());
        snapshot
    }
}

/// Re-prices a line at a new quantity, keeping its frozen unit price.
fn with_quantity(line: &LineItem, quantity: i64) -> LineItem {
    let mut candidate = line.clone();
    candidate.quantity = quantity;
    candidate.line_total_cents = Money::from_cents(candidate.unit_price_cents)
        .multiply_quantity(quantity)
        .clamp_non_negative()
        .cents();
    candidate
}

fn build_snapshot(lines: &[LineItem], config: &PricingConfig) -> CartSnapshot {
    CartSnapshot {
        items: lines.to_vec(),
        totals: pricing::quote(lines, None, Money::zero(), config),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

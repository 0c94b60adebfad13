//! # Collaborator Traits
//!
//! Boundaries to the systems the cart core consumes but does not own: the
//! canonical product catalog, the coupon directory and durable cart storage.
//!
//! ## Fail-Closed Rule
//! Authoritative price and stock lookups happen inside a mutation's
//! validate-then-apply sequence. When a lookup fails or times out the
//! mutation is denied; it is never applied optimistically against stale
//! snapshot data.

use async_trait::async_trait;
use thiserror::Error;

use bordado_core::types::{Coupon, Product};

use crate::snapshot::PersistedCart;

// =============================================================================
// Provider Error
// =============================================================================

/// Failure at a collaborator boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The requested entity does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The collaborator could not be reached or answered with an error.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// The operation lost a race against authoritative state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Stored data failed to decode; shape-level corruption.
    #[error("corrupt stored data: {0}")]
    Corrupt(String),
}

// =============================================================================
// Product Catalog
// =============================================================================

/// Canonical source of product definitions and per-variant stock counts.
///
/// The cart core only reads from the catalog. Stock answers must reflect the
/// authoritative counters at call time; product definitions may be served
/// from a short-lived cache.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Fetches a product definition by id.
    async fn product(&self, product_id: &str) -> Result<Product, ProviderError>;

    /// Fetches the authoritative stock count for a color/size variant.
    ///
    /// Unknown variants report zero.
    async fn stock(&self, product_id: &str, color: &str, size: &str)
        -> Result<i64, ProviderError>;
}

// =============================================================================
// Coupon Directory
// =============================================================================

/// Outcome of a usage-increment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redemption {
    /// The counter moved for this order.
    Counted,
    /// This order was already counted; the counter did not move.
    AlreadyCounted,
}

/// Canonical source of coupon definitions and usage counters.
#[async_trait]
pub trait CouponDirectory: Send + Sync {
    /// Looks up a coupon; lookup is case-insensitive on the code.
    async fn coupon_by_code(&self, code: &str) -> Result<Option<Coupon>, ProviderError>;

    /// Records one redemption for `order_id`, idempotently.
    ///
    /// Called only after an order was successfully created. Repeat calls with
    /// the same order id must not move the counter again, and the
    /// check-then-increment must be atomic against the authoritative counter.
    async fn increment_usage(&self, code: &str, order_id: &str)
        -> Result<Redemption, ProviderError>;
}

// =============================================================================
// Cart Storage
// =============================================================================

/// Durable key-value storage for the cart.
///
/// The entire cart state is written on every successful mutation and read
/// once at startup. Writes issued by the store are serialized in mutation
/// order by its persistence writer.
#[async_trait]
pub trait CartStorage: Send + Sync {
    /// Reads the persisted cart, if any.
    async fn load(&self) -> Result<Option<PersistedCart>, ProviderError>;

    /// Replaces the persisted cart with the given state.
    async fn save(&self, cart: &PersistedCart) -> Result<(), ProviderError>;

    /// Removes the persisted cart.
    async fn clear(&self) -> Result<(), ProviderError>;
}

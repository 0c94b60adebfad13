//! # bordado-cart: The Stateful Cart Core
//!
//! The authoritative shopping cart for the Bordado storefront: durable
//! client-side state, defended against tampering between sessions, gated by
//! per-variant stock ceilings, and priced with exact integer-cent arithmetic.
//!
//! ## Architecture Position
//! ```text
//! Storefront UI / checkout flow (external callers)
//!        │
//!        ▼
//! ┌─────────────────────────────────────────────────────┐
//! │               CartStore (THIS CRATE)                │
//! │                                                     │
//! │  add / update / remove / clear ── gated mutations   │
//! │  snapshot / subscribe ─────────── priced reads      │
//! │  checkout_quote / to_order_items  checkout boundary │
//! │                                                     │
//! │  ProductCatalog   CouponDirectory   CartStorage     │
//! │  (collaborator traits, implemented by bordado-db)   │
//! └─────────────────────────────────────────────────────┘
//!        │
//!        ▼
//! bordado-core - pure pricing, validation, stock rules
//! ```
//!
//! ## Guarantees
//!
//! - Mutations are atomic: they validate against authoritative catalog data
//!   and either fully apply or leave the cart untouched, returning a typed
//!   denial reason.
//! - Authoritative lookups that fail deny the mutation (fail-closed).
//! - Every successful mutation is persisted whole, in order, without
//!   blocking the caller; subscribers receive an immutable snapshot.
//! - A persisted cart that fails validation at startup is discarded in its
//!   entirety and the durable copy cleared.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cache;
pub mod checkout;
pub mod error;
mod persist;
pub mod providers;
pub mod snapshot;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use cache::ProductCache;
pub use checkout::{freeze_order_items, record_coupon_redemption};
pub use error::CartError;
pub use providers::{CartStorage, CouponDirectory, ProductCatalog, ProviderError, Redemption};
pub use snapshot::{AddItem, CartSnapshot, PersistedCart};
pub use store::CartStore;

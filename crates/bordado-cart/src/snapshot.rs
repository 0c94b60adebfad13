//! # Snapshots and Persisted Layout
//!
//! Request and snapshot types exchanged with callers, and the durable cart
//! payload contract.
//!
//! ## Persisted Layout
//! The durable payload is one JSON document holding the ordered line items;
//! the whole state is rewritten on every successful mutation and read once at
//! startup. Anything that fails to decode counts as structural corruption of
//! the payload and resets the cart.

use serde::{Deserialize, Serialize};

use bordado_core::pricing::CartTotals;
use bordado_core::types::{LineItem, Personalization};

// =============================================================================
// Add Requests
// =============================================================================

/// A caller's request to put a product in the cart.
///
/// Embroidered requests name a color/size pick; the authoritative product
/// data always comes from the catalog, never from the caller. Customizable
/// requests carry the customer's personalization, which is overlaid onto the
/// catalog definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AddItem {
    /// Add a pre-stocked embroidered product.
    Embroidered {
        product_id: String,
        color: String,
        size: String,
        quantity: i64,
    },

    /// Add a made-to-order customizable garment. Always a new line.
    Customizable {
        product_id: String,
        personalization: Personalization,
        quantity: i64,
    },
}

// =============================================================================
// Cart Snapshot
// =============================================================================

/// An immutable view of the cart: current lines plus derived totals.
///
/// Produced after every successful mutation and pushed to subscribers;
/// totals are derived through the pricing engine without coupon or shipping
/// (checkout quotes carry those).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    /// Line items, in insertion order.
    pub items: Vec<LineItem>,

    /// Derived totals for display.
    pub totals: CartTotals,
}

impl CartSnapshot {
    /// True when the cart holds no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Persisted Cart
// =============================================================================

/// The durable cart payload: an ordered array of line items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedCart {
    /// Line items, in insertion order.
    pub items: Vec<LineItem>,
}

impl PersistedCart {
    /// Serializes the payload for storage.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decodes a stored payload.
    ///
    /// A decode failure means the payload was corrupted or tampered with at
    /// the shape level; callers reset the cart in that case.
    pub fn from_json(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

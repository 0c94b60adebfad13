//! # Cart Error Type
//!
//! The denial reason returned by every gated cart mutation.
//!
//! Denials are ordinary values: the store returns `Err(CartError)` and keeps
//! its state untouched; nothing panics and nothing escapes the store
//! boundary as an exception. The storefront UI owns user-facing wording.

use thiserror::Error;

use bordado_core::error::{CouponError, IntegrityError, StockError};
use bordado_core::MAX_CART_LINES;

use crate::providers::ProviderError;

/// Why a cart mutation was denied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The candidate line failed integrity validation.
    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    /// The requested quantity exceeds the stock ceiling.
    #[error(transparent)]
    Stock(#[from] StockError),

    /// The coupon is not eligible for this order.
    #[error(transparent)]
    Coupon(#[from] CouponError),

    /// No such product in the catalog.
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// No such line in the cart.
    #[error("line not found: {0}")]
    LineNotFound(String),

    /// The catalog product does not match the requested item kind.
    #[error("product {product_id} does not match the requested item kind")]
    KindMismatch { product_id: String },

    /// The cart reached its line ceiling.
    #[error("cart cannot hold more than {max} lines")]
    CartFull { max: usize },

    /// An authoritative lookup failed; the mutation is denied fail-closed.
    #[error("mutation denied, collaborator failed: {0}")]
    Provider(ProviderError),
}

impl CartError {
    /// Maps a catalog lookup failure for `product_id` into a denial reason.
    pub(crate) fn from_catalog(product_id: &str, error: ProviderError) -> Self {
        match error {
            ProviderError::NotFound(_) => CartError::ProductNotFound(product_id.to_string()),
            other => CartError::Provider(other),
        }
    }

    /// Denial for a cart at its line ceiling.
    pub(crate) fn cart_full() -> Self {
        CartError::CartFull {
            max: MAX_CART_LINES,
        }
    }
}

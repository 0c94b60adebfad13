//! # Error Types
//!
//! Domain errors for bordado-core.
//!
//! ## Error Flow
//! ```text
//! IntegrityError / StockError / CouponError  (this module)
//!        │
//!        ▼
//! CartError (bordado-cart)  ← every denied mutation becomes a typed reason
//!        │
//!        ▼
//! Storefront UI renders the user-facing message
//! ```
//!
//! A denied mutation is a value, never a panic: nothing in this crate throws
//! past the cart boundary.

use thiserror::Error;

// =============================================================================
// Integrity Errors
// =============================================================================

/// Broad class of an integrity failure, for UI messaging and telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityClass {
    /// Malformed line item shape.
    Structural,
    /// Product data fails shape or value checks.
    Authenticity,
    /// Declared totals disagree with recomputation beyond the epsilon.
    Tolerance,
}

/// A line item failed integrity validation.
///
/// Produced by the four-stage validator; the first failing check wins and no
/// partial repair is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    /// Line identifier is missing or blank.
    #[error("line item has an empty identifier")]
    EmptyLineId,

    /// Product identifier is missing or blank.
    #[error("product has an empty identifier")]
    EmptyProductId,

    /// Product name is missing or blank.
    #[error("product has an empty name")]
    EmptyProductName,

    /// Base price must be strictly positive.
    #[error("product base price must be positive, got {cents}")]
    NonPositiveBasePrice { cents: i64 },

    /// Product discount percent outside [0, 100].
    #[error("product discount percent {percent} is out of range")]
    DiscountOutOfRange { percent: u32 },

    /// A stock bucket in the product snapshot is negative.
    #[error("variant {color}/{size} carries negative stock {stock}")]
    NegativeStock {
        color: String,
        size: String,
        stock: i64,
    },

    /// An embroidered line is missing its color/size selection.
    #[error("embroidered line is missing a color/size selection")]
    MissingSelection,

    /// Quantity outside the allowed [1, max] window.
    #[error("quantity {quantity} is outside the allowed range 1..={max}")]
    QuantityOutOfRange { quantity: i64, max: i64 },

    /// Declared unit price disagrees with the recomputed price.
    #[error("declared unit price {declared} disagrees with computed {expected}")]
    UnitPriceMismatch { declared: i64, expected: i64 },

    /// Declared line total disagrees with the recomputed total.
    #[error("declared line total {declared} disagrees with computed {expected}")]
    LineTotalMismatch { declared: i64, expected: i64 },
}

impl IntegrityError {
    /// Classifies the failure for messaging.
    ///
    /// Quantity-bound violations are malformed input, not tampering, so they
    /// classify as structural.
    pub fn class(&self) -> IntegrityClass {
        match self {
            IntegrityError::EmptyLineId
            | IntegrityError::MissingSelection
            | IntegrityError::QuantityOutOfRange { .. } => IntegrityClass::Structural,

            IntegrityError::EmptyProductId
            | IntegrityError::EmptyProductName
            | IntegrityError::NonPositiveBasePrice { .. }
            | IntegrityError::DiscountOutOfRange { .. }
            | IntegrityError::NegativeStock { .. } => IntegrityClass::Authenticity,

            IntegrityError::UnitPriceMismatch { .. }
            | IntegrityError::LineTotalMismatch { .. } => IntegrityClass::Tolerance,
        }
    }
}

// =============================================================================
// Stock Errors
// =============================================================================

/// A requested quantity cannot be satisfied by the stock ceiling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    /// Requested + already-committed quantity exceeds availability.
    ///
    /// The denial is atomic: no part of the requested quantity is applied.
    #[error(
        "insufficient stock for {product_id} {color}/{size}: \
         available {available}, in cart {in_cart}, requested {requested}"
    )]
    Insufficient {
        product_id: String,
        color: String,
        size: String,
        available: i64,
        in_cart: i64,
        requested: i64,
    },

    /// The color/size pair does not exist on the product.
    #[error("unknown variant {color}/{size} for product {product_id}")]
    UnknownVariant {
        product_id: String,
        color: String,
        size: String,
    },
}

// =============================================================================
// Coupon Errors
// =============================================================================

/// A coupon is not eligible for the current order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CouponError {
    /// Coupon is switched off.
    #[error("coupon {code} is inactive")]
    Inactive { code: String },

    /// Validity window has not started yet.
    #[error("coupon {code} is not valid yet")]
    Pending { code: String },

    /// Validity window is over.
    #[error("coupon {code} has expired")]
    Expired { code: String },

    /// All redemptions have been used.
    #[error("coupon {code} has no uses left")]
    Exhausted { code: String },

    /// Order subtotal is below the coupon minimum.
    #[error(
        "coupon {code} requires a minimum order of {min_order_cents}, subtotal is {subtotal_cents}"
    )]
    BelowMinimum {
        code: String,
        min_order_cents: i64,
        subtotal_cents: i64,
    },
}

// =============================================================================
// Unit Tests
// =============================================================================

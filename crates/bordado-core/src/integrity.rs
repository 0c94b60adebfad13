//! # Integrity Validator
//!
//! Decides whether a persisted or newly-constructed line item is structurally
//! and financially trustworthy.
//!
//! ## Check Pipeline
//! ```text
//! 1. structural     line id present, embroidered selection present
//! 2. authenticity   product id/name present, base price > 0,
//!                   discount in [0,100], no negative snapshot stock
//! 3. quantity       integer in [1, 100]
//! 4. financial      declared unit price and line total agree with
//!                   recomputation within the money epsilon
//! ```
//!
//! Checks run in order and short-circuit on the first failure; a rejected
//! item is never repaired. Shape-level corruption (wrong field types, an
//! unknown product tag) is caught earlier by serde when the persisted payload
//! is decoded and counts as structural corruption of the whole payload.
//!
//! A declared amount that disagrees with recomputation beyond
//! [`crate::MONEY_EPSILON_CENTS`] is tampering evidence, not a rounding
//! artifact: recomputation and stamping use the same integer-cent rounding.

use crate::error::IntegrityError;
use crate::pricing::{self, PricingConfig};
use crate::types::LineItem;
use crate::{MAX_LINE_QUANTITY, MONEY_EPSILON_CENTS};

/// Result alias for validation.
pub type ValidationResult = Result<(), IntegrityError>;

// =============================================================================
// Per-Check Helpers
// =============================================================================

/// Validates the quantity bound: an integer in `[1, MAX_LINE_QUANTITY]`.
///
/// The upper bound is a fixed anti-abuse ceiling, shared by the validator
/// and by request-level checks in the cart store (a merged quantity must
/// respect it too).
pub fn check_quantity_bound(quantity: i64) -> ValidationResult {
    if quantity < 1 || quantity > MAX_LINE_QUANTITY {
        return Err(IntegrityError::QuantityOutOfRange {
            quantity,
            max: MAX_LINE_QUANTITY,
        });
    }
    Ok(())
}

fn check_structural(item: &LineItem) -> ValidationResult {
    if item.id.trim().is_empty() {
        return Err(IntegrityError::EmptyLineId);
    }
    if item.product.requires_stock() && item.selection.is_none() {
        return Err(IntegrityError::MissingSelection);
    }
    Ok(())
}

fn check_authenticity(item: &LineItem) -> ValidationResult {
    let product = &item.product;

    if product.id().trim().is_empty() {
        return Err(IntegrityError::EmptyProductId);
    }
    if product.name().trim().is_empty() {
        return Err(IntegrityError::EmptyProductName);
    }
    if product.base_price().cents() <= 0 {
        return Err(IntegrityError::NonPositiveBasePrice {
            cents: product.base_price().cents(),
        });
    }
    if product.discount_percent() > 100 {
        return Err(IntegrityError::DiscountOutOfRange {
            percent: product.discount_percent(),
        });
    }
    for variant in product.variants() {
        for bucket in &variant.sizes {
            if bucket.stock < 0 {
                return Err(IntegrityError::NegativeStock {
                    color: variant.color.clone(),
                    size: bucket.size.clone(),
                    stock: bucket.stock,
                });
            }
        }
    }
    Ok(())
}

fn check_financial(item: &LineItem, config: &PricingConfig) -> ValidationResult {
    let expected_unit = pricing::unit_price(&item.product, config);
    let expected_line = expected_unit
        .multiply_quantity(item.quantity)
        .clamp_non_negative();

    if (item.unit_price_cents - expected_unit.cents()).abs() > MONEY_EPSILON_CENTS {
        return Err(IntegrityError::UnitPriceMismatch {
            declared: item.unit_price_cents,
            expected: expected_unit.cents(),
        });
    }
    if (item.line_total_cents - expected_line.cents()).abs() > MONEY_EPSILON_CENTS {
        return Err(IntegrityError::LineTotalMismatch {
            declared: item.line_total_cents,
            expected: expected_line.cents(),
        });
    }
    Ok(())
}

// =============================================================================
// Validator
// =============================================================================

/// Validates one line item. First failing check wins.
pub fn validate(item: &LineItem, config: &PricingConfig) -> ValidationResult {
    check_structural(item)?;
    check_authenticity(item)?;
    check_quantity_bound(item.quantity)?;
    check_financial(item, config)?;
    Ok(())
}

/// Validates a whole persisted cart, reporting the first offender.
///
/// Used at load time. The caller discards the entire cart when any single
/// item fails; the per-item [`validate`] stays capable of filtering should
/// that policy ever change.
pub fn validate_all(
    items: &[LineItem],
    config: &PricingConfig,
) -> Result<(), (usize, IntegrityError)> {
    for (index, item) in items.iter().enumerate() {
        validate(item, config).map_err(|error| (index, error))?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

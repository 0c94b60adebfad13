//! # Coupon Engine
//!
//! Coupon lifecycle evaluation and discount computation.
//!
//! ## Lifecycle
//! ```text
//! active = false ──────────────► Inactive   (terminal)
//! now < valid_from ────────────► Pending
//! now > valid_to ──────────────► Expired    (valid_to itself is eligible)
//! current_uses >= max_uses ────► Exhausted
//! otherwise ───────────────────► Active
//! ```
//!
//! The status is evaluated at validation time and never stored. Only an
//! `Active` coupon whose minimum order is met can be applied. The durable,
//! idempotent-per-order usage increment lives at the coupon directory
//! boundary; [`increment_usage`] is the pure counter rule it enforces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CouponError;
use crate::money::Money;
use crate::types::{Coupon, DiscountType};

// =============================================================================
// Status
// =============================================================================

/// Evaluated state of a coupon at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum CouponStatus {
    /// Switched off by the back office.
    Inactive,
    /// Validity window has not started.
    Pending,
    /// Validity window is over.
    Expired,
    /// All redemptions used.
    Exhausted,
    /// Eligible, subject to the minimum order amount.
    Active,
}

/// Evaluates the coupon state machine at `now`.
///
/// Check order matters: an inactive coupon is inactive regardless of dates,
/// and an exhausted coupon is exhausted regardless of remaining validity.
/// Both window bounds are inclusive: `now == valid_to` is still eligible.
pub fn status(coupon: &Coupon, now: DateTime<Utc>) -> CouponStatus {
    if !coupon.active {
        return CouponStatus::Inactive;
    }
    if now < coupon.valid_from {
        return CouponStatus::Pending;
    }
    if now > coupon.valid_to {
        return CouponStatus::Expired;
    }
    if coupon.current_uses >= coupon.max_uses {
        return CouponStatus::Exhausted;
    }
    CouponStatus::Active
}

// =============================================================================
// Eligibility
// =============================================================================

/// Decides whether a coupon can be applied to an order subtotal at `now`.
///
/// ## Example
/// ```rust
/// use bordado_core::coupon::can_apply;
/// use bordado_core::money::Money;
/// use bordado_core::types::{Coupon, DiscountType};
/// use chrono::{Duration, Utc};
///
/// let coupon = Coupon {
///     code: "SUMMER10".into(),
///     discount_type: DiscountType::Percentage,
///     value: 10,
///     min_order_cents: 20000,
///     max_uses: 100,
///     current_uses: 0,
///     valid_from: Utc::now() - Duration::days(1),
///     valid_to: Utc::now() + Duration::days(1),
///     active: true,
/// };
///
/// assert!(can_apply(&coupon, Money::from_cents(12070), Utc::now()).is_err());
/// assert!(can_apply(&coupon, Money::from_cents(20000), Utc::now()).is_ok());
/// ```
pub fn can_apply(coupon: &Coupon, subtotal: Money, now: DateTime<Utc>) -> Result<(), CouponError> {
    let code = coupon.code.clone();
    match status(coupon, now) {
        CouponStatus::Inactive => Err(CouponError::Inactive { code }),
        CouponStatus::Pending => Err(CouponError::Pending { code }),
        CouponStatus::Expired => Err(CouponError::Expired { code }),
        CouponStatus::Exhausted => Err(CouponError::Exhausted { code }),
        CouponStatus::Active => {
            if subtotal.cents() < coupon.min_order_cents {
                Err(CouponError::BelowMinimum {
                    code,
                    min_order_cents: coupon.min_order_cents,
                    subtotal_cents: subtotal.cents(),
                })
            } else {
                Ok(())
            }
        }
    }
}

// =============================================================================
// Discount Computation
// =============================================================================

/// Computes the discount a coupon grants on a subtotal.
///
/// - Percentage: `round_half_up(subtotal × value / 100)`, value clamped to
///   [0, 100].
/// - Fixed: the literal configured amount, capped at the subtotal.
///
/// The result is never negative and never exceeds the subtotal.
pub fn compute_discount(coupon: &Coupon, subtotal: Money) -> Money {
    match coupon.discount_type {
        DiscountType::Percentage => {
            let percent = coupon.value.clamp(0, 100) as u32;
            subtotal.percentage(percent * 100)
        }
        DiscountType::Fixed => Money::from_cents(coupon.value.max(0)).min(subtotal),
    }
}

// =============================================================================
// Usage Counter
// =============================================================================

/// Bumps the usage counter after a successfully created order.
///
/// Saturates at `max_uses`; returns whether the counter moved. Durable
/// idempotency per order (one increment per successful checkout, regardless
/// of retried or re-displayed confirmations) is enforced by the coupon
/// directory, which records the order id alongside the increment.
pub fn increment_usage(coupon: &mut Coupon) -> bool {
    if coupon.current_uses >= coupon.max_uses {
        return false;
    }
    coupon.current_uses += 1;
    true
}

// =============================================================================
// Unit Tests
// =============================================================================

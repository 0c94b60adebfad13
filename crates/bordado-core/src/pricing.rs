//! # Pricing Engine
//!
//! Pure pricing functions over validated line items.
//!
//! ## Amount Pipeline
//! ```text
//! base price ──► unit price ──► line total ──► subtotal
//!   (product discount /            (× qty)        (Σ)
//!    personalization                │
//!    surcharges)                    ▼
//!                    coupon discount (capped at subtotal)
//!                                   │
//!                                   ▼
//!              total = max(0, subtotal − coupon + shipping)
//!              tax   = 21% of (subtotal − coupon), informational
//! ```
//!
//! Displayed prices are tax-inclusive: the tax line is derived for the
//! receipt and never added onto the grand total. Percentage amounts round
//! half-up; fixed coupon amounts are applied literally.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::coupon;
use crate::money::Money;
use crate::types::{Coupon, LineItem, Product, TaxRate};

// =============================================================================
// Pricing Configuration
// =============================================================================

/// Pricing knobs that used to live as scattered constants.
///
/// Passed explicitly into every pricing call so surcharges, the tax rate and
/// the free-shipping threshold have exactly one definition site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingConfig {
    /// Display tax rate (informational, prices are tax-inclusive).
    pub tax_rate: TaxRate,

    /// Surcharge for a second thread color on customizable garments.
    pub second_color_surcharge_cents: i64,

    /// Surcharge for embroidered custom text on customizable garments.
    pub custom_text_surcharge_cents: i64,

    /// Orders at or above this amount (after coupon) ship free.
    pub free_shipping_threshold_cents: i64,
}

impl PricingConfig {
    /// Returns the second-color surcharge as Money.
    #[inline]
    pub fn second_color_surcharge(&self) -> Money {
        Money::from_cents(self.second_color_surcharge_cents)
    }

    /// Returns the custom-text surcharge as Money.
    #[inline]
    pub fn custom_text_surcharge(&self) -> Money {
        Money::from_cents(self.custom_text_surcharge_cents)
    }

    /// Returns the free-shipping threshold as Money.
    #[inline]
    pub fn free_shipping_threshold(&self) -> Money {
        Money::from_cents(self.free_shipping_threshold_cents)
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        PricingConfig {
            tax_rate: TaxRate::from_bps(2100),
            second_color_surcharge_cents: 500,
            custom_text_surcharge_cents: 1000,
            free_shipping_threshold_cents: 20000,
        }
    }
}

// =============================================================================
// Unit / Line Pricing
// =============================================================================

/// Computes the per-unit price of a product.
///
/// - Embroidered: base price minus the product discount (rounded half-up).
/// - Customizable: base price plus personalization surcharges; a second
///   thread color and custom text each add their configured amount.
///
/// ## Example
/// ```rust
/// use bordado_core::pricing::{unit_price, PricingConfig};
/// use bordado_core::types::Product;
///
/// let polo = Product::Embroidered {
///     id: "polo-1".into(),
///     name: "Club Polo".into(),
///     base_price_cents: 8500,
///     discount_percent: 29,
///     variants: vec![],
/// };
/// assert_eq!(unit_price(&polo, &PricingConfig::default()).cents(), 6035);
/// ```
pub fn unit_price(product: &Product, config: &PricingConfig) -> Money {
    match product {
        Product::Embroidered { .. } => {
            let base = product.base_price();
            let discount = base.percentage(product.discount_percent() * 100);
            base - discount
        }
        Product::Customizable {
            thread_color_2,
            custom_text,
            ..
        } => {
            let mut price = product.base_price();
            if thread_color_2.is_some() {
                price += config.second_color_surcharge();
            }
            if custom_text.is_some() {
                price += config.custom_text_surcharge();
            }
            price
        }
    }
}

/// Computes a line total: `max(0, unit_price × quantity)`.
pub fn line_total(item: &LineItem, config: &PricingConfig) -> Money {
    unit_price(&item.product, config)
        .multiply_quantity(item.quantity)
        .clamp_non_negative()
}

/// Sums line totals over all items.
pub fn subtotal(items: &[LineItem], config: &PricingConfig) -> Money {
    items.iter().map(|item| line_total(item, config)).sum()
}

// =============================================================================
// Cart Totals
// =============================================================================

/// Derived totals for a cart read or checkout quote. All amounts in cents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartTotals {
    /// Number of distinct lines.
    pub item_count: usize,

    /// Sum of quantities over all lines.
    pub total_quantity: i64,

    /// Sum of line totals.
    pub subtotal_cents: i64,

    /// Coupon discount, never negative and never above the subtotal.
    pub coupon_discount_cents: i64,

    /// Informational tax on `subtotal − coupon_discount`; not part of total.
    pub tax_cents: i64,

    /// Shipping charge; zero at or above the free-shipping threshold.
    pub shipping_cents: i64,

    /// `max(0, subtotal − coupon_discount + shipping)`.
    pub total_cents: i64,
}

/// Prices a cart: subtotal, coupon discount, tax, shipping and grand total.
///
/// The coupon, when given, is assumed eligible (the store checks eligibility
/// via the coupon engine before quoting); its discount is still clamped into
/// `[0, subtotal]` here so the totals invariants hold unconditionally.
///
/// `shipping_rate` comes from the external shipping collaborator and is
/// waived when the after-coupon amount reaches the free-shipping threshold.
/// An empty cart quotes all-zero totals and never charges shipping.
pub fn quote(
    items: &[LineItem],
    applied_coupon: Option<&Coupon>,
    shipping_rate: Money,
    config: &PricingConfig,
) -> CartTotals {
    if items.is_empty() {
        return CartTotals::default();
    }

    let subtotal = subtotal(items, config);

    let coupon_discount = applied_coupon
        .map(|c| coupon::compute_discount(c, subtotal))
        .unwrap_or_else(Money::zero)
        .clamp_non_negative()
        .min(subtotal);

    let before_shipping = subtotal - coupon_discount;

    let shipping = if before_shipping >= config.free_shipping_threshold() {
        Money::zero()
    } else {
        shipping_rate
    };

    let tax = before_shipping.calculate_tax(config.tax_rate);
    let total = (before_shipping + shipping).clamp_non_negative();

    CartTotals {
        item_count: items.len(),
        total_quantity: items.iter().map(|item| item.quantity).sum(),
        subtotal_cents: subtotal.cents(),
        coupon_discount_cents: coupon_discount.cents(),
        tax_cents: tax.cents(),
        shipping_cents: shipping.cents(),
        total_cents: total.cents(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{generate_line_id, DiscountType};
    use chrono::{Duration, Utc};

    fn config() -> PricingConfig {
        PricingConfig::default()
    }

    fn embroidered(base_cents: i64, discount_percent: u32) -> Product {
        Product::Embroidered {
            id: "polo-1".to_string(),
            name: "Club Polo".to_string(),
            base_price_cents: base_cents,
            discount_percent,
            variants: vec![],
        }
    }

    fn customizable(second_color: bool, text: bool) -> Product {
        Product::Customizable {
            id: "tee-1".to_string(),
            name: "Custom Tee".to_string(),
            base_price_cents: 4000,
            thread_color_1: "White".to_string(),
            thread_color_2: second_color.then(|| "Black".to_string()),
            custom_text: text.then(|| "BORDADO".to_string()),
            custom_image: "upload-1".to_string(),
            variants: vec![],
        }
    }

    fn line(product: Product, quantity: i64) -> LineItem {
        let unit = unit_price(&product, &config());
        LineItem {
            id: generate_line_id(),
            product,
            selection: None,
            quantity,
            unit_price_cents: unit.cents(),
            line_total_cents: unit.multiply_quantity(quantity).cents(),
            added_at: Utc::now(),
        }
    }

    fn percentage_coupon(value: i64) -> Coupon {
        Coupon {
            code: "SUMMER10".to_string(),
            discount_type: DiscountType::Percentage,
            value,
            min_order_cents: 0,
            max_uses: 100,
            current_uses: 0,
            valid_from: Utc::now() - Duration::days(1),
            valid_to: Utc::now() + Duration::days(1),
            active: true,
        }
    }

    #[test]
    fn test_embroidered_unit_price_discount() {
        // 85.00 at 29% off -> 60.35
        assert_eq!(unit_price(&embroidered(8500, 29), &config()).cents(), 6035);
        // No discount
        assert_eq!(unit_price(&embroidered(8500, 0), &config()).cents(), 8500);
        // Full discount
        assert_eq!(unit_price(&embroidered(8500, 100), &config()).cents(), 0);
    }

    #[test]
    fn test_customizable_unit_price_surcharges() {
        assert_eq!(unit_price(&customizable(false, false), &config()).cents(), 4000);
        assert_eq!(unit_price(&customizable(true, false), &config()).cents(), 4500);
        assert_eq!(unit_price(&customizable(false, true), &config()).cents(), 5000);
        assert_eq!(unit_price(&customizable(true, true), &config()).cents(), 5500);
    }

    #[test]
    fn test_line_total_scenario() {
        // base 85.00, 29% off, qty 2 -> unit 60.35, line 120.70
        let item = line(embroidered(8500, 29), 2);
        assert_eq!(item.unit_price_cents, 6035);
        assert_eq!(line_total(&item, &config()).cents(), 12070);
    }

    #[test]
    fn test_subtotal_is_sum_of_line_totals() {
        let items = vec![line(embroidered(8500, 29), 2), line(customizable(true, true), 1)];
        let expected: i64 = items
            .iter()
            .map(|i| line_total(i, &config()).cents())
            .sum();
        assert_eq!(subtotal(&items, &config()).cents(), expected);
        assert_eq!(expected, 12070 + 5500);
    }

    #[test]
    fn test_quote_without_coupon() {
        let items = vec![line(embroidered(8500, 29), 2)];
        let totals = quote(&items, None, Money::from_cents(499), &config());

        assert_eq!(totals.item_count, 1);
        assert_eq!(totals.total_quantity, 2);
        assert_eq!(totals.subtotal_cents, 12070);
        assert_eq!(totals.coupon_discount_cents, 0);
        // 12070 < 20000 threshold: shipping applies
        assert_eq!(totals.shipping_cents, 499);
        assert_eq!(totals.total_cents, 12070 + 499);
        // tax informational: 21% of 12070 = 2534.7 -> 2535
        assert_eq!(totals.tax_cents, 2535);
    }

    #[test]
    fn test_quote_totals_identity() {
        let items = vec![line(embroidered(8500, 29), 2), line(customizable(false, false), 3)];
        let totals = quote(
            &items,
            Some(&percentage_coupon(10)),
            Money::from_cents(499),
            &config(),
        );

        assert_eq!(
            totals.total_cents,
            (totals.subtotal_cents - totals.coupon_discount_cents + totals.shipping_cents).max(0)
        );
    }

    #[test]
    fn test_quote_free_shipping_threshold() {
        // 3 × 85.00 = 255.00 ≥ 200.00 threshold
        let items = vec![line(embroidered(8500, 0), 3)];
        let totals = quote(&items, None, Money::from_cents(499), &config());
        assert_eq!(totals.shipping_cents, 0);
        assert_eq!(totals.total_cents, 25500);
    }

    #[test]
    fn test_quote_coupon_can_pull_order_below_threshold() {
        // 210.00 subtotal, 10% coupon -> 189.00 after coupon, below 200.00
        let items = vec![line(embroidered(7000, 0), 3)];
        let totals = quote(
            &items,
            Some(&percentage_coupon(10)),
            Money::from_cents(499),
            &config(),
        );
        assert_eq!(totals.subtotal_cents, 21000);
        assert_eq!(totals.coupon_discount_cents, 2100);
        assert_eq!(totals.shipping_cents, 499);
        assert_eq!(totals.total_cents, 21000 - 2100 + 499);
    }

    #[test]
    fn test_quote_fixed_coupon_capped_at_subtotal() {
        let items = vec![line(embroidered(3000, 0), 1)];
        let coupon = Coupon {
            discount_type: DiscountType::Fixed,
            value: 5000,
            ..percentage_coupon(0)
        };
        let totals = quote(&items, Some(&coupon), Money::zero(), &config());
        assert_eq!(totals.coupon_discount_cents, 3000);
        assert_eq!(totals.total_cents, 0);
    }

    #[test]
    fn test_quote_empty_cart_is_all_zero() {
        let totals = quote(&[], None, Money::from_cents(499), &config());
        assert_eq!(totals, CartTotals::default());
    }
}

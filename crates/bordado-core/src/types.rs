//! # Domain Types
//!
//! Core domain types for the Bordado storefront.
//!
//! ## Type Overview
//! ```text
//! Product (tagged union)        LineItem                 OrderItem
//! ├── Embroidered               id (UUID)                frozen *_snapshot
//! │   pre-stocked, discounted   product snapshot         fields captured at
//! └── Customizable              selection (color/size)   checkout time
//!     made-to-order,            quantity
//!     personalized              declared amounts
//!
//! Coupon                        TaxRate
//! code, type, value,            basis points
//! window, usage counters        (2100 = 21%)
//! ```
//!
//! ## Snapshot Pattern
//! A `LineItem` embeds a full copy of the product at the moment it entered
//! the cart; an `OrderItem` freezes the priced line at checkout. Later
//! catalog edits can never retroactively change a cart line or a historical
//! order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 2100 bps = 21% (Spanish IVA, the storefront's
/// display tax). Displayed prices are tax-inclusive; the rate is used to
/// derive the informational tax line on a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage.
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Product Variants (color / size / stock)
// =============================================================================

/// One sized stock bucket inside a color variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SizeStock {
    /// Size label ("S", "M", "L", "XL", ...).
    pub size: String,

    /// Units available for this color/size. Never negative in valid data.
    pub stock: i64,
}

/// A color variant of a product, holding its sized stock buckets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ColorVariant {
    /// Color name shown to the customer.
    pub color: String,

    /// Stock buckets per size.
    pub sizes: Vec<SizeStock>,
}

/// The customer's color/size pick for an embroidered line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VariantSelection {
    pub color: String,
    pub size: String,
}

/// Identity of a stocked variant: the merge key for embroidered lines and
/// the key the stock ceiling is enforced against.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariantKey {
    pub product_id: String,
    pub color: String,
    pub size: String,
}

// =============================================================================
// Personalization
// =============================================================================

/// Customer-supplied personalization for a customizable garment.
///
/// The image is referenced by the identifier returned from the upload
/// collaborator; the core never touches file contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Personalization {
    /// Primary thread color (always present).
    pub thread_color_1: String,

    /// Optional second thread color (carries a surcharge).
    pub thread_color_2: Option<String>,

    /// Optional embroidered text (carries a surcharge).
    pub custom_text: Option<String>,

    /// Reference to the uploaded design image.
    pub custom_image: String,
}

// =============================================================================
// Product
// =============================================================================

/// A product from the catalog.
///
/// Tagged union over the two storefront item kinds. Pricing and validation
/// dispatch on the tag:
///
/// - `Embroidered`: pre-stocked, off-the-shelf apparel. Carries a product
///   discount and per-color/per-size stock that the cart must respect.
/// - `Customizable`: made-to-order garment personalized with thread colors,
///   text and an uploaded image. No shared stock pool, no product discount;
///   personalization surcharges apply instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export)]
pub enum Product {
    /// Pre-stocked embroidered apparel.
    Embroidered {
        /// Unique identifier.
        id: String,
        /// Display name.
        name: String,
        /// Base price in cents before product discount.
        base_price_cents: i64,
        /// Product discount percent, 0-100.
        discount_percent: u32,
        /// Color variants with sized stock buckets.
        variants: Vec<ColorVariant>,
    },

    /// Made-to-order personalized garment.
    Customizable {
        /// Unique identifier.
        id: String,
        /// Display name.
        name: String,
        /// Base price in cents before surcharges.
        base_price_cents: i64,
        /// Primary thread color.
        thread_color_1: String,
        /// Optional second thread color (surcharged).
        thread_color_2: Option<String>,
        /// Optional embroidered text (surcharged).
        custom_text: Option<String>,
        /// Reference to the uploaded design image.
        custom_image: String,
        /// Available color variants (no stock gate; made to order).
        variants: Vec<ColorVariant>,
    },
}

impl Product {
    /// Returns the product identifier.
    pub fn id(&self) -> &str {
        match self {
            Product::Embroidered { id, .. } | Product::Customizable { id, .. } => id,
        }
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        match self {
            Product::Embroidered { name, .. } | Product::Customizable { name, .. } => name,
        }
    }

    /// Returns the base price.
    pub fn base_price(&self) -> Money {
        match self {
            Product::Embroidered {
                base_price_cents, ..
            }
            | Product::Customizable {
                base_price_cents, ..
            } => Money::from_cents(*base_price_cents),
        }
    }

    /// Returns the product discount percent (0 for customizable items).
    pub fn discount_percent(&self) -> u32 {
        match self {
            Product::Embroidered {
                discount_percent, ..
            } => *discount_percent,
            Product::Customizable { .. } => 0,
        }
    }

    /// Whether this product draws from a shared stock pool.
    ///
    /// Customizable garments are made to order and bypass stock checks.
    pub fn requires_stock(&self) -> bool {
        matches!(self, Product::Embroidered { .. })
    }

    /// Returns the color variants.
    pub fn variants(&self) -> &[ColorVariant] {
        match self {
            Product::Embroidered { variants, .. } | Product::Customizable { variants, .. } => {
                variants
            }
        }
    }

    /// Looks up the snapshot stock for a color/size pair.
    ///
    /// Returns `None` when the variant does not exist on this product.
    pub fn variant_stock(&self, color: &str, size: &str) -> Option<i64> {
        self.variants()
            .iter()
            .find(|v| v.color == color)
            .and_then(|v| v.sizes.iter().find(|s| s.size == size))
            .map(|s| s.stock)
    }

    /// Overwrites the snapshot stock for a color/size pair.
    ///
    /// Used by the catalog layer to overlay authoritative stock counters on
    /// top of the stored product definition. Returns false when the variant
    /// does not exist.
    pub fn set_variant_stock(&mut self, color: &str, size: &str, stock: i64) -> bool {
        let variants = match self {
            Product::Embroidered { variants, .. } | Product::Customizable { variants, .. } => {
                variants
            }
        };
        for variant in variants.iter_mut() {
            if variant.color == color {
                for bucket in variant.sizes.iter_mut() {
                    if bucket.size == size {
                        bucket.stock = stock;
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Applies customer personalization to a customizable product snapshot.
    ///
    /// No-op for embroidered products.
    pub fn personalize(&mut self, personalization: &Personalization) {
        if let Product::Customizable {
            thread_color_1,
            thread_color_2,
            custom_text,
            custom_image,
            ..
        } = self
        {
            *thread_color_1 = personalization.thread_color_1.clone();
            *thread_color_2 = personalization.thread_color_2.clone();
            *custom_text = personalization.custom_text.clone();
            *custom_image = personalization.custom_image.clone();
        }
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One entry in the cart.
///
/// Owned exclusively by the cart store: created on add, mutated only through
/// quantity updates, destroyed on remove/clear. The embedded product is a
/// snapshot taken when the line was created.
///
/// `unit_price_cents` and `line_total_cents` are the *declared* amounts
/// stamped when the line was priced. On reload from durable storage they are
/// recomputed from the product snapshot and compared within the money
/// epsilon; a larger disagreement is treated as tampering, not rounding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    /// Opaque line identifier (UUID v4).
    pub id: String,

    /// Product snapshot at the time the line was created.
    pub product: Product,

    /// Color/size pick for embroidered lines; `None` for customizable lines.
    pub selection: Option<VariantSelection>,

    /// Units of this line. Always in `[1, MAX_LINE_QUANTITY]` in a valid cart.
    pub quantity: i64,

    /// Declared per-unit price in cents.
    pub unit_price_cents: i64,

    /// Declared line total in cents.
    pub line_total_cents: i64,

    /// When this line entered the cart.
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl LineItem {
    /// Returns the declared unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the declared line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }

    /// Returns the stocked-variant key for this line.
    ///
    /// `None` for customizable lines and for embroidered lines missing a
    /// selection (those fail validation).
    pub fn variant_key(&self) -> Option<VariantKey> {
        if !self.product.requires_stock() {
            return None;
        }
        self.selection.as_ref().map(|sel| VariantKey {
            product_id: self.product.id().to_string(),
            color: sel.color.clone(),
            size: sel.size.clone(),
        })
    }
}

/// Generates a new line item identifier.
pub fn generate_line_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Coupon
// =============================================================================

/// How a coupon discounts the order subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum DiscountType {
    /// `value` is a percent of the subtotal (0-100), rounded half-up.
    Percentage,
    /// `value` is a fixed amount in cents, capped at the subtotal.
    Fixed,
}

/// A discount coupon.
///
/// Created by the admin back office; the cart core only reads it and bumps
/// `current_uses` after a successful checkout. Codes are canonicalized to
/// uppercase so lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Coupon {
    /// Canonical (uppercase) coupon code, unique.
    pub code: String,

    /// Discount kind.
    pub discount_type: DiscountType,

    /// Percent (0-100) or fixed cents, depending on `discount_type`.
    pub value: i64,

    /// Minimum order subtotal in cents required to apply.
    pub min_order_cents: i64,

    /// Maximum number of redemptions.
    pub max_uses: u32,

    /// Redemptions so far. Never exceeds `max_uses` in valid data.
    pub current_uses: u32,

    /// Start of the validity window (inclusive).
    #[ts(as = "String")]
    pub valid_from: DateTime<Utc>,

    /// End of the validity window (inclusive).
    #[ts(as = "String")]
    pub valid_to: DateTime<Utc>,

    /// Kill switch; an inactive coupon is never eligible.
    pub active: bool,
}

impl Coupon {
    /// Canonical form of a coupon code: trimmed, uppercase.
    pub fn canonical_code(code: &str) -> String {
        code.trim().to_uppercase()
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A frozen order line created at checkout from a [`LineItem`].
///
/// Snapshot pattern: name, pricing and personalization are captured at the
/// moment of purchase so later catalog changes cannot alter historical
/// orders. Once created, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItem {
    /// Order item identifier (UUID v4).
    pub id: String,

    /// Product this line referenced.
    pub product_id: String,

    /// Product name at time of purchase (frozen).
    pub name_snapshot: String,

    /// Per-unit price in cents at time of purchase (frozen).
    pub unit_price_cents: i64,

    /// Product discount percent at time of purchase (frozen).
    pub discount_percent_snapshot: u32,

    /// Units purchased.
    pub quantity: i64,

    /// Line total in cents (`unit_price × quantity`).
    pub line_total_cents: i64,

    /// Color/size pick for embroidered lines.
    pub selection: Option<VariantSelection>,

    /// Personalization for customizable lines.
    pub personalization: Option<Personalization>,

    /// When the snapshot was taken.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Returns the frozen unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the frozen line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn polo() -> Product {
        Product::Embroidered {
            id: "polo-1".to_string(),
            name: "Club Polo".to_string(),
            base_price_cents: 8500,
            discount_percent: 29,
            variants: vec![ColorVariant {
                color: "Navy".to_string(),
                sizes: vec![
                    SizeStock {
                        size: "M".to_string(),
                        stock: 5,
                    },
                    SizeStock {
                        size: "L".to_string(),
                        stock: 0,
                    },
                ],
            }],
        }
    }

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(2100);
        assert_eq!(rate.bps(), 2100);
        assert!((rate.percentage() - 21.0).abs() < 0.001);
    }

    #[test]
    fn test_tax_rate_from_percentage() {
        assert_eq!(TaxRate::from_percentage(21.0).bps(), 2100);
    }

    #[test]
    fn test_variant_stock_lookup() {
        let product = polo();
        assert_eq!(product.variant_stock("Navy", "M"), Some(5));
        assert_eq!(product.variant_stock("Navy", "L"), Some(0));
        assert_eq!(product.variant_stock("Navy", "XXL"), None);
        assert_eq!(product.variant_stock("Red", "M"), None);
    }

    #[test]
    fn test_set_variant_stock() {
        let mut product = polo();
        assert!(product.set_variant_stock("Navy", "M", 2));
        assert_eq!(product.variant_stock("Navy", "M"), Some(2));
        assert!(!product.set_variant_stock("Red", "M", 9));
    }

    #[test]
    fn test_discount_percent_dispatch() {
        assert_eq!(polo().discount_percent(), 29);

        let tee = Product::Customizable {
            id: "tee-1".to_string(),
            name: "Custom Tee".to_string(),
            base_price_cents: 4000,
            thread_color_1: "White".to_string(),
            thread_color_2: None,
            custom_text: None,
            custom_image: "img-1".to_string(),
            variants: vec![],
        };
        assert_eq!(tee.discount_percent(), 0);
        assert!(!tee.requires_stock());
        assert!(polo().requires_stock());
    }

    #[test]
    fn test_personalize_overlays_custom_fields() {
        let mut tee = Product::Customizable {
            id: "tee-1".to_string(),
            name: "Custom Tee".to_string(),
            base_price_cents: 4000,
            thread_color_1: "White".to_string(),
            thread_color_2: None,
            custom_text: None,
            custom_image: String::new(),
            variants: vec![],
        };
        tee.personalize(&Personalization {
            thread_color_1: "Gold".to_string(),
            thread_color_2: Some("Black".to_string()),
            custom_text: Some("BORDADO".to_string()),
            custom_image: "upload-77".to_string(),
        });

        match tee {
            Product::Customizable {
                thread_color_1,
                thread_color_2,
                custom_text,
                custom_image,
                ..
            } => {
                assert_eq!(thread_color_1, "Gold");
                assert_eq!(thread_color_2.as_deref(), Some("Black"));
                assert_eq!(custom_text.as_deref(), Some("BORDADO"));
                assert_eq!(custom_image, "upload-77");
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_product_serde_tag_round_trip() {
        let product = polo();
        let json = serde_json::to_string(&product).unwrap();
        assert!(json.contains("\"type\":\"embroidered\""));

        let back: Product = serde_json::from_str(&json).unwrap();
        assert_eq!(back, product);
    }

    #[test]
    fn test_unknown_product_tag_rejected() {
        let json = r#"{"type":"giftcard","id":"x","name":"X","base_price_cents":100}"#;
        assert!(serde_json::from_str::<Product>(json).is_err());
    }

    #[test]
    fn test_canonical_code() {
        assert_eq!(Coupon::canonical_code("  summer10 "), "SUMMER10");
        assert_eq!(Coupon::canonical_code("SUMMER10"), "SUMMER10");
    }

    #[test]
    fn test_line_variant_key() {
        let line = LineItem {
            id: generate_line_id(),
            product: polo(),
            selection: Some(VariantSelection {
                color: "Navy".to_string(),
                size: "M".to_string(),
            }),
            quantity: 2,
            unit_price_cents: 6035,
            line_total_cents: 12070,
            added_at: Utc::now(),
        };

        let key = line.variant_key().unwrap();
        assert_eq!(key.product_id, "polo-1");
        assert_eq!(key.color, "Navy");
        assert_eq!(key.size, "M");
    }
}

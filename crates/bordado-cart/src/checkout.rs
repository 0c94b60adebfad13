//! # Checkout Boundary
//!
//! Transforms cart lines into frozen order items for the order-submission
//! collaborator, and records coupon redemptions after an order succeeds.
//! The cart core never submits orders itself.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use bordado_core::pricing::{self, PricingConfig};
use bordado_core::types::{LineItem, OrderItem, Personalization, Product};

use crate::providers::{CouponDirectory, ProviderError, Redemption};

/// Freezes cart lines into immutable order item snapshots.
///
/// Name, pricing and personalization are captured at this moment; later
/// catalog changes cannot retroactively alter the produced items. Amounts
/// are recomputed through the pricing engine rather than copied from the
/// declared line fields, so the frozen values are exact.
pub fn freeze_order_items(items: &[LineItem], config: &PricingConfig) -> Vec<OrderItem> {
    let created_at = Utc::now();
    items
        .iter()
        .map(|item| {
            let unit = pricing::unit_price(&item.product, config);
            OrderItem {
                id: Uuid::new_v4().to_string(),
                product_id: item.product.id().to_string(),
                name_snapshot: item.product.name().to_string(),
                unit_price_cents: unit.cents(),
                discount_percent_snapshot: item.product.discount_percent(),
                quantity: item.quantity,
                line_total_cents: unit
                    .multiply_quantity(item.quantity)
                    .clamp_non_negative()
                    .cents(),
                selection: item.selection.clone(),
                personalization: personalization_of(&item.product),
                created_at,
            }
        })
        .collect()
}

fn personalization_of(product: &Product) -> Option<Personalization> {
    match product {
        Product::Customizable {
            thread_color_1,
            thread_color_2,
            custom_text,
            custom_image,
            ..
        } => Some(Personalization {
            thread_color_1: thread_color_1.clone(),
            thread_color_2: thread_color_2.clone(),
            custom_text: custom_text.clone(),
            custom_image: custom_image.clone(),
        }),
        Product::Embroidered { .. } => None,
    }
}

/// Records one coupon redemption for a successfully created order.
///
/// Invoked once per successful checkout, never per validation or preview.
/// The directory enforces idempotency per order id, so retried confirmations
/// cannot double-count usage.
pub async fn record_coupon_redemption<D>(
    directory: &D,
    code: &str,
    order_id: &str,
) -> Result<Redemption, ProviderError>
where
    D: CouponDirectory + ?Sized,
{
    let outcome = directory.increment_usage(code, order_id).await?;
    match outcome {
        Redemption::Counted => info!(code, order_id, "coupon redemption recorded"),
        Redemption::AlreadyCounted => {
            info!(code, order_id, "coupon redemption already recorded")
        }
    }
    Ok(outcome)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bordado_core::types::{generate_line_id, Coupon, VariantSelection};
    use std::collections::HashSet;
    use std::sync::Mutex;

    fn embroidered_line() -> LineItem {
        LineItem {
            id: generate_line_id(),
            product: Product::Embroidered {
                id: "polo-1".to_string(),
                name: "Club Polo".to_string(),
                base_price_cents: 8500,
                discount_percent: 29,
                variants: vec![],
            },
            selection: Some(VariantSelection {
                color: "Navy".to_string(),
                size: "M".to_string(),
            }),
            quantity: 2,
            unit_price_cents: 6035,
            line_total_cents: 12070,
            added_at: Utc::now(),
        }
    }

    fn customizable_line() -> LineItem {
        LineItem {
            id: generate_line_id(),
            product: Product::Customizable {
                id: "tee-1".to_string(),
                name: "Custom Tee".to_string(),
                base_price_cents: 4000,
                thread_color_1: "Gold".to_string(),
                thread_color_2: Some("Black".to_string()),
                custom_text: Some("BORDADO".to_string()),
                custom_image: "upload-77".to_string(),
                variants: vec![],
            },
            selection: None,
            quantity: 1,
            unit_price_cents: 5500,
            line_total_cents: 5500,
            added_at: Utc::now(),
        }
    }

    #[test]
    fn test_freeze_captures_pricing_and_identity() {
        let config = PricingConfig::default();
        let frozen = freeze_order_items(&[embroidered_line(), customizable_line()], &config);

        assert_eq!(frozen.len(), 2);

        let polo = &frozen[0];
        assert_eq!(polo.product_id, "polo-1");
        assert_eq!(polo.name_snapshot, "Club Polo");
        assert_eq!(polo.unit_price_cents, 6035);
        assert_eq!(polo.discount_percent_snapshot, 29);
        assert_eq!(polo.line_total_cents, 12070);
        assert!(polo.personalization.is_none());
        assert_eq!(polo.selection.as_ref().unwrap().size, "M");

        let tee = &frozen[1];
        assert_eq!(tee.unit_price_cents, 5500);
        let personalization = tee.personalization.as_ref().unwrap();
        assert_eq!(personalization.thread_color_2.as_deref(), Some("Black"));
        assert_eq!(personalization.custom_text.as_deref(), Some("BORDADO"));
    }

    #[test]
    fn test_freeze_is_detached_from_the_line() {
        // Mutating the cart line afterwards must not affect the frozen item
        let config = PricingConfig::default();
        let mut line = embroidered_line();
        let frozen = freeze_order_items(&[line.clone()], &config);

        line.quantity = 99;
        line.unit_price_cents = 1;
        assert_eq!(frozen[0].quantity, 2);
        assert_eq!(frozen[0].unit_price_cents, 6035);
    }

    struct RecordingDirectory {
        seen: Mutex<HashSet<String>>,
    }

    #[async_trait]
    impl CouponDirectory for RecordingDirectory {
        async fn coupon_by_code(&self, _code: &str) -> Result<Option<Coupon>, ProviderError> {
            Ok(None)
        }

        async fn increment_usage(
            &self,
            code: &str,
            order_id: &str,
        ) -> Result<Redemption, ProviderError> {
            let key = format!("{code}:{order_id}");
            let mut seen = self.seen.lock().unwrap();
            if seen.insert(key) {
                Ok(Redemption::Counted)
            } else {
                Ok(Redemption::AlreadyCounted)
            }
        }
    }

    #[tokio::test]
    async fn test_redemption_is_idempotent_per_order() {
        let directory = RecordingDirectory {
            seen: Mutex::new(HashSet::new()),
        };

        let first = record_coupon_redemption(&directory, "SUMMER10", "order-1")
            .await
            .unwrap();
        let retry = record_coupon_redemption(&directory, "SUMMER10", "order-1")
            .await
            .unwrap();
        let other = record_coupon_redemption(&directory, "SUMMER10", "order-2")
            .await
            .unwrap();

        assert_eq!(first, Redemption::Counted);
        assert_eq!(retry, Redemption::AlreadyCounted);
        assert_eq!(other, Redemption::Counted);
    }
}

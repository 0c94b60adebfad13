//! # Stock Guard
//!
//! Enforces per-variant stock ceilings for embroidered products.
//!
//! The ceiling counts quantity already committed elsewhere in the cart:
//! `in_cart + requested <= available`. Availability comes from the catalog at
//! decision time, never from the snapshot stored on the line. Customizable
//! garments are made to order and never pass through here.

use crate::error::StockError;
use crate::types::{LineItem, VariantKey};

/// Decides whether a requested quantity fits under the stock ceiling.
///
/// Denial is atomic: the caller rejects the whole mutation rather than
/// applying a partial quantity.
///
/// ## Example
/// ```rust
/// use bordado_core::stock::check_availability;
/// use bordado_core::types::VariantKey;
///
/// let key = VariantKey {
///     product_id: "polo-1".into(),
///     color: "Navy".into(),
///     size: "M".into(),
/// };
/// // stock 5, cart already holds 4: one more fits, two do not
/// assert!(check_availability(&key, 5, 4, 1).is_ok());
/// assert!(check_availability(&key, 5, 4, 2).is_err());
/// ```
pub fn check_availability(
    key: &VariantKey,
    available: i64,
    in_cart: i64,
    requested: i64,
) -> Result<(), StockError> {
    if in_cart + requested > available {
        return Err(StockError::Insufficient {
            product_id: key.product_id.clone(),
            color: key.color.clone(),
            size: key.size.clone(),
            available,
            in_cart,
            requested,
        });
    }
    Ok(())
}

/// Sums the quantity already committed to a variant across cart lines.
///
/// With the merge-on-add invariant a variant occupies at most one line, but
/// the sum stays correct even for carts restored from older layouts.
pub fn committed_quantity(items: &[LineItem], key: &VariantKey) -> i64 {
    items
        .iter()
        .filter(|item| item.variant_key().as_ref() == Some(key))
        .map(|item| item.quantity)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        generate_line_id, ColorVariant, Product, SizeStock, VariantSelection,
    };
    use chrono::Utc;

    fn key() -> VariantKey {
        VariantKey {
            product_id: "polo-1".to_string(),
            color: "Navy".to_string(),
            size: "M".to_string(),
        }
    }

    fn embroidered_line(quantity: i64) -> LineItem {
        LineItem {
            id: generate_line_id(),
            product: Product::Embroidered {
                id: "polo-1".to_string(),
                name: "Club Polo".to_string(),
                base_price_cents: 1000,
                discount_percent: 0,
                variants: vec![ColorVariant {
                    color: "Navy".to_string(),
                    sizes: vec![SizeStock {
                        size: "M".to_string(),
                        stock: 5,
                    }],
                }],
            },
            selection: Some(VariantSelection {
                color: "Navy".to_string(),
                size: "M".to_string(),
            }),
            quantity,
            unit_price_cents: 1000,
            line_total_cents: 1000 * quantity,
            added_at: Utc::now(),
        }
    }

    #[test]
    fn test_boundary_exactly_at_ceiling() {
        assert!(check_availability(&key(), 5, 4, 1).is_ok());
        assert!(check_availability(&key(), 5, 0, 5).is_ok());
    }

    #[test]
    fn test_boundary_over_ceiling_denied() {
        let denied = check_availability(&key(), 5, 4, 2);
        assert!(matches!(
            denied,
            Err(StockError::Insufficient {
                available: 5,
                in_cart: 4,
                requested: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_zero_stock_denies_any_request() {
        assert!(check_availability(&key(), 0, 0, 1).is_err());
    }

    #[test]
    fn test_committed_quantity_sums_matching_lines() {
        let items = vec![embroidered_line(4)];
        assert_eq!(committed_quantity(&items, &key()), 4);

        let other = VariantKey {
            size: "L".to_string(),
            ..key()
        };
        assert_eq!(committed_quantity(&items, &other), 0);
        assert_eq!(committed_quantity(&[], &key()), 0);
    }
}

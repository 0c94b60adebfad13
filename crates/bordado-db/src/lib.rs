//! # bordado-db: Database Layer for the Bordado Storefront
//!
//! SQLite durability behind the cart core's collaborator traits.
//!
//! ## Architecture Position
//! ```text
//! bordado-cart                     CartStore + collaborator traits
//!        │
//!        ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   bordado-db (THIS CRATE)                    │
//! │                                                              │
//! │   Database (pool.rs)        Repositories        Migrations  │
//! │   SqlitePool, WAL           catalog             embedded     │
//! │   connection mgmt           coupon              001_...sql   │
//! │                             cart_state                       │
//! └──────────────────────────────────────────────────────────────┘
//!        │
//!        ▼
//! SQLite database file (or :memory: for tests)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bordado_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./bordado.db")).await?;
//!
//! let store = CartStore::open(
//!     db.catalog(),
//!     db.cart_state(),
//!     PricingConfig::default(),
//! )
//! .await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::DbError;
pub use pool::{Database, DbConfig};

pub use repository::cart_state::CartStateRepository;
pub use repository::catalog::CatalogRepository;
pub use repository::coupon::CouponRepository;

// =============================================================================
// End-to-End Tests (cart store over SQLite)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bordado_cart::snapshot::AddItem;
    use bordado_cart::store::CartStore;
    use bordado_core::pricing::PricingConfig;
    use bordado_core::types::{ColorVariant, Product, SizeStock};

    fn polo() -> Product {
        Product::Embroidered {
            id: "polo-1".to_string(),
            name: "Club Polo".to_string(),
            base_price_cents: 8500,
            discount_percent: 29,
            variants: vec![ColorVariant {
                color: "Navy".to_string(),
                sizes: vec![SizeStock {
                    size: "M".to_string(),
                    stock: 5,
                }],
            }],
        }
    }

    #[tokio::test]
    async fn test_cart_store_over_sqlite_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.catalog().insert(&polo()).await.unwrap();

        let store = CartStore::open(
            db.catalog(),
            db.cart_state(),
            PricingConfig::default(),
        )
        .await;

        let snapshot = store
            .add(AddItem::Embroidered {
                product_id: "polo-1".to_string(),
                color: "Navy".to_string(),
                size: "M".to_string(),
                quantity: 2,
            })
            .await
            .unwrap();
        assert_eq!(snapshot.totals.subtotal_cents, 12070);
        store.flush().await;

        // A new session over the same database restores the validated cart
        let reopened = CartStore::open(
            db.catalog(),
            db.cart_state(),
            PricingConfig::default(),
        )
        .await;
        let restored = reopened.snapshot().await;
        assert_eq!(restored.items, snapshot.items);
        assert_eq!(restored.totals.subtotal_cents, 12070);
    }

    #[tokio::test]
    async fn test_cart_store_respects_sqlite_stock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.catalog().insert(&polo()).await.unwrap();
        db.catalog().set_stock("polo-1", "Navy", "M", 1).await.unwrap();

        let store = CartStore::open(
            db.catalog(),
            db.cart_state(),
            PricingConfig::default(),
        )
        .await;

        // Authoritative counter (1), not the payload snapshot (5), gates
        let denied = store
            .add(AddItem::Embroidered {
                product_id: "polo-1".to_string(),
                color: "Navy".to_string(),
                size: "M".to_string(),
                quantity: 2,
            })
            .await;
        assert!(denied.is_err());
        assert!(store.snapshot().await.is_empty());
    }
}

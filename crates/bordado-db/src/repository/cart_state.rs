//! # Cart State Repository
//!
//! Durable storage for the cart: one JSON payload per slot, replaced whole
//! on every successful mutation and read once at session start.

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use async_trait::async_trait;
use bordado_cart::providers::{CartStorage, ProviderError};
use bordado_cart::snapshot::PersistedCart;

use crate::error::DbResult;

/// Slot used when no explicit slot is configured.
pub const DEFAULT_CART_SLOT: &str = "default";

/// Repository for the persisted cart payload.
#[derive(Debug, Clone)]
pub struct CartStateRepository {
    pool: SqlitePool,
    slot: String,
}

impl CartStateRepository {
    /// Creates a repository over the default slot.
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_slot(pool, DEFAULT_CART_SLOT)
    }

    /// Creates a repository over a named slot (one cart per device profile).
    pub fn with_slot(pool: SqlitePool, slot: impl Into<String>) -> Self {
        CartStateRepository {
            pool,
            slot: slot.into(),
        }
    }

    /// Replaces the stored payload with the given cart state.
    pub async fn save(&self, cart: &PersistedCart) -> DbResult<()> {
        let payload = cart.to_json()?;
        debug!(slot = %self.slot, lines = cart.items.len(), "saving cart state");

        sqlx::query(
            r#"
            INSERT INTO cart_state (slot, payload, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (slot) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&self.slot)
        .bind(&payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Reads the stored cart, if any.
    ///
    /// A payload that fails to decode is reported as a serialization error;
    /// the cart store treats that as corruption and resets.
    pub async fn load(&self) -> DbResult<Option<PersistedCart>> {
        let row = sqlx::query("SELECT payload FROM cart_state WHERE slot = ?1")
            .bind(&self.slot)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let payload: String = row.try_get("payload")?;
        let cart = PersistedCart::from_json(&payload)?;
        Ok(Some(cart))
    }

    /// Removes the stored cart.
    pub async fn clear(&self) -> DbResult<()> {
        debug!(slot = %self.slot, "clearing cart state");

        sqlx::query("DELETE FROM cart_state WHERE slot = ?1")
            .bind(&self.slot)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// =============================================================================
// Collaborator Trait
// =============================================================================

#[async_trait]
impl CartStorage for CartStateRepository {
    async fn load(&self) -> Result<Option<PersistedCart>, ProviderError> {
        CartStateRepository::load(self).await.map_err(Into::into)
    }

    async fn save(&self, cart: &PersistedCart) -> Result<(), ProviderError> {
        CartStateRepository::save(self, cart).await.map_err(Into::into)
    }

    async fn clear(&self) -> Result<(), ProviderError> {
        CartStateRepository::clear(self).await.map_err(Into::into)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use bordado_core::types::{generate_line_id, LineItem, Product, VariantSelection};
    use chrono::Utc;

    fn persisted_cart() -> PersistedCart {
        PersistedCart {
            items: vec![LineItem {
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
            }],
        }
    }

    async fn database() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let repo = database().await.cart_state();
        assert!(repo.load().await.unwrap().is_none());

        let cart = persisted_cart();
        repo.save(&cart).await.unwrap();
        assert_eq!(repo.load().await.unwrap().unwrap(), cart);

        // Saving again replaces, not appends
        let empty = PersistedCart::default();
        repo.save(&empty).await.unwrap();
        assert_eq!(repo.load().await.unwrap().unwrap(), empty);
    }

    #[tokio::test]
    async fn test_clear_removes_payload() {
        let repo = database().await.cart_state();
        repo.save(&persisted_cart()).await.unwrap();

        repo.clear().await.unwrap();
        assert!(repo.load().await.unwrap().is_none());

        // Clearing an empty slot is fine
        repo.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_slots_are_independent() {
        let db = database().await;
        let front = CartStateRepository::with_slot(db.pool().clone(), "front-desk");
        let kiosk = CartStateRepository::with_slot(db.pool().clone(), "kiosk");

        front.save(&persisted_cart()).await.unwrap();
        assert!(kiosk.load().await.unwrap().is_none());
        assert!(front.load().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_corrupt_payload_reports_corruption() {
        let db = database().await;
        let repo = db.cart_state();

        // Write garbage straight past the repository
        sqlx::query(
            "INSERT INTO cart_state (slot, payload, updated_at) VALUES (?1, 'not json', ?2)",
        )
        .bind(DEFAULT_CART_SLOT)
        .bind(Utc::now())
        .execute(db.pool())
        .await
        .unwrap();

        let failed = repo.load().await;
        assert!(matches!(failed, Err(DbError::Serialization(_))));

        // At the collaborator boundary the same failure reads as corruption
        let provider_view = CartStorage::load(&repo).await;
        assert!(matches!(provider_view, Err(ProviderError::Corrupt(_))));
    }
}

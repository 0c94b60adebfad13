//! # Catalog Repository
//!
//! Database operations for the product catalog.
//!
//! ## Storage Shape
//! ```text
//! products       id | payload (JSON Product) | is_active | timestamps
//! variant_stock  product_id | color | size | stock     ← authoritative
//! ```
//!
//! The JSON payload carries the full tagged product definition, including a
//! stock snapshot inside its variants; the `variant_stock` table is the
//! authoritative counter and is overlaid onto the payload on every read.
//! Stock claims are a single guarded UPDATE so concurrent checkouts cannot
//! oversell a variant.

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use async_trait::async_trait;
use bordado_cart::providers::{ProductCatalog, ProviderError};
use bordado_core::types::Product;

use crate::error::{DbError, DbResult};

/// Repository for catalog database operations.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Inserts a product definition and its stock counters.
    ///
    /// The counters are initialized from the stock snapshot embedded in the
    /// product's variants.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id(), "inserting product");

        let payload = serde_json::to_string(product)?;
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO products (id, payload, is_active, created_at, updated_at)
            VALUES (?1, ?2, 1, ?3, ?3)
            "#,
        )
        .bind(product.id())
        .bind(&payload)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for variant in product.variants() {
            for bucket in &variant.sizes {
                sqlx::query(
                    r#"
                    INSERT OR REPLACE INTO variant_stock (product_id, color, size, stock)
                    VALUES (?1, ?2, ?3, ?4)
                    "#,
                )
                .bind(product.id())
                .bind(&variant.color)
                .bind(&bucket.size)
                .bind(bucket.stock)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    /// Gets an active product by id, with authoritative stock overlaid.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let row = sqlx::query("SELECT payload FROM products WHERE id = ?1 AND is_active = 1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let payload: String = row.try_get("payload")?;
        let mut product: Product = serde_json::from_str(&payload)?;

        let stock_rows =
            sqlx::query("SELECT color, size, stock FROM variant_stock WHERE product_id = ?1")
                .bind(id)
                .fetch_all(&self.pool)
                .await?;

        for stock_row in stock_rows {
            let color: String = stock_row.try_get("color")?;
            let size: String = stock_row.try_get("size")?;
            let stock: i64 = stock_row.try_get("stock")?;
            product.set_variant_stock(&color, &size, stock);
        }

        Ok(Some(product))
    }

    /// Returns the authoritative stock for a variant. Unknown variants
    /// report zero.
    pub async fn stock_for(&self, product_id: &str, color: &str, size: &str) -> DbResult<i64> {
        let stock: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT stock FROM variant_stock
            WHERE product_id = ?1 AND color = ?2 AND size = ?3
            "#,
        )
        .bind(product_id)
        .bind(color)
        .bind(size)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stock.unwrap_or(0))
    }

    /// Sets the authoritative stock counter for a variant.
    pub async fn set_stock(
        &self,
        product_id: &str,
        color: &str,
        size: &str,
        stock: i64,
    ) -> DbResult<()> {
        debug!(product_id, color, size, stock, "setting variant stock");

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO variant_stock (product_id, color, size, stock)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(product_id)
        .bind(color)
        .bind(size)
        .bind(stock)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Claims `quantity` units from a variant's stock counter, atomically.
    ///
    /// A single guarded UPDATE performs the check-then-decrement; when the
    /// counter cannot cover the claim no row changes and a conflict is
    /// returned. Called by the order-submission flow at checkout.
    pub async fn claim_stock(
        &self,
        product_id: &str,
        color: &str,
        size: &str,
        quantity: i64,
    ) -> DbResult<()> {
        debug!(product_id, color, size, quantity, "claiming stock");

        let result = sqlx::query(
            r#"
            UPDATE variant_stock
            SET stock = stock - ?4
            WHERE product_id = ?1 AND color = ?2 AND size = ?3 AND stock >= ?4
            "#,
        )
        .bind(product_id)
        .bind(color)
        .bind(size)
        .bind(quantity)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::Conflict(format!(
                "cannot claim {quantity} units of {product_id} {color}/{size}"
            )));
        }

        Ok(())
    }

    /// Soft-deletes a product; it stops resolving for the cart while
    /// historical orders keep their snapshots.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        debug!(id, "deactivating product");

        let now = Utc::now();
        let result =
            sqlx::query("UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(now)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("product", id));
        }

        Ok(())
    }

    /// Counts active products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Collaborator Trait
// =============================================================================

/// The cart store's view of the catalog: definitions plus live stock.
#[async_trait]
impl ProductCatalog for CatalogRepository {
    async fn product(&self, product_id: &str) -> Result<Product, ProviderError> {
        self.get_by_id(product_id)
            .await
            .map_err(ProviderError::from)?
            .ok_or_else(|| ProviderError::NotFound(format!("product {product_id}")))
    }

    async fn stock(
        &self,
        product_id: &str,
        color: &str,
        size: &str,
    ) -> Result<i64, ProviderError> {
        self.stock_for(product_id, color, size)
            .await
            .map_err(Into::into)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use bordado_core::types::{ColorVariant, SizeStock};

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
                        stock: 2,
                    },
                ],
            }],
        }
    }

    async fn repo() -> CatalogRepository {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.catalog()
    }

    #[tokio::test]
    async fn test_insert_and_get_round_trip() {
        let repo = repo().await;
        repo.insert(&polo()).await.unwrap();

        let loaded = repo.get_by_id("polo-1").await.unwrap().unwrap();
        assert_eq!(loaded, polo());
        assert_eq!(repo.count().await.unwrap(), 1);
        assert!(repo.get_by_id("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_stock_overlay_on_read() {
        let repo = repo().await;
        repo.insert(&polo()).await.unwrap();

        repo.set_stock("polo-1", "Navy", "M", 1).await.unwrap();

        // The payload snapshot said 5; the authoritative counter wins
        let loaded = repo.get_by_id("polo-1").await.unwrap().unwrap();
        assert_eq!(loaded.variant_stock("Navy", "M"), Some(1));
        assert_eq!(loaded.variant_stock("Navy", "L"), Some(2));
    }

    #[tokio::test]
    async fn test_stock_for_unknown_variant_is_zero() {
        let repo = repo().await;
        repo.insert(&polo()).await.unwrap();

        assert_eq!(repo.stock_for("polo-1", "Navy", "M").await.unwrap(), 5);
        assert_eq!(repo.stock_for("polo-1", "Red", "M").await.unwrap(), 0);
        assert_eq!(repo.stock_for("ghost", "Navy", "M").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_claim_stock_is_guarded() {
        let repo = repo().await;
        repo.insert(&polo()).await.unwrap();

        repo.claim_stock("polo-1", "Navy", "M", 4).await.unwrap();
        assert_eq!(repo.stock_for("polo-1", "Navy", "M").await.unwrap(), 1);

        // Claim past the counter: nothing changes
        let denied = repo.claim_stock("polo-1", "Navy", "M", 2).await;
        assert!(matches!(denied, Err(DbError::Conflict(_))));
        assert_eq!(repo.stock_for("polo-1", "Navy", "M").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_deactivated_product_stops_resolving() {
        let repo = repo().await;
        repo.insert(&polo()).await.unwrap();

        repo.deactivate("polo-1").await.unwrap();
        assert!(repo.get_by_id("polo-1").await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 0);

        assert!(matches!(
            repo.deactivate("ghost").await,
            Err(DbError::NotFound { .. })
        ));
    }
}

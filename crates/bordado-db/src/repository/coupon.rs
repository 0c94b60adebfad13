//! # Coupon Repository
//!
//! Database operations for coupons and their usage counters.
//!
//! ## Idempotent Redemption
//! ```text
//! increment_usage(code, order_id)
//!        │
//!        ▼
//! INSERT OR IGNORE INTO coupon_redemptions (code, order_id)
//!        │
//!        ├── 0 rows: this order was counted before ──► AlreadyCounted
//!        │
//!        ▼
//! UPDATE coupons SET current_uses = current_uses + 1
//! WHERE code = ? AND current_uses < max_uses
//!        │
//!        ├── 0 rows: counter is at max_uses ──► Conflict (rolled back)
//!        │
//!        ▼
//! commit ──► Counted
//! ```
//!
//! Both statements run in one transaction: a retried or re-displayed
//! checkout confirmation can never move the counter twice, and concurrent
//! checkouts cannot push it past `max_uses`.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::debug;

use async_trait::async_trait;
use bordado_cart::providers::{CouponDirectory, ProviderError, Redemption};
use bordado_core::types::{Coupon, DiscountType};

use crate::error::{DbError, DbResult};

/// Repository for coupon database operations.
#[derive(Debug, Clone)]
pub struct CouponRepository {
    pool: SqlitePool,
}

impl CouponRepository {
    /// Creates a new CouponRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CouponRepository { pool }
    }

    /// Inserts a coupon. The code is stored in canonical form.
    pub async fn insert(&self, coupon: &Coupon) -> DbResult<()> {
        let code = Coupon::canonical_code(&coupon.code);
        debug!(%code, "inserting coupon");

        sqlx::query(
            r#"
            INSERT INTO coupons (
                code, discount_type, discount_value, min_order_cents,
                max_uses, current_uses, valid_from, valid_to, active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&code)
        .bind(discount_type_label(coupon.discount_type))
        .bind(coupon.value)
        .bind(coupon.min_order_cents)
        .bind(coupon.max_uses as i64)
        .bind(coupon.current_uses as i64)
        .bind(coupon.valid_from)
        .bind(coupon.valid_to)
        .bind(coupon.active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Looks up a coupon by code, case-insensitively.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Coupon>> {
        let canonical = Coupon::canonical_code(code);

        let row = sqlx::query(
            r#"
            SELECT code, discount_type, discount_value, min_order_cents,
                   max_uses, current_uses, valid_from, valid_to, active
            FROM coupons
            WHERE code = ?1
            "#,
        )
        .bind(&canonical)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let discount_type: String = row.try_get("discount_type")?;
        let discount_type = match discount_type.as_str() {
            "percentage" => DiscountType::Percentage,
            "fixed" => DiscountType::Fixed,
            other => {
                return Err(DbError::Serialization(format!(
                    "unknown discount type '{other}'"
                )))
            }
        };

        Ok(Some(Coupon {
            code: row.try_get("code")?,
            discount_type,
            value: row.try_get("discount_value")?,
            min_order_cents: row.try_get("min_order_cents")?,
            max_uses: row.try_get::<i64, _>("max_uses")? as u32,
            current_uses: row.try_get::<i64, _>("current_uses")? as u32,
            valid_from: row.try_get::<DateTime<Utc>, _>("valid_from")?,
            valid_to: row.try_get::<DateTime<Utc>, _>("valid_to")?,
            active: row.try_get("active")?,
        }))
    }

    /// Records one redemption for `order_id`, idempotently.
    ///
    /// See the module docs for the transaction layout.
    pub async fn increment_usage(&self, code: &str, order_id: &str) -> DbResult<Redemption> {
        let canonical = Coupon::canonical_code(code);
        debug!(code = %canonical, order_id, "recording coupon redemption");

        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM coupons WHERE code = ?1")
            .bind(&canonical)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(DbError::not_found("coupon", &canonical));
        }

        let inserted = sqlx::query(
            r#"
            INSERT OR IGNORE INTO coupon_redemptions (coupon_code, order_id, redeemed_at)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(&canonical)
        .bind(order_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            // This order already moved the counter; nothing else to do
            tx.commit().await?;
            return Ok(Redemption::AlreadyCounted);
        }

        let updated = sqlx::query(
            r#"
            UPDATE coupons
            SET current_uses = current_uses + 1
            WHERE code = ?1 AND current_uses < max_uses
            "#,
        )
        .bind(&canonical)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            // Dropping the transaction rolls the redemption row back
            return Err(DbError::Conflict(format!(
                "coupon {canonical} has no uses left"
            )));
        }

        tx.commit().await?;
        Ok(Redemption::Counted)
    }
}

// =============================================================================
// Collaborator Trait
// =============================================================================

#[async_trait]
impl CouponDirectory for CouponRepository {
    async fn coupon_by_code(&self, code: &str) -> Result<Option<Coupon>, ProviderError> {
        self.get_by_code(code).await.map_err(Into::into)
    }

    async fn increment_usage(
        &self,
        code: &str,
        order_id: &str,
    ) -> Result<Redemption, ProviderError> {
        CouponRepository::increment_usage(self, code, order_id)
            .await
            .map_err(Into::into)
    }
}

fn discount_type_label(discount_type: DiscountType) -> &'static str {
    match discount_type {
        DiscountType::Percentage => "percentage",
        DiscountType::Fixed => "fixed",
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! Order-history repository for purchase aggregation queries.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use orchard_core::{CategoryId, ProductId, UserId};

use crate::store::{OrderHistoryStore, StoreError};

/// Repository for completed-order read queries.
pub struct OrderHistoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderHistoryRepository<'a> {
    /// Create a new order-history repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl OrderHistoryStore for OrderHistoryRepository<'_> {
    async fn top_sellers_since(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ProductId>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query_scalar::<_, i32>(
            r"
            SELECT oi.product_id
            FROM shop.order_items oi
            JOIN shop.orders o ON o.id = oi.order_id
            WHERE o.created_at >= $1
            GROUP BY oi.product_id
            ORDER BY SUM(oi.quantity) DESC
            LIMIT $2
            ",
        )
        .bind(since)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ProductId::new).collect())
    }

    async fn purchased_category_ids(&self, user: UserId) -> Result<Vec<CategoryId>, StoreError> {
        let rows = sqlx::query_scalar::<_, i32>(
            r"
            SELECT DISTINCT p.category_id
            FROM shop.order_items oi
            JOIN shop.orders o ON o.id = oi.order_id
            JOIN shop.products p ON p.id = oi.product_id
            WHERE o.user_id = $1 AND p.category_id IS NOT NULL
            ",
        )
        .bind(user.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(CategoryId::new).collect())
    }

    async fn purchased_product_ids(&self, user: UserId) -> Result<Vec<ProductId>, StoreError> {
        let rows = sqlx::query_scalar::<_, i32>(
            r"
            SELECT DISTINCT oi.product_id
            FROM shop.order_items oi
            JOIN shop.orders o ON o.id = oi.order_id
            WHERE o.user_id = $1
            ",
        )
        .bind(user.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ProductId::new).collect())
    }
}

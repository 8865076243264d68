//! Catalog repository for product read queries.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use orchard_core::{CategoryId, CurrencyCode, Price, ProductId};

use crate::models::Product;
use crate::store::{CatalogStore, StoreError};

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    category_id: Option<i32>,
    name: String,
    price: Decimal,
    currency_code: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let currency_code = row.currency_code.parse::<CurrencyCode>().map_err(|e| {
            StoreError::DataCorruption(format!("invalid currency code in database: {e}"))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            category_id: row.category_id.map(CategoryId::new),
            name: row.name,
            price: Price::new(row.price, currency_code),
            created_at: row.created_at,
        })
    }
}

/// Repository for catalog read queries.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl CatalogStore for CatalogRepository<'_> {
    async fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, category_id, name, price, currency_code, created_at
            FROM shop.products
            WHERE id = ANY($1)
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn category_ids_of(&self, ids: &[ProductId]) -> Result<Vec<CategoryId>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
        let rows = sqlx::query_scalar::<_, i32>(
            r"
            SELECT DISTINCT category_id
            FROM shop.products
            WHERE id = ANY($1) AND category_id IS NOT NULL
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(CategoryId::new).collect())
    }

    async fn sample_random(
        &self,
        categories: Option<&[CategoryId]>,
        exclude: &HashSet<ProductId>,
        k: usize,
    ) -> Result<Vec<Product>, StoreError> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let categories: Option<Vec<i32>> =
            categories.map(|c| c.iter().map(CategoryId::as_i32).collect());
        let exclude: Vec<i32> = exclude.iter().map(ProductId::as_i32).collect();
        let k = i64::try_from(k).unwrap_or(i64::MAX);

        // NULL category filter means "whole catalog"; an empty array matches
        // nothing, which is what an empty category set should do.
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, category_id, name, price, currency_code, created_at
            FROM shop.products
            WHERE ($1::int4[] IS NULL OR category_id = ANY($1))
              AND id <> ALL($2)
            ORDER BY random()
            LIMIT $3
            ",
        )
        .bind(&categories)
        .bind(&exclude)
        .bind(k)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }
}

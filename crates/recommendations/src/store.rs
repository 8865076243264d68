//! Store interfaces consumed by the recommendation engine.
//!
//! The engine is generic over these two traits so its selection logic can be
//! exercised with deterministic in-memory fakes. The production
//! implementations live in [`crate::db`] and run read-only queries against
//! `PostgreSQL`; randomization uses the store's own primitive, so no ordering
//! or reproducibility guarantee exists beyond what each method documents.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use thiserror::Error;

use orchard_core::{CategoryId, ProductId, UserId};

use crate::models::Product;

/// Errors raised by catalog and order-history stores.
///
/// The engine does not catch or translate these; they propagate unchanged to
/// the caller.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Read access to the product catalog.
///
/// The engine only needs id-set fetches, a distinct category projection, and
/// random sampling with category/exclusion filters.
#[allow(async_fn_in_trait)] // engine is generic over stores, never dyn
pub trait CatalogStore {
    /// Fetch the products named by `ids`.
    ///
    /// Row order is unspecified; callers needing a particular order must
    /// re-establish it. Unknown ids are silently absent from the result.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the underlying query fails.
    async fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError>;

    /// Distinct categories among the products named by `ids`.
    ///
    /// Products without a category contribute nothing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the underlying query fails.
    async fn category_ids_of(&self, ids: &[ProductId]) -> Result<Vec<CategoryId>, StoreError>;

    /// Up to `k` products drawn uniformly at random.
    ///
    /// `categories` of `Some` restricts candidates to products in any of the
    /// given categories (products without a category never match); `None`
    /// samples the whole catalog. Products in `exclude` are never returned.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the underlying query fails.
    async fn sample_random(
        &self,
        categories: Option<&[CategoryId]>,
        exclude: &HashSet<ProductId>,
        k: usize,
    ) -> Result<Vec<Product>, StoreError>;
}

/// Read access to completed-order history.
#[allow(async_fn_in_trait)] // engine is generic over stores, never dyn
pub trait OrderHistoryStore {
    /// Product ids ranked by total quantity sold since `since`, best first,
    /// at most `limit` entries. Tie order is whatever the store yields.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the underlying query fails.
    async fn top_sellers_since(
        &self,
        since: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<ProductId>, StoreError>;

    /// Distinct categories among products the user has ever purchased.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the underlying query fails.
    async fn purchased_category_ids(&self, user: UserId) -> Result<Vec<CategoryId>, StoreError>;

    /// Distinct ids of products the user has ever purchased.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the underlying query fails.
    async fn purchased_product_ids(&self, user: UserId) -> Result<Vec<ProductId>, StoreError>;
}

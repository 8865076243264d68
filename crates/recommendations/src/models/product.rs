//! Product domain type.
//!
//! Validated domain object, separate from database row types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use orchard_core::{CategoryId, Price, ProductId};

/// A catalog product as seen by the recommendation engine.
///
/// Read-only here: the engine never creates or mutates catalog rows. Identity
/// is the product ID; two instances with the same ID represent the same row.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Grouping category, if the product has one.
    pub category_id: Option<CategoryId>,
    /// Display name.
    pub name: String,
    /// Display price.
    pub price: Price,
    /// When the product was added to the catalog.
    pub created_at: DateTime<Utc>,
}

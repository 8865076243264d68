//! `PostgreSQL` implementations of the recommendation stores.
//!
//! # Schema: `shop`
//!
//! Everything here is a read-only consumer of:
//!
//! - `categories`, `products` - the catalog
//! - `users`, `orders`, `order_items` - completed-order history
//!
//! Queries are runtime-checked (`sqlx::query_as` over `FromRow` row types)
//! rather than macro-checked: the array filters and `ORDER BY random()`
//! sampling used here don't fit the macros' offline verification.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/recommendations/migrations/` and run via:
//! ```bash
//! cargo run -p orchard-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub mod catalog;
pub mod orders;

pub use catalog::CatalogRepository;
pub use orders::OrderHistoryRepository;

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

//! Orchard Recommendations - rule-based product recommendation engine.
//!
//! Selects products for a user or browsing context from three strategies:
//! recent sales volume (trending), purchase-category affinity
//! (personalized), and category overlap with a seed set (similar). Short
//! results are backfilled from trending and, ultimately, uniform random
//! sampling.
//!
//! # Architecture
//!
//! The engine ([`RecommendationEngine`]) is generic over two read-only store
//! traits, [`CatalogStore`] and [`OrderHistoryStore`], so its selection
//! logic is testable without a database. Production implementations backed
//! by `PostgreSQL` live in [`db`].
//!
//! # Example
//!
//! ```rust,ignore
//! use orchard_recommendations::db::{CatalogRepository, OrderHistoryRepository};
//! use orchard_recommendations::{RecommendationEngine, RecommenderConfig, db};
//!
//! let config = RecommenderConfig::from_env()?;
//! let pool = db::create_pool(&config.database_url).await?;
//! let engine = RecommendationEngine::with_settings(
//!     CatalogRepository::new(&pool),
//!     OrderHistoryRepository::new(&pool),
//!     config.engine_settings(),
//! );
//! let products = engine.get_trending_products(None).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod engine;
pub mod models;
pub mod store;

pub use config::{ConfigError, RecommenderConfig};
pub use engine::{DEFAULT_LIMIT, EngineSettings, RecommendationEngine};
pub use models::Product;
pub use store::{CatalogStore, OrderHistoryStore, StoreError};

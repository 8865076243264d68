//! Recommendation query commands.
//!
//! Each subcommand builds a request-scoped engine over the two Postgres
//! repositories and reports the selected products.

use sqlx::PgPool;
use tracing::info;

use orchard_core::{ProductId, UserId, UserIdentity};
use orchard_recommendations::db::{self, CatalogRepository, OrderHistoryRepository};
use orchard_recommendations::{Product, RecommendationEngine, RecommenderConfig};

/// Globally trending products.
///
/// # Errors
///
/// Returns an error on configuration, connection, or query failure.
pub async fn trending(limit: Option<usize>) -> Result<(), Box<dyn std::error::Error>> {
    let (config, pool) = connect().await?;
    let engine = build_engine(&pool, &config);

    let products = engine.get_trending_products(limit).await?;
    report("trending", &products);
    Ok(())
}

/// Personalized recommendations for a user (anonymous when `user` is `None`).
///
/// # Errors
///
/// Returns an error on configuration, connection, or query failure.
pub async fn for_user(
    user: Option<i32>,
    limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let identity = user.map_or(UserIdentity::Anonymous, |id| {
        UserIdentity::Authenticated(UserId::new(id))
    });

    let (config, pool) = connect().await?;
    let engine = build_engine(&pool, &config);

    let products = engine
        .get_personalized_recommendations(identity, limit)
        .await?;
    report("personalized", &products);
    Ok(())
}

/// Products similar to a seed set.
///
/// # Errors
///
/// Returns an error on configuration, connection, or query failure.
pub async fn similar(
    ids: &[ProductId],
    exclude: &[ProductId],
    limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (config, pool) = connect().await?;
    let engine = build_engine(&pool, &config);

    let products = engine.get_similar_to_products(ids, limit, exclude).await?;
    report("similar", &products);
    Ok(())
}

async fn connect() -> Result<(RecommenderConfig, PgPool), Box<dyn std::error::Error>> {
    let config = RecommenderConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;
    Ok((config, pool))
}

fn build_engine<'a>(
    pool: &'a PgPool,
    config: &RecommenderConfig,
) -> RecommendationEngine<CatalogRepository<'a>, OrderHistoryRepository<'a>> {
    RecommendationEngine::with_settings(
        CatalogRepository::new(pool),
        OrderHistoryRepository::new(pool),
        config.engine_settings(),
    )
}

fn report(strategy: &str, products: &[Product]) {
    info!(strategy, count = products.len(), "Recommendations");
    for product in products {
        info!("  [{}] {} - {}", product.id, product.name, product.price);
    }
}

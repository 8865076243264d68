//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! orchard migrate
//! ```
//!
//! # Environment Variables
//!
//! - `ORCHARD_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! Migration files live in `crates/recommendations/migrations/` and are
//! embedded into the binary at compile time. Migrations are never run on
//! startup by anything else; this command is the only writer.

use secrecy::SecretString;
use thiserror::Error;
use tracing::info;

/// Errors raised while running migrations.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run the recommendation-store migrations.
///
/// # Errors
///
/// Returns [`MigrationError`] if the database URL is unset, the connection
/// fails, or a migration fails to apply.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("ORCHARD_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar("ORCHARD_DATABASE_URL"))?;

    info!("Connecting to database...");
    let pool = orchard_recommendations::db::create_pool(&database_url).await?;

    info!("Running migrations...");
    sqlx::migrate!("../recommendations/migrations")
        .run(&pool)
        .await?;

    info!("Migrations complete!");
    Ok(())
}

//! Orchard CLI - database migrations, seeding, and recommendation tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! orchard migrate
//!
//! # Seed demo catalog and order history
//! orchard seed --users 8 --orders 40
//!
//! # Query recommendations
//! orchard recommend trending --limit 6
//! orchard recommend for-user --user 3
//! orchard recommend similar --ids 1,4,9 --exclude 2
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed the database with demo data
//! - `recommend` - Query the recommendation engine

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use orchard_core::ProductId;

mod commands;

#[derive(Parser)]
#[command(name = "orchard")]
#[command(author, version, about = "Orchard CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with a demo catalog and order history
    Seed {
        /// Number of demo users to create
        #[arg(long, default_value_t = 8)]
        users: usize,

        /// Number of demo orders to create
        #[arg(long, default_value_t = 40)]
        orders: usize,
    },
    /// Query product recommendations
    Recommend {
        #[command(subcommand)]
        strategy: RecommendStrategy,
    },
}

#[derive(Subcommand)]
enum RecommendStrategy {
    /// Globally trending products (recent sales volume)
    Trending {
        /// Maximum number of products to return
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Personalized recommendations for a user
    ForUser {
        /// User ID; omit for the anonymous fallback
        #[arg(short, long)]
        user: Option<i32>,

        /// Maximum number of products to return
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Products similar to a seed set (e.g. a wishlist)
    Similar {
        /// Seed product ids (comma-separated); empty falls back to trending
        #[arg(long, value_delimiter = ',')]
        ids: Vec<ProductId>,

        /// Additional product ids to exclude (comma-separated)
        #[arg(long, value_delimiter = ',')]
        exclude: Vec<ProductId>,

        /// Maximum number of products to return
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing with EnvFilter; default to info for our crates.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "orchard_cli=info,orchard_recommendations=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { users, orders } => commands::seed::run(users, orders).await?,
        Commands::Recommend { strategy } => match strategy {
            RecommendStrategy::Trending { limit } => commands::recommend::trending(limit).await?,
            RecommendStrategy::ForUser { user, limit } => {
                commands::recommend::for_user(user, limit).await?;
            }
            RecommendStrategy::Similar {
                ids,
                exclude,
                limit,
            } => commands::recommend::similar(&ids, &exclude, limit).await?,
        },
    }
    Ok(())
}

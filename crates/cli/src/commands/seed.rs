//! Seed the database with a demo catalog and order history.
//!
//! Inserts a small fixed catalog (four categories, sixteen products), the
//! requested number of demo users, and randomized completed orders spread
//! across the last 45 days, so some fall inside the 30-day trending window
//! and some do not. Intended for a freshly migrated database; categories and
//! users upsert by name/email, products are inserted as-is.

use std::collections::HashMap;

use chrono::{TimeDelta, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use secrecy::SecretString;
use tracing::info;

use orchard_recommendations::db;

/// Demo category names.
const DEMO_CATEGORIES: &[&str] = &["Books", "Coffee", "Homeware", "Outdoors"];

/// Demo products: (name, category, price in cents).
const DEMO_PRODUCTS: &[(&str, &str, i64)] = &[
    ("The Salt Path", "Books", 1499),
    ("Winter Orchard", "Books", 1899),
    ("A Field Guide to Ferns", "Books", 2450),
    ("Paper Towns of Europe", "Books", 2199),
    ("Ethiopia Yirgacheffe 250g", "Coffee", 1350),
    ("House Espresso Blend 1kg", "Coffee", 2900),
    ("Ceramic Pour-Over Dripper", "Coffee", 3200),
    ("Goose-neck Kettle", "Coffee", 5400),
    ("Linen Tea Towel Set", "Homeware", 2800),
    ("Stoneware Serving Bowl", "Homeware", 4200),
    ("Beeswax Candle Trio", "Homeware", 1950),
    ("Walnut Serving Board", "Homeware", 6100),
    ("Enamel Camping Mug", "Outdoors", 1200),
    ("Ripstop Day Pack 20L", "Outdoors", 7800),
    ("Merino Hiking Socks", "Outdoors", 1650),
    ("Titanium Spork", "Outdoors", 990),
];

/// Seed demo data.
///
/// # Arguments
///
/// * `users` - Number of demo users to create
/// * `orders` - Number of demo orders to create
///
/// # Errors
///
/// Returns an error if the database URL is unset or any insert fails.
pub async fn run(users: usize, orders: usize) -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("ORCHARD_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| "ORCHARD_DATABASE_URL not set")?;

    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let mut tx = pool.begin().await?;

    // Categories (upsert by name so re-seeding keeps ids stable)
    let mut category_ids: HashMap<&str, i32> = HashMap::new();
    for name in DEMO_CATEGORIES {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO shop.categories (name) VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            ",
        )
        .bind(name)
        .fetch_one(&mut *tx)
        .await?;
        category_ids.insert(name, id);
    }

    // Products
    let mut product_ids: Vec<i32> = Vec::with_capacity(DEMO_PRODUCTS.len());
    for (name, category, cents) in DEMO_PRODUCTS {
        let category_id = category_ids
            .get(category)
            .copied()
            .ok_or_else(|| format!("unknown demo category: {category}"))?;
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO shop.products (category_id, name, price, currency_code)
            VALUES ($1, $2, $3, 'USD')
            RETURNING id
            ",
        )
        .bind(category_id)
        .bind(name)
        .bind(Decimal::new(*cents, 2))
        .fetch_one(&mut *tx)
        .await?;
        product_ids.push(id);
    }

    // Users (upsert by email)
    let mut user_ids: Vec<i32> = Vec::with_capacity(users);
    for i in 1..=users {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO shop.users (email) VALUES ($1)
            ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
            RETURNING id
            ",
        )
        .bind(format!("demo{i}@example.com"))
        .fetch_one(&mut *tx)
        .await?;
        user_ids.push(id);
    }

    // Orders spread over the last 45 days, 1-3 line items each
    let mut rng = rand::rng();
    let mut items_inserted = 0_usize;
    if !user_ids.is_empty() && !product_ids.is_empty() {
        for _ in 0..orders {
            let user_id = user_ids
                .get(rng.random_range(0..user_ids.len()))
                .copied()
                .ok_or("empty user pool")?;
            let created_at = Utc::now()
                - TimeDelta::days(rng.random_range(0..45))
                - TimeDelta::minutes(rng.random_range(0..1440));

            let order_id: i32 = sqlx::query_scalar(
                r"
                INSERT INTO shop.orders (user_id, created_at) VALUES ($1, $2)
                RETURNING id
                ",
            )
            .bind(user_id)
            .bind(created_at)
            .fetch_one(&mut *tx)
            .await?;

            for _ in 0..rng.random_range(1..=3) {
                let product_id = product_ids
                    .get(rng.random_range(0..product_ids.len()))
                    .copied()
                    .ok_or("empty product pool")?;
                sqlx::query(
                    r"
                    INSERT INTO shop.order_items (order_id, product_id, quantity)
                    VALUES ($1, $2, $3)
                    ",
                )
                .bind(order_id)
                .bind(product_id)
                .bind(rng.random_range(1_i32..=4))
                .execute(&mut *tx)
                .await?;
                items_inserted += 1;
            }
        }
    }

    tx.commit().await?;

    info!("Seeding complete!");
    info!("  Categories: {}", category_ids.len());
    info!("  Products: {}", product_ids.len());
    info!("  Users: {}", user_ids.len());
    info!("  Orders: {orders} ({items_inserted} line items)");

    Ok(())
}

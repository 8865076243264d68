//! Rule-based product recommendation engine.
//!
//! Three selection strategies share one fallback chain: recent sales volume
//! (trending), purchase-category affinity (personalized), and category
//! overlap with a seed set (similar). Short results are topped up from
//! trending, which in turn tops up from uniform random sampling, so callers
//! always get as close to `limit` products as the catalog allows.

use std::collections::{HashMap, HashSet};

use chrono::{TimeDelta, Utc};
use tracing::{debug, instrument};

use orchard_core::{ProductId, UserIdentity};

use crate::models::Product;
use crate::store::{CatalogStore, OrderHistoryStore, StoreError};

/// Number of products returned when the caller does not specify a limit.
pub const DEFAULT_LIMIT: usize = 4;

/// Default trailing window, in days, for trending sales aggregation.
pub const DEFAULT_TRENDING_WINDOW_DAYS: i64 = 30;

/// Tunable engine settings.
///
/// [`Default`] matches the shipped behavior: four products per call, ranked
/// over the last thirty days of sales.
#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    /// Result count used when an operation is called without a limit.
    pub default_limit: usize,
    /// Trailing window for trending sales aggregation.
    pub trending_window: TimeDelta,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            trending_window: TimeDelta::days(DEFAULT_TRENDING_WINDOW_DAYS),
        }
    }
}

/// Stateless recommendation engine over a catalog store and an order-history
/// store.
///
/// Each operation is an independent read-then-select pipeline: the engine
/// holds no mutable state, so it is cheap to construct per request and
/// concurrent calls are fully independent. Store failures propagate unchanged
/// to the caller; the only built-in fallback is the trending/random backfill,
/// which handles insufficient data, not errors.
pub struct RecommendationEngine<C, O> {
    catalog: C,
    orders: O,
    settings: EngineSettings,
}

impl<C, O> RecommendationEngine<C, O>
where
    C: CatalogStore,
    O: OrderHistoryStore,
{
    /// Create an engine with default settings.
    pub fn new(catalog: C, orders: O) -> Self {
        Self::with_settings(catalog, orders, EngineSettings::default())
    }

    /// Create an engine with explicit settings.
    #[must_use]
    pub const fn with_settings(catalog: C, orders: O, settings: EngineSettings) -> Self {
        Self {
            catalog,
            orders,
            settings,
        }
    }

    /// Globally popular products based on recent sales.
    ///
    /// Ranks products by total quantity sold inside the trending window and
    /// keeps the top `limit`. If recent sales cover fewer than `limit`
    /// products, the remainder is drawn uniformly at random from the rest of
    /// the catalog. An empty catalog yields an empty list.
    ///
    /// # Errors
    ///
    /// Propagates any [`StoreError`] raised by the underlying stores.
    #[instrument(skip(self))]
    pub async fn get_trending_products(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<Product>, StoreError> {
        let limit = limit.unwrap_or(self.settings.default_limit);
        let since = Utc::now() - self.settings.trending_window;

        let ranked_ids = self.orders.top_sellers_since(since, limit).await?;
        let mut by_id: HashMap<ProductId, Product> = self
            .catalog
            .products_by_ids(&ranked_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        // The id-set fetch returns rows in unspecified order; restore the
        // sales ranking. `remove` also collapses duplicate ids.
        let mut products: Vec<Product> = ranked_ids
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect();

        if products.len() < limit {
            let selected: HashSet<ProductId> = products.iter().map(|p| p.id).collect();
            let fill = self
                .catalog
                .sample_random(None, &selected, limit - products.len())
                .await?;
            debug!(
                ranked = products.len(),
                backfilled = fill.len(),
                "recent sales fell short of limit"
            );
            products.extend(fill);
        }

        products.truncate(limit);
        Ok(products)
    }

    /// Recommendations for a specific user based on purchased categories.
    ///
    /// Anonymous visitors get trending products. For signed-in users, each
    /// purchased category is sampled in turn (excluding products the user
    /// already owns) until `limit` is reached; any remaining quota is filled
    /// from trending. A product the user has purchased is never returned.
    ///
    /// # Errors
    ///
    /// Propagates any [`StoreError`] raised by the underlying stores.
    #[instrument(skip(self))]
    pub async fn get_personalized_recommendations(
        &self,
        user: UserIdentity,
        limit: Option<usize>,
    ) -> Result<Vec<Product>, StoreError> {
        let limit = limit.unwrap_or(self.settings.default_limit);

        // Anonymous visitors have no purchase history to mine.
        let Some(user_id) = user.user_id() else {
            return self.get_trending_products(Some(limit)).await;
        };

        let categories = self.orders.purchased_category_ids(user_id).await?;
        let purchased: HashSet<ProductId> = self
            .orders
            .purchased_product_ids(user_id)
            .await?
            .into_iter()
            .collect();
        debug!(
            %user_id,
            categories = categories.len(),
            purchased = purchased.len(),
            "loaded purchase history"
        );

        let mut selected: Vec<Product> = Vec::with_capacity(limit);
        let mut excluded = purchased.clone();

        for category in categories {
            if selected.len() >= limit {
                break;
            }
            let picks = self
                .catalog
                .sample_random(Some(&[category]), &excluded, limit - selected.len())
                .await?;
            for product in picks {
                excluded.insert(product.id);
                selected.push(product);
            }
        }

        if selected.len() < limit {
            // Keep purchased products out of the trending backfill too.
            self.fill_from_trending(&mut selected, limit, &purchased)
                .await?;
        }

        selected.truncate(limit);
        Ok(selected)
    }

    /// Products similar to a seed set (e.g. a wishlist), by shared category.
    ///
    /// The seed products and `exclude_ids` form one exclusion set; candidates
    /// are sampled at random from the seed products' categories, then topped
    /// up from trending. An empty seed set delegates entirely to trending.
    ///
    /// # Errors
    ///
    /// Propagates any [`StoreError`] raised by the underlying stores.
    #[instrument(skip(self))]
    pub async fn get_similar_to_products(
        &self,
        product_ids: &[ProductId],
        limit: Option<usize>,
        exclude_ids: &[ProductId],
    ) -> Result<Vec<Product>, StoreError> {
        let limit = limit.unwrap_or(self.settings.default_limit);

        if product_ids.is_empty() {
            return self.get_trending_products(Some(limit)).await;
        }

        let excluded: HashSet<ProductId> =
            product_ids.iter().chain(exclude_ids).copied().collect();

        let categories = self.catalog.category_ids_of(product_ids).await?;
        debug!(
            seeds = product_ids.len(),
            categories = categories.len(),
            "resolved seed categories"
        );
        let mut selected = self
            .catalog
            .sample_random(Some(&categories), &excluded, limit)
            .await?;

        if selected.len() < limit {
            self.fill_from_trending(&mut selected, limit, &excluded)
                .await?;
        }

        selected.truncate(limit);
        Ok(selected)
    }

    /// Top up `selected` from trending, skipping excluded and already-selected
    /// products.
    ///
    /// Deduplication is by product identifier throughout: two instances of the
    /// same catalog row never both land in the result, even if the stores
    /// return distinct instances.
    async fn fill_from_trending(
        &self,
        selected: &mut Vec<Product>,
        limit: usize,
        excluded: &HashSet<ProductId>,
    ) -> Result<(), StoreError> {
        if selected.len() >= limit {
            return Ok(());
        }

        let trending = self
            .get_trending_products(Some(limit - selected.len()))
            .await?;
        let mut seen: HashSet<ProductId> = selected.iter().map(|p| p.id).collect();
        for product in trending {
            if selected.len() >= limit {
                break;
            }
            if excluded.contains(&product.id) || !seen.insert(product.id) {
                continue;
            }
            selected.push(product);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::DateTime;
    use rust_decimal::Decimal;

    use orchard_core::{CategoryId, CurrencyCode, Price, UserId};

    use super::*;

    /// Deterministic catalog fake: "random" sampling returns candidates in
    /// ascending id order.
    struct FakeCatalog {
        products: Vec<Product>,
    }

    impl CatalogStore for FakeCatalog {
        async fn products_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, StoreError> {
            // Deliberately NOT in the requested order: the engine must restore
            // rank order itself.
            let mut found: Vec<Product> = self
                .products
                .iter()
                .filter(|p| ids.contains(&p.id))
                .cloned()
                .collect();
            found.sort_by_key(|p| p.id);
            Ok(found)
        }

        async fn category_ids_of(&self, ids: &[ProductId]) -> Result<Vec<CategoryId>, StoreError> {
            let mut categories: Vec<CategoryId> = self
                .products
                .iter()
                .filter(|p| ids.contains(&p.id))
                .filter_map(|p| p.category_id)
                .collect();
            categories.sort_unstable();
            categories.dedup();
            Ok(categories)
        }

        async fn sample_random(
            &self,
            categories: Option<&[CategoryId]>,
            exclude: &HashSet<ProductId>,
            k: usize,
        ) -> Result<Vec<Product>, StoreError> {
            let mut candidates: Vec<Product> = self
                .products
                .iter()
                .filter(|p| match categories {
                    Some(wanted) => p.category_id.is_some_and(|c| wanted.contains(&c)),
                    None => true,
                })
                .filter(|p| !exclude.contains(&p.id))
                .cloned()
                .collect();
            candidates.sort_by_key(|p| p.id);
            candidates.truncate(k);
            Ok(candidates)
        }
    }

    #[derive(Default)]
    struct FakeOrders {
        /// Product ids ranked by recent sales volume, best seller first.
        recent_top_sellers: Vec<ProductId>,
        purchases: HashMap<UserId, Vec<ProductId>>,
        purchased_categories: HashMap<UserId, Vec<CategoryId>>,
    }

    impl OrderHistoryStore for FakeOrders {
        async fn top_sellers_since(
            &self,
            _since: DateTime<Utc>,
            limit: usize,
        ) -> Result<Vec<ProductId>, StoreError> {
            Ok(self
                .recent_top_sellers
                .iter()
                .copied()
                .take(limit)
                .collect())
        }

        async fn purchased_category_ids(
            &self,
            user: UserId,
        ) -> Result<Vec<CategoryId>, StoreError> {
            Ok(self
                .purchased_categories
                .get(&user)
                .cloned()
                .unwrap_or_default())
        }

        async fn purchased_product_ids(&self, user: UserId) -> Result<Vec<ProductId>, StoreError> {
            Ok(self.purchases.get(&user).cloned().unwrap_or_default())
        }
    }

    fn product(id: i32, category: Option<i32>) -> Product {
        Product {
            id: ProductId::new(id),
            category_id: category.map(CategoryId::new),
            name: format!("product-{id}"),
            price: Price::new(Decimal::new(1000 + i64::from(id), 2), CurrencyCode::USD),
            created_at: Utc::now(),
        }
    }

    /// Ten products: ids 1-5 in category 1, ids 6-10 in category 2.
    fn two_category_catalog() -> Vec<Product> {
        (1..=10)
            .map(|id| product(id, Some(if id <= 5 { 1 } else { 2 })))
            .collect()
    }

    fn product_ids(products: &[Product]) -> Vec<i32> {
        products.iter().map(|p| p.id.as_i32()).collect()
    }

    fn top_sellers(ids: &[i32]) -> Vec<ProductId> {
        ids.iter().copied().map(ProductId::new).collect()
    }

    fn engine(
        products: Vec<Product>,
        orders: FakeOrders,
    ) -> RecommendationEngine<FakeCatalog, FakeOrders> {
        RecommendationEngine::new(FakeCatalog { products }, orders)
    }

    #[tokio::test]
    async fn test_trending_ranks_recent_sales_then_backfills() {
        // Product 3 sold 5 units, product 7 sold 3 units in the window.
        let orders = FakeOrders {
            recent_top_sellers: top_sellers(&[3, 7]),
            ..FakeOrders::default()
        };
        let engine = engine(two_category_catalog(), orders);

        let result = engine.get_trending_products(Some(4)).await.unwrap();
        let ids = product_ids(&result);

        assert_eq!(ids.len(), 4);
        assert_eq!(&ids[..2], &[3, 7], "sales rank order must be preserved");
        assert!(!ids[2..].contains(&3) && !ids[2..].contains(&7));
    }

    #[tokio::test]
    async fn test_trending_restores_rank_order_after_catalog_fetch() {
        // The fake catalog returns id-set fetches in ascending id order, so a
        // descending sales ranking proves the engine reorders.
        let orders = FakeOrders {
            recent_top_sellers: top_sellers(&[9, 2, 5]),
            ..FakeOrders::default()
        };
        let engine = engine(two_category_catalog(), orders);

        let result = engine.get_trending_products(Some(3)).await.unwrap();
        assert_eq!(product_ids(&result), vec![9, 2, 5]);
    }

    #[tokio::test]
    async fn test_trending_never_contains_duplicates() {
        // A store quirk yielding the same id twice must be collapsed.
        let orders = FakeOrders {
            recent_top_sellers: top_sellers(&[3, 3, 7]),
            ..FakeOrders::default()
        };
        let engine = engine(two_category_catalog(), orders);

        let result = engine.get_trending_products(Some(5)).await.unwrap();
        let ids = product_ids(&result);
        let unique: HashSet<i32> = ids.iter().copied().collect();

        assert_eq!(ids.len(), 5);
        assert_eq!(unique.len(), ids.len());
    }

    #[tokio::test]
    async fn test_trending_empty_catalog_yields_empty() {
        let engine = engine(Vec::new(), FakeOrders::default());
        let result = engine.get_trending_products(None).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_default_limit_applies_when_unspecified() {
        let engine = engine(two_category_catalog(), FakeOrders::default());
        let result = engine.get_trending_products(None).await.unwrap();
        assert_eq!(result.len(), DEFAULT_LIMIT);
    }

    #[tokio::test]
    async fn test_output_is_bounded_for_every_operation() {
        for limit in 0..=6 {
            let orders = FakeOrders {
                recent_top_sellers: top_sellers(&[1, 6]),
                purchases: HashMap::from([(UserId::new(1), top_sellers(&[2]))]),
                purchased_categories: HashMap::from([(UserId::new(1), vec![CategoryId::new(1)])]),
            };
            let engine = engine(two_category_catalog(), orders);

            let trending = engine.get_trending_products(Some(limit)).await.unwrap();
            assert!(trending.len() <= limit);

            let personalized = engine
                .get_personalized_recommendations(
                    UserIdentity::Authenticated(UserId::new(1)),
                    Some(limit),
                )
                .await
                .unwrap();
            assert!(personalized.len() <= limit);

            let similar = engine
                .get_similar_to_products(&[ProductId::new(1)], Some(limit), &[])
                .await
                .unwrap();
            assert!(similar.len() <= limit);
        }
    }

    #[tokio::test]
    async fn test_anonymous_user_gets_trending() {
        let orders = FakeOrders {
            recent_top_sellers: top_sellers(&[8, 2]),
            ..FakeOrders::default()
        };
        let engine = engine(two_category_catalog(), orders);

        let trending = engine.get_trending_products(Some(4)).await.unwrap();
        let personalized = engine
            .get_personalized_recommendations(UserIdentity::Anonymous, Some(4))
            .await
            .unwrap();

        assert_eq!(product_ids(&personalized), product_ids(&trending));
    }

    #[tokio::test]
    async fn test_personalized_prefers_purchased_categories() {
        // User bought product 1 (category 1, "Books"); category 1 has three
        // other products, the rest of the catalog lives in category 2.
        let user = UserId::new(42);
        let orders = FakeOrders {
            recent_top_sellers: top_sellers(&[6, 7]),
            purchases: HashMap::from([(user, top_sellers(&[1]))]),
            purchased_categories: HashMap::from([(user, vec![CategoryId::new(1)])]),
        };
        let catalog: Vec<Product> = (1..=4)
            .map(|id| product(id, Some(1)))
            .chain((5..=9).map(|id| product(id, Some(2))))
            .collect();
        let engine = engine(catalog, orders);

        let result = engine
            .get_personalized_recommendations(UserIdentity::Authenticated(user), Some(4))
            .await
            .unwrap();
        let ids = product_ids(&result);

        assert_eq!(ids.len(), 4);
        assert!(!ids.contains(&1), "purchased product must never come back");
        // All three remaining category-1 products, then trending backfill.
        assert!([2, 3, 4].iter().all(|id| ids.contains(id)));
        assert_eq!(ids[3], 6);
    }

    #[tokio::test]
    async fn test_personalized_excludes_purchases_from_trending_backfill() {
        // Category affinity yields nothing (the user owns the only product in
        // their category), and trending is dominated by products they bought.
        let user = UserId::new(7);
        let orders = FakeOrders {
            recent_top_sellers: top_sellers(&[1, 5, 6]),
            purchases: HashMap::from([(user, top_sellers(&[1, 5]))]),
            purchased_categories: HashMap::from([(user, vec![CategoryId::new(9)])]),
        };
        let catalog = vec![
            product(1, Some(9)),
            product(5, Some(2)),
            product(6, Some(2)),
            product(8, Some(2)),
        ];
        let engine = engine(catalog, orders);

        let result = engine
            .get_personalized_recommendations(UserIdentity::Authenticated(user), Some(4))
            .await
            .unwrap();
        let ids = product_ids(&result);

        assert!(!ids.contains(&1) && !ids.contains(&5));
        assert!(ids.contains(&6));
    }

    #[tokio::test]
    async fn test_personalized_stops_once_limit_reached() {
        // The first purchased category alone can fill the quota; the second
        // must not contribute.
        let user = UserId::new(3);
        let orders = FakeOrders {
            recent_top_sellers: Vec::new(),
            purchases: HashMap::from([(user, top_sellers(&[1]))]),
            purchased_categories: HashMap::from([(
                user,
                vec![CategoryId::new(1), CategoryId::new(2)],
            )]),
        };
        let engine = engine(two_category_catalog(), orders);

        let result = engine
            .get_personalized_recommendations(UserIdentity::Authenticated(user), Some(3))
            .await
            .unwrap();

        assert_eq!(product_ids(&result), vec![2, 3, 4]);
    }

    #[tokio::test]
    async fn test_similar_excludes_seed_and_explicit_ids() {
        // Trending deliberately leads with an excluded product.
        let orders = FakeOrders {
            recent_top_sellers: top_sellers(&[2, 6]),
            ..FakeOrders::default()
        };
        let catalog: Vec<Product> = (1..=4)
            .map(|id| product(id, Some(1)))
            .chain((5..=8).map(|id| product(id, Some(2))))
            .collect();
        let engine = engine(catalog, orders);

        let result = engine
            .get_similar_to_products(&[ProductId::new(1)], Some(4), &[ProductId::new(2)])
            .await
            .unwrap();
        let ids = product_ids(&result);

        assert!(!ids.contains(&1) && !ids.contains(&2));
        // Remaining category-1 products first, then trending backfill.
        assert!(ids.contains(&3) && ids.contains(&4));
        assert!(ids.contains(&6));
    }

    #[tokio::test]
    async fn test_similar_with_empty_seed_delegates_to_trending() {
        let orders = FakeOrders {
            recent_top_sellers: top_sellers(&[4, 9]),
            ..FakeOrders::default()
        };
        let engine = engine(two_category_catalog(), orders);

        let trending = engine.get_trending_products(Some(4)).await.unwrap();
        let similar = engine
            .get_similar_to_products(&[], Some(4), &[ProductId::new(4)])
            .await
            .unwrap();

        assert_eq!(product_ids(&similar), product_ids(&trending));
    }

    #[tokio::test]
    async fn test_similar_uncategorized_seed_backfills_from_trending() {
        let orders = FakeOrders {
            recent_top_sellers: top_sellers(&[2]),
            ..FakeOrders::default()
        };
        let catalog = vec![product(1, None), product(2, Some(1)), product(3, Some(1))];
        let engine = engine(catalog, orders);

        let result = engine
            .get_similar_to_products(&[ProductId::new(1)], Some(2), &[])
            .await
            .unwrap();
        let ids = product_ids(&result);

        assert!(!ids.contains(&1));
        assert!(ids.contains(&2));
    }

    #[tokio::test]
    async fn test_limit_zero_returns_empty_everywhere() {
        let orders = FakeOrders {
            recent_top_sellers: top_sellers(&[1]),
            ..FakeOrders::default()
        };
        let engine = engine(two_category_catalog(), orders);

        assert!(
            engine
                .get_trending_products(Some(0))
                .await
                .unwrap()
                .is_empty()
        );
        assert!(
            engine
                .get_personalized_recommendations(UserIdentity::Anonymous, Some(0))
                .await
                .unwrap()
                .is_empty()
        );
        assert!(
            engine
                .get_similar_to_products(&[ProductId::new(1)], Some(0), &[])
                .await
                .unwrap()
                .is_empty()
        );
    }
}

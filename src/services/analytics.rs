use crate::{
    entities::{product, restock_event},
    errors::ServiceError,
};
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

/// Days of history covered by trend and metrics views.
const TREND_WINDOW_DAYS: i64 = 30;

/// Aggregate snapshot computed on demand from current product state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_products: u64,
    pub low_stock_count: u64,
    pub total_value: Decimal,
    pub restocks_pending: u64,
}

/// One day of reconstructed stock history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub stock: i64,
}

/// Per-product stock movement over the trend window.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductStockMetrics {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub current_stock: i32,
    pub min_stock: i64,
    pub max_stock: i64,
    pub change_amount: i64,
    pub change_percent: String,
}

/// Read-only derived views over the product and restock collections.
///
/// Stock history is reconstructed by replaying restock events backwards from
/// the current stock level; nothing here is stored or fabricated.
#[derive(Clone)]
pub struct AnalyticsService {
    db: Arc<DatabaseConnection>,
}

impl AnalyticsService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Computes the dashboard summary fresh from the current product set.
    pub async fn dashboard_summary(&self) -> Result<DashboardSummary, ServiceError> {
        let products = product::Entity::find().all(&*self.db).await?;
        Ok(summarize(&products))
    }

    /// Day-by-day stock history for one product.
    ///
    /// Replays the product's restock events chronologically over the trend
    /// window, capped at the product's creation date. A product with no
    /// event history yields a single point at its current stock level.
    pub async fn product_trend(&self, product_id: Uuid) -> Result<Vec<TrendPoint>, ServiceError> {
        let product = product::Entity::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        let events = restock_event::Entity::find()
            .filter(restock_event::Column::ProductId.eq(product_id))
            .order_by_asc(restock_event::Column::Timestamp)
            .all(&*self.db)
            .await?;

        let today = Utc::now().date_naive();
        if events.is_empty() {
            return Ok(vec![TrendPoint {
                date: today,
                stock: i64::from(product.stock_level),
            }]);
        }

        let window_start = today - Duration::days(TREND_WINDOW_DAYS - 1);
        let start = window_start.max(product.created_at.date_naive());
        let deltas = event_deltas(&events);
        Ok(replay_daily_stock(
            i64::from(product.stock_level),
            &deltas,
            start,
            today,
        ))
    }

    /// Aggregate day-by-day total stock across all products.
    pub async fn inventory_trend(&self) -> Result<Vec<TrendPoint>, ServiceError> {
        let products = product::Entity::find().all(&*self.db).await?;
        let events = restock_event::Entity::find()
            .order_by_asc(restock_event::Column::Timestamp)
            .all(&*self.db)
            .await?;

        let total_stock: i64 = products.iter().map(|p| i64::from(p.stock_level)).sum();
        let today = Utc::now().date_naive();
        let start = today - Duration::days(TREND_WINDOW_DAYS - 1);
        let deltas = event_deltas(&events);
        Ok(replay_daily_stock(total_stock, &deltas, start, today))
    }

    /// Per-product min/max/change metrics over the trend window.
    pub async fn product_metrics(&self) -> Result<Vec<ProductStockMetrics>, ServiceError> {
        let products = product::Entity::find()
            .order_by_asc(product::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        let events = restock_event::Entity::find()
            .order_by_asc(restock_event::Column::Timestamp)
            .all(&*self.db)
            .await?;

        let mut deltas_by_product: HashMap<Uuid, Vec<(NaiveDate, i32)>> = HashMap::new();
        for event in &events {
            deltas_by_product
                .entry(event.product_id)
                .or_default()
                .push((event.timestamp.date_naive(), event.quantity));
        }

        let today = Utc::now().date_naive();
        let start = today - Duration::days(TREND_WINDOW_DAYS - 1);

        let metrics = products
            .into_iter()
            .map(|p| {
                let deltas = deltas_by_product.remove(&p.id).unwrap_or_default();
                let points =
                    replay_daily_stock(i64::from(p.stock_level), &deltas, start, today);
                let min_stock = points.iter().map(|pt| pt.stock).min().unwrap_or(0);
                let max_stock = points.iter().map(|pt| pt.stock).max().unwrap_or(0);
                let first_stock = points.first().map(|pt| pt.stock).unwrap_or(0);
                let change_amount = i64::from(p.stock_level) - first_stock;
                let change_percent = if first_stock > 0 {
                    format!(
                        "{:.1}%",
                        (change_amount as f64 / first_stock as f64) * 100.0
                    )
                } else {
                    "N/A".to_string()
                };

                ProductStockMetrics {
                    id: p.id,
                    name: p.name,
                    sku: p.sku,
                    current_stock: p.stock_level,
                    min_stock,
                    max_stock,
                    change_amount,
                    change_percent,
                }
            })
            .collect();

        Ok(metrics)
    }
}

fn event_deltas(events: &[restock_event::Model]) -> Vec<(NaiveDate, i32)> {
    events
        .iter()
        .map(|e| (e.timestamp.date_naive(), e.quantity))
        .collect()
}

/// Computes the dashboard summary from a product snapshot.
pub(crate) fn summarize(products: &[product::Model]) -> DashboardSummary {
    let low_stock_count = products.iter().filter(|p| p.is_low_stock()).count() as u64;
    let total_value = products
        .iter()
        .fold(Decimal::ZERO, |acc, p| {
            acc + p.price * Decimal::from(p.stock_level)
        });

    DashboardSummary {
        total_products: products.len() as u64,
        low_stock_count,
        total_value,
        // No scheduler exists; the low-stock set is what is pending restock.
        restocks_pending: low_stock_count,
    }
}

/// Reconstructs end-of-day stock for each day in `[start, end]`.
///
/// The stock at the end of day `d` is the current stock minus every delta
/// applied after `d`.
pub(crate) fn replay_daily_stock(
    current_stock: i64,
    deltas: &[(NaiveDate, i32)],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<TrendPoint> {
    let mut points = Vec::new();
    let mut day = start;
    while day <= end {
        let applied_later: i64 = deltas
            .iter()
            .filter(|(date, _)| *date > day)
            .map(|(_, quantity)| i64::from(*quantity))
            .sum();
        points.push(TrendPoint {
            date: day,
            stock: current_stock - applied_later,
        });
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn mk_product(name: &str, price: Decimal, stock_level: i32, threshold: i32) -> product::Model {
        product::Model {
            id: Uuid::new_v4(),
            name: name.to_string(),
            sku: format!("SKU-{}", name),
            category: None,
            price,
            cost: None,
            stock_level,
            low_stock_threshold: threshold,
            description: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn summary_of_empty_inventory_is_zero() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_products, 0);
        assert_eq!(summary.low_stock_count, 0);
        assert_eq!(summary.total_value, Decimal::ZERO);
        assert_eq!(summary.restocks_pending, 0);
    }

    #[test]
    fn summary_counts_and_values() {
        let products = vec![
            mk_product("mug", dec!(5), 3, 10),   // low stock, value 15
            mk_product("pen", dec!(1.50), 40, 10), // healthy, value 60
        ];

        let summary = summarize(&products);
        assert_eq!(summary.total_products, 2);
        assert_eq!(summary.low_stock_count, 1);
        assert_eq!(summary.total_value, dec!(75.00));
        assert_eq!(summary.restocks_pending, 1);
    }

    #[test]
    fn threshold_boundary_is_low_stock() {
        let product = mk_product("mug", dec!(5), 10, 10);
        assert!(product.is_low_stock());
        let product = mk_product("mug", dec!(5), 11, 10);
        assert!(!product.is_low_stock());
    }

    #[test]
    fn replay_subtracts_later_restocks() {
        let today = Utc::now().date_naive();
        let start = today - Duration::days(2);
        // Stock went 3 -> 13 by a restock of 10 today.
        let points = replay_daily_stock(13, &[(today, 10)], start, today);

        assert_eq!(points.len(), 3);
        assert_eq!(points[0].stock, 3);
        assert_eq!(points[1].stock, 3);
        assert_eq!(points[2].stock, 13);
        assert_eq!(points[2].date, today);
    }

    #[test]
    fn replay_applies_sales_as_negative_deltas() {
        let today = Utc::now().date_naive();
        let start = today - Duration::days(2);
        // 10 on hand two days ago, sold 4 yesterday, restocked 2 today.
        let deltas = [(today - Duration::days(1), -4), (today, 2)];
        let points = replay_daily_stock(8, &deltas, start, today);

        assert_eq!(points.len(), 3);
        assert_eq!(points[0].stock, 10);
        assert_eq!(points[1].stock, 6);
        assert_eq!(points[2].stock, 8);
    }

    #[test]
    fn replay_with_no_deltas_is_flat() {
        let today = Utc::now().date_naive();
        let start = today - Duration::days(4);
        let points = replay_daily_stock(7, &[], start, today);

        assert_eq!(points.len(), 5);
        assert!(points.iter().all(|p| p.stock == 7));
    }

    proptest! {
        #[test]
        fn summary_matches_component_wise_computation(
            specs in proptest::collection::vec(
                (0i64..100_000, 0i32..1_000, 1i32..100),
                0..24,
            )
        ) {
            let products: Vec<product::Model> = specs
                .iter()
                .enumerate()
                .map(|(i, (cents, stock, threshold))| {
                    mk_product(&format!("p{}", i), Decimal::new(*cents, 2), *stock, *threshold)
                })
                .collect();

            let summary = summarize(&products);

            let expected_low = products
                .iter()
                .filter(|p| p.stock_level <= p.low_stock_threshold)
                .count() as u64;
            let expected_value = products
                .iter()
                .map(|p| p.price * Decimal::from(p.stock_level))
                .sum::<Decimal>();

            prop_assert_eq!(summary.total_products, products.len() as u64);
            prop_assert_eq!(summary.low_stock_count, expected_low);
            prop_assert_eq!(summary.restocks_pending, expected_low);
            prop_assert_eq!(summary.total_value, expected_value);
        }

        #[test]
        fn replay_is_monotonic_and_ends_at_current_stock(
            initial in 0i64..1_000,
            quantities in proptest::collection::vec(1i32..500, 0..16),
            day_offsets in proptest::collection::vec(0i64..30, 0..16),
        ) {
            let today = Utc::now().date_naive();
            let start = today - Duration::days(29);

            let deltas: Vec<(NaiveDate, i32)> = quantities
                .iter()
                .zip(day_offsets.iter())
                .map(|(q, off)| (today - Duration::days(*off), *q))
                .collect();
            let current = initial
                + deltas.iter().map(|(_, q)| i64::from(*q)).sum::<i64>();

            let points = replay_daily_stock(current, &deltas, start, today);

            prop_assert_eq!(points.len(), 30);
            prop_assert_eq!(points.last().unwrap().stock, current);
            // Only positive deltas exist, so history never decreases.
            for pair in points.windows(2) {
                prop_assert!(pair[0].stock <= pair[1].stock);
            }
            prop_assert!(points.iter().all(|p| p.stock >= 0));
        }
    }
}

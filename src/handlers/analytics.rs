use crate::cache::ViewCollection;
use crate::errors::ServiceError;
use crate::handlers::common::to_cached_value;
use crate::services::analytics::{ProductStockMetrics, TrendPoint};
use crate::AppState;
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use uuid::Uuid;

pub fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/product-trend/:id", get(product_trend))
        .route("/inventory-trend", get(inventory_trend))
        .route("/metrics", get(product_metrics))
}

/// Day-by-day stock history for one product
#[utoipa::path(
    get,
    path = "/api/v1/analytics/product-trend/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Stock history reconstructed from restock events", body = Vec<TrendPoint>),
        (status = 404, description = "Unknown product", body = crate::errors::ErrorResponse)
    ),
    tag = "Analytics"
)]
pub async fn product_trend(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let cache_key = format!("product-trend:{}", id);
    if let Some(hit) = state.cache.get(ViewCollection::Analytics, &cache_key) {
        return Ok(Json(hit));
    }

    let trend = state.analytics_service.product_trend(id).await?;
    let value = to_cached_value(&trend)?;
    state
        .cache
        .put(ViewCollection::Analytics, cache_key, value.clone());
    Ok(Json(value))
}

/// Aggregate stock history across all products
#[utoipa::path(
    get,
    path = "/api/v1/analytics/inventory-trend",
    responses(
        (status = 200, description = "Total stock per day", body = Vec<TrendPoint>)
    ),
    tag = "Analytics"
)]
pub async fn inventory_trend(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    if let Some(hit) = state.cache.get(ViewCollection::Analytics, "inventory-trend") {
        return Ok(Json(hit));
    }

    let trend = state.analytics_service.inventory_trend().await?;
    let value = to_cached_value(&trend)?;
    state
        .cache
        .put(ViewCollection::Analytics, "inventory-trend", value.clone());
    Ok(Json(value))
}

/// Per-product stock movement metrics
#[utoipa::path(
    get,
    path = "/api/v1/analytics/metrics",
    responses(
        (status = 200, description = "Min/max/change metrics per product", body = Vec<ProductStockMetrics>)
    ),
    tag = "Analytics"
)]
pub async fn product_metrics(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    if let Some(hit) = state.cache.get(ViewCollection::Analytics, "metrics") {
        return Ok(Json(hit));
    }

    let metrics = state.analytics_service.product_metrics().await?;
    let value = to_cached_value(&metrics)?;
    state
        .cache
        .put(ViewCollection::Analytics, "metrics", value.clone());
    Ok(Json(value))
}

use crate::cache::ViewCollection;
use crate::errors::ServiceError;
use crate::handlers::common::to_cached_value;
use crate::services::analytics::DashboardSummary;
use crate::AppState;
use axum::{
    extract::{Json, State},
    response::IntoResponse,
    routing::get,
    Router,
};

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/summary", get(dashboard_summary))
}

/// Dashboard summary, computed fresh from current product state
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/summary",
    responses(
        (status = 200, description = "Aggregate inventory snapshot", body = DashboardSummary)
    ),
    tag = "Dashboard"
)]
pub async fn dashboard_summary(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    if let Some(hit) = state.cache.get(ViewCollection::Summary, "summary") {
        return Ok(Json(hit));
    }

    let summary = state.analytics_service.dashboard_summary().await?;
    let value = to_cached_value(&summary)?;
    state
        .cache
        .put(ViewCollection::Summary, "summary", value.clone());
    Ok(Json(value))
}

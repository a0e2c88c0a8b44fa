use crate::cache::ViewCollection;
use crate::entities::restock_event;
use crate::errors::ServiceError;
use crate::handlers::common::to_cached_value;
use crate::AppState;
use axum::{
    extract::{Json, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Canonical wire representation of a restock event.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RestockEventResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub previous_stock: i32,
    pub new_stock: i32,
    pub timestamp: DateTime<Utc>,
}

impl From<restock_event::Model> for RestockEventResponse {
    fn from(model: restock_event::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            quantity: model.quantity,
            previous_stock: model.previous_stock,
            new_stock: model.new_stock,
            timestamp: model.timestamp,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RestockListQuery {
    /// Maximum number of events to return, most recent first.
    pub limit: Option<u64>,
}

pub fn restocks_routes() -> Router<AppState> {
    Router::new().route("/", get(list_restocks))
}

/// List restock events, most recent first
#[utoipa::path(
    get,
    path = "/api/v1/restocks",
    params(RestockListQuery),
    responses(
        (status = 200, description = "Restock events, timestamp descending", body = Vec<RestockEventResponse>)
    ),
    tag = "Restocks"
)]
pub async fn list_restocks(
    State(state): State<AppState>,
    Query(query): Query<RestockListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let cache_key = match query.limit {
        Some(limit) => format!("limit:{}", limit),
        None => "all".to_string(),
    };
    if let Some(hit) = state.cache.get(ViewCollection::Restocks, &cache_key) {
        return Ok(Json(hit));
    }

    let events = state.inventory_service.list_restocks(query.limit).await?;
    let body: Vec<RestockEventResponse> = events.into_iter().map(Into::into).collect();
    let value = to_cached_value(&body)?;
    state
        .cache
        .put(ViewCollection::Restocks, cache_key, value.clone());
    Ok(Json(value))
}

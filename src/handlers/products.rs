use crate::cache::ViewCollection;
use crate::entities::product;
use crate::errors::ServiceError;
use crate::handlers::common::{
    created_response, ensure_decimal_non_negative, ensure_i32_non_negative, ensure_i32_positive,
    no_content_response, normalize_optional_string, require, require_non_blank, success_response,
    to_cached_value,
};
use crate::handlers::restocks::RestockEventResponse;
use crate::services::inventory::{CreateProductInput, UpdateProductInput};
use crate::AppState;
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 10;

/// Canonical wire representation of a product. The domain entity is mapped
/// to this exactly once, here at the boundary.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub category: Option<String>,
    pub price: Decimal,
    pub cost: Option<Decimal>,
    pub stock_level: i32,
    pub low_stock_threshold: i32,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<product::Model> for ProductResponse {
    fn from(model: product::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            sku: model.sku,
            category: model.category,
            price: model.price,
            cost: model.cost,
            stock_level: model.stock_level,
            low_stock_threshold: model.low_stock_threshold,
            description: model.description,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    /// Caller-supplied id; assigned by the server when omitted.
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub cost: Option<Decimal>,
    /// `stock` is accepted as a legacy alias.
    #[serde(alias = "stock")]
    pub stock_level: Option<i32>,
    pub low_stock_threshold: Option<i32>,
    pub description: Option<String>,
}

impl CreateProductRequest {
    /// Presence and range validation for the create payload.
    ///
    /// "Absent" and "present with zero" are distinct: `stock_level: 0` and
    /// `price: 0` are valid, only a missing field is rejected.
    fn into_input(self) -> Result<CreateProductInput, ServiceError> {
        let name = require_non_blank(require(self.name, "name")?, "name")?;
        let sku = require_non_blank(require(self.sku, "sku")?, "sku")?;
        let price = require(self.price, "price")?;
        let stock_level = require(self.stock_level, "stock_level")?;
        let low_stock_threshold = self
            .low_stock_threshold
            .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);

        ensure_decimal_non_negative(&price, "price")?;
        if let Some(cost) = self.cost.as_ref() {
            ensure_decimal_non_negative(cost, "cost")?;
        }
        ensure_i32_non_negative(stock_level, "stock_level")?;
        ensure_i32_positive(low_stock_threshold, "low_stock_threshold")?;

        Ok(CreateProductInput {
            id: self.id,
            name,
            sku,
            category: normalize_optional_string(self.category),
            price,
            cost: self.cost,
            stock_level,
            low_stock_threshold,
            description: normalize_optional_string(self.description),
        })
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub cost: Option<Decimal>,
    #[serde(alias = "stock")]
    pub stock_level: Option<i32>,
    pub low_stock_threshold: Option<i32>,
    pub description: Option<String>,
}

impl UpdateProductRequest {
    fn into_input(self) -> Result<UpdateProductInput, ServiceError> {
        let name = self
            .name
            .map(|v| require_non_blank(v, "name"))
            .transpose()?;
        let sku = self.sku.map(|v| require_non_blank(v, "sku")).transpose()?;
        if let Some(price) = self.price.as_ref() {
            ensure_decimal_non_negative(price, "price")?;
        }
        if let Some(cost) = self.cost.as_ref() {
            ensure_decimal_non_negative(cost, "cost")?;
        }
        if let Some(stock_level) = self.stock_level {
            ensure_i32_non_negative(stock_level, "stock_level")?;
        }
        if let Some(threshold) = self.low_stock_threshold {
            ensure_i32_positive(threshold, "low_stock_threshold")?;
        }

        Ok(UpdateProductInput {
            name,
            sku,
            category: normalize_optional_string(self.category),
            price: self.price,
            cost: self.cost,
            stock_level: self.stock_level,
            low_stock_threshold: self.low_stock_threshold,
            description: normalize_optional_string(self.description),
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RestockRequest {
    /// Quantity to add; must be a positive integer.
    #[schema(value_type = i64)]
    pub quantity: Option<serde_json::Number>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PurchaseRequest {
    /// Quantity to sell; must be a positive integer.
    #[schema(value_type = i64)]
    pub quantity: Option<serde_json::Number>,
}

/// Rejects absent, fractional, out-of-range and non-positive quantities.
fn positive_quantity(quantity: Option<serde_json::Number>) -> Result<i32, ServiceError> {
    require(quantity, "quantity")?
        .as_i64()
        .and_then(|q| i32::try_from(q).ok())
        .filter(|q| *q > 0)
        .ok_or_else(|| {
            ServiceError::ValidationError("quantity must be a positive integer".to_string())
        })
}

/// Creates the router for product endpoints
pub fn products_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/low-stock", get(list_low_stock))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/:id/restock", post(restock_product))
        .route("/:id/purchase", post(purchase_product))
}

/// List all products
#[utoipa::path(
    get,
    path = "/api/v1/products",
    responses(
        (status = 200, description = "All products in insertion order", body = Vec<ProductResponse>)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    if let Some(hit) = state.cache.get(ViewCollection::Products, "list") {
        return Ok(Json(hit));
    }

    let products = state.inventory_service.list_products().await?;
    let body: Vec<ProductResponse> = products.into_iter().map(Into::into).collect();
    let value = to_cached_value(&body)?;
    state
        .cache
        .put(ViewCollection::Products, "list", value.clone());
    Ok(Json(value))
}

/// List products at or below their reorder threshold
#[utoipa::path(
    get,
    path = "/api/v1/products/low-stock",
    responses(
        (status = 200, description = "Low-stock products", body = Vec<ProductResponse>)
    ),
    tag = "Products"
)]
pub async fn list_low_stock(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    if let Some(hit) = state.cache.get(ViewCollection::LowStock, "list") {
        return Ok(Json(hit));
    }

    let products = state.inventory_service.list_low_stock().await?;
    let body: Vec<ProductResponse> = products.into_iter().map(Into::into).collect();
    let value = to_cached_value(&body)?;
    state
        .cache
        .put(ViewCollection::LowStock, "list", value.clone());
    Ok(Json(value))
}

/// Fetch a single product
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Unknown product", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.inventory_service.get_product(id).await?;
    Ok(success_response(ProductResponse::from(product)))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Missing or invalid field", body = crate::errors::ErrorResponse),
        (status = 409, description = "Duplicate id or SKU", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let input = payload.into_input()?;
    let product = state.inventory_service.create_product(input).await?;
    Ok(created_response(ProductResponse::from(product)))
}

/// Update an existing product
#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid field", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown product", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let input = payload.into_input()?;
    let product = state.inventory_service.update_product(id, input).await?;
    Ok(success_response(ProductResponse::from(product)))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 404, description = "Unknown product", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.inventory_service.delete_product(id).await?;
    Ok(no_content_response())
}

/// Restock a product
#[utoipa::path(
    post,
    path = "/api/v1/products/{id}/restock",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = RestockRequest,
    responses(
        (status = 201, description = "Restock recorded", body = RestockEventResponse),
        (status = 400, description = "Invalid quantity", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown product", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn restock_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RestockRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let quantity = positive_quantity(payload.quantity)?;
    let event = state.inventory_service.restock(id, quantity).await?;
    Ok(created_response(RestockEventResponse::from(event)))
}

/// Purchase a product, decrementing its stock
#[utoipa::path(
    post,
    path = "/api/v1/products/{id}/purchase",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = PurchaseRequest,
    responses(
        (status = 201, description = "Purchase recorded as a negative stock movement", body = RestockEventResponse),
        (status = 400, description = "Invalid quantity or not enough stock", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown product", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn purchase_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PurchaseRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let quantity = positive_quantity(payload.quantity)?;
    let event = state.inventory_service.purchase(id, quantity).await?;
    Ok(created_response(RestockEventResponse::from(event)))
}

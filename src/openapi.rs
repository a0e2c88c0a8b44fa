use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::errors::ErrorResponse;
use crate::handlers::products::{
    CreateProductRequest, ProductResponse, PurchaseRequest, RestockRequest, UpdateProductRequest,
};
use crate::handlers::restocks::RestockEventResponse;
use crate::services::analytics::{DashboardSummary, ProductStockMetrics, TrendPoint};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "stockroom API",
        version = "0.1.0",
        description = "Retail inventory tracking: product catalog CRUD, restock logging, \
low-stock monitoring, dashboard summary and stock-trend analytics."
    ),
    paths(
        crate::handlers::products::list_products,
        crate::handlers::products::list_low_stock,
        crate::handlers::products::get_product,
        crate::handlers::products::create_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,
        crate::handlers::products::restock_product,
        crate::handlers::products::purchase_product,
        crate::handlers::restocks::list_restocks,
        crate::handlers::dashboard::dashboard_summary,
        crate::handlers::analytics::product_trend,
        crate::handlers::analytics::inventory_trend,
        crate::handlers::analytics::product_metrics,
    ),
    components(schemas(
        ProductResponse,
        CreateProductRequest,
        UpdateProductRequest,
        RestockRequest,
        PurchaseRequest,
        RestockEventResponse,
        DashboardSummary,
        TrendPoint,
        ProductStockMetrics,
        ErrorResponse,
    )),
    tags(
        (name = "Products", description = "Product catalog and restock operations"),
        (name = "Restocks", description = "Restock event history"),
        (name = "Dashboard", description = "Aggregate inventory snapshot"),
        (name = "Analytics", description = "Stock trend reconstruction")
    )
)]
pub struct ApiDoc;

/// Swagger UI served at `/docs`, schema document at `/api-docs/openapi.json`.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

use crate::app::catalog_service::{ListingView, SearchMode, SearchView};
use crate::domain::product::{FieldError, Product, ProductForm};
use crate::domain::query::{AdvancedCriteria, QueryDescriptor, SortDirection};
use crate::domain::stats::{AggregateSnapshot, CategoryCount};
use crate::storage::PageInfo;
use crate::transport::http::handlers::{dashboard, health, products};
use crate::transport::http::types::{ApiResponse, AppState};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        products::list_products_handler,
        products::search_products_handler,
        products::get_product_handler,
        products::save_product_handler,
        products::delete_product_handler,
        dashboard::dashboard_handler
    ),
    components(schemas(
        ApiResponse,
        Product,
        ProductForm,
        FieldError,
        ListingView,
        SearchView,
        SearchMode,
        QueryDescriptor,
        SortDirection,
        AdvancedCriteria,
        PageInfo,
        AggregateSnapshot,
        CategoryCount
    ))
)]
pub struct ApiDoc;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route(
            products::LISTING_PATH,
            get(products::list_products_handler).post(products::save_product_handler),
        )
        .route("/api/products/search", get(products::search_products_handler))
        .route(
            "/api/products/:id",
            get(products::get_product_handler).delete(products::delete_product_handler),
        )
        .route("/api/dashboard", get(dashboard::dashboard_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

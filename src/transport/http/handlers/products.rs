use crate::app::catalog_service::{MutationOutcome, SearchOutcome};
use crate::domain::product::ProductForm;
use crate::domain::query::{ListingParams, SearchParams};
use crate::transport::http::types::{
    json_422, ok_data, query_400, validation_422, ApiResponse, AppState,
};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect};
use axum::Json;

pub const LISTING_PATH: &str = "/api/products";

#[utoipa::path(
    get,
    path = "/api/products",
    params(ListingParams),
    responses(
        (status = 200, description = "Products, optionally filtered by category and sorted", body = ApiResponse),
        (status = 400, description = "Malformed query string", body = ApiResponse),
        (status = 500, description = "Store failure (including an unknown sort field)", body = ApiResponse)
    )
)]
pub async fn list_products_handler(
    State(state): State<AppState>,
    params: Result<Query<ListingParams>, QueryRejection>,
) -> impl IntoResponse {
    let Query(params) = match params {
        Ok(v) => v,
        Err(e) => return query_400(e).into_response(),
    };

    match state.catalog.list(&params).await {
        Ok(view) => ok_data(&view, None),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/products/search",
    params(SearchParams),
    responses(
        (status = 200, description = "One page of keyword or advanced search results", body = ApiResponse),
        (status = 303, description = "No search criteria; redirect to the plain listing"),
        (status = 400, description = "Malformed query string (e.g. unparsable price)", body = ApiResponse),
        (status = 500, description = "Store failure", body = ApiResponse)
    )
)]
pub async fn search_products_handler(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> impl IntoResponse {
    let Query(params) = match params {
        Ok(v) => v,
        Err(e) => return query_400(e).into_response(),
    };

    match state.catalog.search(&params).await {
        Ok(SearchOutcome::Results(view)) => ok_data(&view, None),
        Ok(SearchOutcome::RedirectToListing) => Redirect::to(LISTING_PATH).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(
        ("id" = i64, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "The product", body = ApiResponse),
        (status = 404, description = "Product not found", body = ApiResponse),
        (status = 500, description = "Store failure", body = ApiResponse)
    )
)]
pub async fn get_product_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match state.catalog.get(id).await {
        Ok(Some(product)) => ok_data(&product, None),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::failure("Product not found")),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = ProductForm,
    responses(
        (status = 200, description = "Product added or updated", body = ApiResponse),
        (status = 422, description = "Invalid body or failed field validation", body = ApiResponse),
        (status = 500, description = "Product could not be saved", body = ApiResponse)
    )
)]
pub async fn save_product_handler(
    State(state): State<AppState>,
    request: Result<Json<ProductForm>, JsonRejection>,
) -> impl IntoResponse {
    let Json(form) = match request {
        Ok(v) => v,
        Err(e) => {
            return json_422(e, "{\"name\", \"category\", \"price\", \"quantity\", \"id\"?}")
                .into_response()
        }
    };

    if let Err(errors) = form.validate() {
        return validation_422(errors).into_response();
    }

    match state.catalog.save(form.into_product()).await {
        MutationOutcome::Saved { product, message } => ok_data(&product, Some(message.as_str())),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::failure(other.message())),
        )
            .into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(
        ("id" = i64, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Product deleted (also when it did not exist)", body = ApiResponse),
        (status = 500, description = "Product could not be deleted", body = ApiResponse)
    )
)]
pub async fn delete_product_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let outcome = state.catalog.delete(id).await;
    if outcome.is_success() {
        (
            StatusCode::OK,
            Json(ApiResponse::ok_with_message(None, outcome.message())),
        )
            .into_response()
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::failure(outcome.message())),
        )
            .into_response()
    }
}

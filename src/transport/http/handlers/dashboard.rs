use crate::transport::http::types::{ok_data, ApiResponse, AppState};
use axum::extract::State;
use axum::response::IntoResponse;

#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Catalog statistics (AggregateSnapshot)", body = ApiResponse),
        (status = 500, description = "Store failure", body = ApiResponse)
    )
)]
pub async fn dashboard_handler(State(state): State<AppState>) -> impl IntoResponse {
    match state.catalog.dashboard().await {
        Ok(snapshot) => ok_data(&snapshot, None),
        Err(e) => e.into_response(),
    }
}

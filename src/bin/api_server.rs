// src/bin/api_server.rs

use product_catalog::infra::config::Config;
use product_catalog::infra::telemetry;
use product_catalog::transport;
use product_catalog::{CatalogService, PgProductStore};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    telemetry::init_tracing();

    let config = Config::from_env()?;

    // --- Store Initialization ---
    info!(max_connections = config.database_max_connections, "connecting product store");
    let store = PgProductStore::connect(&config.database_url, config.database_max_connections).await?;

    // --- Service Initialization ---
    let settings = config.dashboard_settings();
    info!(
        low_stock_threshold = settings.low_stock_threshold,
        recent_limit = settings.recent_limit,
        "catalog service initialized"
    );
    let app_state = transport::http::AppState::new(CatalogService::new(Arc::new(store), settings));

    // --- API Server Initialization ---
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(cors);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "API server listening (Swagger UI at /swagger-ui)");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown signal received");
            }
        })
        .await?;

    info!("graceful shutdown complete");
    Ok(())
}

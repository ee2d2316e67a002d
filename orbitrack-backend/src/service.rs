use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use orbitrack_common::ELEMENT_SETS_PATH;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::BackendConfig;
use crate::module::tle::TleManager;

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Cached (or freshly acquired) element-set records as a JSON array
async fn element_sets(State(manager): State<Arc<TleManager>>) -> Response {
    match manager.element_sets().await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => {
            tracing::error!("Element-set acquisition failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

pub fn router(manager: Arc<TleManager>, enable_cors: bool) -> Router {
    let app = Router::new()
        .route("/health", get(health_check))
        .route(ELEMENT_SETS_PATH, get(element_sets))
        .with_state(manager)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

pub async fn serve(config: &BackendConfig, manager: Arc<TleManager>) -> anyhow::Result<()> {
    let app = router(manager, config.enable_cors);
    let addr = config.server_address();

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

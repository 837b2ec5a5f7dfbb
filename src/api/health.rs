use std::sync::Arc;

use axum::{
    Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get,
};
use serde_json::json;
use tracing::error;

use crate::{
    db,
    models::{
        app_state::AppState,
        error::ServerError,
        system_log::{LogAction, LogCeverity},
    },
};

pub fn health_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/detailed", get(health_detailed))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    "OK".into_response()
}

async fn health_detailed(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ServerError> {
    let db_status = match db::health::health_check(state.get_pool()).await {
        Ok(_) => true,
        Err(e) => {
            error!("Failed database health check: {}", e);
            false
        }
    };

    if !db_status {
        state
            .syslog()
            .action(LogAction::Read)
            .ceverity(LogCeverity::Critical)
            .function("health_detailed")
            .description("Database unreachable during health check")
            .log_async();
    }

    let json = json!({
        "platform": true,
        "database": db_status,
    });

    Ok((StatusCode::OK, Json(json)))
}

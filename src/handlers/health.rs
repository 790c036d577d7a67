use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::json;

use crate::handlers::AppState;

pub async fn liveness() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let ledger_status = match state.ledger.ping().await {
        Ok(()) => "healthy",
        Err(e) => {
            tracing::warn!("Ledger readiness check failed: {}", e);
            "unhealthy"
        }
    };

    let (status, overall_status) = if ledger_status == "healthy" {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
    };

    (
        status,
        Json(json!({
            "status": overall_status,
            "checks": {
                "ledger": ledger_status
            },
            "timestamp": chrono::Utc::now().to_rfc3339()
        })),
    )
}

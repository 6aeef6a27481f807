// src/handlers/status.rs
use crate::AppState;
use axum::{extract::Extension, routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;

pub fn status_routes() -> Router {
    Router::new().route("/api/status", get(api_status))
}

async fn api_status(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    let history_status = match state.history.ping().await {
        Ok(()) => "healthy",
        Err(e) => {
            tracing::warn!("History store health check failed: {}", e);
            "unhealthy"
        }
    };

    let (completion_status, model) = match &state.completion {
        Some(requester) => ("configured", Some(requester.model().to_string())),
        None => ("not_configured", None),
    };

    Json(json!({
        "status": "operational",
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "history": {
                "backend": state.history.backend(),
                "status": history_status
            },
            "completion": {
                "status": completion_status,
                "model": model
            }
        },
        "endpoints": {
            "client": "/",
            "story": "/api/story",
            "history": "/api/history",
            "status": "/api/status"
        }
    }))
}

// lib.rs - Voice intake service: streaming completion relay with stored history
pub mod completion;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod history;
pub mod middleware;
pub mod models;
pub mod prompt;
pub mod relay;
pub mod voice;

use axum::{Extension, Router};
use completion::CompletionRequester;
use history::HistoryStore;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

// AppState holds the history store and, when a provider credential is
// configured, the completion requester
pub struct AppState {
    pub history: Arc<dyn HistoryStore>,
    pub completion: Option<CompletionRequester>,
}

/// All routes with shared state and the request logging layer.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(handlers::ui::ui_routes())
        .merge(handlers::story::story_routes())
        .merge(handlers::history::history_routes())
        .merge(handlers::status::status_routes())
        .layer(axum::middleware::from_fn(middleware::logging::request_logging_middleware))
        .layer(CorsLayer::permissive())
        .layer(Extension(state))
}

// src/handlers/history.rs
use crate::history::fetch_history;
use crate::models::{ConversationKey, HistoryQuery, HistoryResponse};
use crate::AppState;
use axum::{
    extract::{Extension, Query},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

pub fn history_routes() -> Router {
    Router::new().route("/api/history", get(get_history))
}

async fn get_history(
    Query(params): Query<HistoryQuery>,
    Extension(state): Extension<Arc<AppState>>,
) -> Json<HistoryResponse> {
    let key = ConversationKey::new(params.username.as_deref(), params.chat_id.as_deref());
    let fetched = fetch_history(state.history.as_ref(), &key).await;
    let status = fetched.status();

    Json(HistoryResponse {
        username: key.username,
        chat_id: key.chat_id,
        status,
        messages: fetched.into_messages(),
    })
}

// src/handlers/ui.rs
use axum::{response::Html, routing::get, Router};

const CLIENT_PAGE: &str = include_str!("../../static/index.html");

pub fn ui_routes() -> Router {
    Router::new().route("/", get(client_page))
}

/// The voice client: microphone capture, auto-send on silence, streamed
/// transcript and spoken replies, all through browser APIs.
async fn client_page() -> Html<&'static str> {
    Html(CLIENT_PAGE)
}

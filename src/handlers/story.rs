// src/handlers/story.rs
use crate::error::{AppError, AppResult};
use crate::models::StoryRequest;
use crate::relay::Relay;
use crate::AppState;
use axum::{
    body::{Body, Bytes},
    extract::Extension,
    http::header,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Fragments buffered between the relay task and the response body.
const BODY_CHANNEL_CAPACITY: usize = 32;

pub fn story_routes() -> Router {
    Router::new().route("/api/story", post(create_story))
}

/// Streams the assistant's reply as `text/plain` while it is generated.
/// Anything that fails before the first byte is a JSON error instead.
///
/// The body is parsed as JSON whatever its `Content-Type` says.
async fn create_story(
    Extension(state): Extension<Arc<AppState>>,
    body: Bytes,
) -> AppResult<Response> {
    let request: StoryRequest = serde_json::from_slice(&body)?;
    let requester = state
        .completion
        .as_ref()
        .ok_or(AppError::ProviderNotConfigured)?;

    let key = request.key();
    let topic = request.topic().to_string();
    tracing::info!(conversation = %key, topic_len = topic.len(), "💬 story request");

    let fragments = requester.request_completion(&topic, &key).await?;

    let (tx, rx) = mpsc::channel(BODY_CHANNEL_CAPACITY);
    tokio::spawn(Relay::new().run(fragments, tx, state.history.clone(), key, topic));

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(ReceiverStream::new(rx)),
    )
        .into_response())
}

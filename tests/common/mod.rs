#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use intake_voice::{
    completion::{
        CompletionError, CompletionProvider, CompletionRequester, FragmentStream, PromptMessage,
    },
    history::{HistoryError, HistoryStore, MemoryHistoryStore},
    models::{ChatMessage, ConversationKey},
    AppState,
};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const TEST_PROMPT: &str = "You are a test intake assistant.";

/// What the scripted provider does when asked for a completion.
#[derive(Clone)]
pub enum Script {
    Fragments(Vec<&'static str>),
    /// Emits the fragments, then fails.
    FailAfter(Vec<&'static str>),
    /// Rejects the request before streaming.
    Reject,
}

pub struct ScriptedProvider {
    script: Script,
    pub requests: Mutex<Vec<Vec<PromptMessage>>>,
}

impl ScriptedProvider {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn last_request(&self) -> Vec<PromptMessage> {
        self.requests.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    async fn stream_chat(
        &self,
        messages: Vec<PromptMessage>,
    ) -> Result<FragmentStream, CompletionError> {
        self.requests.lock().unwrap().push(messages);

        let items: Vec<Result<String, CompletionError>> = match &self.script {
            Script::Fragments(fragments) => fragments.iter().map(|f| Ok(f.to_string())).collect(),
            Script::FailAfter(fragments) => fragments
                .iter()
                .map(|f| Ok(f.to_string()))
                .chain(std::iter::once(Err(CompletionError::Provider("stream reset".into()))))
                .collect(),
            Script::Reject => {
                return Err(CompletionError::Api {
                    status: 401,
                    body: "invalid api key".into(),
                })
            }
        };

        Ok(Box::pin(futures::stream::iter(items)))
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

/// Reads succeed from the inner store; writes always fail.
pub struct WriteFailingStore(pub MemoryHistoryStore);

#[async_trait]
impl HistoryStore for WriteFailingStore {
    async fn fetch(&self, key: &ConversationKey) -> Result<Vec<ChatMessage>, HistoryError> {
        self.0.fetch(key).await
    }

    async fn append(
        &self,
        _key: &ConversationKey,
        _messages: &[ChatMessage],
    ) -> Result<(), HistoryError> {
        Err(HistoryError::Unavailable("disk full".into()))
    }

    async fn ping(&self) -> Result<(), HistoryError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "write-failing"
    }
}

/// Every operation fails, like an unreachable database.
pub struct UnreachableStore;

#[async_trait]
impl HistoryStore for UnreachableStore {
    async fn fetch(&self, _key: &ConversationKey) -> Result<Vec<ChatMessage>, HistoryError> {
        Err(HistoryError::Unavailable("connection refused".into()))
    }

    async fn append(
        &self,
        _key: &ConversationKey,
        _messages: &[ChatMessage],
    ) -> Result<(), HistoryError> {
        Err(HistoryError::Unavailable("connection refused".into()))
    }

    async fn ping(&self) -> Result<(), HistoryError> {
        Err(HistoryError::Unavailable("connection refused".into()))
    }

    fn backend(&self) -> &'static str {
        "unreachable"
    }
}

pub fn test_app(store: Arc<dyn HistoryStore>, provider: Option<Arc<ScriptedProvider>>) -> Router {
    let completion = provider.map(|provider| {
        CompletionRequester::new(store.clone(), provider, TEST_PROMPT.to_string())
    });
    intake_voice::app(Arc::new(AppState {
        history: store,
        completion,
    }))
}

pub type StoryResponse = (StatusCode, Option<String>, Result<String, axum::Error>);

pub async fn post_story(app: &Router, body: &str) -> StoryResponse {
    post_story_as(app, Some("application/json"), body).await
}

/// Posts `body` with the given `Content-Type`, or none at all.
pub async fn post_story_as(app: &Router, content_type: Option<&str>, body: &str) -> StoryResponse {
    let mut request = Request::builder().method("POST").uri("/api/story");
    if let Some(content_type) = content_type {
        request = request.header(header::CONTENT_TYPE, content_type);
    }
    let request = request.body(Body::from(body.to_string())).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .map(|bytes| String::from_utf8(bytes.to_vec()).unwrap());

    (status, content_type, body)
}

pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

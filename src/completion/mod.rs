// src/completion/mod.rs
mod openai;
mod requester;
mod sse;

pub use openai::OpenAiClient;
pub use requester::{build_messages, CompletionRequester};
pub use sse::SseDecoder;

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("Failed to parse stream event: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Provider error: {0}")]
    Provider(String),
}

/// One message of the prompt sent to the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: String,
    pub content: String,
}

impl PromptMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Text fragments in emission order. Finite, consumed once.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, CompletionError>> + Send>>;

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Opens a streamed completion. Errors returned here happen before any
    /// fragment exists; errors inside the stream happen mid-response.
    async fn stream_chat(
        &self,
        messages: Vec<PromptMessage>,
    ) -> Result<FragmentStream, CompletionError>;

    fn model(&self) -> &str;
}

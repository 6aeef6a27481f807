// src/completion/openai.rs
use super::{CompletionError, CompletionProvider, FragmentStream, PromptMessage, SseDecoder};
use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::Serialize;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    stream: bool,
}

impl OpenAiClient {
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
            model,
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    async fn stream_chat(
        &self,
        messages: Vec<PromptMessage>,
    ) -> Result<FragmentStream, CompletionError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: &messages,
            stream: true,
        };

        tracing::debug!("OpenAI API Request messages count: {}", messages.len());

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("OpenAI API error ({}): {}", status, body);
            return Err(CompletionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(fragments_from_bytes(Box::pin(response.bytes_stream())))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

struct FragmentState<S> {
    bytes: S,
    decoder: SseDecoder,
    pending: VecDeque<String>,
    finished: bool,
}

/// Turns a raw event-stream body into text fragments. The first error ends
/// the stream after being yielded.
pub(crate) fn fragments_from_bytes<S, E>(bytes: S) -> FragmentStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + Unpin + 'static,
    E: Into<CompletionError> + Send + 'static,
{
    let state = FragmentState {
        bytes,
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    Box::pin(futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(fragment) = state.pending.pop_front() {
                return Some((Ok(fragment), state));
            }
            if state.finished || state.decoder.is_done() {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => match state.decoder.push(&chunk) {
                    Ok(fragments) => state.pending.extend(fragments),
                    Err(e) => {
                        state.finished = true;
                        return Some((Err(e), state));
                    }
                },
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(e.into()), state));
                }
                None => {
                    state.finished = true;
                    match state.decoder.finish() {
                        Ok(Some(fragment)) => state.pending.push_back(fragment),
                        Ok(None) => {}
                        Err(e) => return Some((Err(e), state)),
                    }
                }
            }
        }
    }))
}

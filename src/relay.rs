// src/relay.rs
//! Forwards completion fragments to the caller as they arrive and records
//! the finished exchange.

use crate::completion::{CompletionError, FragmentStream};
use crate::history::{append_history, HistoryStore};
use crate::models::{ChatMessage, ConversationKey};
use bytes::Bytes;
use chrono::Utc;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Items of the response body channel. An `Err` aborts the body.
pub type BodySender = mpsc::Sender<Result<Bytes, CompletionError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Idle,
    Streaming,
    Done,
    Failed,
}

#[derive(Debug)]
pub struct RelayOutcome {
    pub state: RelayState,
    pub text: String,
    pub fragments: usize,
    pub persisted: bool,
}

pub struct Relay {
    state: RelayState,
    text: String,
    fragments: usize,
}

impl Default for Relay {
    fn default() -> Self {
        Self::new()
    }
}

impl Relay {
    pub fn new() -> Self {
        Self {
            state: RelayState::Idle,
            text: String::new(),
            fragments: 0,
        }
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    /// Drives `fragments` into `body`, then writes the exchange once.
    /// `body` is dropped on return, which closes the response on every path.
    pub async fn run(
        mut self,
        mut fragments: FragmentStream,
        body: BodySender,
        store: Arc<dyn HistoryStore>,
        key: ConversationKey,
        topic: String,
    ) -> RelayOutcome {
        self.state = RelayState::Streaming;

        while let Some(item) = fragments.next().await {
            match item {
                Ok(fragment) => {
                    self.text.push_str(&fragment);
                    self.fragments += 1;

                    if body.send(Ok(Bytes::from(fragment))).await.is_err() {
                        tracing::warn!(
                            conversation = %key,
                            fragments = self.fragments,
                            "caller disconnected mid-stream"
                        );
                        return self.fail();
                    }
                }
                Err(e) => {
                    tracing::error!(
                        conversation = %key,
                        fragments = self.fragments,
                        error = %e,
                        "completion stream failed"
                    );
                    // Already-sent bytes stay sent; the error aborts the body.
                    let _ = body.send(Err(e)).await;
                    return self.fail();
                }
            }
        }

        self.state = RelayState::Done;
        tracing::debug!(
            conversation = %key,
            fragments = self.fragments,
            chars = self.text.len(),
            "completion stream finished"
        );

        let exchange = [
            ChatMessage::user(topic, Utc::now()),
            ChatMessage::assistant(self.text.clone(), Utc::now()),
        ];
        let persisted = append_history(store.as_ref(), &key, &exchange).await;

        RelayOutcome {
            state: self.state,
            text: self.text,
            fragments: self.fragments,
            persisted,
        }
    }

    fn fail(mut self) -> RelayOutcome {
        self.state = RelayState::Failed;
        RelayOutcome {
            state: self.state,
            text: self.text,
            fragments: self.fragments,
            persisted: false,
        }
    }
}

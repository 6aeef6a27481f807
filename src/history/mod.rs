// src/history/mod.rs
//! Conversation history: an append-only log of chat turns keyed by
//! (username, chat id).
//!
//! Reads never fail from the caller's point of view. `fetch_history`
//! reports what happened through [`HistoryFetch`] and logs store errors,
//! so a broken database looks like an empty conversation downstream while
//! tests can still tell the two apart.

mod memory;
mod postgres;

pub use memory::MemoryHistoryStore;
pub use postgres::PgHistoryStore;

use crate::models::{ChatMessage, ConversationKey};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("History store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// All turns for `key`, oldest first.
    async fn fetch(&self, key: &ConversationKey) -> Result<Vec<ChatMessage>, HistoryError>;

    /// Writes the whole batch or nothing.
    async fn append(
        &self,
        key: &ConversationKey,
        messages: &[ChatMessage],
    ) -> Result<(), HistoryError>;

    async fn ping(&self) -> Result<(), HistoryError>;

    /// Short backend name for status output.
    fn backend(&self) -> &'static str;
}

/// Outcome of a history read.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryFetch {
    Found(Vec<ChatMessage>),
    Empty,
    Failed(String),
}

impl HistoryFetch {
    /// The turns to use; a failed read contributes none.
    pub fn messages(&self) -> &[ChatMessage] {
        match self {
            HistoryFetch::Found(messages) => messages,
            HistoryFetch::Empty | HistoryFetch::Failed(_) => &[],
        }
    }

    pub fn into_messages(self) -> Vec<ChatMessage> {
        match self {
            HistoryFetch::Found(messages) => messages,
            HistoryFetch::Empty | HistoryFetch::Failed(_) => Vec::new(),
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            HistoryFetch::Found(_) => "found",
            HistoryFetch::Empty => "empty",
            HistoryFetch::Failed(_) => "failed",
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, HistoryFetch::Failed(_))
    }
}

pub async fn fetch_history(store: &dyn HistoryStore, key: &ConversationKey) -> HistoryFetch {
    match store.fetch(key).await {
        Ok(messages) if messages.is_empty() => HistoryFetch::Empty,
        Ok(messages) => {
            tracing::debug!(conversation = %key, count = messages.len(), "loaded chat history");
            HistoryFetch::Found(messages)
        }
        Err(e) => {
            tracing::error!(conversation = %key, error = %e, "Error fetching chat history");
            HistoryFetch::Failed(e.to_string())
        }
    }
}

/// Single attempt, no retry. Returns whether the batch was committed.
pub async fn append_history(
    store: &dyn HistoryStore,
    key: &ConversationKey,
    messages: &[ChatMessage],
) -> bool {
    match store.append(key, messages).await {
        Ok(()) => {
            tracing::debug!(conversation = %key, count = messages.len(), "appended chat history");
            true
        }
        Err(e) => {
            tracing::error!(conversation = %key, error = %e, "Error appending chat history");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    struct BrokenStore;

    #[async_trait]
    impl HistoryStore for BrokenStore {
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
            "broken"
        }
    }

    #[tokio::test]
    async fn test_fetch_distinguishes_empty_from_failed() {
        let key = ConversationKey::default();

        let store = MemoryHistoryStore::new();
        let fetched = fetch_history(&store, &key).await;
        assert_eq!(fetched, HistoryFetch::Empty);
        assert_eq!(fetched.status(), "empty");

        let fetched = fetch_history(&BrokenStore, &key).await;
        assert!(fetched.is_failed());
        assert!(fetched.messages().is_empty());
        assert_eq!(fetched.status(), "failed");
    }

    #[tokio::test]
    async fn test_round_trip_preserves_order_and_content() {
        let store = MemoryHistoryStore::new();
        let key = ConversationKey::new(Some("u"), Some("c"));
        let start = Utc::now();
        let batch: Vec<ChatMessage> = (0..5)
            .map(|i| {
                let ts = start + Duration::milliseconds(i);
                if i % 2 == 0 {
                    ChatMessage::user(format!("question {i}"), ts)
                } else {
                    ChatMessage::assistant(format!("answer {i}"), ts)
                }
            })
            .collect();

        assert!(append_history(&store, &key, &batch).await);

        let fetched = fetch_history(&store, &key).await.into_messages();
        assert_eq!(fetched, batch);
    }

    #[tokio::test]
    async fn test_append_failure_reported() {
        let key = ConversationKey::default();
        let batch = vec![ChatMessage::user("hi", Utc::now())];
        assert!(!append_history(&BrokenStore, &key, &batch).await);
    }
}

// src/history/memory.rs
use super::{HistoryError, HistoryStore};
use crate::models::{ChatMessage, ConversationKey};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-local history, used when no database is configured.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    conversations: RwLock<HashMap<ConversationKey, Vec<ChatMessage>>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn fetch(&self, key: &ConversationKey) -> Result<Vec<ChatMessage>, HistoryError> {
        let conversations = self.conversations.read().await;
        Ok(conversations.get(key).cloned().unwrap_or_default())
    }

    async fn append(
        &self,
        key: &ConversationKey,
        messages: &[ChatMessage],
    ) -> Result<(), HistoryError> {
        // Held across the whole batch, so readers never see half of it.
        let mut conversations = self.conversations.write().await;
        let log = conversations.entry(key.clone()).or_default();
        log.extend_from_slice(messages);
        // Stable: equal timestamps keep insertion order.
        log.sort_by_key(|m| m.timestamp);
        Ok(())
    }

    async fn ping(&self) -> Result<(), HistoryError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

// src/completion/requester.rs
use super::{CompletionError, CompletionProvider, FragmentStream, PromptMessage};
use crate::history::{fetch_history, HistoryStore};
use crate::models::{ChatMessage, ConversationKey};
use crate::prompt::EMPTY_TOPIC_FALLBACK;
use std::sync::Arc;

/// Assembles the prompt for a conversation turn and opens the provider stream.
pub struct CompletionRequester {
    store: Arc<dyn HistoryStore>,
    provider: Arc<dyn CompletionProvider>,
    system_prompt: String,
}

impl CompletionRequester {
    pub fn new(
        store: Arc<dyn HistoryStore>,
        provider: Arc<dyn CompletionProvider>,
        system_prompt: String,
    ) -> Self {
        Self {
            store,
            provider,
            system_prompt,
        }
    }

    pub fn model(&self) -> &str {
        self.provider.model()
    }

    pub async fn request_completion(
        &self,
        topic: &str,
        key: &ConversationKey,
    ) -> Result<FragmentStream, CompletionError> {
        let history = fetch_history(self.store.as_ref(), key).await;
        if history.is_failed() {
            tracing::warn!(conversation = %key, "continuing without chat history");
        }

        let messages = build_messages(&self.system_prompt, history.messages(), topic);
        tracing::debug!(
            conversation = %key,
            prompt_messages = messages.len(),
            "requesting completion"
        );

        self.provider.stream_chat(messages).await
    }
}

/// System prompt, then prior user/assistant turns, then the new turn.
pub fn build_messages(
    system_prompt: &str,
    history: &[ChatMessage],
    topic: &str,
) -> Vec<PromptMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(PromptMessage::new("system", system_prompt));

    messages.extend(
        history
            .iter()
            .filter(|m| m.role.is_conversational())
            .map(|m| PromptMessage::new(m.role.as_str(), m.content.clone())),
    );

    let turn = if topic.trim().is_empty() {
        EMPTY_TOPIC_FALLBACK
    } else {
        topic
    };
    messages.push(PromptMessage::new("user", turn));

    messages
}

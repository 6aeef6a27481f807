// src/models/chat.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_USERNAME: &str = "guest";
pub const DEFAULT_CHAT_ID: &str = "default";

/// Speaker of a stored turn. Unknown role text read back from the store is
/// preserved as `Other` so nothing is lost on a round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Other(role) => role.as_str(),
        }
    }

    pub fn from_db(role: &str) -> Self {
        match role {
            "system" => Role::System,
            "user" => Role::User,
            "assistant" => Role::Assistant,
            other => Role::Other(other.to_string()),
        }
    }

    /// Only user and assistant turns are replayed to the provider.
    pub fn is_conversational(&self) -> bool {
        matches!(self, Role::User | Role::Assistant)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let role = String::deserialize(deserializer)?;
        Ok(Role::from_db(&role))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp,
        }
    }

    pub fn assistant(content: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp,
        }
    }
}

/// Partition key of the history log: (username, chat id).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversationKey {
    pub username: String,
    pub chat_id: String,
}

impl ConversationKey {
    /// Missing or empty parts fall back to the guest user and the default
    /// chat. Values are otherwise kept verbatim.
    pub fn new(username: Option<&str>, chat_id: Option<&str>) -> Self {
        fn or_default(value: Option<&str>, fallback: &str) -> String {
            match value {
                Some(v) if !v.is_empty() => v.to_string(),
                _ => fallback.to_string(),
            }
        }

        Self {
            username: or_default(username, DEFAULT_USERNAME),
            chat_id: or_default(chat_id, DEFAULT_CHAT_ID),
        }
    }
}

impl Default for ConversationKey {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.username, self.chat_id)
    }
}

/// Body of `POST /api/story`. Every field is optional and may be `null`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryRequest {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub chat_id: Option<String>,
}

impl StoryRequest {
    /// The new turn's text; absent or `null` reads as empty.
    pub fn topic(&self) -> &str {
        self.topic.as_deref().unwrap_or_default()
    }

    pub fn key(&self) -> ConversationKey {
        ConversationKey::new(self.username.as_deref(), self.chat_id.as_deref())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    pub username: Option<String>,
    pub chat_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub username: String,
    pub chat_id: String,
    pub status: &'static str,
    pub messages: Vec<ChatMessage>,
}

//! Conversation data model
//!
//! `ChatMessage` is what callers send and what the provider receives.
//! `Chat` is the record written to the store once per relayed request.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Characters of the first message kept as the chat title.
pub const TITLE_MAX_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Persisted conversation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: String,
    pub title: String,
    pub user_id: String,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    pub path: String,
    pub messages: Vec<ChatMessage>,
}

impl Chat {
    /// Assemble the record for a finished exchange. `messages` are the
    /// caller's messages; the assistant reply is appended after them.
    pub fn assemble(
        id: String,
        user_id: String,
        created_at: i64,
        mut messages: Vec<ChatMessage>,
        reply: String,
    ) -> Self {
        let title = messages
            .first()
            .map(|m| derive_title(&m.content))
            .unwrap_or_default();
        let path = chat_path(&id);
        messages.push(ChatMessage::assistant(reply));

        Self {
            id,
            title,
            user_id,
            created_at,
            path,
            messages,
        }
    }

    pub fn key(&self) -> String {
        chat_key(&self.id)
    }

    pub fn index_key(&self) -> String {
        user_chat_key(&self.user_id)
    }

    /// Flatten into hash fields. `messages` is stored as a JSON array.
    pub fn to_fields(&self) -> Result<Vec<(String, String)>> {
        let messages =
            serde_json::to_string(&self.messages).context("Failed to serialize chat messages")?;

        Ok(vec![
            ("id".to_string(), self.id.clone()),
            ("title".to_string(), self.title.clone()),
            ("userId".to_string(), self.user_id.clone()),
            ("createdAt".to_string(), self.created_at.to_string()),
            ("path".to_string(), self.path.clone()),
            ("messages".to_string(), messages),
        ])
    }
}

pub fn derive_title(content: &str) -> String {
    content.chars().take(TITLE_MAX_CHARS).collect()
}

pub fn chat_path(id: &str) -> String {
    format!("/chat/{}", id)
}

pub fn chat_key(id: &str) -> String {
    format!("chat:{}", id)
}

pub fn user_chat_key(user_id: &str) -> String {
    format!("user:chat:{}", user_id)
}

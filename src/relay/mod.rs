//! Chat relay
//!
//! Forwards a conversation to the completion provider, buffers the streamed
//! reply, and stores the finished exchange. The reply is returned only after
//! the upstream stream has been fully drained.

pub mod handler;

use crate::core::chat::{Chat, ChatMessage};
use crate::core::id::IdGenerator;
use crate::core::llm::CompletionProvider;
use crate::core::prompt::PromptTemplate;
use crate::error::{RelayError, RelayResult};
use crate::storage::ChatStore;
use chrono::Utc;
use futures::StreamExt;
use serde::Deserialize;
use std::sync::Arc;

/// Body of `POST /api/chat`
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub messages: Vec<ChatMessage>,
}

#[derive(Clone)]
pub struct ChatRelay {
    provider: Arc<dyn CompletionProvider>,
    store: Arc<dyn ChatStore>,
    ids: Arc<dyn IdGenerator>,
}

impl ChatRelay {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        store: Arc<dyn ChatStore>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            provider,
            store,
            ids,
        }
    }

    /// Relay one conversation on behalf of an already-resolved user.
    pub async fn relay(&self, user_id: &str, request: ChatRequest) -> RelayResult<String> {
        let ChatRequest { id, messages } = request;

        let input = messages
            .last()
            .map(|m| m.content.clone())
            .ok_or_else(|| RelayError::InvalidRequest("messages must not be empty".to_string()))?;

        let prompt = PromptTemplate::for_conversation(&messages);
        let mut stream = self
            .provider
            .stream_complete(&prompt, &input)
            .await
            .map_err(RelayError::Provider)?;

        let mut reply = String::new();
        let mut chunks = 0usize;
        while let Some(chunk) = stream.next().await {
            reply.push_str(&chunk.map_err(RelayError::Provider)?);
            chunks += 1;
        }

        // Only an absent id is generated; a supplied one is kept verbatim
        let id = id.unwrap_or_else(|| self.ids.new_id());
        let created_at = Utc::now().timestamp_millis();
        let chat = Chat::assemble(id, user_id.to_string(), created_at, messages, reply.clone());

        self.store
            .save_chat(&chat)
            .await
            .map_err(RelayError::Storage)?;

        tracing::info!(
            "[ChatRelay] Stored {} for user '{}' ({} chunks, {} bytes)",
            chat.key(),
            user_id,
            chunks,
            reply.len()
        );

        Ok(reply)
    }
}

//! Chat Record Storage
//!
//! Information Hiding:
//! - Key-value backend hidden behind trait
//! - Records are written as a hash plus a per-user sorted index entry
//! - Backends decide whether the two writes are applied atomically

use crate::core::chat::Chat;
use anyhow::Result;
use async_trait::async_trait;

pub mod memory;
pub mod redis;

/// Write side of a Redis-style key-value store
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Set `fields` on the hash stored at `key`
    async fn write_fields(&self, key: &str, fields: &[(String, String)]) -> Result<()>;

    /// Add `member` to the sorted set at `key` with `score`
    async fn add_to_sorted_set(&self, key: &str, score: i64, member: &str) -> Result<()>;

    /// Persist a chat record and index it under its owner.
    /// The default performs the two writes in sequence; a failure of the
    /// second leaves the first in place.
    async fn save_chat(&self, chat: &Chat) -> Result<()> {
        let key = chat.key();
        self.write_fields(&key, &chat.to_fields()?).await?;
        self.add_to_sorted_set(&chat.index_key(), chat.created_at, &key)
            .await
    }
}

//! Redis Chat Storage
//!
//! Information Hiding:
//! - Connection pooling via deadpool hidden behind the store
//! - Record and index entry are written in one MULTI/EXEC pipeline

use super::ChatStore;
use crate::config::settings::StorageConfig;
use crate::core::chat::Chat;
use ::redis::AsyncCommands;
use anyhow::{Context, Result};
use async_trait::async_trait;
use deadpool_redis::{Config, Connection, Pool, PoolConfig, Runtime};

#[derive(Clone)]
pub struct RedisStore {
    pool: Pool,
}

impl RedisStore {
    /// Build the pool. Connections are opened lazily on first use.
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let mut cfg = Config::from_url(config.redis_url.as_str());
        cfg.pool = Some(PoolConfig::new(config.pool_max));
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .context("Failed to create Redis pool")?;
        Ok(Self { pool })
    }

    async fn connection(&self) -> Result<Connection> {
        self.pool
            .get()
            .await
            .context("Failed to get Redis connection")
    }

    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        ::redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .context("Redis PING failed")?;
        Ok(())
    }
}

#[async_trait]
impl ChatStore for RedisStore {
    async fn write_fields(&self, key: &str, fields: &[(String, String)]) -> Result<()> {
        let mut conn = self.connection().await?;
        conn.hset_multiple::<_, _, _, ()>(key, fields)
            .await
            .with_context(|| format!("HSET {} failed", key))
    }

    async fn add_to_sorted_set(&self, key: &str, score: i64, member: &str) -> Result<()> {
        let mut conn = self.connection().await?;
        conn.zadd::<_, _, _, ()>(key, member, score)
            .await
            .with_context(|| format!("ZADD {} failed", key))
    }

    async fn save_chat(&self, chat: &Chat) -> Result<()> {
        let key = chat.key();
        let fields = chat.to_fields()?;
        let mut conn = self.connection().await?;

        let mut pipe = ::redis::pipe();
        pipe.atomic()
            .hset_multiple(&key, &fields)
            .ignore()
            .zadd(chat.index_key(), &key, chat.created_at)
            .ignore();
        pipe.query_async::<()>(&mut conn)
            .await
            .with_context(|| format!("Failed to persist {}", key))?;

        tracing::debug!("[RedisStore] Saved {} and indexed under {}", key, chat.index_key());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chat::ChatMessage;
    use crate::core::id::{IdGenerator, RandomId};
    use std::collections::HashMap;

    /// Store against `REDIS_URL`, or `None` to skip when no server is configured.
    async fn live_store() -> Option<(RedisStore, Connection)> {
        let url = std::env::var("REDIS_URL").ok()?;
        let config = StorageConfig {
            redis_url: url,
            ..StorageConfig::default()
        };
        let store = RedisStore::new(&config).unwrap();
        let conn = store.connection().await.unwrap();
        Some((store, conn))
    }

    #[test]
    fn test_pool_is_lazy() {
        let config = StorageConfig {
            redis_url: "redis://127.0.0.1:1".to_string(),
            ..StorageConfig::default()
        };
        assert!(RedisStore::new(&config).is_ok());
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let config = StorageConfig {
            redis_url: "not a redis url".to_string(),
            ..StorageConfig::default()
        };
        assert!(RedisStore::new(&config).is_err());
    }

    #[tokio::test]
    async fn test_save_chat_writes_record_and_index() {
        let Some((store, mut conn)) = live_store().await else {
            eprintln!("REDIS_URL not set, skipping");
            return;
        };
        let ids = RandomId::default();
        let chat = Chat::assemble(
            ids.new_id(),
            format!("user-{}", ids.new_id()),
            1_700_000_000_123,
            vec![ChatMessage::user("Hi")],
            "Hello".to_string(),
        );

        store.save_chat(&chat).await.unwrap();

        let hash: HashMap<String, String> = conn.hgetall(chat.key()).await.unwrap();
        let expected: HashMap<String, String> = chat.to_fields().unwrap().into_iter().collect();
        assert_eq!(hash.len(), 6);
        assert_eq!(hash, expected);

        let index: Vec<(String, i64)> = conn
            .zrange_withscores(chat.index_key(), 0, -1)
            .await
            .unwrap();
        assert_eq!(index, vec![(chat.key(), chat.created_at)]);

        conn.del::<_, ()>(vec![chat.key(), chat.index_key()]).await.unwrap();
    }

    #[tokio::test]
    async fn test_single_writes_reach_redis() {
        let Some((store, mut conn)) = live_store().await else {
            eprintln!("REDIS_URL not set, skipping");
            return;
        };
        let suffix = RandomId::default().new_id();
        let key = format!("chat:{}", suffix);
        let index = format!("user:chat:{}", suffix);

        let fields = vec![
            ("id".to_string(), suffix.clone()),
            ("title".to_string(), "Hi".to_string()),
        ];
        store.write_fields(&key, &fields).await.unwrap();
        store.add_to_sorted_set(&index, 20, "chat:b").await.unwrap();
        store.add_to_sorted_set(&index, 10, "chat:a").await.unwrap();

        let title: String = conn.hget(&key, "title").await.unwrap();
        assert_eq!(title, "Hi");
        let members: Vec<String> = conn.zrange(&index, 0, -1).await.unwrap();
        assert_eq!(members, vec!["chat:a", "chat:b"]);

        conn.del::<_, ()>(vec![key, index]).await.unwrap();
    }
}

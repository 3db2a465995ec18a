//! In-Memory Chat Storage
//!
//! Information Hiding:
//! - Hash and sorted-set maps hidden from users
//! - Thread-safe access via RwLock hidden behind async interface
//! - Suitable for testing and local runs without Redis

use super::ChatStore;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Keyspace {
    hashes: HashMap<String, HashMap<String, String>>,
    sorted_sets: HashMap<String, Vec<(i64, String)>>,
}

/// In-memory store; data is lost when the process exits
#[derive(Clone, Default)]
pub struct InMemoryStore {
    keyspace: Arc<RwLock<Keyspace>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn hash(&self, key: &str) -> Option<HashMap<String, String>> {
        self.keyspace.read().await.hashes.get(key).cloned()
    }

    /// Members of a sorted set, ascending by score
    pub async fn sorted_set(&self, key: &str) -> Vec<(i64, String)> {
        self.keyspace
            .read()
            .await
            .sorted_sets
            .get(key)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatStore for InMemoryStore {
    async fn write_fields(&self, key: &str, fields: &[(String, String)]) -> Result<()> {
        let mut keyspace = self.keyspace.write().await;
        let hash = keyspace.hashes.entry(key.to_string()).or_default();
        for (field, value) in fields {
            hash.insert(field.clone(), value.clone());
        }
        tracing::debug!("[InMemoryStore] Wrote {} fields to '{}'", fields.len(), key);
        Ok(())
    }

    async fn add_to_sorted_set(&self, key: &str, score: i64, member: &str) -> Result<()> {
        let mut keyspace = self.keyspace.write().await;
        let set = keyspace.sorted_sets.entry(key.to_string()).or_default();

        // ZADD semantics: re-adding a member updates its score
        set.retain(|(_, m)| m != member);
        let at = set
            .iter()
            .position(|(s, m)| (*s, m.as_str()) > (score, member))
            .unwrap_or(set.len());
        set.insert(at, (score, member.to_string()));

        tracing::debug!("[InMemoryStore] Indexed '{}' in '{}' at {}", member, key, score);
        Ok(())
    }
}

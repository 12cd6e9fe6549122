use std::collections::HashSet;

use async_trait::async_trait;
use common_types::{Topic, VolumeEntry};
use thiserror::Error;

pub mod memory;
pub mod redis_store;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// Retained history entries per pool; older entries are trimmed after append.
pub const HISTORY_CAP: usize = 10;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("stored record is not valid JSON: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Append-only bounded volume history, keyed by pool address. Appends must be
/// atomic per address; the concurrency model relies on that instead of
/// locking.
#[async_trait]
pub trait VolumeStore: Send + Sync {
    /// Every pool address ever sighted. Empty exactly on a cold start.
    async fn known_addresses(&self) -> Result<HashSet<String>, StoreError>;

    /// Bulk upsert: appends one entry per address, creating records on first
    /// sighting and trimming each history to [`HISTORY_CAP`].
    async fn append_volumes(&self, entries: &[(String, VolumeEntry)]) -> Result<(), StoreError>;

    /// Up to `limit` most recent entries, oldest first.
    async fn recent_history(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<VolumeEntry>, StoreError>;
}

/// Subscriptions, one record per user id.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Enables the given topics, merging into an existing record or creating
    /// one; the chat id is refreshed either way.
    async fn upsert(&self, user_id: i64, chat_id: i64, topics: &[Topic]) -> Result<(), StoreError>;

    /// Disables the given topics, leaving the record in place. Returns
    /// whether a record existed.
    async fn disable_topics(&self, user_id: i64, topics: &[Topic]) -> Result<bool, StoreError>;

    /// Removes the record entirely. Returns whether one was removed.
    async fn delete(&self, user_id: i64) -> Result<bool, StoreError>;

    /// Chat ids of every user subscribed to `topic`.
    async fn subscribers(&self, topic: Topic) -> Result<Vec<i64>, StoreError>;
}

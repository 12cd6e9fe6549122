use std::collections::HashSet;

use async_trait::async_trait;
use common_types::{Subscription, Topic, VolumeEntry};
use redis::{aio::MultiplexedConnection, AsyncCommands};

use crate::{StoreError, SubscriptionStore, VolumeStore, HISTORY_CAP};

const KNOWN_SET_KEY: &str = "dlmm:pools";
const SUBS_KEY: &str = "dlmm:subs";

fn volume_key(address: &str) -> String {
    format!("dlmm:volumes:{address}")
}

/// Redis-backed store. Histories are lists (`RPUSH` + `LTRIM`), the known
/// address set is a set, subscriptions live in one hash keyed by user id.
/// Every mutation is a single-key Redis command, which is the per-record
/// atomicity the refresh cycle and the command handlers count on.
pub struct RedisStore {
    conn: MultiplexedConnection,
}

impl RedisStore {
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl VolumeStore for RedisStore {
    async fn known_addresses(&self) -> Result<HashSet<String>, StoreError> {
        let mut conn = self.conn.clone();
        let addresses: Vec<String> = conn.smembers(KNOWN_SET_KEY).await?;
        Ok(addresses.into_iter().collect())
    }

    async fn append_volumes(&self, entries: &[(String, VolumeEntry)]) -> Result<(), StoreError> {
        if entries.is_empty() {
            return Ok(());
        }
        let mut pipe = redis::pipe();
        for (address, entry) in entries {
            let key = volume_key(address);
            let payload = serde_json::to_string(entry)?;
            pipe.rpush(&key, payload)
                .ignore()
                .ltrim(&key, -(HISTORY_CAP as isize), -1)
                .ignore()
                .sadd(KNOWN_SET_KEY, address)
                .ignore();
        }
        let mut conn = self.conn.clone();
        let _: () = pipe.query_async(&mut conn).await?;
        Ok(())
    }

    async fn recent_history(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<VolumeEntry>, StoreError> {
        let mut conn = self.conn.clone();
        let raw: Vec<String> = conn
            .lrange(volume_key(address), -(limit as isize), -1)
            .await?;
        raw.iter()
            .map(|line| serde_json::from_str(line).map_err(StoreError::from))
            .collect()
    }
}

#[async_trait]
impl SubscriptionStore for RedisStore {
    async fn upsert(&self, user_id: i64, chat_id: i64, topics: &[Topic]) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let existing: Option<String> = conn.hget(SUBS_KEY, user_id).await?;
        let mut sub = match existing {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Subscription::empty(user_id, chat_id),
        };
        sub.chat_id = chat_id;
        for topic in topics {
            sub.set(*topic, true);
        }
        let _: () = conn
            .hset(SUBS_KEY, user_id, serde_json::to_string(&sub)?)
            .await?;
        Ok(())
    }

    async fn disable_topics(&self, user_id: i64, topics: &[Topic]) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let existing: Option<String> = conn.hget(SUBS_KEY, user_id).await?;
        let Some(raw) = existing else {
            return Ok(false);
        };
        let mut sub: Subscription = serde_json::from_str(&raw)?;
        for topic in topics {
            sub.set(*topic, false);
        }
        let _: () = conn
            .hset(SUBS_KEY, user_id, serde_json::to_string(&sub)?)
            .await?;
        Ok(true)
    }

    async fn delete(&self, user_id: i64) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.hdel(SUBS_KEY, user_id).await?;
        Ok(removed > 0)
    }

    async fn subscribers(&self, topic: Topic) -> Result<Vec<i64>, StoreError> {
        let mut conn = self.conn.clone();
        let raw: Vec<String> = conn.hvals(SUBS_KEY).await?;
        let mut chats = Vec::new();
        for line in raw {
            let sub: Subscription = serde_json::from_str(&line)?;
            if sub.has(topic) {
                chats.push(sub.chat_id);
            }
        }
        Ok(chats)
    }
}

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use common_types::{Subscription, Topic, VolumeEntry};
use tokio::sync::RwLock;

use crate::{StoreError, SubscriptionStore, VolumeStore, HISTORY_CAP};

/// In-memory store with the same trimming and upsert semantics as
/// [`crate::RedisStore`]; used by tests and local runs without Redis.
#[derive(Default)]
pub struct MemoryStore {
    volumes: RwLock<HashMap<String, Vec<VolumeEntry>>>,
    subs: RwLock<HashMap<i64, Subscription>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VolumeStore for MemoryStore {
    async fn known_addresses(&self) -> Result<HashSet<String>, StoreError> {
        Ok(self.volumes.read().await.keys().cloned().collect())
    }

    async fn append_volumes(&self, entries: &[(String, VolumeEntry)]) -> Result<(), StoreError> {
        let mut volumes = self.volumes.write().await;
        for (address, entry) in entries {
            let history = volumes.entry(address.clone()).or_default();
            history.push(entry.clone());
            if history.len() > HISTORY_CAP {
                let excess = history.len() - HISTORY_CAP;
                history.drain(..excess);
            }
        }
        Ok(())
    }

    async fn recent_history(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<VolumeEntry>, StoreError> {
        let volumes = self.volumes.read().await;
        let history = volumes.get(address).map(Vec::as_slice).unwrap_or(&[]);
        let start = history.len().saturating_sub(limit);
        Ok(history[start..].to_vec())
    }
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn upsert(&self, user_id: i64, chat_id: i64, topics: &[Topic]) -> Result<(), StoreError> {
        let mut subs = self.subs.write().await;
        let sub = subs
            .entry(user_id)
            .or_insert_with(|| Subscription::empty(user_id, chat_id));
        sub.chat_id = chat_id;
        for topic in topics {
            sub.set(*topic, true);
        }
        Ok(())
    }

    async fn disable_topics(&self, user_id: i64, topics: &[Topic]) -> Result<bool, StoreError> {
        let mut subs = self.subs.write().await;
        match subs.get_mut(&user_id) {
            Some(sub) => {
                for topic in topics {
                    sub.set(*topic, false);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, user_id: i64) -> Result<bool, StoreError> {
        Ok(self.subs.write().await.remove(&user_id).is_some())
    }

    async fn subscribers(&self, topic: Topic) -> Result<Vec<i64>, StoreError> {
        Ok(self
            .subs
            .read()
            .await
            .values()
            .filter(|sub| sub.has(topic))
            .map(|sub| sub.chat_id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn entry(volume: f64) -> VolumeEntry {
        VolumeEntry {
            ts: Utc::now(),
            volume,
        }
    }

    #[tokio::test]
    async fn history_is_trimmed_to_cap() {
        let store = MemoryStore::new();
        for i in 0..15 {
            store
                .append_volumes(&[("pool".to_string(), entry(i as f64))])
                .await
                .unwrap();
        }
        let history = store.recent_history("pool", 100).await.unwrap();
        assert_eq!(history.len(), HISTORY_CAP);
        assert_eq!(history.first().unwrap().volume, 5.0);
        assert_eq!(history.last().unwrap().volume, 14.0);
    }

    #[tokio::test]
    async fn recent_history_returns_tail_oldest_first() {
        let store = MemoryStore::new();
        let entries: Vec<_> = (0..8)
            .map(|i| ("pool".to_string(), entry(i as f64)))
            .collect();
        store.append_volumes(&entries).await.unwrap();
        let last_three = store.recent_history("pool", 3).await.unwrap();
        let volumes: Vec<f64> = last_three.iter().map(|e| e.volume).collect();
        assert_eq!(volumes, vec![5.0, 6.0, 7.0]);
    }

    #[tokio::test]
    async fn upsert_merges_topics_and_refreshes_chat() {
        let store = MemoryStore::new();
        store.upsert(1, 10, &[Topic::NewPools]).await.unwrap();
        store.upsert(1, 20, &[Topic::IncreasedVolume]).await.unwrap();
        assert_eq!(store.subscribers(Topic::NewPools).await.unwrap(), vec![20]);
        assert_eq!(
            store.subscribers(Topic::IncreasedVolume).await.unwrap(),
            vec![20]
        );
    }

    #[tokio::test]
    async fn disable_keeps_record_delete_removes_it() {
        let store = MemoryStore::new();
        store
            .upsert(1, 10, &[Topic::NewPools, Topic::IncreasedVolume])
            .await
            .unwrap();

        assert!(store.disable_topics(1, &[Topic::NewPools]).await.unwrap());
        assert!(store.subscribers(Topic::NewPools).await.unwrap().is_empty());
        assert_eq!(
            store.subscribers(Topic::IncreasedVolume).await.unwrap(),
            vec![10]
        );

        assert!(store.delete(1).await.unwrap());
        assert!(!store.delete(1).await.unwrap());
        assert!(!store.disable_topics(2, &[Topic::NewPools]).await.unwrap());
    }
}

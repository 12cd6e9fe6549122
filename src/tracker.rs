use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use common_types::{PoolRecord, SortField, SortKey, Topic, VolumeEntry};
use meteora_client::PoolSource;
use query_engine::{batch_messages, format_pools, sort_pools, BLOCKS_PER_MESSAGE};
use tg_publisher::{broadcast, ChatTransport};
use tokio::time::{sleep, Duration};
use tracing::{error, info};
use volume_store::{SubscriptionStore, VolumeStore};

/// History entries inspected for the rising-volume check.
pub const TREND_WINDOW: usize = 5;

const NEW_POOLS_HEADER: &str = "🆕 <b>New pools on Meteora DLMM</b>";
const RISING_VOLUME_HEADER: &str = "📈 <b>Pools with rising 24h volume</b>";

/// Hourly refresh cycle: fetch a snapshot, notify about pools never seen
/// before, append one volume point per pool, then notify about pools whose
/// recent volume history is strictly increasing.
pub struct VolumeTracker {
    source: Arc<dyn PoolSource>,
    volumes: Arc<dyn VolumeStore>,
    subs: Arc<dyn SubscriptionStore>,
    transport: Arc<dyn ChatTransport>,
}

impl VolumeTracker {
    pub fn new(
        source: Arc<dyn PoolSource>,
        volumes: Arc<dyn VolumeStore>,
        subs: Arc<dyn SubscriptionStore>,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        Self {
            source,
            volumes,
            subs,
            transport,
        }
    }

    /// Runs one cycle immediately, then one per interval, forever. A failed
    /// cycle is logged and retried on the next tick.
    pub async fn run(self, interval: Duration) {
        loop {
            if let Err(e) = self.cycle().await {
                error!(err=%e, "refresh cycle failed, retrying next tick");
            }
            sleep(interval).await;
        }
    }

    pub async fn cycle(&self) -> Result<()> {
        let pools = self.source.eligible_pools().await;
        if pools.is_empty() {
            info!("empty snapshot, skipping cycle");
            return Ok(());
        }

        let known = self.volumes.known_addresses().await?;
        // first-ever run: everything is unseen, notifying would spam
        if !known.is_empty() {
            let fresh: Vec<PoolRecord> = pools
                .iter()
                .filter(|pool| !known.contains(&pool.address))
                .cloned()
                .collect();
            if !fresh.is_empty() {
                info!(count = fresh.len(), "new pools detected");
                self.notify(Topic::NewPools, NEW_POOLS_HEADER, fresh).await?;
            }
        }

        let now = Utc::now();
        let entries: Vec<(String, VolumeEntry)> = pools
            .iter()
            .map(|pool| {
                (
                    pool.address.clone(),
                    VolumeEntry {
                        ts: now,
                        volume: pool.trade_volume_24h,
                    },
                )
            })
            .collect();
        self.volumes.append_volumes(&entries).await?;

        let mut rising = Vec::new();
        for pool in &pools {
            let history = self
                .volumes
                .recent_history(&pool.address, TREND_WINDOW)
                .await?;
            if history.len() >= TREND_WINDOW && strictly_increasing(&history) {
                rising.push(pool.clone());
            }
        }
        if !rising.is_empty() {
            info!(count = rising.len(), "pools with rising volume");
            self.notify(Topic::IncreasedVolume, RISING_VOLUME_HEADER, rising)
                .await?;
        }

        info!(pools = pools.len(), "refresh cycle finished");
        Ok(())
    }

    /// Formats `pools` (liquidity descending, uncapped) and fans the batches
    /// out to every subscriber of `topic`.
    async fn notify(&self, topic: Topic, header: &str, pools: Vec<PoolRecord>) -> Result<()> {
        let chats = self.subs.subscribers(topic).await?;
        if chats.is_empty() {
            return Ok(());
        }
        let sorted = sort_pools(pools, &[SortField::desc(SortKey::Liquidity)]);
        let mut blocks = vec![header.to_string()];
        blocks.extend(format_pools(&sorted));
        let messages = Arc::new(batch_messages(&blocks, BLOCKS_PER_MESSAGE));
        broadcast(self.transport.clone(), &chats, messages).await;
        Ok(())
    }
}

/// True iff every consecutive pair is strictly increasing; a plateau or any
/// decrease disqualifies.
pub fn strictly_increasing(history: &[VolumeEntry]) -> bool {
    history
        .windows(2)
        .all(|pair| pair[0].volume < pair[1].volume)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(volumes: &[f64]) -> Vec<VolumeEntry> {
        volumes
            .iter()
            .map(|&volume| VolumeEntry {
                ts: Utc::now(),
                volume,
            })
            .collect()
    }

    #[test]
    fn strictly_increasing_window_qualifies() {
        assert!(strictly_increasing(&history(&[10.0, 20.0, 30.0, 40.0, 50.0])));
    }

    #[test]
    fn plateau_or_decrease_disqualifies() {
        assert!(!strictly_increasing(&history(&[10.0, 20.0, 20.0, 40.0, 50.0])));
        assert!(!strictly_increasing(&history(&[10.0, 20.0, 15.0, 40.0, 50.0])));
    }
}

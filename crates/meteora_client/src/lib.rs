use std::time::Duration;

use async_trait::async_trait;
use common_types::PoolRecord;
use thiserror::Error;
use tracing::warn;

pub const PAIR_ALL_URL: &str = "https://dlmm-api.meteora.ag/pair/all";

/// A stuck upstream must not block the next scheduled cycle.
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("pair list request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Snapshot provider seam so the tracker and the command handlers can run
/// against a test double.
#[async_trait]
pub trait PoolSource: Send + Sync {
    /// Current snapshot after the baseline eligibility filter.
    /// Empty on upstream failure; the failure is logged, never propagated.
    async fn eligible_pools(&self) -> Vec<PoolRecord>;
}

pub struct MeteoraClient {
    http: reqwest::Client,
    url: String,
}

impl MeteoraClient {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_url(PAIR_ALL_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder().timeout(FETCH_TIMEOUT).build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub async fn fetch_all(&self) -> Result<Vec<PoolRecord>, FetchError> {
        let resp = self
            .http
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }
}

/// Baseline eligibility: SOL-quoted pairs, stables excluded, with a minimum
/// of liquidity and at least some trading activity.
pub fn is_eligible(pool: &PoolRecord) -> bool {
    let liquidity = pool.liquidity.parse::<f64>().unwrap_or(0.0);
    pool.name.contains("SOL")
        && !pool.name.contains("USDC")
        && !pool.name.contains("USDT")
        && liquidity > 100.0
        && pool.trade_volume_24h > 0.0
        && pool.fees_24h > 0.0
}

#[async_trait]
impl PoolSource for MeteoraClient {
    async fn eligible_pools(&self) -> Vec<PoolRecord> {
        match self.fetch_all().await {
            Ok(pools) => pools.into_iter().filter(is_eligible).collect(),
            Err(e) => {
                warn!(err=%e, "pool fetch failed, treating snapshot as empty");
                Vec::new()
            }
        }
    }
}

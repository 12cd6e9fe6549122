use std::sync::Arc;

use anyhow::Result;
use tokio::time::Duration;
use tracing::info;

use dlmm_pool_bot::bot::run_bot;
use dlmm_pool_bot::config::BotConfig;
use dlmm_pool_bot::handlers::BotContext;
use dlmm_pool_bot::tracker::VolumeTracker;
use meteora_client::MeteoraClient;
use tg_publisher::TgClient;
use volume_store::RedisStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cfg = BotConfig::from_env()?;

    let store = Arc::new(RedisStore::connect(&cfg.redis_url).await?);
    info!("connected to redis");
    let client = Arc::new(TgClient::new(&cfg.bot_token)?);
    let source = Arc::new(MeteoraClient::new()?);

    let tracker = VolumeTracker::new(
        source.clone(),
        store.clone(),
        store.clone(),
        client.clone(),
    );
    tokio::spawn(tracker.run(Duration::from_secs(cfg.refresh_interval_secs)));

    let ctx = Arc::new(BotContext {
        transport: client.clone(),
        source,
        subs: store,
        allowed_usernames: cfg.allowed_usernames.clone(),
    });
    info!("bot started");
    run_bot(client, ctx).await;
    Ok(())
}

use std::sync::Arc;

use tg_publisher::TgClient;
use tokio::time::{sleep, Duration};
use tracing::warn;

use crate::handlers::{handle_message, BotContext};

const POLL_TIMEOUT_SECS: u64 = 30;

/// Long-polls `getUpdates` forever, spawning one task per inbound message so
/// commands run concurrently. Handlers only read shared state or perform
/// per-key atomic store writes, so no coordination is needed between them.
pub async fn run_bot(client: Arc<TgClient>, ctx: Arc<BotContext>) {
    let mut offset = 0i64;
    loop {
        match client.get_updates(offset, POLL_TIMEOUT_SECS).await {
            Ok(updates) => {
                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    if let Some(message) = update.message {
                        let ctx = ctx.clone();
                        tokio::spawn(async move {
                            handle_message(&ctx, message).await;
                        });
                    }
                }
            }
            Err(e) => {
                warn!(err=%e, "getUpdates failed, retrying in 2s");
                sleep(Duration::from_secs(2)).await;
            }
        }
    }
}

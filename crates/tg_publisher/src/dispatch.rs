use std::sync::Arc;

use futures::{stream, StreamExt};
use tracing::warn;

use crate::{ChatTransport, SendError};

/// Upper bound on destinations being sent to at once, so a large subscriber
/// list cannot trip the Bot API rate limits.
pub const MAX_PARALLEL_SENDS: usize = 4;

/// Sends `messages` to one destination strictly in order; the first failure
/// aborts the remaining batches of this request.
pub async fn deliver(
    transport: &dyn ChatTransport,
    chat_id: i64,
    messages: &[String],
) -> Result<(), SendError> {
    for message in messages {
        transport.send_html(chat_id, message).await?;
    }
    Ok(())
}

/// Fans the same message sequence out to many destinations. Destinations run
/// concurrently (capped) with no ordering guarantee between them; a failing
/// destination is logged and does not affect the others.
pub async fn broadcast(
    transport: Arc<dyn ChatTransport>,
    chat_ids: &[i64],
    messages: Arc<Vec<String>>,
) {
    stream::iter(chat_ids.to_vec())
        .for_each_concurrent(MAX_PARALLEL_SENDS, |chat_id| {
            let transport = transport.clone();
            let messages = messages.clone();
            async move {
                if let Err(e) = deliver(transport.as_ref(), chat_id, &messages).await {
                    warn!(chat_id, err=%e, "notification delivery failed");
                }
            }
        })
        .await;
}

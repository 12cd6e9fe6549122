use async_trait::async_trait;
use thiserror::Error;

mod client;
pub mod dispatch;

pub use client::{Chat, Message, TgClient, Update, User};
pub use dispatch::{broadcast, deliver, MAX_PARALLEL_SENDS};

#[derive(Debug, Error)]
pub enum SendError {
    #[error("telegram request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("telegram API rejected the call: status={status} body={body}")]
    Api { status: u16, body: String },
}

/// Outbound chat capability. Injected everywhere a message is sent so tests
/// can substitute a fake transport.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_html(&self, chat_id: i64, text: &str) -> Result<(), SendError>;
}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::json;

use crate::{ChatTransport, SendError};

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Deserialize)]
struct UpdatesEnvelope {
    #[serde(default)]
    result: Vec<Update>,
}

/// Raw Telegram Bot API client over reqwest: `sendMessage` for output,
/// long-polled `getUpdates` for input.
pub struct TgClient {
    http: Client,
    api_base: String,
}

impl TgClient {
    pub fn new(bot_token: &str) -> Result<Self, SendError> {
        // must outlive a 30s getUpdates long poll
        let http = Client::builder().timeout(Duration::from_secs(40)).build()?;
        Ok(Self {
            http,
            api_base: format!("https://api.telegram.org/bot{bot_token}"),
        })
    }

    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, SendError> {
        let url = format!("{}/getUpdates", self.api_base);
        let body = json!({
            "offset": offset,
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        let resp = self.http.post(&url).json(&body).send().await?;
        let resp = checked(resp).await?;
        let envelope: UpdatesEnvelope = resp.json().await?;
        Ok(envelope.result)
    }
}

async fn checked(resp: Response) -> Result<Response, SendError> {
    if resp.status().is_success() {
        Ok(resp)
    } else {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        Err(SendError::Api { status, body })
    }
}

#[async_trait]
impl ChatTransport for TgClient {
    async fn send_html(&self, chat_id: i64, text: &str) -> Result<(), SendError> {
        let url = format!("{}/sendMessage", self.api_base);
        let body = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
        });
        let resp = self.http.post(&url).json(&body).send().await?;
        checked(resp).await?;
        Ok(())
    }
}

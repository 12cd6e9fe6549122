use std::collections::HashSet;

use anyhow::{Context, Result};

const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 3600;

/// Process configuration, environment-only. Missing required variables are a
/// fatal startup error.
#[derive(Clone, Debug)]
pub struct BotConfig {
    pub bot_token: String,
    pub redis_url: String,
    /// Lowercased allow-list; membership checks are case-insensitive.
    pub allowed_usernames: HashSet<String>,
    pub refresh_interval_secs: u64,
}

impl BotConfig {
    pub fn from_env() -> Result<Self> {
        let bot_token = std::env::var("BOT_TOKEN").context("BOT_TOKEN not set")?;
        let redis_url = std::env::var("REDIS_URL").context("REDIS_URL not set")?;
        let allowed = std::env::var("ALLOWED_USERNAMES").context("ALLOWED_USERNAMES not set")?;
        let refresh_interval_secs = match std::env::var("REFRESH_INTERVAL_SECS") {
            Ok(raw) => raw
                .parse()
                .context("REFRESH_INTERVAL_SECS must be an integer number of seconds")?,
            Err(_) => DEFAULT_REFRESH_INTERVAL_SECS,
        };
        Ok(Self {
            bot_token,
            redis_url,
            allowed_usernames: parse_allow_list(&allowed),
            refresh_interval_secs,
        })
    }
}

pub fn parse_allow_list(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(|name| name.trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .collect()
}

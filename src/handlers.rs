use std::collections::HashSet;
use std::sync::Arc;

use meteora_client::PoolSource;
use query_engine::{
    batch_messages, filter_pools, format_pools, parse_pools_command, parse_topics, sort_pools,
    BLOCKS_PER_MESSAGE, RESULT_CAP,
};
use tg_publisher::{deliver, ChatTransport, Message};
use tracing::{error, warn};
use volume_store::SubscriptionStore;

use crate::help::HELP_MESSAGE;

const UNAUTHORIZED: &str = "You are not authorized to use this bot.";
const NO_MATCHES: &str = "No pools found matching your criteria.";
const SEND_FAILED: &str =
    "An error occurred while sending the pool information. Please try again later.";
const SUBSCRIBE_OK: &str = "You have successfully subscribed to notifications.";
const SUBSCRIBE_FAILED: &str = "An error occurred while subscribing. Please try again later.";
const UNSUBSCRIBE_FAILED: &str = "An error occurred while unsubscribing. Please try again later.";
const SUBSCRIPTION_UPDATED: &str = "Your subscription has been updated.";
const UNSUBSCRIBED_ALL: &str = "You have successfully unsubscribed from all notifications.";
const NOT_SUBSCRIBED: &str = "You were not subscribed to any notifications.";
const MISSING_TOPIC: &str = "Specify what to subscribe to: newPools and/or increasedVolume.";

/// Everything a command handler needs, passed explicitly so tests can swap
/// in fakes for the transport, the pool source, and the store.
pub struct BotContext {
    pub transport: Arc<dyn ChatTransport>,
    pub source: Arc<dyn PoolSource>,
    pub subs: Arc<dyn SubscriptionStore>,
    /// Lowercased usernames allowed to talk to the bot.
    pub allowed_usernames: HashSet<String>,
}

/// Routes one inbound message. Non-commands and unknown commands are
/// ignored; everything else is allow-list checked first.
pub async fn handle_message(ctx: &BotContext, message: Message) {
    let Some(text) = message.text.clone() else {
        return;
    };
    let Some((command, args)) = split_command(&text) else {
        return;
    };

    let chat_id = message.chat.id;
    let username = message.from.as_ref().and_then(|user| user.username.as_deref());
    let allowed = username
        .map(|name| ctx.allowed_usernames.contains(&name.to_lowercase()))
        .unwrap_or(false);
    if !allowed {
        reply(ctx, chat_id, UNAUTHORIZED).await;
        return;
    }
    let user_id = message.from.as_ref().map(|user| user.id).unwrap_or(chat_id);

    match command {
        "pools" => pools_command(ctx, chat_id, args).await,
        "subscribe" => subscribe_command(ctx, user_id, chat_id, args).await,
        "unsubscribe" => unsubscribe_command(ctx, user_id, chat_id, args).await,
        "help" => reply(ctx, chat_id, HELP_MESSAGE).await,
        _ => {}
    }
}

/// `"/pools@SomeBot -s apr"` -> `("pools", "-s apr")`.
fn split_command(text: &str) -> Option<(&str, &str)> {
    let rest = text.trim().strip_prefix('/')?;
    let (head, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    let command = head.split('@').next().unwrap_or(head);
    if command.is_empty() {
        return None;
    }
    Some((command, args))
}

async fn pools_command(ctx: &BotContext, chat_id: i64, args: &str) {
    let query = match parse_pools_command(args) {
        Ok(query) => query,
        Err(e) => {
            // ParseError messages are written for end users
            reply(ctx, chat_id, &e.to_string()).await;
            return;
        }
    };

    let pools = ctx.source.eligible_pools().await;
    let matched = filter_pools(&pools, &query.filters);
    if matched.is_empty() {
        reply(ctx, chat_id, NO_MATCHES).await;
        return;
    }
    let sorted = sort_pools(matched, &query.sort);
    let capped = &sorted[..sorted.len().min(RESULT_CAP)];
    let blocks = format_pools(capped);
    let messages = batch_messages(&blocks, BLOCKS_PER_MESSAGE);
    if let Err(e) = deliver(ctx.transport.as_ref(), chat_id, &messages).await {
        warn!(chat_id, err=%e, "failed to send pool listing");
        reply(ctx, chat_id, SEND_FAILED).await;
    }
}

async fn subscribe_command(ctx: &BotContext, user_id: i64, chat_id: i64, args: &str) {
    let topics = match parse_topics(args) {
        Ok(topics) => topics,
        Err(e) => {
            reply(ctx, chat_id, &e.to_string()).await;
            return;
        }
    };
    if topics.is_empty() {
        reply(ctx, chat_id, MISSING_TOPIC).await;
        return;
    }
    match ctx.subs.upsert(user_id, chat_id, &topics).await {
        Ok(()) => reply(ctx, chat_id, SUBSCRIBE_OK).await,
        Err(e) => {
            error!(user_id, err=%e, "subscription upsert failed");
            reply(ctx, chat_id, SUBSCRIBE_FAILED).await;
        }
    }
}

async fn unsubscribe_command(ctx: &BotContext, user_id: i64, chat_id: i64, args: &str) {
    let topics = match parse_topics(args) {
        Ok(topics) => topics,
        Err(e) => {
            reply(ctx, chat_id, &e.to_string()).await;
            return;
        }
    };
    let outcome = if topics.is_empty() {
        // no topics means unsubscribe from everything
        ctx.subs.delete(user_id).await.map(|removed| {
            if removed {
                UNSUBSCRIBED_ALL
            } else {
                NOT_SUBSCRIBED
            }
        })
    } else {
        ctx.subs.disable_topics(user_id, &topics).await.map(|existed| {
            if existed {
                SUBSCRIPTION_UPDATED
            } else {
                NOT_SUBSCRIBED
            }
        })
    };
    match outcome {
        Ok(text) => reply(ctx, chat_id, text).await,
        Err(e) => {
            error!(user_id, err=%e, "unsubscribe failed");
            reply(ctx, chat_id, UNSUBSCRIBE_FAILED).await;
        }
    }
}

async fn reply(ctx: &BotContext, chat_id: i64, text: &str) {
    if let Err(e) = ctx.transport.send_html(chat_id, text).await {
        warn!(chat_id, err=%e, "reply failed");
    }
}

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use common_types::{PoolRecord, Topic};
use dlmm_pool_bot::handlers::{handle_message, BotContext};
use meteora_client::PoolSource;
use tg_publisher::{Chat, ChatTransport, Message, SendError, User};
use volume_store::{MemoryStore, SubscriptionStore};

struct FixedSource {
    pools: Vec<PoolRecord>,
}

#[async_trait]
impl PoolSource for FixedSource {
    async fn eligible_pools(&self) -> Vec<PoolRecord> {
        self.pools.clone()
    }
}

#[derive(Default)]
struct RecordingTransport {
    sent: std::sync::Mutex<Vec<(i64, String)>>,
}

impl RecordingTransport {
    fn messages(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_html(&self, chat_id: i64, text: &str) -> Result<(), SendError> {
        self.sent.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }
}

fn pool(address: &str, liquidity: &str) -> PoolRecord {
    PoolRecord {
        address: address.to_string(),
        name: "BOGUS-SOL".to_string(),
        bin_step: 100,
        liquidity: liquidity.to_string(),
        fees_24h: 5.0,
        trade_volume_24h: 100.0,
        apr: 0.05,
        ..Default::default()
    }
}

fn message(text: &str, username: &str) -> Message {
    Message {
        chat: Chat { id: 99 },
        from: Some(User {
            id: 7,
            username: Some(username.to_string()),
        }),
        text: Some(text.to_string()),
    }
}

struct Fixture {
    transport: Arc<RecordingTransport>,
    subs: Arc<MemoryStore>,
    ctx: BotContext,
}

fn fixture(pools: Vec<PoolRecord>) -> Fixture {
    let transport = Arc::new(RecordingTransport::default());
    let subs = Arc::new(MemoryStore::new());
    let ctx = BotContext {
        transport: transport.clone(),
        source: Arc::new(FixedSource { pools }),
        subs: subs.clone(),
        allowed_usernames: HashSet::from(["alice".to_string()]),
    };
    Fixture {
        transport,
        subs,
        ctx,
    }
}

#[tokio::test]
async fn unauthorized_users_get_a_fixed_rejection() {
    let f = fixture(vec![pool("PoolA", "5000")]);

    handle_message(&f.ctx, message("/pools", "mallory")).await;
    let messages = f.transport.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].1, "You are not authorized to use this bot.");

    // a missing username is also unauthorized
    let mut anonymous = message("/pools", "x");
    anonymous.from = None;
    handle_message(&f.ctx, anonymous).await;
    assert_eq!(
        f.transport.messages().last().unwrap().1,
        "You are not authorized to use this bot."
    );
}

#[tokio::test]
async fn allow_list_matching_is_case_insensitive() {
    let f = fixture(vec![pool("PoolA", "5000")]);
    handle_message(&f.ctx, message("/pools", "ALICE")).await;
    let messages = f.transport.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].1.contains("PoolA"));
}

#[tokio::test]
async fn pools_command_replies_with_formatted_blocks() {
    let f = fixture(vec![pool("PoolA", "9000"), pool("PoolB", "100")]);
    handle_message(&f.ctx, message("/pools", "alice")).await;

    let messages = f.transport.messages();
    assert_eq!(messages.len(), 1);
    let text = &messages[0].1;
    // default sort is liquidity descending
    assert!(text.contains("Liquidity: 9000.00"));
    assert!(text.find("PoolA").unwrap() < text.find("PoolB").unwrap());
}

#[tokio::test]
async fn results_are_capped_and_chunked() {
    let pools: Vec<PoolRecord> = (0..12).map(|i| pool(&format!("Pool{i:02}"), "5000")).collect();
    let f = fixture(pools);
    handle_message(&f.ctx, message("/pools", "alice")).await;

    let messages = f.transport.messages();
    // 10 blocks in messages of 4: 4 + 4 + 2
    assert_eq!(messages.len(), 3);
    let all: String = messages.iter().map(|(_, t)| t.as_str()).collect();
    assert!(all.contains("<b>10. "));
    assert!(!all.contains("<b>11. "));
}

#[tokio::test]
async fn filters_narrow_the_result() {
    let f = fixture(vec![pool("Big", "9000"), pool("Small", "200")]);
    handle_message(&f.ctx, message("/pools -f liquidity>5000", "alice")).await;

    let messages = f.transport.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].1.contains("Big"));
    assert!(!messages[0].1.contains("Small"));
}

#[tokio::test]
async fn unmatched_criteria_get_a_plain_reply() {
    let f = fixture(vec![pool("PoolA", "5000")]);
    handle_message(&f.ctx, message("/pools -f liquidity>999999", "alice")).await;
    assert_eq!(
        f.transport.messages()[0].1,
        "No pools found matching your criteria."
    );
}

#[tokio::test]
async fn parse_errors_are_reported_verbatim() {
    let f = fixture(vec![pool("PoolA", "5000")]);
    handle_message(&f.ctx, message("/pools -s banana", "alice")).await;
    assert!(f.transport.messages()[0].1.contains("Invalid sort field: banana"));
}

#[tokio::test]
async fn subscribe_then_partially_and_fully_unsubscribe() {
    let f = fixture(Vec::new());

    handle_message(
        &f.ctx,
        message("/subscribe newPools increasedVolume", "alice"),
    )
    .await;
    assert_eq!(f.subs.subscribers(Topic::NewPools).await.unwrap(), vec![99]);
    assert_eq!(
        f.subs.subscribers(Topic::IncreasedVolume).await.unwrap(),
        vec![99]
    );

    // flag-off update keeps the record and the other topic
    handle_message(&f.ctx, message("/unsubscribe newPools", "alice")).await;
    assert!(f.subs.subscribers(Topic::NewPools).await.unwrap().is_empty());
    assert_eq!(
        f.subs.subscribers(Topic::IncreasedVolume).await.unwrap(),
        vec![99]
    );
    assert_eq!(
        f.transport.messages().last().unwrap().1,
        "Your subscription has been updated."
    );

    // no topics removes the record entirely
    handle_message(&f.ctx, message("/unsubscribe", "alice")).await;
    assert!(f
        .subs
        .subscribers(Topic::IncreasedVolume)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        f.transport.messages().last().unwrap().1,
        "You have successfully unsubscribed from all notifications."
    );

    handle_message(&f.ctx, message("/unsubscribe", "alice")).await;
    assert_eq!(
        f.transport.messages().last().unwrap().1,
        "You were not subscribed to any notifications."
    );
}

#[tokio::test]
async fn subscribe_requires_a_topic() {
    let f = fixture(Vec::new());
    handle_message(&f.ctx, message("/subscribe", "alice")).await;
    assert!(f.transport.messages()[0].1.contains("Specify what to subscribe to"));

    handle_message(&f.ctx, message("/subscribe everything", "alice")).await;
    assert!(f
        .transport
        .messages()
        .last()
        .unwrap()
        .1
        .contains("Unknown subscription topic: everything"));
}

#[tokio::test]
async fn unknown_commands_and_plain_text_are_ignored() {
    let f = fixture(Vec::new());
    handle_message(&f.ctx, message("/frobnicate", "alice")).await;
    handle_message(&f.ctx, message("hello there", "alice")).await;
    assert!(f.transport.messages().is_empty());
}

#[tokio::test]
async fn help_is_served() {
    let f = fixture(Vec::new());
    handle_message(&f.ctx, message("/help", "alice")).await;
    assert!(f.transport.messages()[0].1.contains("Available Commands"));
}

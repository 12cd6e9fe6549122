use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One pool as returned by the DLMM pair API. Ephemeral: re-fetched every
/// cycle and never persisted as a whole. Unknown upstream fields are ignored,
/// absent ones default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolRecord {
    pub address: String,
    /// Always `"TOKEN1-TOKEN2"`.
    pub name: String,
    pub mint_x: String,
    pub mint_y: String,
    pub reserve_x: String,
    pub reserve_y: String,
    pub bin_step: u32,
    pub base_fee_percentage: String,
    pub max_fee_percentage: String,
    pub protocol_fee_percentage: String,
    /// Numeric-as-string, as the API ships it.
    pub liquidity: String,
    pub fees_24h: f64,
    pub trade_volume_24h: f64,
    pub current_price: f64,
    pub apr: f64,
    pub apy: f64,
    pub hide: bool,
}

/// Sortable pool attributes exposed to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    Fees,
    Liquidity,
    Volume,
    Apr,
}

impl SortKey {
    /// Underlying record attribute this key orders by.
    pub fn attr(self) -> &'static str {
        match self {
            SortKey::Fees => "fees_24h",
            SortKey::Liquidity => "liquidity",
            SortKey::Volume => "trade_volume_24h",
            SortKey::Apr => "apr",
        }
    }
}

/// The command parser always emits `Desc`; an explicit `Asc` supplied by a
/// caller is honored by the sort engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortField {
    pub field: SortKey,
    pub order: SortOrder,
}

impl SortField {
    pub fn desc(field: SortKey) -> Self {
        Self {
            field,
            order: SortOrder::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
}

impl FilterOp {
    pub fn holds(self, lhs: f64, rhs: f64) -> bool {
        match self {
            FilterOp::Gt => lhs > rhs,
            FilterOp::Lt => lhs < rhs,
            FilterOp::Ge => lhs >= rhs,
            FilterOp::Le => lhs <= rhs,
            FilterOp::Eq => lhs == rhs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterValue {
    Num(f64),
    /// Kept verbatim when the token value does not parse as a number.
    /// Never passes a numeric comparison.
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub op: FilterOp,
    pub value: FilterValue,
}

/// Resolved attribute name -> constraints that must all hold.
pub type FilterCriteria = BTreeMap<String, Vec<Constraint>>;

/// A parsed `/pools` request: the validated contract shared by the command
/// parser and the filter/sort engine.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolQuery {
    pub sort: Vec<SortField>,
    pub filters: FilterCriteria,
}

/// Notification streams a user can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Topic {
    NewPools,
    IncreasedVolume,
}

/// One point of a pool's bounded 24h-volume history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeEntry {
    pub ts: DateTime<Utc>,
    pub volume: f64,
}

/// One subscription per user, keyed by `user_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub user_id: i64,
    pub chat_id: i64,
    pub new_pools: bool,
    pub increased_volume: bool,
}

impl Subscription {
    pub fn empty(user_id: i64, chat_id: i64) -> Self {
        Self {
            user_id,
            chat_id,
            new_pools: false,
            increased_volume: false,
        }
    }

    pub fn has(&self, topic: Topic) -> bool {
        match topic {
            Topic::NewPools => self.new_pools,
            Topic::IncreasedVolume => self.increased_volume,
        }
    }

    pub fn set(&mut self, topic: Topic, on: bool) {
        match topic {
            Topic::NewPools => self.new_pools = on,
            Topic::IncreasedVolume => self.increased_volume = on,
        }
    }
}

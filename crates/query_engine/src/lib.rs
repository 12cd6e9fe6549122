pub mod engine;
pub mod format;
pub mod parser;

pub use engine::{filter_pools, numeric_attr, sort_pools};
pub use format::{batch_messages, format_pool, format_pools, BLOCKS_PER_MESSAGE, RESULT_CAP};
pub use parser::{parse_pools_command, parse_topics, ParseError};

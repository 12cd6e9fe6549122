pub mod bot;
pub mod config;
pub mod handlers;
pub mod help;
pub mod tracker;

pub use config::BotConfig;
pub use handlers::BotContext;
pub use tracker::VolumeTracker;

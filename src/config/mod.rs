// src/config/mod.rs
pub mod ai;
pub mod feed;

pub use ai::AiSearchConfig;
pub use feed::{
    load_feed_config_default, load_feed_config_from, FeedConfig, HnConfig, HttpConfig, Roster,
    Vocabulary,
};

pub mod cache;
pub mod client;
pub mod config;
pub mod journal;
pub mod metrics;
pub mod model;
pub mod storage;
pub mod store;
pub mod sync;

#[cfg(feature = "tui")]
pub mod tui;

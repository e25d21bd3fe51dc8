//! M3U Curator Library
//!
//! Cleans, classifies, deduplicates and groups IPTV channel entries, and
//! writes the curated channel records, playlist and run reports.

pub mod config;
pub mod errors;
pub mod generator;
pub mod models;
pub mod patterns;
pub mod pipeline;
pub mod services;
pub mod sources;
pub mod storage;
pub mod utils;

pub use errors::{AppError, AppResult};
pub use pipeline::ChannelPipeline;

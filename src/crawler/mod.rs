//! Crawler module for forum fetching and candidate selection
//!
//! This module contains the core run logic, including:
//! - Forum API access for headlines and comment trees
//! - "tl;dr" sentence extraction
//! - Forum rotation and request pacing
//! - Overall run coordination and publishing

mod collector;
mod coordinator;
mod extractor;
mod fetcher;
mod scheduler;
mod throttle;

pub use collector::{candidates_from_comments, Candidate, Crawler};
pub use coordinator::{load_forums, Bot, PublishGate};
pub use extractor::{
    extract_acceptable, extract_tldr, is_acceptable, DEFAULT_MAX_MESSAGE_CHARS, TLDR_MARKERS,
};
pub use fetcher::{build_http_client, Comment, FetchError, ForumClient, Post, RedditClient};
pub use scheduler::{resolve_forums, ForumScheduler, DEFAULT_FORUMS};
pub use throttle::Throttle;

use crate::config::Config;
use crate::publish::Credentials;
use crate::state::RunOutcome;
use crate::BotError;
use std::time::Duration;

/// Runs a complete bot pass
///
/// This is the main entry point. It will:
/// 1. Load history and the forum list from the configured files
/// 2. Crawl forums until a fresh "tl;dr" is published or the budget runs out
/// 3. Write the history back, whatever the outcome
///
/// # Arguments
///
/// * `config` - The bot configuration
/// * `credentials` - Publisher credentials
///
/// # Returns
///
/// * `Ok(RunOutcome)` - The run finished, published or not
/// * `Err(BotError)` - The bot could not start or its state was misused
pub async fn run_once(config: &Config, credentials: Credentials) -> Result<RunOutcome, BotError> {
    let mut bot = Bot::from_config(config, credentials)?;

    let result = match config.bot.run_timeout_secs {
        Some(secs) => {
            let timed = tokio::time::timeout(Duration::from_secs(secs), bot.run()).await;
            match timed {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!("Run timed out after {}s", secs);
                    Ok(RunOutcome::Exhausted {
                        forums_tried: bot.forums_tried(),
                    })
                }
            }
        }
        None => bot.run().await,
    };

    if let Err(e) = bot.flush() {
        tracing::error!(stage = "persist", "Failed to write history: {}", e);
    }

    result
}

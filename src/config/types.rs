use crate::crawler::{DEFAULT_FORUMS, DEFAULT_MAX_MESSAGE_CHARS};
use crate::storage::DEFAULT_MAX_HISTORY;
use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for tldr-bot
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bot: BotConfig,
    pub forum: ForumConfig,
    pub publisher: PublisherConfig,
    pub files: FilesConfig,
}

/// Run behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BotConfig {
    /// Maximum number of remembered published messages
    pub max_history: usize,

    /// Number of forums tried per run (defaults to the whole forum list)
    pub crawl_distance: Option<usize>,

    /// Longest sentence that may be published, in characters
    pub max_message_chars: usize,

    /// Record a candidate in history before the publish attempt, so a failed
    /// publish still marks it as seen
    pub record_failed_attempts: bool,

    /// Abandon a run that takes longer than this many seconds
    pub run_timeout_secs: Option<u64>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
            crawl_distance: None,
            max_message_chars: DEFAULT_MAX_MESSAGE_CHARS,
            record_failed_attempts: true,
            run_timeout_secs: None,
        }
    }
}

/// Forum API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ForumConfig {
    /// Base URL of the forum API
    pub api_base: String,

    /// User agent sent with every request
    pub user_agent: String,

    /// Number of headline posts fetched per forum
    pub headline_limit: u32,

    /// Request ceiling for the forum API
    pub requests_per_minute: u32,

    /// Forums crawled when no forum file is present
    pub defaults: Vec<String>,
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            api_base: "https://www.reddit.com".to_string(),
            user_agent: concat!("tldr-bot/", env!("CARGO_PKG_VERSION")).to_string(),
            headline_limit: 25,
            requests_per_minute: 30,
            defaults: DEFAULT_FORUMS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Publishing endpoint configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// Status-update endpoint
    pub endpoint: String,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.twitter.com/1.1/statuses/update.json".to_string(),
        }
    }
}

/// Locations of persisted state
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Published-message history, one per line
    pub history: PathBuf,

    /// Optional forum list, one id per line
    pub forums: PathBuf,

    /// Credential blob
    pub credentials: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            history: PathBuf::from("history.txt"),
            forums: PathBuf::from("forums.txt"),
            credentials: PathBuf::from("CREDENTIALS"),
        }
    }
}

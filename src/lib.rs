//! tldr-bot: republishes "tl;dr" summaries found in forum comments
//!
//! This crate crawls popular posts of a rotating list of forums, pulls the
//! one-sentence "tl;dr" summary out of their comments and publishes the first
//! one it has not published before, remembering what it published.

pub mod config;
pub mod crawler;
pub mod publish;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for tldr-bot operations
#[derive(Debug, Error)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No forum identifiers available")]
    NoForums,

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition {
        from: state::RunState,
        to: state::RunState,
    },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid forum identifier: {0}")]
    InvalidForum(String),
}

/// Result type alias for tldr-bot operations
pub type Result<T> = std::result::Result<T, BotError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::Bot;
pub use publish::Credentials;
pub use state::{RunOutcome, RunState};
pub use storage::HistoryStore;

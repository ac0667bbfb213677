//! Configuration module for tldr-bot
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key is optional; a missing file section falls back to built-in defaults.
//!
//! # Example
//!
//! ```no_run
//! use tldr_bot::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("tldr-bot.toml")).unwrap();
//! println!("Forums per run: {:?}", config.bot.crawl_distance);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{BotConfig, Config, FilesConfig, ForumConfig, PublisherConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
pub(crate) use validation::validate_forum_name;

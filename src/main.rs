//! tldr-bot main entry point
//!
//! This is the command-line interface for the tldr-bot republisher.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tldr_bot::config::{load_config_with_hash, validate, Config};
use tldr_bot::crawler::run_once;
use tldr_bot::storage::{FileStorage, MemoryStorage, Storage};
use tldr_bot::{Bot, Credentials, HistoryStore, RunOutcome};
use tracing_subscriber::EnvFilter;

/// tldr-bot: republishes forum "tl;dr" summaries
///
/// Each invocation crawls the popular posts of the next forums in rotation,
/// extracts one-sentence "tl;dr" summaries from their comments and publishes
/// the first one that has not been published before.
#[derive(Parser, Debug)]
#[command(name = "tldr-bot")]
#[command(version)]
#[command(about = "Republishes forum tl;dr summaries", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Override the credentials file location
    #[arg(long, value_name = "PATH")]
    credentials: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Crawl one forum and list candidates without publishing or saving
    #[arg(long, conflicts_with = "show_history")]
    dry_run: bool,

    /// Print the published-message history and exit
    #[arg(long, conflicts_with = "dry_run")]
    show_history: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = load_configuration(cli.config.as_deref())?;
    if let Some(path) = cli.credentials {
        config.files.credentials = path;
    }

    // Handle different modes
    if cli.show_history {
        handle_show_history(&config)
    } else if cli.dry_run {
        handle_dry_run(&config).await
    } else {
        handle_run(&config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tldr_bot=info,warn"),
            1 => EnvFilter::new("tldr_bot=debug,info"),
            2 => EnvFilter::new("tldr_bot=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, or the validated defaults when none is given
fn load_configuration(path: Option<&std::path::Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::info!("No configuration file given, using defaults");
        let config = Config::default();
        validate(&config)?;
        return Ok(config);
    };

    tracing::info!("Loading configuration from: {}", path.display());
    match load_config_with_hash(path) {
        Ok((config, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            Err(e).with_context(|| format!("loading {}", path.display()))
        }
    }
}

/// Reads the credential blob; a missing file leaves the bot without credentials
fn load_credentials(config: &Config) -> Credentials {
    let path = &config.files.credentials;
    match Credentials::load(path) {
        Ok(credentials) => credentials,
        Err(e) => {
            tracing::error!(
                "Failed to read credentials from {}: {}",
                path.display(),
                e
            );
            Credentials::default()
        }
    }
}

/// Handles the main run: crawl, publish at most one message, save history
async fn handle_run(config: &Config) -> anyhow::Result<()> {
    let credentials = load_credentials(config);

    match run_once(config, credentials).await {
        Ok(RunOutcome::Published { message, forum }) => {
            tracing::info!("Run complete, published from {}: {}", forum, message);
            Ok(())
        }
        Ok(RunOutcome::Exhausted { forums_tried }) => {
            tracing::info!(
                "Run complete, nothing published after {} forums",
                forums_tried
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handles the --dry-run mode: crawls one forum and lists what would be published
async fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== tldr-bot Dry Run ===\n");

    // Work on a copy of the persisted state so nothing is written back
    let files = FileStorage::new(&config.files.history, Some(config.files.forums.clone()));
    let history = files.load_history().unwrap_or_default();
    let forums = files.load_forums().unwrap_or_default();
    let storage = MemoryStorage::with_contents(history, forums);

    let mut bot = Bot::with_storage(config, Credentials::default(), Box::new(storage))?;

    println!("Forums ({}):", bot.scheduler().len());
    for forum in bot.scheduler().forums() {
        println!("  - {}", forum);
    }
    println!("Forums per run: {}", bot.crawl_distance());
    println!(
        "History: {}/{} entries\n",
        bot.history().len(),
        bot.history().max_history()
    );

    let forum = bot.scheduler().peek().to_string();
    let candidates = bot.crawl().await?.to_vec();

    println!("Candidates from {} ({}):", forum, candidates.len());
    for candidate in &candidates {
        let marker = if bot.history().contains(&candidate.content) {
            "seen"
        } else {
            "new "
        };
        println!("  [{}] {} ({})", marker, candidate.content, candidate.author);
    }

    match candidates
        .iter()
        .find(|c| !bot.history().contains(&c.content))
    {
        Some(candidate) => println!("\n✓ Would publish: {}", candidate.content),
        None => println!("\n✓ Nothing new to publish from {}", forum),
    }

    Ok(())
}

/// Handles the --show-history mode: prints remembered messages, most recent first
fn handle_show_history(config: &Config) -> anyhow::Result<()> {
    let storage = FileStorage::new(&config.files.history, None);
    let history = HistoryStore::load(config.bot.max_history, &storage);

    println!(
        "History: {} ({}/{} entries)\n",
        config.files.history.display(),
        history.len(),
        history.max_history()
    );
    for (i, message) in history.iter().enumerate() {
        println!("{:4}. {}", i + 1, message);
    }

    Ok(())
}

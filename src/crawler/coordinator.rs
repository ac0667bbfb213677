//! Bot coordinator - main run orchestration logic
//!
//! This module contains the run loop that ties everything together:
//! - Initializing history, forum rotation and collaborators
//! - Crawling the next forum for candidates
//! - Gating candidates through the history and publishing the first fresh one
//! - Advancing through forums until something is published or the budget runs out
//! - Persisting history

use crate::config::{validate_forum_name, BotConfig, Config};
use crate::crawler::collector::{Candidate, Crawler};
use crate::crawler::fetcher::RedditClient;
use crate::crawler::scheduler::{resolve_forums, ForumScheduler};
use crate::crawler::throttle::Throttle;
use crate::publish::{Credentials, HttpPublisher, Publisher};
use crate::state::{RunOutcome, RunState};
use crate::storage::{FileStorage, HistoryStore, Storage};
use crate::BotError;
use std::collections::HashSet;
use std::sync::Arc;

/// When a candidate is recorded in history relative to its publish attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishGate {
    /// Record first, then publish; a failed publish still burns the candidate
    BeforePublish,

    /// Record only after a successful publish
    AfterSuccess,
}

impl PublishGate {
    fn from_config(config: &BotConfig) -> Self {
        if config.record_failed_attempts {
            Self::BeforePublish
        } else {
            Self::AfterSuccess
        }
    }
}

/// Main bot structure
///
/// Owns all run state: the history, the forum cursor and the candidates of
/// the forum currently being worked on.
pub struct Bot {
    config: BotConfig,
    gate: PublishGate,
    scheduler: ForumScheduler,
    history: HistoryStore,
    storage: Box<dyn Storage>,
    crawler: Crawler,
    publisher: Arc<dyn Publisher>,
    credentials: Credentials,
    state: RunState,
    pending: Vec<Candidate>,
    attempted: HashSet<String>,
    current_forum: Option<String>,
    forums_tried: usize,
}

impl Bot {
    /// Creates a new bot instance
    ///
    /// # Arguments
    ///
    /// * `config` - Run behavior configuration
    /// * `forums` - Forum rotation, in crawl order
    /// * `storage` - Where history is loaded from and persisted to
    /// * `crawler` - Fetch-and-extract collaborator
    /// * `publisher` - Publishing collaborator
    /// * `credentials` - Opaque blob handed to the publisher
    ///
    /// # Returns
    ///
    /// * `Ok(Bot)` - Bot ready to run
    /// * `Err(BotError::NoForums)` - The forum list was empty
    pub fn new(
        config: &BotConfig,
        forums: Vec<String>,
        storage: Box<dyn Storage>,
        crawler: Crawler,
        publisher: Arc<dyn Publisher>,
        credentials: Credentials,
    ) -> Result<Self, BotError> {
        let scheduler = ForumScheduler::new(forums)?;
        let history = HistoryStore::load(config.max_history, storage.as_ref());

        if credentials.is_empty() {
            tracing::warn!("Credentials are empty; every publish attempt will fail");
        }

        tracing::info!(
            "Bot initialized with {} forums, {} history entries",
            scheduler.len(),
            history.len()
        );

        Ok(Self {
            config: config.clone(),
            gate: PublishGate::from_config(config),
            scheduler,
            history,
            storage,
            crawler,
            publisher,
            credentials,
            state: RunState::Idle,
            pending: Vec::new(),
            attempted: HashSet::new(),
            current_forum: None,
            forums_tried: 0,
        })
    }

    /// Creates a bot wired to the real forum API, publisher and files
    pub fn from_config(config: &Config, credentials: Credentials) -> Result<Self, BotError> {
        let storage = FileStorage::new(&config.files.history, Some(config.files.forums.clone()));
        Self::with_storage(config, credentials, Box::new(storage))
    }

    /// Creates a bot wired to the real forum API and publisher, keeping
    /// state in the given storage
    pub fn with_storage(
        config: &Config,
        credentials: Credentials,
        storage: Box<dyn Storage>,
    ) -> Result<Self, BotError> {
        let forums = load_forums(storage.as_ref(), &config.forum.defaults);

        let client = RedditClient::new(&config.forum)?;
        let throttle = Arc::new(Throttle::per_minute(config.forum.requests_per_minute));
        let crawler = Crawler::new(Arc::new(client), throttle, config.bot.max_message_chars);
        let publisher = HttpPublisher::new(&config.publisher, &config.forum.user_agent)?;

        Self::new(
            &config.bot,
            forums,
            storage,
            crawler,
            Arc::new(publisher),
            credentials,
        )
    }

    /// Executes one complete run
    ///
    /// Forums are crawled one after another until a candidate is published
    /// or `crawl-distance` forums have been tried. An exhausted budget is a
    /// normal outcome, not an error.
    pub async fn run(&mut self) -> Result<RunOutcome, BotError> {
        if self.state != RunState::Idle && !self.state.is_terminal() {
            tracing::warn!("Discarding unfinished run in state {}", self.state);
            self.state = RunState::Idle;
        }

        let distance = self.crawl_distance();
        tracing::info!("Starting run over up to {} forums", distance);

        loop {
            self.crawl().await?;

            if let Some(message) = self.tweet().await? {
                let forum = self.current_forum.clone().unwrap_or_default();
                return Ok(RunOutcome::Published { message, forum });
            }

            if self.forums_tried >= distance {
                self.transition(RunState::Done(false))?;
                tracing::info!(
                    "Nothing published after trying {} forums",
                    self.forums_tried
                );
                return Ok(RunOutcome::Exhausted {
                    forums_tried: self.forums_tried,
                });
            }
        }
    }

    /// Crawls the next forum and queues its candidates
    ///
    /// Starting from an idle or finished bot begins a new run: the history
    /// is batch-evicted if full and the forum budget resets.
    pub async fn crawl(&mut self) -> Result<&[Candidate], BotError> {
        if self.state == RunState::Idle || self.state.is_terminal() {
            self.begin_run();
        }

        self.transition(RunState::CrawlingForum(self.forums_tried))?;
        let forum = self.scheduler.next_forum().to_string();
        self.forums_tried += 1;

        tracing::info!(
            "Crawling forum {} ({}/{})",
            forum,
            self.forums_tried,
            self.crawl_distance()
        );

        let candidates = self.crawler.collect_candidates(&forum).await;

        self.transition(RunState::Extracting)?;
        self.pending = candidates;
        self.current_forum = Some(forum);
        Ok(&self.pending)
    }

    /// Publishes the first fresh candidate from the last crawl
    ///
    /// # Returns
    ///
    /// * `Ok(Some(message))` - A message was published and recorded
    /// * `Ok(None)` - No candidate could be published
    pub async fn tweet(&mut self) -> Result<Option<String>, BotError> {
        self.transition(RunState::Publishing)?;

        let forum = self.current_forum.clone().unwrap_or_default();
        let candidates = std::mem::take(&mut self.pending);

        for candidate in candidates {
            let message = candidate.content;

            let fresh = match self.gate {
                PublishGate::BeforePublish => self.history.try_add(&message),
                PublishGate::AfterSuccess => {
                    !self.history.contains(&message) && self.attempted.insert(message.clone())
                }
            };
            if !fresh {
                tracing::debug!("Skipping already seen candidate: {}", message);
                continue;
            }

            tracing::info!("Publishing candidate by {}: {}", candidate.author, message);
            match self.publisher.publish(&message, &self.credentials).await {
                Ok(()) => {
                    if self.gate == PublishGate::AfterSuccess {
                        self.history.try_add(&message);
                    }
                    self.persist_history();
                    self.transition(RunState::Done(true))?;
                    tracing::info!(forum = %forum, "Published: {}", message);
                    return Ok(Some(message));
                }
                Err(e) => {
                    tracing::warn!(
                        forum = %forum,
                        stage = "publish",
                        error = %e,
                        "Publish failed, trying next candidate"
                    );
                }
            }
        }

        self.transition(RunState::Advancing)?;
        Ok(None)
    }

    /// Writes the history to storage
    ///
    /// Called at the end of the process whatever the run outcome, so
    /// candidates burned by failed publishes are remembered too.
    pub fn flush(&mut self) -> Result<(), BotError> {
        self.history.persist(self.storage.as_mut())?;
        tracing::debug!("Flushed {} history entries", self.history.len());
        Ok(())
    }

    /// Number of forums tried per run
    pub fn crawl_distance(&self) -> usize {
        self.config
            .crawl_distance
            .unwrap_or_else(|| self.scheduler.len())
    }

    /// The published-message history
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// The forum rotation
    pub fn scheduler(&self) -> &ForumScheduler {
        &self.scheduler
    }

    /// The current run state
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Forums crawled so far in the current run
    pub fn forums_tried(&self) -> usize {
        self.forums_tried
    }

    /// Candidates from the last crawl not yet offered to the publisher
    pub fn pending(&self) -> &[Candidate] {
        &self.pending
    }

    /// Resets per-run state and applies history eviction
    fn begin_run(&mut self) {
        self.state = RunState::Idle;
        self.forums_tried = 0;
        self.pending.clear();
        self.attempted.clear();
        self.current_forum = None;

        let evicted = self.history.evict_if_full();
        if evicted > 0 {
            tracing::info!("Evicted {} oldest history entries", evicted);
        }
    }

    /// Persists history after a publish; failures are logged, never fatal
    fn persist_history(&mut self) {
        if let Err(e) = self.history.persist(self.storage.as_mut()) {
            tracing::error!(
                stage = "persist",
                "Failed to persist history, keeping in-memory state: {}",
                e
            );
        }
    }

    /// Moves to `next`, rejecting illegal transitions
    fn transition(&mut self, next: RunState) -> Result<(), BotError> {
        if !self.state.can_transition_to(next) {
            return Err(BotError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        tracing::trace!("Run state {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }
}

/// Loads the forum list from storage, falling back to `defaults`
///
/// Unreadable forum files and invalid forum names are logged and skipped.
pub fn load_forums(storage: &dyn Storage, defaults: &[String]) -> Vec<String> {
    let loaded = match storage.load_forums() {
        Ok(forums) => forums,
        Err(e) => {
            tracing::warn!("Could not read forum list: {}", e);
            Vec::new()
        }
    };

    let valid = loaded
        .into_iter()
        .filter(|forum| match validate_forum_name(forum) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Ignoring forum list entry: {}", e);
                false
            }
        })
        .collect();

    resolve_forums(valid, defaults)
}

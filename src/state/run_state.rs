/// Run state definitions for tracking a crawl-and-publish run
///
/// This module defines every state the bot passes through during one run and
/// which transitions between them are legal.
use std::fmt;

/// Represents the current stage of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RunState {
    /// No run in progress
    #[default]
    Idle,

    /// Fetching headlines and comments for the n-th forum of this run
    CrawlingForum(usize),

    /// Running the extractor over fetched comments
    Extracting,

    /// Offering candidates to the publisher
    Publishing,

    /// Nothing published from the current forum; moving to the next
    Advancing,

    /// Run finished; `true` if a message was published
    Done(bool),
}

impl RunState {
    /// Returns true if the run has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    /// Returns true if the run finished with a published message
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Done(true))
    }

    /// Checks whether moving from `self` to `next` is legal
    pub fn can_transition_to(&self, next: RunState) -> bool {
        match (self, next) {
            (Self::Idle, Self::CrawlingForum(0)) => true,
            (Self::CrawlingForum(_), Self::Extracting) => true,
            (Self::Extracting, Self::Publishing) => true,
            (Self::Publishing, Self::Done(_)) => true,
            (Self::Publishing, Self::Advancing) => true,
            (Self::Advancing, Self::CrawlingForum(_)) => true,
            (Self::Advancing, Self::Done(false)) => true,
            (Self::Done(_), Self::Idle) => true,
            _ => false,
        }
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::CrawlingForum(_) => "crawling",
            Self::Extracting => "extracting",
            Self::Publishing => "publishing",
            Self::Advancing => "advancing",
            Self::Done(_) => "done",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CrawlingForum(n) => write!(f, "crawling({})", n),
            Self::Done(published) => write!(f, "done({})", published),
            other => write!(f, "{}", other.name()),
        }
    }
}

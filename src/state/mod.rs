//! State module for tracking run progress
//!
//! # Components
//!
//! - `RunState`: the stage a run is in (crawling, extracting, publishing, done)
//! - `RunOutcome`: how a finished run ended

mod run_state;

pub use run_state::RunState;

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// A message was published and recorded
    Published { message: String, forum: String },

    /// Every forum in the budget was tried without publishing anything
    Exhausted { forums_tried: usize },
}

impl RunOutcome {
    /// Returns true if a message was published
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Published { .. })
    }

    /// The terminal run state for this outcome
    pub fn as_state(&self) -> RunState {
        RunState::Done(self.is_success())
    }
}

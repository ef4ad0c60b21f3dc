//! Per-session conversation state.
//!
//! A [`SessionStore`] owns the transcript, the active model and the usage
//! counters of one chat session. Nothing here is shared between sessions.

use crate::error::Result;
use crate::observability::MODEL_SWITCHES;
use crate::types::{KnownModel, ModelDescriptor, Turn, UsageCounters};

/// Transcript, active model and usage counters for one session.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    transcript: Vec<Turn>,
    model: KnownModel,
    usage: UsageCounters,
}

impl SessionStore {
    /// Creates an empty store using `model`.
    pub fn new(model: KnownModel) -> Self {
        Self {
            transcript: Vec::new(),
            model,
            usage: UsageCounters::default(),
        }
    }

    /// Appends a turn to the transcript.
    pub fn append_turn(&mut self, turn: Turn) {
        self.transcript.push(turn);
    }

    /// Clears the transcript and zeroes the usage counters.
    ///
    /// The active model is left as is.
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.usage = UsageCounters::default();
    }

    /// Makes `id` the active model.
    ///
    /// Switching to a different model resets the session because context is
    /// not carried across models. Returns `Ok(true)` if the model changed and
    /// `Ok(false)` if `id` was already active.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownModel`](crate::Error::UnknownModel) if `id` is
    /// not registered; the store is left untouched.
    pub fn select_model(&mut self, id: &str) -> Result<bool> {
        let model: KnownModel = id.parse()?;
        if model == self.model {
            return Ok(false);
        }
        self.reset();
        self.model = model;
        MODEL_SWITCHES.click();
        Ok(true)
    }

    /// Records one completed round that cost an estimated `tokens`.
    pub fn record_usage(&mut self, tokens: u64) {
        self.usage = self.usage + UsageCounters::new(tokens, 1);
    }

    /// The transcript, oldest turn first.
    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    /// The active model.
    pub fn model(&self) -> KnownModel {
        self.model
    }

    /// Registry entry of the active model.
    pub fn active_model(&self) -> &'static ModelDescriptor {
        self.model.descriptor()
    }

    /// A snapshot of the usage counters.
    pub fn usage(&self) -> UsageCounters {
        self.usage
    }

    /// Number of turns in the transcript.
    pub fn message_count(&self) -> usize {
        self.transcript.len()
    }

    /// Number of user messages that received a reply.
    pub fn messages_sent(&self) -> usize {
        self.transcript.len() / 2
    }
}

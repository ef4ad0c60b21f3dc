//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns the conversation
//! state and drives one streamed request/response round at a time.

use std::fmt;
use std::time::Instant;

use futures::StreamExt;

use crate::chat::store::SessionStore;
use crate::error::{Error, Result};
use crate::observability::{
    ROUND_DURATION, ROUND_FIRST_FRAGMENT, ROUND_FRAGMENTS, ROUNDS_COMPLETED, ROUNDS_FAILED,
};
use crate::render::Renderer;
use crate::service::CompletionService;
use crate::types::{
    CompletionRequest, KnownModel, ModelDescriptor, Turn, UsageCounters, estimate_round_tokens,
};

/// Label shown above streamed replies.
pub const ASSISTANT_LABEL: &str = "Assistant";

/// Where a session is within its current round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    /// No round has run, or the next one has not started.
    Idle,
    /// The user turn is in the transcript; the service has not been called.
    UserAppended,
    /// Fragments are being consumed.
    Streaming,
    /// The last round ran to the end of its stream.
    Completed,
    /// The last round ended with a service error.
    Failed,
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// The active model.
    pub model: &'static ModelDescriptor,
    /// The number of turns in the conversation.
    pub message_count: usize,
    /// The number of user messages that received a reply.
    pub messages_sent: usize,
    /// Estimated tokens used so far.
    pub total_tokens_used: u64,
    /// Completed rounds, including failed ones.
    pub conversation_count: u64,
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Messages sent: {}", self.messages_sent)?;
        writeln!(f, "Tokens used (estimated): {}", self.total_tokens_used)?;
        writeln!(f, "Rounds: {}", self.conversation_count)?;
        writeln!(f, "Model provider: {}", self.model.developer)?;
        writeln!(f, "Model: {}", self.model.display_name)?;
        write!(f, "Messages: {}", self.message_count)
    }
}

/// A chat session that manages conversation state and completion rounds.
pub struct ChatSession<S: CompletionService> {
    service: S,
    store: SessionStore,
    state: RoundState,
}

impl<S: CompletionService> ChatSession<S> {
    /// Creates a new chat session that uses the default model.
    pub fn new(service: S) -> Self {
        Self::with_model(service, KnownModel::default())
    }

    /// Creates a new chat session that starts on `model`.
    pub fn with_model(service: S, model: KnownModel) -> Self {
        Self {
            service,
            store: SessionStore::new(model),
            state: RoundState::Idle,
        }
    }

    /// Sends a user message and streams the response.
    ///
    /// This method:
    /// 1. Adds the user message to history
    /// 2. Sends the whole transcript to the service
    /// 3. Renders fragments as they arrive while accumulating them
    /// 4. Records usage and adds the assistant turn to history
    ///
    /// Word counts of the prompt and reply stand in for the token cost.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an empty prompt and
    /// [`Error::InvalidBound`] for a bound outside `[512, max_tokens]`; in
    /// both cases the session is unchanged. If the service fails, whatever
    /// text arrived before the failure is appended as the assistant turn, the
    /// round is counted with no token cost, and the service error is returned.
    pub async fn submit(
        &mut self,
        prompt: &str,
        bound: u32,
        renderer: &mut dyn Renderer,
    ) -> Result<Turn> {
        self.state = RoundState::Idle;
        if prompt.trim().is_empty() {
            return Err(Error::validation(
                "prompt must not be empty",
                Some("prompt".to_string()),
            ));
        }
        let descriptor = self.store.active_model();
        if !descriptor.accepts_bound(bound) {
            let (min, max) = descriptor.bound_range();
            return Err(Error::invalid_bound(bound, min, max));
        }

        let start = Instant::now();
        self.store.append_turn(Turn::user(prompt));
        self.state = RoundState::UserAppended;

        let request =
            CompletionRequest::streaming(self.store.model(), self.store.transcript(), bound);
        let mut full_response = String::new();
        let outcome = self
            .stream_into(request, &mut full_response, renderer, start)
            .await;
        renderer.finish_response();
        ROUND_DURATION.add(start.elapsed().as_secs_f64());

        let turn = Turn::assistant(full_response);
        match outcome {
            Ok(()) => {
                self.store
                    .record_usage(estimate_round_tokens(prompt, turn.content()));
                self.store.append_turn(turn.clone());
                self.state = RoundState::Completed;
                ROUNDS_COMPLETED.click();
                Ok(turn)
            }
            Err(err) => {
                self.store.record_usage(0);
                self.store.append_turn(turn);
                self.state = RoundState::Failed;
                ROUNDS_FAILED.click();
                Err(err)
            }
        }
    }

    async fn stream_into(
        &mut self,
        request: CompletionRequest,
        full_response: &mut String,
        renderer: &mut dyn Renderer,
        start: Instant,
    ) -> Result<()> {
        renderer.print_status("thinking...");
        let mut fragments = self.service.stream(request).await?;
        self.state = RoundState::Streaming;
        renderer.start_response(ASSISTANT_LABEL);

        let mut count = 0u64;
        let result = loop {
            match fragments.next().await {
                Some(Ok(fragment)) => {
                    if count == 0 {
                        ROUND_FIRST_FRAGMENT.add(start.elapsed().as_secs_f64());
                    }
                    count += 1;
                    renderer.print_text(&fragment);
                    full_response.push_str(&fragment);
                }
                Some(Err(err)) => break Err(err),
                None => break Ok(()),
            }
        };
        ROUND_FRAGMENTS.add(count as f64);
        result
    }

    /// Clears the conversation history and usage counters.
    pub fn clear(&mut self) {
        self.store.reset();
        self.state = RoundState::Idle;
    }

    /// Changes the model used for responses.
    ///
    /// See [`SessionStore::select_model`].
    pub fn select_model(&mut self, id: &str) -> Result<bool> {
        let changed = self.store.select_model(id)?;
        if changed {
            self.state = RoundState::Idle;
        }
        Ok(changed)
    }

    /// Returns the current model.
    pub fn model(&self) -> KnownModel {
        self.store.model()
    }

    /// Returns the registry entry of the current model.
    pub fn active_model(&self) -> &'static ModelDescriptor {
        self.store.active_model()
    }

    /// Returns the transcript, oldest turn first.
    pub fn transcript(&self) -> &[Turn] {
        self.store.transcript()
    }

    /// Returns the number of turns in the conversation.
    pub fn message_count(&self) -> usize {
        self.store.message_count()
    }

    /// Returns a snapshot of the usage counters.
    pub fn usage(&self) -> UsageCounters {
        self.store.usage()
    }

    /// Returns where the session is within its current round.
    pub fn round_state(&self) -> RoundState {
        self.state
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        let usage = self.store.usage();
        SessionStats {
            model: self.store.active_model(),
            message_count: self.store.message_count(),
            messages_sent: self.store.messages_sent(),
            total_tokens_used: usage.total_tokens_used,
            conversation_count: usage.conversation_count,
        }
    }
}

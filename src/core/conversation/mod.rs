//! Conversation state machine.
//!
//! ```text
//! Init --mount ok--> Ready --submit--> Pending --settle--> Ready
//!   \
//!    --mount failed--> Degraded (absorbing)
//! ```
//!
//! The `Pending` state is the single-flight gate: while an exchange is in
//! flight every further submission is ignored. User messages are appended
//! optimistically at submit time and never rolled back; a failed exchange is
//! answered with a fixed apology instead.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::core::constants::{FALLBACK_REPLY, GREETING};
use crate::core::error::ConfigurationError;
use crate::core::exchange::{exchange, ExchangeOutcome};
use crate::core::message::Message;
use crate::core::session::{ChatSession, SessionFactory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationState {
    /// No session yet.
    Init,
    /// Session live, waiting for input.
    Ready,
    /// An exchange is in flight.
    Pending,
    /// Session creation failed; input stays disabled.
    Degraded,
}

/// An exchange that has been accepted by the state machine but not yet run.
///
/// Owns everything it needs so it can be moved onto another task.
pub struct PendingExchange {
    session: Arc<dyn ChatSession>,
    text: String,
}

impl PendingExchange {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub async fn run(self) -> ExchangeOutcome {
        exchange(&*self.session, &self.text).await
    }
}

pub struct Conversation {
    state: ConversationState,
    messages: Vec<Message>,
    session: Option<Arc<dyn ChatSession>>,
    configuration_error: Option<ConfigurationError>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            state: ConversationState::Init,
            messages: Vec::new(),
            session: None,
            configuration_error: None,
        }
    }

    /// Create the remote session. Only meaningful once, from `Init`; later
    /// calls are ignored so the server-side history is never discarded.
    pub fn mount<F>(&mut self, factory: &F)
    where
        F: SessionFactory + ?Sized,
    {
        if self.state != ConversationState::Init {
            debug!(state = ?self.state, "ignoring mount outside Init");
            return;
        }

        match factory.create_session() {
            Ok(session) => {
                self.session = Some(session);
                self.messages.push(Message::bot(GREETING, Vec::new()));
                self.state = ConversationState::Ready;
                info!("conversation ready");
            }
            Err(err) => {
                warn!(error = %err, "chat session could not be created");
                self.configuration_error = Some(err);
                self.state = ConversationState::Degraded;
            }
        }
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.state == ConversationState::Pending
    }

    pub fn is_degraded(&self) -> bool {
        self.state == ConversationState::Degraded
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn configuration_error(&self) -> Option<&ConfigurationError> {
        self.configuration_error.as_ref()
    }

    /// Whether the input control should accept typing at all.
    pub fn input_enabled(&self) -> bool {
        self.state == ConversationState::Ready
    }

    /// Whether the submit control should be enabled for `input`.
    pub fn can_submit(&self, input: &str) -> bool {
        self.input_enabled() && !input.trim().is_empty()
    }

    /// Accept a user utterance.
    ///
    /// Returns `None` and changes nothing unless the conversation is `Ready`
    /// and `input` has non-whitespace content. Otherwise the user message is
    /// appended immediately and the returned exchange must be run and its
    /// outcome passed to [`Conversation::settle`].
    pub fn submit(&mut self, input: &str) -> Option<PendingExchange> {
        if !self.can_submit(input) {
            debug!(state = ?self.state, "submission ignored");
            return None;
        }
        let session = self.session.clone()?;

        let text = input.trim().to_string();
        self.messages.push(Message::user(text.clone()));
        self.state = ConversationState::Pending;

        Some(PendingExchange { session, text })
    }

    /// Record the result of the in-flight exchange and return to `Ready`.
    pub fn settle(&mut self, outcome: ExchangeOutcome) {
        if self.state != ConversationState::Pending {
            debug!(state = ?self.state, "ignoring exchange outcome outside Pending");
            return;
        }

        let message = match outcome {
            Ok(reply) => Message::bot(reply.text, reply.sources),
            Err(_) => Message::bot(FALLBACK_REPLY, Vec::new()),
        };
        self.messages.push(message);
        self.state = ConversationState::Ready;
    }

    /// Submit, await, and settle in one step. Returns `false` when the
    /// submission was ignored.
    pub async fn send(&mut self, input: &str) -> bool {
        let Some(pending) = self.submit(input) else {
            return false;
        };
        let outcome = pending.run().await;
        self.settle(outcome);
        true
    }

    /// Most recent message, if any.
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

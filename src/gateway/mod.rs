//! Participant gateway: how the referee asks participants for decisions.
//!
//! The referee only ever talks to participants through [`ParticipantGateway`].
//! Three transports ship with the crate:
//!
//! - [`HttpGateway`] posts the question as JSON to the participant's address
//! - [`LlmGateway`] turns the question into a prompt for an LLM
//! - [`ScriptedGateway`] replays canned decisions, for tests and simulation

mod http;
mod llm;
mod question;
mod retry;
mod scripted;

pub use http::HttpGateway;
pub use llm::{LlmGateway, parse_decision};
pub use question::{Decision, Question, QuestionKind, RoundContext};
pub use retry::{RetryPolicy, ask_with_retry};
pub use scripted::{Scripted, ScriptedGateway};

use async_trait::async_trait;
use derive_more::{Display, Error};
use tracing::instrument;
use werewolf_core::Participant;

/// Transport-agnostic channel for asking one participant one question.
#[async_trait]
pub trait ParticipantGateway: Send + Sync {
    /// Asks `participant` and waits for their decision.
    ///
    /// Implementations do not enforce timeouts; [`ask_with_retry`] does.
    async fn ask(&self, participant: &Participant, question: &Question) -> Result<Decision, GatewayError>;
}

/// Category of gateway failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum GatewayErrorKind {
    /// No answer within the decision timeout.
    #[display("timeout")]
    Timeout,
    /// An answer arrived but could not be understood or has the wrong shape.
    #[display("malformed")]
    Malformed,
    /// The participant could not be reached.
    #[display("transport")]
    Transport,
}

/// Gateway error with caller location.
#[derive(Debug, Clone, Display, Error)]
#[display("Gateway error ({}): {} at {}:{}", kind, message, file, line)]
pub struct GatewayError {
    /// Failure category.
    pub kind: GatewayErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl GatewayError {
    /// Creates a new gateway error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: GatewayErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Creates a timeout error.
    #[track_caller]
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Timeout, message)
    }

    /// Creates a malformed-answer error.
    #[track_caller]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Malformed, message)
    }

    /// Creates a transport error.
    #[track_caller]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(GatewayErrorKind::Transport, message)
    }
}

//! Gateway that lets an LLM play a participant.

use super::{Decision, GatewayError, ParticipantGateway, Question, QuestionKind};
use crate::llm_client::{Completion, LlmClient};
use crate::prompts;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};
use werewolf_core::{Participant, ParticipantId};

#[derive(Debug, Deserialize)]
struct TargetReply {
    player_id: ParticipantId,
    #[serde(default)]
    reason: String,
}

#[derive(Debug, Deserialize)]
struct BidReply {
    amount: i64,
    #[serde(default)]
    reason: String,
}

#[derive(Debug, Deserialize)]
struct MessageReply {
    message: String,
}

/// Cuts the body out of a Markdown code fence, if the reply has one.
fn unfence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(open) = trimmed.find("```") else {
        return trimmed;
    };
    let after_marker = &trimmed[open + 3..];
    // Skip the language tag, if any.
    let body_start = after_marker.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_marker[body_start..];
    body.find("```").map(|close| &body[..close]).unwrap_or(body).trim()
}

/// Parses an LLM reply into the decision shape `kind` expects.
///
/// Accepts bare JSON or JSON wrapped in a Markdown code fence. A discussion
/// reply that is not JSON is taken verbatim.
///
/// # Errors
///
/// Returns a malformed [`GatewayError`] if the reply cannot be read.
pub fn parse_decision(kind: QuestionKind, reply: &str) -> Result<Decision, GatewayError> {
    let body = unfence(reply);
    let malformed = |e: serde_json::Error| GatewayError::malformed(format!("{}: {}", e, reply));

    match kind {
        QuestionKind::Protect | QuestionKind::Eliminate | QuestionKind::Investigate | QuestionKind::Vote => {
            let parsed: TargetReply = serde_json::from_str(body).map_err(malformed)?;
            Ok(Decision::Target {
                target: parsed.player_id,
                rationale: parsed.reason,
            })
        }
        QuestionKind::Bid => {
            let parsed: BidReply = serde_json::from_str(body).map_err(malformed)?;
            Ok(Decision::Bid {
                amount: parsed.amount,
                rationale: parsed.reason,
            })
        }
        QuestionKind::Speak => match serde_json::from_str::<MessageReply>(body) {
            Ok(parsed) => Ok(Decision::message(parsed.message)),
            Err(_) if !body.is_empty() && !body.starts_with('{') => Ok(Decision::message(body)),
            Err(e) => Err(malformed(e)),
        },
    }
}

/// Prompts an LLM for every decision.
#[derive(Debug, Clone)]
pub struct LlmGateway<C = LlmClient> {
    client: C,
}

impl<C: Completion> LlmGateway<C> {
    /// Creates a gateway backed by `client`.
    pub fn new(client: C) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C: Completion> ParticipantGateway for LlmGateway<C> {
    #[instrument(skip(self, participant, question), fields(participant = %participant.id(), kind = %question.kind()))]
    async fn ask(&self, participant: &Participant, question: &Question) -> Result<Decision, GatewayError> {
        let system = prompts::system_prompt(question);
        let user = prompts::user_message(question);

        let reply = self
            .client
            .complete(&system, &user)
            .await
            .map_err(|e| GatewayError::transport(e.message))?;
        debug!(reply_length = reply.len(), "LLM replied");

        parse_decision(question.kind(), &reply)
    }
}

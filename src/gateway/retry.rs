//! Decision timeout and bounded retry.

use super::{Decision, GatewayError, ParticipantGateway, Question};
use derive_getters::Getters;
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use werewolf_core::Participant;

/// How long to wait for a decision, and how often to ask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct RetryPolicy {
    /// Total attempts per decision, at least 1.
    attempts: u32,
    /// Per-attempt decision timeout.
    timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Asks a participant, retrying timeouts and malformed answers.
///
/// Each attempt is bounded by the policy's timeout. An answer whose shape
/// does not fit the question kind counts as malformed. Returns the last
/// error once every attempt failed.
#[instrument(
    skip(gateway, participant, question, policy),
    fields(participant = %participant.id(), kind = %question.kind())
)]
pub async fn ask_with_retry(
    gateway: &dyn ParticipantGateway,
    participant: &Participant,
    question: &Question,
    policy: &RetryPolicy,
) -> Result<Decision, GatewayError> {
    let attempts = policy.attempts.max(1);
    let mut last_error = GatewayError::transport("no attempt made");

    for attempt in 1..=attempts {
        let outcome = match tokio::time::timeout(policy.timeout, gateway.ask(participant, question)).await {
            Ok(Ok(decision)) if question.kind().accepts(&decision) => {
                debug!(attempt, "Decision received");
                return Ok(decision);
            }
            Ok(Ok(decision)) => GatewayError::malformed(format!(
                "expected an answer to a {} question, got {:?}",
                question.kind(),
                decision
            )),
            Ok(Err(e)) => e,
            Err(_) => GatewayError::timeout(format!(
                "no decision within {}ms",
                policy.timeout.as_millis()
            )),
        };
        warn!(attempt, attempts, error = %outcome, "Decision attempt failed");
        last_error = outcome;
    }

    Err(last_error)
}

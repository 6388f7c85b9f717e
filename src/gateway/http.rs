//! Gateway that posts questions to remote participant agents.

use super::{Decision, GatewayError, ParticipantGateway, Question};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, instrument};
use werewolf_core::{Participant, ParticipantId, Role};

/// Body posted to a participant's address.
#[derive(Debug, Serialize)]
struct Envelope<'a> {
    participant: &'a ParticipantId,
    role: Role,
    question: &'a Question,
}

/// Posts each question as JSON to the participant's address and reads a
/// [`Decision`] back.
#[derive(Debug, Clone, Default)]
pub struct HttpGateway {
    client: reqwest::Client,
}

impl HttpGateway {
    /// Creates a gateway with a fresh HTTP client.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ParticipantGateway for HttpGateway {
    #[instrument(skip(self, participant, question), fields(participant = %participant.id(), url = %participant.address(), kind = %question.kind()))]
    async fn ask(&self, participant: &Participant, question: &Question) -> Result<Decision, GatewayError> {
        let envelope = Envelope {
            participant: participant.id(),
            role: *participant.role(),
            question,
        };

        let response = self
            .client
            .post(participant.address())
            .json(&envelope)
            .send()
            .await
            .map_err(|e| GatewayError::transport(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::transport(format!("participant answered {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::transport(format!("failed to read body: {}", e)))?;
        debug!(body_length = body.len(), "Decision body received");

        serde_json::from_str(&body)
            .map_err(|e| GatewayError::malformed(format!("undecodable decision: {}", e)))
    }
}

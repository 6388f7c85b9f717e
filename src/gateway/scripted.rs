//! Deterministic gateway for tests and offline simulation.

use super::{Decision, GatewayError, GatewayErrorKind, ParticipantGateway, Question, QuestionKind};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, instrument};
use werewolf_core::{Participant, ParticipantId};

/// One scripted reaction.
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Answer with this decision.
    Answer(Decision),
    /// Fail with this error kind.
    Fail(GatewayErrorKind),
    /// Sleep, then answer with the fallback.
    Stall(Duration),
}

type Key = (ParticipantId, QuestionKind);

/// Replays scripted reactions per participant and question kind.
///
/// Once a queue runs dry, or for questions never scripted, the gateway plays
/// a fixed fallback strategy derived from the question context. With the
/// fallback disabled those questions fail with a transport error instead.
#[derive(Debug)]
pub struct ScriptedGateway {
    scripts: Mutex<HashMap<Key, VecDeque<Scripted>>>,
    calls: Mutex<HashMap<Key, u32>>,
    fallback: bool,
}

impl Default for ScriptedGateway {
    fn default() -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            calls: Mutex::new(HashMap::new()),
            fallback: true,
        }
    }
}

impl ScriptedGateway {
    /// Creates a gateway with no scripts and the fallback enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Disables the fallback strategy.
    pub fn without_fallback(mut self) -> Self {
        self.fallback = false;
        self
    }

    /// Queues reactions for `participant` on questions of `kind`.
    pub fn script(
        self,
        participant: impl Into<ParticipantId>,
        kind: QuestionKind,
        reactions: impl IntoIterator<Item = Scripted>,
    ) -> Self {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry((participant.into(), kind))
            .or_default()
            .extend(reactions);
        self
    }

    /// Queues decisions for `participant` on questions of `kind`.
    pub fn answers(
        self,
        participant: impl Into<ParticipantId>,
        kind: QuestionKind,
        decisions: impl IntoIterator<Item = Decision>,
    ) -> Self {
        self.script(participant, kind, decisions.into_iter().map(Scripted::Answer))
    }

    /// Returns how often `participant` was asked a question of `kind`.
    pub fn calls(&self, participant: &ParticipantId, kind: QuestionKind) -> u32 {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(participant.clone(), kind))
            .copied()
            .unwrap_or(0)
    }

    fn next(&self, key: &Key) -> Option<Scripted> {
        *self
            .calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key.clone())
            .or_insert(0) += 1;
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(key)
            .and_then(VecDeque::pop_front)
    }

    fn fallback(&self, question: &Question) -> Result<Decision, GatewayError> {
        if !self.fallback {
            return Err(GatewayError::transport(format!(
                "no scripted answer for {} question",
                question.kind()
            )));
        }
        Ok(fallback_decision(question))
    }
}

/// The fixed strategy played when nothing is scripted.
///
/// Werewolves target the first alive non-werewolf and the seer investigates
/// the first participant it has not checked yet. Everyone else targets the
/// first alive participant other than themselves. Bids are 0.
fn fallback_decision(question: &Question) -> Decision {
    let context = question.context();
    let others = || context.alive().iter().filter(|id| *id != context.you());
    let first_other = || others().next().cloned();

    let target = match question {
        Question::Bid { .. } => return Decision::bid(0, "no preference"),
        Question::Speak { .. } => {
            return Decision::message(format!("{} has nothing to add.", context.you()));
        }
        Question::Eliminate { .. } => others()
            .find(|id| !context.allies().contains(*id))
            .cloned(),
        Question::Investigate {
            previous_checks, ..
        } => others()
            .find(|id| !previous_checks.iter().any(|c| c.target() == *id))
            .cloned()
            .or_else(first_other),
        Question::Vote { .. } if context.role().is_werewolf() => others()
            .find(|id| !context.allies().contains(*id))
            .cloned(),
        Question::Protect { .. } | Question::Vote { .. } => first_other(),
    };

    match target {
        Some(target) => Decision::target(target, "fallback"),
        // Nobody else is alive; answer with self and let validation reject it.
        None => Decision::target(context.you().clone(), "fallback"),
    }
}

#[async_trait]
impl ParticipantGateway for ScriptedGateway {
    #[instrument(skip(self, participant, question), fields(participant = %participant.id(), kind = %question.kind()))]
    async fn ask(&self, participant: &Participant, question: &Question) -> Result<Decision, GatewayError> {
        let key = (participant.id().clone(), question.kind());
        match self.next(&key) {
            Some(Scripted::Answer(decision)) => Ok(decision),
            Some(Scripted::Fail(kind)) => Err(GatewayError::new(kind, "scripted failure")),
            Some(Scripted::Stall(pause)) => {
                debug!(?pause, "Stalling");
                tokio::time::sleep(pause).await;
                self.fallback(question)
            }
            None => self.fallback(question),
        }
    }
}

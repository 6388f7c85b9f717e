//! The referee: drives a match through its phases.
//!
//! ```text
//! Night → Bidding → Discussion → Voting → RoundEnd → { Night | GameEnd }
//! ```
//!
//! The referee owns the [`GameState`] and is its only writer. Participants
//! are reached through a [`ParticipantGateway`]; concurrent questions only
//! ever see a snapshot, and every write happens on the referee's task after
//! the answers are joined.

mod bidding;
mod discussion;
mod game_end;
mod night;
mod round_end;
mod voting;

pub use game_end::MatchRecord;
pub use night::night_summary;

use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::gateway::{Decision, GatewayError, ParticipantGateway, Question, RetryPolicy, RoundContext, ask_with_retry};
use crate::match_config::MatchConfig;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::EnumIter;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};
use werewolf_core::invariants::{InvariantSet, MatchInvariants};
use werewolf_core::{Event, GameState, Participant, ParticipantId, Role, SetupError, StateError};

/// Default round limit.
pub const DEFAULT_MAX_ROUNDS: u32 = 20;

/// Phase of the round state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Phase {
    /// Doctor, werewolf and seer act.
    Night,
    /// Everyone bids for speaking position.
    Bidding,
    /// Speakers talk in bid order.
    Discussion,
    /// Everyone votes someone out.
    Voting,
    /// Win conditions are checked.
    RoundEnd,
    /// Terminal.
    GameEnd,
}

/// Why the referee stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum RefereeErrorKind {
    /// The roster cannot start a match.
    #[display("setup")]
    Setup,
    /// A state write was rejected.
    #[display("state")]
    State,
    /// Nobody is left alive.
    #[display("no survivors")]
    NoSurvivors,
    /// The round limit was reached without a winner.
    #[display("round limit")]
    RoundLimit,
    /// Cancellation was requested.
    #[display("aborted")]
    Aborted,
}

/// Referee error with caller location.
#[derive(Debug, Clone, Display, Error)]
#[display("Referee error ({}): {} at {}:{}", kind, message, file, line)]
pub struct RefereeError {
    /// Category.
    pub kind: RefereeErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl RefereeError {
    /// Creates a new referee error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: RefereeErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        let message = message.into();
        error!(%kind, error_message = %message, "Referee error created");
        Self {
            kind,
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<StateError> for RefereeError {
    #[track_caller]
    fn from(e: StateError) -> Self {
        Self::new(RefereeErrorKind::State, e.to_string())
    }
}

impl From<SetupError> for RefereeError {
    #[track_caller]
    fn from(e: SetupError) -> Self {
        Self::new(RefereeErrorKind::Setup, e.to_string())
    }
}

/// Fatal end of a match, with everything recorded up to that point.
#[derive(Debug, Clone, Display, Error)]
#[display("Match aborted: {}", reason)]
pub struct MatchAborted {
    /// What stopped the match.
    #[error(source)]
    pub reason: RefereeError,
    /// Partial record; no winner and no scores.
    pub record: MatchRecord,
}

/// Handle that cancels a running match between phases.
#[derive(Debug)]
pub struct MatchAbort {
    tx: watch::Sender<bool>,
}

impl Default for MatchAbort {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchAbort {
    /// Creates an untriggered handle.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Requests cancellation. The referee stops before its next phase.
    pub fn abort(&self) {
        self.tx.send_replace(true);
    }

    fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

/// Runs one match.
pub struct Referee {
    state: GameState,
    phase: Phase,
    gateway: Arc<dyn ParticipantGateway>,
    policy: RetryPolicy,
    max_rounds: u32,
    sink: Arc<dyn DiagnosticSink>,
    abort: Option<watch::Receiver<bool>>,
}

impl std::fmt::Debug for Referee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Referee")
            .field("round", &self.state.current_round())
            .field("phase", &self.phase)
            .field("policy", &self.policy)
            .field("max_rounds", &self.max_rounds)
            .finish_non_exhaustive()
    }
}

impl Referee {
    /// Creates a referee for `state`, starting at night.
    pub fn new(state: GameState, gateway: Arc<dyn ParticipantGateway>) -> Self {
        Self {
            state,
            phase: Phase::Night,
            gateway,
            policy: RetryPolicy::default(),
            max_rounds: DEFAULT_MAX_ROUNDS,
            sink: Arc::new(TracingSink),
            abort: None,
        }
    }

    /// Builds the state from a validated config and creates a referee.
    ///
    /// # Errors
    ///
    /// Returns a setup [`RefereeError`] if the roster is unusable.
    #[instrument(skip_all)]
    pub fn from_config(config: &MatchConfig, gateway: Arc<dyn ParticipantGateway>) -> Result<Self, RefereeError> {
        let state = GameState::new(config.roster(), *config.turns_to_speak_per_round())?;
        Ok(Self::new(state, gateway)
            .with_policy(config.retry_policy())
            .with_max_rounds(*config.max_rounds()))
    }

    /// Sets the decision timeout and retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the round limit.
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Sets where progress lines go.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Lets `abort` cancel this match.
    pub fn with_abort(mut self, abort: &MatchAbort) -> Self {
        self.abort = Some(abort.subscribe());
        self
    }

    /// Returns the match state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Returns the phase that runs next.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn abort_requested(&self) -> bool {
        self.abort.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Runs the current phase and moves to the next one.
    ///
    /// Does nothing once the match reached [`Phase::GameEnd`].
    ///
    /// # Errors
    ///
    /// Returns a fatal [`RefereeError`]; the state keeps everything logged so
    /// far.
    #[instrument(skip(self), fields(round = self.state.current_round(), phase = %self.phase))]
    pub async fn step(&mut self) -> Result<Phase, RefereeError> {
        if self.phase != Phase::GameEnd {
            self.diagnose(format!("Round {}: {}", self.state.current_round(), self.phase));
        }

        let next = match self.phase {
            Phase::Night => {
                self.night().await?;
                Phase::Bidding
            }
            Phase::Bidding => {
                self.bidding().await?;
                Phase::Discussion
            }
            Phase::Discussion => {
                self.discussion().await?;
                Phase::Voting
            }
            Phase::Voting => {
                self.voting().await?;
                Phase::RoundEnd
            }
            Phase::RoundEnd => self.round_end()?,
            Phase::GameEnd => Phase::GameEnd,
        };

        self.check_invariants()?;
        debug!(%next, "Phase complete");
        self.phase = next;
        Ok(next)
    }

    /// Plays the match to the end.
    ///
    /// # Errors
    ///
    /// Returns [`MatchAborted`] with the partial record on a fatal error, on
    /// the round limit, or when cancellation is requested.
    #[instrument(skip(self))]
    pub async fn run(mut self) -> Result<MatchRecord, MatchAborted> {
        info!(participants = self.state.roster().len(), max_rounds = self.max_rounds, "Match started");
        loop {
            if self.abort_requested() {
                let reason = RefereeError::new(RefereeErrorKind::Aborted, "cancellation requested");
                return Err(self.aborted(reason));
            }
            if self.phase == Phase::GameEnd {
                return self.finish().map_err(|reason| self.aborted(reason));
            }
            if let Err(reason) = self.step().await {
                return Err(self.aborted(reason));
            }
        }
    }

    fn aborted(&self, reason: RefereeError) -> MatchAborted {
        warn!(%reason, round = self.state.current_round(), "Match aborted");
        MatchAborted {
            record: MatchRecord::partial(&self.state, &reason),
            reason,
        }
    }

    fn check_invariants(&self) -> Result<(), RefereeError> {
        MatchInvariants::check_all(&self.state).map_err(|violations| {
            error!(?violations, "Match invariants violated");
            let described: Vec<_> = violations.iter().map(|v| v.description.as_str()).collect();
            RefereeError::new(
                RefereeErrorKind::State,
                format!("invariants violated: {}", described.join("; ")),
            )
        })
    }

    fn diagnose(&self, line: impl AsRef<str>) {
        self.sink.line(line.as_ref());
    }

    /// Logs a warning event about `participant` in the current round.
    fn reject(&mut self, participant: &ParticipantId, detail: impl Into<String>) {
        let detail = detail.into();
        warn!(participant = %participant, %detail, "Decision rejected");
        self.state.log_current(Event::warning(participant, detail));
    }

    /// Builds what `participant` is told about the current round.
    fn context(&self, participant: &Participant) -> RoundContext {
        let allies = if participant.role().is_werewolf() {
            self.state
                .alive()
                .iter()
                .filter(|id| *id != participant.id() && self.state.is_werewolf(id))
                .cloned()
                .collect()
        } else {
            Vec::new()
        };
        let context = RoundContext::new(
            self.state.current_round(),
            participant.id().clone(),
            *participant.role(),
            self.state.alive().to_vec(),
            allies,
        );
        if *participant.role() == Role::Seer {
            context.with_known_checks(self.state.seer_checks().to_vec())
        } else {
            context
        }
    }

    /// Clones the participants alive in the current round, in join order.
    fn alive_snapshot(&self) -> Vec<Participant> {
        self.state.alive_participants().into_iter().cloned().collect()
    }

    async fn ask(&self, participant: &Participant, question: &Question) -> Result<Decision, GatewayError> {
        ask_with_retry(self.gateway.as_ref(), participant, question, &self.policy).await
    }

    /// Asks every participant concurrently and returns answers in input order.
    async fn ask_all(&self, asks: &[(Participant, Question)]) -> Vec<Result<Decision, GatewayError>> {
        futures::future::join_all(
            asks.iter()
                .map(|(participant, question)| self.ask(participant, question)),
        )
        .await
    }
}

//! Game end: final event, scores and the archived record.

use super::{Referee, RefereeError, RefereeErrorKind};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, instrument};
use werewolf_core::scoring::score_all;
use werewolf_core::{Elimination, Event, GameState, ParticipantId, Winner};

/// Archived result of a match.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Winning side; `None` for an aborted match.
    winner: Option<Winner>,
    /// Round in which the match ended.
    final_round: u32,
    /// Event log keyed by round.
    events: BTreeMap<u32, Vec<Event>>,
    /// Eliminations keyed by round.
    eliminations: BTreeMap<u32, Vec<Elimination>>,
    /// Score per participant; empty for an aborted match.
    scores: BTreeMap<ParticipantId, i64>,
    /// Short human-readable summary.
    summary: String,
}

impl MatchRecord {
    fn build(state: &GameState, scores: BTreeMap<ParticipantId, i64>, summary: String) -> Self {
        let rounds = state.rounds();
        Self {
            winner: state.winner(),
            final_round: state.current_round(),
            events: rounds
                .iter()
                .map(|r| (*r.number(), r.events().clone()))
                .collect(),
            eliminations: rounds
                .iter()
                .map(|r| (*r.number(), r.eliminations().clone()))
                .collect(),
            scores,
            summary,
        }
    }

    /// Record of a finished match, scored.
    pub fn finished(state: &GameState, winner: Winner) -> Self {
        let eliminated = state.roster().iter().filter(|p| !p.is_alive()).count();
        let summary = format!(
            "The {} won after {} round(s); {} of {} participants were eliminated.",
            winner,
            state.current_round(),
            eliminated,
            state.roster().len()
        );
        Self::build(state, score_all(state), summary)
    }

    /// Record of an aborted match: history so far, no scores.
    pub fn partial(state: &GameState, reason: &RefereeError) -> Self {
        let summary = format!(
            "Match aborted in round {} ({}): {}",
            state.current_round(),
            reason.kind,
            reason.message
        );
        Self::build(state, BTreeMap::new(), summary)
    }

    /// Returns every event in round order.
    pub fn all_events(&self) -> impl Iterator<Item = &Event> {
        self.events.values().flatten()
    }
}

impl Referee {
    /// Logs the end of the match and archives it.
    #[instrument(skip(self), fields(round = self.state.current_round()))]
    pub(super) fn finish(&mut self) -> Result<MatchRecord, RefereeError> {
        let winner = self.state.winner().ok_or_else(|| {
            RefereeError::new(RefereeErrorKind::State, "match ended without a declared winner")
        })?;
        self.state.log_current(Event::GameEnd { winner });
        let record = MatchRecord::finished(&self.state, winner);
        info!(%winner, final_round = record.final_round, scores = ?record.scores, "Match finished");
        self.diagnose(record.summary());
        Ok(record)
    }
}

//! Win condition evaluation.

use crate::state::GameState;
use crate::types::Winner;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Head count of the alive roster by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct SideCount {
    /// Living werewolves.
    werewolves: usize,
    /// Living village-side participants, seer and doctor included.
    villagers: usize,
}

impl SideCount {
    /// Counts sides over the current round's alive roster.
    #[instrument(skip(state), fields(round = state.current_round()))]
    pub fn of(state: &GameState) -> Self {
        let (werewolves, villagers) = state
            .alive_participants()
            .iter()
            .fold((0, 0), |(w, v), p| {
                if p.role().is_werewolf() {
                    (w + 1, v)
                } else {
                    (w, v + 1)
                }
            });
        Self {
            werewolves,
            villagers,
        }
    }

    /// Returns true when nobody is alive.
    pub fn is_empty(&self) -> bool {
        self.werewolves == 0 && self.villagers == 0
    }
}

/// What the round-end check decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// The match is over.
    Winner(Winner),
    /// Play another round.
    Continue,
    /// Nobody is alive; no winner can be determined.
    NoSurvivors,
}

/// Applies the win-condition table to a head count.
///
/// No werewolves left means the village wins. Werewolves at or above the
/// village head count win. Anything else continues.
#[instrument]
pub fn check_winner(count: SideCount) -> Verdict {
    if count.is_empty() {
        Verdict::NoSurvivors
    } else if count.werewolves == 0 {
        Verdict::Winner(Winner::Villagers)
    } else if count.werewolves >= count.villagers {
        Verdict::Winner(Winner::Werewolves)
    } else {
        Verdict::Continue
    }
}

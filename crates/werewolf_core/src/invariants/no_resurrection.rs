//! No resurrection: once eliminated, never alive again.

use super::Invariant;
use crate::state::GameState;
use std::collections::HashSet;

/// Invariant: an eliminated participant never reappears in a later round.
///
/// Also requires the roster liveness flags to agree with the current round's
/// alive roster, and every participant to be eliminated at most once.
pub struct NoResurrectionInvariant;

impl Invariant<GameState> for NoResurrectionInvariant {
    fn holds(state: &GameState) -> bool {
        let mut gone = HashSet::new();
        for round in state.rounds() {
            if round.participants().iter().any(|id| gone.contains(id)) {
                return false;
            }
            for elimination in round.eliminations() {
                if !gone.insert(elimination.participant()) {
                    return false;
                }
            }
        }

        state
            .roster()
            .iter()
            .all(|p| p.is_alive() == state.is_alive(p.id()))
    }

    fn description() -> &'static str {
        "Eliminated participants never return to the alive roster"
    }
}

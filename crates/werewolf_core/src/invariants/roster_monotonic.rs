//! Roster monotonicity: the alive roster only ever shrinks.

use super::Invariant;
use crate::state::GameState;
use std::collections::HashSet;

/// Invariant: each round starts with exactly the survivors of the previous one.
///
/// For every closed round `r`, the alive roster of `r + 1` equals the alive
/// roster of `r` minus the eliminations of `r`. Round 1 holds the full roster.
pub struct RosterMonotonicInvariant;

impl Invariant<GameState> for RosterMonotonicInvariant {
    fn holds(state: &GameState) -> bool {
        let Some(first) = state.rounds().first() else {
            return false;
        };
        let full: Vec<_> = state.roster().iter().map(|p| p.id().clone()).collect();
        let first_allowed: HashSet<_> = full.iter().collect();
        if first
            .participants()
            .iter()
            .chain(first.eliminations().iter().map(|e| e.participant()))
            .any(|id| !first_allowed.contains(id))
        {
            return false;
        }

        state.rounds().windows(2).all(|pair| {
            let (before, after) = (&pair[0], &pair[1]);
            let survivors: Vec<_> = before
                .participants()
                .iter()
                .filter(|id| !before.eliminated(id))
                .collect();
            let next: Vec<_> = after.participants().iter().collect();
            survivors == next
        })
    }

    fn description() -> &'static str {
        "Each round's alive roster is the previous round's survivors"
    }
}

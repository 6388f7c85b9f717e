//! Role scores computed from the finished match.
//!
//! Every function here is a pure reduction over the state's history. Werewolf
//! identity comes from roster roles because role slots are cleared on
//! elimination.

use crate::event::Event;
use crate::state::GameState;
use crate::types::{ParticipantId, Role, Winner};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

fn final_round(state: &GameState) -> i64 {
    i64::from(state.current_round())
}

fn won(state: &GameState, side: Winner) -> bool {
    state.winner() == Some(side)
}

/// Counts votes across all rounds, split by whether the target is a werewolf.
fn vote_split(state: &GameState) -> (i64, i64) {
    state
        .rounds()
        .iter()
        .flat_map(|round| round.votes())
        .fold((0, 0), |(hits, misses), vote| {
            if state.is_werewolf(vote.target()) {
                (hits + 1, misses)
            } else {
                (hits, misses + 1)
            }
        })
}

/// Score shared by both werewolves.
///
/// `10 × final_round + 5 × votes against non-werewolves + 50 on a werewolf win`.
pub fn werewolf_score(state: &GameState) -> i64 {
    let (_, misdirected) = vote_split(state);
    let bonus = if won(state, Winner::Werewolves) { 50 } else { 0 };
    10 * final_round(state) + 5 * misdirected + bonus
}

/// Seer score, floored at 0.
///
/// Rewards an early first investigation and decays by `3 × (r − R)` for each
/// round `r` played after the first investigation round `R`.
pub fn seer_score(state: &GameState) -> i64 {
    let last = final_round(state);
    let first_investigation = state.rounds().iter().find_map(|round| {
        round
            .events()
            .iter()
            .any(|e| matches!(e, Event::SeerInvestigation { .. }))
            .then(|| i64::from(*round.number()))
    });

    let raw = match first_investigation {
        Some(r) => {
            let decay: i64 = (r + 1..=last).map(|round| 3 * (round - r)).sum();
            (10 - r) * 5 - decay
        }
        None => (10 - last) * 5,
    };
    raw.max(0)
}

/// Score shared by every plain villager, alive or not.
///
/// `10 × votes against werewolves + (10 − final_round) × 3 + 30 on a village
/// win`. Not floored.
pub fn villager_score(state: &GameState) -> i64 {
    let (accurate, _) = vote_split(state);
    let bonus = if won(state, Winner::Villagers) { 30 } else { 0 };
    10 * accurate + (10 - final_round(state)) * 3 + bonus
}

/// Doctor score.
///
/// `25 × blocked kills + 5 × final_round + 30 on a village win`. A kill counts
/// as blocked when the round's save matches a logged failed kill.
pub fn doctor_score(state: &GameState) -> i64 {
    let blocked = state
        .rounds()
        .iter()
        .filter(|round| {
            round.doctor_save().as_ref().is_some_and(|saved| {
                round.events().iter().any(|e| {
                    matches!(e, Event::WerewolfEliminationFailure { target, .. } if target == saved)
                })
            })
        })
        .count();
    let bonus = if won(state, Winner::Villagers) { 30 } else { 0 };
    25 * blocked as i64 + 5 * final_round(state) + bonus
}

/// Scores every roster participant by role.
#[instrument(skip(state), fields(final_round = state.current_round(), winner = ?state.winner()))]
pub fn score_all(state: &GameState) -> BTreeMap<ParticipantId, i64> {
    let werewolf = werewolf_score(state);
    let seer = seer_score(state);
    let villager = villager_score(state);
    let doctor = doctor_score(state);

    let scores: BTreeMap<_, _> = state
        .roster()
        .iter()
        .map(|p| {
            let score = match p.role() {
                Role::WerewolfPrimary | Role::WerewolfSecondary => werewolf,
                Role::Seer => seer,
                Role::Doctor => doctor,
                Role::Villager => villager,
            };
            (p.id().clone(), score)
        })
        .collect();
    debug!(?scores, "Scores computed");
    scores
}

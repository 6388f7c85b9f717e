//! Role slots point at living holders of the matching role.

use super::Invariant;
use crate::state::GameState;
use crate::types::{ParticipantId, Role};

/// Invariant: every filled role slot names a living participant whose role fits.
///
/// The primary werewolf slot may hold a promoted secondary. A filled
/// secondary slot requires a filled primary slot.
pub struct RoleSlotsInvariant;

fn fits(state: &GameState, slot: Option<&ParticipantId>, allowed: &[Role]) -> bool {
    slot.is_none_or(|id| {
        state
            .participant(id)
            .is_some_and(|p| p.is_alive() && allowed.contains(p.role()))
    })
}

impl Invariant<GameState> for RoleSlotsInvariant {
    fn holds(state: &GameState) -> bool {
        let werewolf = [Role::WerewolfPrimary, Role::WerewolfSecondary];
        fits(state, state.primary_werewolf(), &werewolf)
            && fits(state, state.secondary_werewolf(), &[Role::WerewolfSecondary])
            && fits(state, state.seer(), &[Role::Seer])
            && fits(state, state.doctor(), &[Role::Doctor])
            && (state.secondary_werewolf().is_none() || state.primary_werewolf().is_some())
    }

    fn description() -> &'static str {
        "Role slots name living participants holding the matching role"
    }
}

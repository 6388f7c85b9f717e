//! The single source of truth for a match.
//!
//! [`GameState`] is created once at setup and then mutated only through the
//! named operations below. Every per-round collection is append-only.

use crate::event::Event;
use crate::round::RoundRecord;
use crate::types::{
    Bid, ChatMessage, Elimination, EliminationKind, KillOutcome, Participant, ParticipantId,
    Role, SeerCheck, Vote, WerewolfKill, Winner,
};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// Error raised when the roster handed to [`GameState::new`] is unusable.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum SetupError {
    /// No participants at all.
    #[display("Roster is empty")]
    EmptyRoster,

    /// Two participants share an id.
    #[display("Participant id {} appears more than once", _0)]
    DuplicateParticipant(ParticipantId),

    /// A single-holder role was assigned twice.
    #[display("Role {} is assigned to more than one participant", _0)]
    DuplicateRole(Role),

    /// No werewolf in the roster.
    #[display("Roster has no werewolf")]
    NoWerewolf,

    /// A secondary werewolf without a primary.
    #[display("Secondary werewolf {} has no primary to back up", _0)]
    SecondaryWithoutPrimary(ParticipantId),
}

impl std::error::Error for SetupError {}

/// Error raised by a state write that cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum StateError {
    /// The round has not been opened yet.
    #[display("Round {} does not exist (current round is {})", round, current)]
    UnknownRound {
        /// Requested round.
        round: u32,
        /// Current round.
        current: u32,
    },

    /// The speaking order was already derived for this round.
    #[display("Speaking order for round {} is already set", _0)]
    SpeakingOrderAlreadySet(u32),

    /// The doctor already protected someone this round.
    #[display("Doctor save for round {} is already recorded", _0)]
    DoctorSaveAlreadyRecorded(u32),
}

impl std::error::Error for StateError {}

/// Full match state: roster, role slots, and the round arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    roster: Vec<Participant>,
    rounds: Vec<RoundRecord>,
    current_round: u32,
    primary_werewolf: Option<ParticipantId>,
    secondary_werewolf: Option<ParticipantId>,
    seer: Option<ParticipantId>,
    doctor: Option<ParticipantId>,
    seer_checks: Vec<SeerCheck>,
    latest_werewolf_kill: Option<WerewolfKill>,
    winner: Option<Winner>,
    turns_to_speak_per_round: u32,
}

impl GameState {
    /// Creates the state for a new match at round 1.
    ///
    /// The roster order is the canonical join order used for tie-breaking.
    ///
    /// # Errors
    ///
    /// Returns [`SetupError`] if ids repeat, a single-holder role is assigned
    /// twice, or the werewolf slots cannot be filled consistently.
    #[instrument(skip(roster), fields(roster_size = roster.len()))]
    pub fn new(roster: Vec<Participant>, turns_to_speak_per_round: u32) -> Result<Self, SetupError> {
        if roster.is_empty() {
            return Err(SetupError::EmptyRoster);
        }

        let mut seen = HashSet::new();
        let mut primary = None;
        let mut secondary = None;
        let mut seer = None;
        let mut doctor = None;

        for participant in &roster {
            if !seen.insert(participant.id().clone()) {
                return Err(SetupError::DuplicateParticipant(participant.id().clone()));
            }

            let slot = match participant.role() {
                Role::WerewolfPrimary => &mut primary,
                Role::WerewolfSecondary => &mut secondary,
                Role::Seer => &mut seer,
                Role::Doctor => &mut doctor,
                Role::Villager => continue,
            };
            if slot.is_some() {
                return Err(SetupError::DuplicateRole(*participant.role()));
            }
            *slot = Some(participant.id().clone());
        }

        if let (None, Some(orphan)) = (&primary, &secondary) {
            return Err(SetupError::SecondaryWithoutPrimary(orphan.clone()));
        }
        if primary.is_none() {
            return Err(SetupError::NoWerewolf);
        }

        let initial: Vec<ParticipantId> = roster.iter().map(|p| p.id().clone()).collect();
        info!(
            participants = initial.len(),
            turns_to_speak_per_round, "Match state created"
        );

        Ok(Self {
            roster,
            rounds: vec![RoundRecord::open(1, initial)],
            current_round: 1,
            primary_werewolf: primary,
            secondary_werewolf: secondary,
            seer,
            doctor,
            seer_checks: Vec::new(),
            latest_werewolf_kill: None,
            winner: None,
            turns_to_speak_per_round,
        })
    }

    // ─────────────────────────────────────────────────────────────
    //  Reads
    // ─────────────────────────────────────────────────────────────

    /// Returns the current round number.
    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    /// Returns the number of discussion passes per round.
    pub fn turns_to_speak_per_round(&self) -> u32 {
        self.turns_to_speak_per_round
    }

    /// Returns the full roster in join order, eliminated participants included.
    pub fn roster(&self) -> &[Participant] {
        &self.roster
    }

    /// Looks up a participant by id.
    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.roster.iter().find(|p| p.id() == id)
    }

    /// Returns the record of round `number`, if it has been opened.
    pub fn round(&self, number: u32) -> Option<&RoundRecord> {
        number
            .checked_sub(1)
            .and_then(|index| self.rounds.get(index as usize))
    }

    /// Returns every opened round, oldest first.
    pub fn rounds(&self) -> &[RoundRecord] {
        &self.rounds
    }

    /// Returns the record of the current round.
    pub fn current(&self) -> &RoundRecord {
        &self.rounds[self.current_index()]
    }

    /// Returns the alive participant ids of the current round, in join order.
    pub fn alive(&self) -> &[ParticipantId] {
        self.current().participants()
    }

    /// Returns the alive participants of the current round, in join order.
    pub fn alive_participants(&self) -> Vec<&Participant> {
        self.alive()
            .iter()
            .filter_map(|id| self.participant(id))
            .collect()
    }

    /// Returns true if `id` is alive in the current round.
    pub fn is_alive(&self, id: &ParticipantId) -> bool {
        self.current().contains(id)
    }

    /// Returns true if `voter` already has an accepted vote this round.
    pub fn has_voted(&self, voter: &ParticipantId) -> bool {
        self.current().votes().iter().any(|v| v.voter() == voter)
    }

    /// Returns true if `id` holds a werewolf role.
    pub fn is_werewolf(&self, id: &ParticipantId) -> bool {
        self.participant(id)
            .map(|p| p.role().is_werewolf())
            .unwrap_or(false)
    }

    /// Returns the ids of every werewolf, alive or not.
    pub fn werewolf_ids(&self) -> Vec<ParticipantId> {
        self.ids_with(|role| role.is_werewolf())
    }

    /// Returns the ids of every participant holding exactly `role`.
    pub fn ids_with_role(&self, role: Role) -> Vec<ParticipantId> {
        self.ids_with(|r| r == role)
    }

    fn ids_with(&self, predicate: impl Fn(Role) -> bool) -> Vec<ParticipantId> {
        self.roster
            .iter()
            .filter(|p| predicate(*p.role()))
            .map(|p| p.id().clone())
            .collect()
    }

    /// Returns the living primary werewolf.
    pub fn primary_werewolf(&self) -> Option<&ParticipantId> {
        self.primary_werewolf.as_ref()
    }

    /// Returns the living secondary werewolf.
    pub fn secondary_werewolf(&self) -> Option<&ParticipantId> {
        self.secondary_werewolf.as_ref()
    }

    /// Returns the living seer.
    pub fn seer(&self) -> Option<&ParticipantId> {
        self.seer.as_ref()
    }

    /// Returns the living doctor.
    pub fn doctor(&self) -> Option<&ParticipantId> {
        self.doctor.as_ref()
    }

    /// Returns every seer investigation so far.
    pub fn seer_checks(&self) -> &[SeerCheck] {
        &self.seer_checks
    }

    /// Returns the most recent werewolf kill attempt.
    pub fn latest_werewolf_kill(&self) -> Option<&WerewolfKill> {
        self.latest_werewolf_kill.as_ref()
    }

    /// Returns the declared winner.
    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    fn current_index(&self) -> usize {
        (self.current_round - 1) as usize
    }

    fn current_mut(&mut self) -> &mut RoundRecord {
        let index = self.current_index();
        &mut self.rounds[index]
    }

    // ─────────────────────────────────────────────────────────────
    //  Mutations
    // ─────────────────────────────────────────────────────────────

    /// Eliminates a participant from the current round.
    ///
    /// Does nothing and returns `false` if `id` is not currently alive.
    /// Otherwise promotes or clears the werewolf slots, clears the seer and
    /// doctor slots, removes `id` from the alive roster and appends to the
    /// elimination ledger.
    #[instrument(skip(self), fields(round = self.current_round))]
    pub fn eliminate(&mut self, id: &ParticipantId, kind: EliminationKind) -> bool {
        if !self.is_alive(id) {
            debug!(participant = %id, "Not alive, elimination ignored");
            return false;
        }

        if self.primary_werewolf.as_ref() == Some(id) {
            self.primary_werewolf = self.secondary_werewolf.take();
            info!(
                promoted = ?self.primary_werewolf,
                "Primary werewolf eliminated, secondary promoted"
            );
        } else if self.secondary_werewolf.as_ref() == Some(id) {
            self.secondary_werewolf = None;
        }

        if self.seer.as_ref() == Some(id) {
            self.seer = None;
        }
        if self.doctor.as_ref() == Some(id) {
            self.doctor = None;
        }

        let round = self.current_mut();
        round.participants.retain(|p| p != id);
        round
            .eliminations
            .push(Elimination::new(id.clone(), kind));

        if let Some(participant) = self.roster.iter_mut().find(|p| p.id() == id) {
            participant.mark_eliminated();
        }

        info!(participant = %id, %kind, "Participant eliminated");
        true
    }

    /// Records a vote for the current round without validating it.
    #[instrument(skip(self, rationale), fields(round = self.current_round))]
    pub fn cast_vote(&mut self, voter: &ParticipantId, target: &ParticipantId, rationale: impl Into<String>) {
        self.current_mut()
            .votes
            .push(Vote::new(voter.clone(), target.clone(), rationale.into()));
    }

    /// Records a bid for the current round.
    #[instrument(skip(self, rationale), fields(round = self.current_round))]
    pub fn place_bid(&mut self, participant: &ParticipantId, amount: u64, rationale: impl Into<String>) {
        self.current_mut()
            .bids
            .push(Bid::new(participant.clone(), amount, rationale.into()));
    }

    /// Sets the discussion order for the current round.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::SpeakingOrderAlreadySet`] on a second call in the
    /// same round.
    #[instrument(skip(self, order), fields(round = self.current_round))]
    pub fn set_speaking_order(&mut self, order: Vec<ParticipantId>) -> Result<(), StateError> {
        let current = self.current_round;
        let round = self.current_mut();
        if !round.speaking_order.is_empty() {
            return Err(StateError::SpeakingOrderAlreadySet(current));
        }
        round.speaking_order = order;
        Ok(())
    }

    /// Appends a discussion message to the current round.
    #[instrument(skip(self, content), fields(round = self.current_round))]
    pub fn append_chat(&mut self, sender: &ParticipantId, content: impl Into<String>) {
        self.current_mut()
            .chat_history
            .push(ChatMessage::new(sender.clone(), content.into()));
    }

    /// Records who the doctor protects tonight.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::DoctorSaveAlreadyRecorded`] if a save exists for
    /// the current round.
    #[instrument(skip(self), fields(round = self.current_round))]
    pub fn record_doctor_save(&mut self, target: &ParticipantId) -> Result<(), StateError> {
        let current = self.current_round;
        let round = self.current_mut();
        if round.doctor_save.is_some() {
            return Err(StateError::DoctorSaveAlreadyRecorded(current));
        }
        round.doctor_save = Some(target.clone());
        Ok(())
    }

    /// Appends a seer investigation result.
    #[instrument(skip(self))]
    pub fn record_seer_check(&mut self, target: &ParticipantId, was_werewolf: bool) {
        self.seer_checks
            .push(SeerCheck::new(target.clone(), was_werewolf));
    }

    /// Overwrites the most recent werewolf kill attempt.
    #[instrument(skip(self))]
    pub fn record_werewolf_kill(&mut self, target: &ParticipantId, outcome: KillOutcome) {
        self.latest_werewolf_kill = Some(WerewolfKill::new(target.clone(), outcome));
    }

    /// Appends an event to the log of `round`.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::UnknownRound`] if `round` has not been opened.
    #[instrument(skip(self, event), fields(current = self.current_round))]
    pub fn log_event(&mut self, round: u32, event: Event) -> Result<(), StateError> {
        let current = self.current_round;
        let index = round
            .checked_sub(1)
            .filter(|_| round <= current)
            .ok_or(StateError::UnknownRound { round, current })?;
        debug!(?event, "Event logged");
        self.rounds[index as usize].events.push(event);
        Ok(())
    }

    /// Appends an event to the current round.
    pub fn log_current(&mut self, event: Event) {
        let index = self.current_index();
        debug!(round = self.current_round, ?event, "Event logged");
        self.rounds[index].events.push(event);
    }

    /// Opens the next round with the current survivors and makes it current.
    #[instrument(skip(self), fields(from = self.current_round))]
    pub fn advance_round(&mut self) {
        let survivors = self.current().participants().clone();
        let next = self.current_round + 1;
        self.rounds.push(RoundRecord::open(next, survivors));
        self.current_round = next;
        info!(round = next, alive = self.alive().len(), "Round opened");
    }

    /// Declares the winner of the match.
    ///
    /// A second call overwrites the first; the referee calls it once.
    #[instrument(skip(self))]
    pub fn declare_winner(&mut self, winner: Winner) {
        if let Some(previous) = self.winner {
            warn!(%previous, %winner, "Winner declared twice, overwriting");
        }
        self.winner = Some(winner);
    }
}

//! Typed audit log entries.
//!
//! Events are appended to the round in which they happened and are never
//! edited afterwards. Scoring and replay read nothing else.

use crate::types::{ParticipantId, Winner};
use serde::{Deserialize, Serialize};

/// Something that happened during a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The doctor protected a participant for this night.
    DoctorSave {
        /// Acting doctor.
        doctor: ParticipantId,
        /// Protected participant.
        target: ParticipantId,
        /// Stated reason.
        rationale: String,
    },
    /// The primary werewolf killed a participant.
    WerewolfElimination {
        /// Acting werewolf.
        werewolf: ParticipantId,
        /// Victim.
        target: ParticipantId,
        /// Stated reason.
        rationale: String,
    },
    /// The kill was blocked by the doctor.
    WerewolfEliminationFailure {
        /// Acting werewolf.
        werewolf: ParticipantId,
        /// Protected target.
        target: ParticipantId,
    },
    /// The seer learned whether a participant is a werewolf.
    SeerInvestigation {
        /// Acting seer.
        seer: ParticipantId,
        /// Investigated participant.
        target: ParticipantId,
        /// Investigation result.
        was_werewolf: bool,
        /// Stated reason.
        rationale: String,
    },
    /// All night actions are resolved.
    NightEnd,
    /// A participant bid for speaking position.
    BidPlaced {
        /// Bidder.
        participant: ParticipantId,
        /// Accepted amount.
        amount: u64,
    },
    /// Discussion order derived from the bids.
    SpeakingOrderSet {
        /// Speakers, first to last.
        order: Vec<ParticipantId>,
    },
    /// A participant spoke during the discussion.
    Statement {
        /// Speaker.
        speaker: ParticipantId,
        /// Zero-based pass over the speaking order.
        pass: u32,
    },
    /// A day vote was accepted.
    Vote {
        /// Voter.
        voter: ParticipantId,
        /// Target.
        target: ParticipantId,
        /// Stated reason.
        rationale: String,
    },
    /// The village voted a participant out.
    VillageElimination {
        /// Eliminated participant.
        target: ParticipantId,
        /// Votes received.
        votes: usize,
    },
    /// A decision was rejected or degraded to its default.
    Warning {
        /// Participant involved, if any.
        participant: Option<ParticipantId>,
        /// What went wrong.
        detail: String,
    },
    /// Win conditions were evaluated for the round.
    RoundEnd {
        /// Living werewolves.
        werewolves: usize,
        /// Living village-side participants.
        villagers: usize,
    },
    /// The match finished.
    GameEnd {
        /// Declared winner.
        winner: Winner,
    },
}

impl Event {
    /// Creates a warning about a participant.
    pub fn warning(participant: &ParticipantId, detail: impl Into<String>) -> Self {
        Event::Warning {
            participant: Some(participant.clone()),
            detail: detail.into(),
        }
    }

    /// Creates a warning not tied to a participant.
    pub fn notice(detail: impl Into<String>) -> Self {
        Event::Warning {
            participant: None,
            detail: detail.into(),
        }
    }

    /// Returns true for warning entries.
    pub fn is_warning(&self) -> bool {
        matches!(self, Event::Warning { .. })
    }
}

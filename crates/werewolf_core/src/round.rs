//! Per-round record stored in the state arena.

use crate::event::Event;
use crate::types::{Bid, ChatMessage, Elimination, ParticipantId, Vote};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Everything that happened in one round.
///
/// Records live in an arena indexed by `number - 1`. Collections only grow;
/// the owning [`GameState`](crate::GameState) is the only writer.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct RoundRecord {
    /// Round number, starting at 1.
    number: u32,
    /// Alive participants, in join order.
    pub(crate) participants: Vec<ParticipantId>,
    /// Discussion order derived from bidding.
    pub(crate) speaking_order: Vec<ParticipantId>,
    /// Discussion messages in causal order.
    pub(crate) chat_history: Vec<ChatMessage>,
    /// Accepted bids.
    pub(crate) bids: Vec<Bid>,
    /// Accepted votes, in submission order.
    pub(crate) votes: Vec<Vote>,
    /// Eliminations of this round.
    pub(crate) eliminations: Vec<Elimination>,
    /// Audit log.
    pub(crate) events: Vec<Event>,
    /// Participant protected by the doctor this night.
    pub(crate) doctor_save: Option<ParticipantId>,
}

impl RoundRecord {
    pub(crate) fn open(number: u32, participants: Vec<ParticipantId>) -> Self {
        Self {
            number,
            participants,
            speaking_order: Vec::new(),
            chat_history: Vec::new(),
            bids: Vec::new(),
            votes: Vec::new(),
            eliminations: Vec::new(),
            events: Vec::new(),
            doctor_save: None,
        }
    }

    /// Returns true if `id` is alive in this round.
    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.participants.contains(id)
    }

    /// Returns true if `id` was eliminated during this round.
    pub fn eliminated(&self, id: &ParticipantId) -> bool {
        self.eliminations.iter().any(|e| e.participant() == id)
    }
}

//! Core domain types for werewolf.

use derive_getters::Getters;
use derive_more::{Display, From};
use derive_new::new;
use serde::{Deserialize, Serialize};
use strum::EnumIter;

/// Stable identifier of a participant.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Creates a participant id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Role held by a participant for the whole match.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    /// Werewolf that chooses the night kill.
    WerewolfPrimary,
    /// Werewolf promoted to primary when the primary falls.
    WerewolfSecondary,
    /// Investigates one participant per night.
    Seer,
    /// Protects one participant per night.
    Doctor,
    /// Plain villager.
    Villager,
}

impl Role {
    /// Returns true for either werewolf role.
    pub fn is_werewolf(self) -> bool {
        matches!(self, Role::WerewolfPrimary | Role::WerewolfSecondary)
    }

    /// Returns true for every role on the village side (seer and doctor included).
    pub fn is_village(self) -> bool {
        !self.is_werewolf()
    }

    /// Short description handed to participants so they know what they are.
    pub fn describe(self) -> &'static str {
        match self {
            Role::WerewolfPrimary => "werewolf (you choose the night kill)",
            Role::WerewolfSecondary => "werewolf (you take over the kill if your partner falls)",
            Role::Seer => "seer",
            Role::Doctor => "doctor",
            Role::Villager => "villager",
        }
    }
}

/// Whether a participant is still in the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum Liveness {
    /// Still playing.
    #[display("alive")]
    Alive,
    /// Removed from the alive roster.
    #[display("eliminated")]
    Eliminated,
}

/// One player in the match.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct Participant {
    /// Stable id.
    id: ParticipantId,
    /// Where the gateway can reach this participant.
    address: String,
    /// Role assigned at setup.
    role: Role,
    /// Current liveness.
    liveness: Liveness,
}

impl Participant {
    /// Creates a living participant.
    pub fn new(id: impl Into<ParticipantId>, address: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            address: address.into(),
            role,
            liveness: Liveness::Alive,
        }
    }

    /// Returns true while the participant has not been eliminated.
    pub fn is_alive(&self) -> bool {
        self.liveness == Liveness::Alive
    }

    pub(crate) fn mark_eliminated(&mut self) {
        self.liveness = Liveness::Eliminated;
    }
}

/// Winning side of a finished match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Winner {
    /// All werewolves were eliminated.
    #[serde(rename = "villagers")]
    #[display("villagers")]
    Villagers,
    /// Werewolves reached parity with the village.
    #[serde(rename = "werewolf")]
    #[display("werewolf")]
    Werewolves,
}

/// How a participant left the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum EliminationKind {
    /// Killed by the primary werewolf at night.
    #[display("night kill")]
    NightKill,
    /// Voted out during the day.
    #[display("voted out")]
    VotedOut,
}

/// Outcome of a werewolf kill attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum KillOutcome {
    /// The target was eliminated.
    Success,
    /// The doctor protected the target.
    Failed,
}

/// Entry of the elimination ledger.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, new)]
pub struct Elimination {
    /// Who was eliminated.
    participant: ParticipantId,
    /// Why.
    kind: EliminationKind,
}

/// A day vote.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, new)]
pub struct Vote {
    /// Participant casting the vote.
    voter: ParticipantId,
    /// Participant voted against.
    target: ParticipantId,
    /// Free-form reasoning.
    rationale: String,
}

/// A bid for speaking position.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, new)]
pub struct Bid {
    /// Bidding participant.
    participant: ParticipantId,
    /// Non-negative amount.
    amount: u64,
    /// Free-form reasoning.
    rationale: String,
}

/// One line of the discussion.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, new)]
pub struct ChatMessage {
    /// Speaker.
    sender: ParticipantId,
    /// What was said.
    content: String,
}

/// Result of a seer investigation.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, new)]
pub struct SeerCheck {
    /// Investigated participant.
    target: ParticipantId,
    /// Whether the target is a werewolf.
    was_werewolf: bool,
}

/// The most recent werewolf kill attempt.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, new)]
pub struct WerewolfKill {
    /// Targeted participant.
    target: ParticipantId,
    /// Whether it landed.
    outcome: KillOutcome,
}

//! Questions put to participants and the decisions they send back.

use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use werewolf_core::{ChatMessage, ParticipantId, Role, SeerCheck};

/// Question kind, without its payload.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QuestionKind {
    /// Doctor picks someone to protect.
    Protect,
    /// Primary werewolf picks a victim.
    Eliminate,
    /// Seer picks someone to investigate.
    Investigate,
    /// Everyone bids for speaking position.
    Bid,
    /// A speaker contributes to the discussion.
    Speak,
    /// Everyone votes someone out.
    Vote,
}

impl QuestionKind {
    /// Returns true if `decision` is the right shape for this kind.
    pub fn accepts(self, decision: &Decision) -> bool {
        matches!(
            (self, decision),
            (
                QuestionKind::Protect
                    | QuestionKind::Eliminate
                    | QuestionKind::Investigate
                    | QuestionKind::Vote,
                Decision::Target { .. }
            ) | (QuestionKind::Bid, Decision::Bid { .. })
                | (QuestionKind::Speak, Decision::Message { .. })
        )
    }
}

/// What every question tells the participant about the round.
///
/// Built from the referee's state snapshot; participants never see state
/// directly.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize, new)]
pub struct RoundContext {
    /// Current round number.
    round: u32,
    /// Participant being asked.
    you: ParticipantId,
    /// Their role.
    role: Role,
    /// Alive participants in join order.
    alive: Vec<ParticipantId>,
    /// Fellow werewolves, only filled in for werewolves.
    allies: Vec<ParticipantId>,
    /// Extra instruction, e.g. why a previous answer was rejected.
    #[new(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    note: Option<String>,
    /// The seer's own investigation results so far, only filled in for the seer.
    #[new(default)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    known_checks: Vec<SeerCheck>,
}

impl RoundContext {
    /// Returns a copy carrying `note`.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Returns a copy carrying the seer's investigation results.
    pub fn with_known_checks(mut self, checks: Vec<SeerCheck>) -> Self {
        self.known_checks = checks;
        self
    }
}

/// A request for one decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Question {
    /// Doctor: whom to protect tonight. Self-protection is rejected.
    Protect {
        /// Round context.
        context: RoundContext,
    },
    /// Primary werewolf: whom to kill tonight.
    Eliminate {
        /// Round context.
        context: RoundContext,
    },
    /// Seer: whom to investigate tonight.
    Investigate {
        /// Round context.
        context: RoundContext,
        /// Results of earlier investigations.
        previous_checks: Vec<SeerCheck>,
    },
    /// Everyone: how much to bid for speaking position.
    Bid {
        /// Round context.
        context: RoundContext,
        /// What happened during the night.
        night_summary: String,
    },
    /// Current speaker: what to say.
    Speak {
        /// Round context.
        context: RoundContext,
        /// Zero-based pass over the speaking order.
        pass: u32,
        /// Discussion order.
        speaking_order: Vec<ParticipantId>,
        /// Messages so far this round.
        chat_history: Vec<ChatMessage>,
        /// What happened during the night.
        night_summary: String,
    },
    /// Everyone: whom to vote out.
    Vote {
        /// Round context.
        context: RoundContext,
        /// The full discussion of this round.
        chat_history: Vec<ChatMessage>,
        /// What happened during the night.
        night_summary: String,
    },
}

impl Question {
    /// Returns the kind of this question.
    pub fn kind(&self) -> QuestionKind {
        match self {
            Question::Protect { .. } => QuestionKind::Protect,
            Question::Eliminate { .. } => QuestionKind::Eliminate,
            Question::Investigate { .. } => QuestionKind::Investigate,
            Question::Bid { .. } => QuestionKind::Bid,
            Question::Speak { .. } => QuestionKind::Speak,
            Question::Vote { .. } => QuestionKind::Vote,
        }
    }

    /// Returns the round context shared by every kind.
    pub fn context(&self) -> &RoundContext {
        match self {
            Question::Protect { context }
            | Question::Eliminate { context }
            | Question::Investigate { context, .. }
            | Question::Bid { context, .. }
            | Question::Speak { context, .. }
            | Question::Vote { context, .. } => context,
        }
    }
}

/// A participant's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Decision {
    /// Answer to protect, eliminate, investigate and vote questions.
    Target {
        /// Chosen participant.
        target: ParticipantId,
        /// Stated reason.
        #[serde(default)]
        rationale: String,
    },
    /// Answer to a bid question. Negative amounts are degraded to 0.
    Bid {
        /// Offered amount.
        amount: i64,
        /// Stated reason.
        #[serde(default)]
        rationale: String,
    },
    /// Answer to a speak question.
    Message {
        /// What to say.
        text: String,
    },
}

impl Decision {
    /// Creates a target decision.
    pub fn target(target: impl Into<ParticipantId>, rationale: impl Into<String>) -> Self {
        Decision::Target {
            target: target.into(),
            rationale: rationale.into(),
        }
    }

    /// Creates a bid decision.
    pub fn bid(amount: i64, rationale: impl Into<String>) -> Self {
        Decision::Bid {
            amount,
            rationale: rationale.into(),
        }
    }

    /// Creates a message decision.
    pub fn message(text: impl Into<String>) -> Self {
        Decision::Message { text: text.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_matches_shape() {
        let target = Decision::target("v1", "");
        assert!(QuestionKind::Vote.accepts(&target));
        assert!(QuestionKind::Protect.accepts(&target));
        assert!(!QuestionKind::Bid.accepts(&target));
        assert!(QuestionKind::Bid.accepts(&Decision::bid(-1, "")));
        assert!(QuestionKind::Speak.accepts(&Decision::message("hi")));
        assert!(!QuestionKind::Speak.accepts(&Decision::bid(3, "")));
    }

    #[test]
    fn test_decision_wire_format() {
        let decision: Decision =
            serde_json::from_str(r#"{"type":"target","target":"seer"}"#).unwrap();
        assert_eq!(decision, Decision::target("seer", ""));
    }

    #[test]
    fn test_question_tagged_by_kind() {
        let context = RoundContext::new(2, "doc".into(), Role::Doctor, vec!["doc".into()], vec![]);
        let question = Question::Protect { context };
        let json = serde_json::to_value(&question).unwrap();
        assert_eq!(json["kind"], "protect");
        assert_eq!(json["context"]["round"], 2);
        assert!(json["context"].get("note").is_none());
        assert!(json["context"].get("known_checks").is_none());
    }
}

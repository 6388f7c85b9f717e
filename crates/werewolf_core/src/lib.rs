//! Werewolf core - the pure match model
//!
//! Everything a referee needs to know about a werewolf match without doing
//! any I/O: the roster, round-indexed state, typed events, elimination and
//! promotion rules, win conditions and scoring.
//!
//! # Example
//!
//! ```
//! use werewolf_core::{EliminationKind, GameState, Participant, Role};
//!
//! let mut state = GameState::new(
//!     vec![
//!         Participant::new("wolf", "http://localhost:9001", Role::WerewolfPrimary),
//!         Participant::new("seer", "http://localhost:9002", Role::Seer),
//!         Participant::new("villager", "http://localhost:9003", Role::Villager),
//!     ],
//!     1,
//! )?;
//!
//! assert!(state.eliminate(&"wolf".into(), EliminationKind::VotedOut));
//! assert!(!state.eliminate(&"wolf".into(), EliminationKind::VotedOut));
//! # Ok::<(), werewolf_core::SetupError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod event;
pub mod invariants;
mod round;
pub mod rules;
pub mod scoring;
mod state;
mod types;

pub use event::Event;
pub use round::RoundRecord;
pub use state::{GameState, SetupError, StateError};
pub use types::{
    Bid, ChatMessage, Elimination, EliminationKind, KillOutcome, Liveness, Participant,
    ParticipantId, Role, SeerCheck, Vote, WerewolfKill, Winner,
};

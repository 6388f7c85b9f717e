//! Strictly Werewolf - a referee for werewolf matches
//!
//! Drives a roster of remote or LLM-played participants through night,
//! bidding, discussion and vote until one side wins, then scores the match.
//!
//! # Architecture
//!
//! - **Core** (`werewolf_core`): round-indexed state, events, rules, scoring
//! - **Referee**: the phase state machine and the only writer of state
//! - **Gateway**: how participants are asked (HTTP, LLM, scripted)
//! - **Config**: TOML match setup
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use strictly_werewolf::{MatchConfig, Referee, ScriptedGateway};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = MatchConfig::from_file("match.toml")?;
//! let referee = Referee::from_config(&config, Arc::new(ScriptedGateway::new()))?;
//! let record = referee.run().await?;
//! println!("{}", record.summary());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod diagnostics;
mod gateway;
mod llm_client;
mod match_config;
mod prompts;
mod referee;

// Crate-level exports - Diagnostics
pub use diagnostics::{DiagnosticSink, MemorySink, TracingSink};

// Crate-level exports - Gateways
pub use gateway::{
    Decision, GatewayError, GatewayErrorKind, HttpGateway, LlmGateway, ParticipantGateway,
    Question, QuestionKind, RetryPolicy, RoundContext, Scripted, ScriptedGateway,
    ask_with_retry, parse_decision,
};

// Crate-level exports - LLM client
pub use llm_client::{Completion, LlmClient, LlmConfig, LlmError, LlmProvider};

// Crate-level exports - Configuration
pub use match_config::{
    ConfigError, Difficulty, GatewayConfig, GatewayKind, MatchConfig, ParticipantConfig,
    RetryConfig,
};

// Crate-level exports - Referee
pub use referee::{
    DEFAULT_MAX_ROUNDS, MatchAbort, MatchAborted, MatchRecord, Phase, Referee, RefereeError,
    RefereeErrorKind, night_summary,
};

// Re-export the core model
pub use werewolf_core;

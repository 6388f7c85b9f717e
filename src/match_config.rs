//! Match setup loaded from TOML.

use crate::gateway::RetryPolicy;
use crate::llm_client::{LlmConfig, LlmProvider};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};
use werewolf_core::{GameState, Participant, ParticipantId, Role};

/// How strong the LLM participants play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Small, fast model.
    #[display("easy")]
    Easy,
    /// Larger model.
    #[default]
    #[display("hard")]
    Hard,
}

impl Difficulty {
    /// Returns the model name this difficulty maps to for `provider`.
    pub fn model(self, provider: LlmProvider) -> &'static str {
        match (provider, self) {
            (LlmProvider::OpenAI, Difficulty::Easy) => "gpt-4o-mini",
            (LlmProvider::OpenAI, Difficulty::Hard) => "gpt-4o",
            (LlmProvider::Anthropic, Difficulty::Easy) => "claude-3-5-haiku-latest",
            (LlmProvider::Anthropic, Difficulty::Hard) => "claude-sonnet-4-0",
        }
    }
}

/// Which transport reaches the participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum GatewayKind {
    /// Remote agents over HTTP.
    #[default]
    #[display("http")]
    Http,
    /// LLM-played participants.
    #[display("llm")]
    Llm,
    /// Canned decisions with the fallback strategy.
    #[display("scripted")]
    Scripted,
}

/// One roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ParticipantConfig {
    /// Stable participant id.
    id: ParticipantId,
    /// Agent endpoint, used by the HTTP gateway.
    #[serde(default)]
    address: String,
    /// Assigned role.
    role: Role,
}

/// `[retry]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Attempts per decision.
    #[serde(default = "default_attempts")]
    attempts: u32,
    /// Decision timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// `[gateway]` section.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Transport.
    #[serde(default)]
    kind: GatewayKind,
    /// LLM provider (openai or anthropic).
    #[serde(default = "default_provider")]
    provider: LlmProvider,
    /// Model override; the difficulty picks one otherwise.
    #[serde(default)]
    model: Option<String>,
    /// Maximum tokens for LLM replies.
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            kind: GatewayKind::default(),
            provider: default_provider(),
            model: None,
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_attempts() -> u32 {
    3
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_provider() -> LlmProvider {
    LlmProvider::OpenAI
}

fn default_max_tokens() -> u32 {
    300
}

fn default_turns() -> u32 {
    1
}

fn default_max_rounds() -> u32 {
    20
}

/// Everything needed to start a match.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Roster in join order.
    participants: Vec<ParticipantConfig>,
    /// Discussion passes per round.
    #[serde(default = "default_turns")]
    turns_to_speak_per_round: u32,
    /// LLM strength.
    #[serde(default)]
    difficulty: Difficulty,
    /// Round limit before the match is aborted.
    #[serde(default = "default_max_rounds")]
    max_rounds: u32,
    /// Decision timeout and retries.
    #[serde(default)]
    retry: RetryConfig,
    /// Transport settings.
    #[serde(default)]
    gateway: GatewayConfig,
}

impl MatchConfig {
    /// Loads and validates configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading match config");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        info!(
            participants = config.participants.len(),
            gateway = %config.gateway.kind,
            difficulty = %config.difficulty,
            "Match config loaded"
        );
        Ok(config)
    }

    /// Checks the roster and limits without starting a match.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unusable roster (duplicate ids, repeated
    /// single-holder roles, no primary werewolf) or a zero round limit.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_rounds == 0 {
            return Err(ConfigError::new("max_rounds must be at least 1".to_string()));
        }
        GameState::new(self.roster(), self.turns_to_speak_per_round)
            .map(|_| ())
            .map_err(|e| ConfigError::new(format!("Invalid roster: {}", e)))
    }

    /// Builds the roster in join order.
    pub fn roster(&self) -> Vec<Participant> {
        self.participants
            .iter()
            .map(|p| Participant::new(p.id.clone(), p.address.clone(), p.role))
            .collect()
    }

    /// Builds the gateway retry policy.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_attempts(self.retry.attempts)
            .with_timeout(Duration::from_secs(self.retry.timeout_secs))
    }

    /// Model the LLM gateway uses: the override, or the difficulty default.
    pub fn model(&self) -> String {
        self.gateway
            .model
            .clone()
            .unwrap_or_else(|| self.difficulty.model(self.gateway.provider).to_string())
    }

    /// Creates LLM configuration for the LLM gateway.
    /// Requires OPENAI_API_KEY or ANTHROPIC_API_KEY environment variable.
    #[instrument(skip(self), fields(provider = %self.gateway.provider))]
    pub fn llm_config(&self) -> Result<LlmConfig, ConfigError> {
        LlmConfig::from_env(self.gateway.provider, &self.model(), self.gateway.max_tokens)
            .map_err(|e| ConfigError::new(e.message))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

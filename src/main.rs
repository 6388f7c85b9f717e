//! Strictly Werewolf - CLI
//!
//! Loads a match configuration, runs the referee and prints the record.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use std::path::Path;
use std::sync::Arc;
use strictly_werewolf::{
    GatewayKind, HttpGateway, LlmClient, LlmGateway, MatchAbort, MatchConfig, ParticipantGateway,
    Referee, ScriptedGateway,
};
use tracing::{info, instrument, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();
    initialize_tracing();

    let cli = Cli::parse();

    match cli.command {
        Command::Run { config } => run_match(&config, false).await,
        Command::Simulate { config } => run_match(&config, true).await,
    }
}

fn build_gateway(config: &MatchConfig, simulate: bool) -> Result<Arc<dyn ParticipantGateway>> {
    if simulate {
        return Ok(Arc::new(ScriptedGateway::new()));
    }
    let gateway: Arc<dyn ParticipantGateway> = match config.gateway().kind() {
        GatewayKind::Http => Arc::new(HttpGateway::new()),
        GatewayKind::Llm => {
            let llm_config = config.llm_config()?;
            info!(model = %llm_config.model(), "Using LLM participants");
            Arc::new(LlmGateway::new(LlmClient::new(llm_config)))
        }
        GatewayKind::Scripted => Arc::new(ScriptedGateway::new()),
    };
    Ok(gateway)
}

/// Runs one match and prints the record
#[instrument(skip_all, fields(config_path = %config_path.display(), simulate = simulate))]
async fn run_match(config_path: &Path, simulate: bool) -> Result<()> {
    let config = MatchConfig::from_file(config_path)?;
    let gateway = build_gateway(&config, simulate)?;

    let abort = MatchAbort::new();
    let referee = Referee::from_config(&config, gateway)?.with_abort(&abort);

    let run = referee.run();
    tokio::pin!(run);
    let outcome = tokio::select! {
        outcome = &mut run => outcome,
        _ = tokio::signal::ctrl_c() => {
            warn!("Ctrl+C received, aborting after the current phase");
            abort.abort();
            run.await
        }
    };

    match outcome {
        Ok(record) => {
            println!("{}", serde_json::to_string_pretty(&record)?);
            info!(summary = %record.summary(), "Match complete");
            Ok(())
        }
        Err(aborted) => {
            println!("{}", serde_json::to_string_pretty(&aborted.record)?);
            Err(aborted.into())
        }
    }
}

#[instrument]
fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,strictly_werewolf=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

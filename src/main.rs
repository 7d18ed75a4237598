#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use opora::config::Config;
use opora::crisis::{CrisisDetector, RuleSet};
use opora::gateway;
use opora::llm::GeminiBackend;
use opora::pipeline::{ChatPipeline, TracingAuditSink};
use opora::prompt::SYSTEM_PROMPT;
use opora::sessions::MemorySessionStore;

#[derive(Parser)]
#[command(name = "opora", about = "Crisis-aware chat backend", version)]
struct Cli {
    /// Path to a TOML config file (defaults to ./opora.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP gateway
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Run crisis detection on a single message and print the verdict
    Check {
        /// Message to evaluate
        message: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    let rules = match &config.rules.path {
        Some(path) => RuleSet::from_toml_file(path)?,
        None => RuleSet::builtin()?,
    };
    let (keywords, patterns) = rules.rule_counts();
    tracing::info!(version = %rules.version, keywords, patterns, "crisis rules loaded");

    match cli.command {
        Command::Serve { host, port } => {
            let backend = GeminiBackend::new(
                config.backend.api_key.as_deref(),
                &config.backend.model,
                config.backend.temperature,
                Duration::from_secs(config.backend.request_timeout_secs),
            )?;
            let store = MemorySessionStore::new(config.session.max_turns);
            let pipeline = ChatPipeline::new(
                CrisisDetector::new(rules),
                Arc::new(backend),
                Arc::new(store),
                Arc::new(TracingAuditSink),
                SYSTEM_PROMPT.to_string(),
                config.session.context_turns,
            );

            let host = host.unwrap_or(config.server.host);
            let port = port.unwrap_or(config.server.port);
            gateway::run_gateway(&host, port, Arc::new(pipeline)).await
        }
        Command::Check { message } => {
            let detector = CrisisDetector::new(rules);
            let detection = detector.detect(&message);
            if detection.is_crisis() {
                println!("CRISIS");
                for keyword in &detection.matched_keywords {
                    println!("  keyword: {keyword}");
                }
                if let Some(pattern) = &detection.matched_pattern {
                    println!("  pattern: {pattern}");
                }
            } else {
                println!("ok");
            }
            Ok(())
        }
    }
}

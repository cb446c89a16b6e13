use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gtm_analyst::{
    agent::{Agent, ConversationMessage},
    analysis::AnalysisPipeline,
    config::{Config, LogFormat},
    langbase::LangbaseClient,
    repository::SqliteRepository,
    tools::business_registry,
};

#[derive(Parser)]
#[command(name = "gtm-analyst", version, about = "GTM analysis and business data agent")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a GTM questionnaire and print the analysis bundle as JSON
    Analyze {
        /// Path to the questionnaire JSON file
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Ask the business data agent a question
    Ask {
        /// The question
        message: String,
        /// Path to a JSON array of prior conversation messages
        #[arg(long)]
        history: Option<PathBuf>,
    },
    /// Create or update the Langbase pipes used by this tool
    Pipes,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config);

    info!(version = env!("CARGO_PKG_VERSION"), "GTM Analyst starting...");

    match run(cli.command, config).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, config: Config) -> anyhow::Result<ExitCode> {
    let langbase = LangbaseClient::new(&config.langbase, config.request.clone())
        .context("Failed to initialize Langbase client")?;
    info!(base_url = %config.langbase.base_url, "Langbase client initialized");

    match command {
        Command::Analyze { input } => {
            let raw = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let questionnaire: Value =
                serde_json::from_str(&raw).context("Questionnaire is not valid JSON")?;

            let pipeline = AnalysisPipeline::new(Arc::new(langbase), &config.pipes);
            match pipeline.run_value(&questionnaire).await {
                Ok(bundle) => {
                    println!("{}", serde_json::to_string_pretty(&bundle)?);
                    Ok(ExitCode::SUCCESS)
                }
                Err(e) => {
                    println!("{}", serde_json::to_string_pretty(&e.to_body())?);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Ask { message, history } => {
            let history: Vec<ConversationMessage> = match history {
                Some(path) => {
                    let raw = std::fs::read_to_string(&path)
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    serde_json::from_str(&raw).context("History is not a valid message array")?
                }
                None => Vec::new(),
            };

            let repository = SqliteRepository::new(&config.database)
                .await
                .context("Failed to initialize database")?;
            info!(path = %config.database.path.display(), "Database initialized");

            let registry = business_registry(Arc::new(repository))?;
            let agent = Agent::new(
                Arc::new(langbase),
                Arc::new(registry),
                config.pipes.agent.clone(),
                config.agent.clone(),
            );

            let reply = agent.ask(&history, &message).await?;
            info!(
                turns = reply.turns,
                tool_calls = reply.tool_calls.len(),
                "Agent reply ready"
            );
            println!("{}", reply.answer);
            Ok(ExitCode::SUCCESS)
        }
        Command::Pipes => {
            info!("Ensuring required Langbase pipes exist...");
            langbase.ensure_pipes(&config.pipes).await?;
            println!("Pipes ready");
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

//! # GTM Analyst
//!
//! Schema-validated go-to-market analysis and a tool-augmented business data
//! agent, both driven by Langbase Pipes.
//!
//! ## Features
//!
//! - **Analysis Pipeline**: questionnaire → maturity stage, then executive
//!   summary, recommendations and AI opportunities generated concurrently
//! - **Schema Contracts**: every generation call validates its input before the
//!   call and its output after it
//! - **Tool Registry**: named, typed, read-only business data tools
//! - **Agent Loop**: multi-turn conversation with concurrent tool execution,
//!   bounded by turn count and time budget
//!
//! ## Architecture
//!
//! ```text
//! CLI → AnalysisPipeline ─┐
//!     → Agent ─ ToolRegistry ─ SqliteRepository (business data)
//!                          └─ GenerationBackend → Langbase Pipes (HTTP)
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use gtm_analyst::{AnalysisPipeline, Config, LangbaseClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let client = LangbaseClient::new(&config.langbase, config.request.clone())?;
//!     let pipeline = AnalysisPipeline::new(Arc::new(client), &config.pipes);
//!     let input = serde_json::from_str(&std::fs::read_to_string("questionnaire.json")?)?;
//!     let bundle = pipeline.run(input).await?;
//!     println!("{}", serde_json::to_string_pretty(&bundle)?);
//!     Ok(())
//! }
//! ```

/// Tool-augmented conversational agent.
pub mod agent;
/// GTM questionnaire analysis pipeline.
pub mod analysis;
/// Generation backend abstraction and its Langbase implementation.
pub mod backend;
/// Configuration loaded from the environment.
pub mod config;
/// Typed input/output contracts and structured invocation.
pub mod contract;
/// Error types and result aliases for the application.
pub mod error;
/// Langbase API client and wire types.
pub mod langbase;
/// System prompts and input templates.
pub mod prompts;
/// Read-only business data access.
pub mod repository;
/// Tool registry and built-in business tools.
pub mod tools;

pub use agent::{Agent, AgentReply, ConversationMessage};
pub use analysis::{AnalysisBundle, AnalysisPipeline, QuestionnaireInput};
pub use backend::GenerationBackend;
pub use config::Config;
pub use error::AppError;
pub use langbase::LangbaseClient;
pub use repository::{BusinessRepository, SqliteRepository};
pub use tools::{business_registry, ToolRegistry};

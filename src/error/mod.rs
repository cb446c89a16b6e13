use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Langbase error: {0}")]
    Langbase(#[from] LangbaseError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),
}

/// Business data repository errors
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Database connection failed: {message}")]
    Connection { message: String },

    #[error("Migration failed: {message}")]
    Migration { message: String },

    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// Langbase API errors
#[derive(Debug, Error)]
pub enum LangbaseError {
    #[error("Langbase unavailable: {message} (retries: {retries})")]
    Unavailable { message: String, retries: u32 },

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Which side of an operation contract was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractStage {
    /// The caller-supplied value, checked before any generation call.
    Input,
    /// The value produced by the backend or a tool handler.
    Output,
}

impl fmt::Display for ContractStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractStage::Input => write!(f, "input"),
            ContractStage::Output => write!(f, "output"),
        }
    }
}

/// A value did not match the shape declared by an operation contract.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Contract violation in {operation} ({stage}): {field} - {reason}")]
pub struct ContractViolation {
    /// Operation or tool name the contract belongs to.
    pub operation: String,
    /// Input or output side.
    pub stage: ContractStage,
    /// Offending field, or `$` for the value as a whole.
    pub field: String,
    /// Human-readable reason.
    pub reason: String,
}

/// Failure of a single structured invocation.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error(transparent)]
    Contract(#[from] ContractViolation),

    #[error("Backend call failed: {0}")]
    Backend(#[from] LangbaseError),
}

/// Errors surfaced by the analysis pipeline to its caller.
///
/// Stage identity is logged, not returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Analysis failed: {message}")]
    Failed { message: String },
}

/// Error kind exposed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisErrorKind {
    InvalidInput,
    AnalysisError,
}

/// Serializable `{kind, message}` failure body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisErrorBody {
    pub kind: AnalysisErrorKind,
    pub message: String,
}

impl AnalysisError {
    /// The coarse kind shown to the caller.
    pub fn kind(&self) -> AnalysisErrorKind {
        match self {
            AnalysisError::InvalidInput { .. } => AnalysisErrorKind::InvalidInput,
            AnalysisError::Failed { .. } => AnalysisErrorKind::AnalysisError,
        }
    }

    /// Convert into the `{kind, message}` body handed to the UI.
    pub fn to_body(&self) -> AnalysisErrorBody {
        let message = match self {
            AnalysisError::InvalidInput { field, reason } => format!("{}: {}", field, reason),
            AnalysisError::Failed { message } => message.clone(),
        };
        AnalysisErrorBody {
            kind: self.kind(),
            message,
        }
    }
}

/// Tool registry errors. These are folded into the conversation by the agent.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolError {
    #[error("Unknown tool: {tool_name}")]
    UnknownTool { tool_name: String },

    #[error("Tool already registered: {tool_name}")]
    DuplicateTool { tool_name: String },

    #[error("Invalid arguments for {tool_name}: {message}")]
    InvalidArguments { tool_name: String, message: String },

    #[error("Tool {tool_name} returned a value violating its contract: {message}")]
    ContractViolation { tool_name: String, message: String },

    #[error("Tool {tool_name} failed: {message}")]
    Execution { tool_name: String, message: String },
}

/// Hard failures of an agent exchange.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Message cannot be empty")]
    EmptyMessage,

    #[error("Generation backend unreachable: {message}")]
    BackendUnreachable { message: String },

    #[error("Agent exhausted after {turns} turns: {reason}")]
    Exhausted { turns: u32, reason: String },
}

impl From<LangbaseError> for AgentError {
    fn from(err: LangbaseError) -> Self {
        AgentError::BackendUnreachable {
            message: err.to_string(),
        }
    }
}

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Result type alias for Langbase operations
pub type LangbaseResult<T> = Result<T, LangbaseError>;

/// Result type alias for structured invocations
pub type InvocationResult<T> = Result<T, InvocationError>;

/// Result type alias for tool operations
pub type ToolResult<T> = Result<T, ToolError>;

/// Result type alias for agent exchanges
pub type AgentResult<T> = Result<T, AgentError>;

//! Generation backend seam.
//!
//! The analysis pipeline and the agent only talk to a [`GenerationBackend`].
//! [`LangbaseClient`](crate::langbase::LangbaseClient) implements it over HTTP;
//! tests substitute scripted stubs.

mod langbase;

use async_trait::async_trait;
use serde_json::Value;

use crate::agent::{ConversationMessage, ToolRequest};
use crate::error::LangbaseResult;
use crate::langbase::ToolSpec;

/// A single structured generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRequest {
    /// Operation name, for logging.
    pub operation: String,
    /// Pipe to run.
    pub pipe: String,
    /// Operation-specific system prompt.
    pub system_prompt: String,
    /// Input rendered into the operation template.
    pub instructions: String,
    /// JSON Schema the completion must satisfy.
    pub output_schema: Value,
}

/// One conversational turn request.
#[derive(Debug, Clone)]
pub struct ConversationRequest {
    pub pipe: String,
    pub system_instruction: String,
    pub messages: Vec<ConversationMessage>,
    pub tools: Vec<ToolSpec>,
}

/// What the backend decided to do on a conversational turn.
#[derive(Debug, Clone, PartialEq)]
pub enum AssistantTurn {
    /// Literal answer text; the exchange is over.
    Final(String),
    /// Tools the backend wants executed before it continues.
    ToolRequests {
        /// Text emitted alongside the requests, if any.
        text: Option<String>,
        calls: Vec<ToolRequest>,
    },
}

/// Text-generation backend used as a typed, composable function.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Run one structured generation and return the raw completion text.
    async fn invoke_structured(&self, request: StructuredRequest) -> LangbaseResult<String>;

    /// Run one conversational turn with the given tools available.
    async fn invoke_conversational(
        &self,
        request: ConversationRequest,
    ) -> LangbaseResult<AssistantTurn>;
}

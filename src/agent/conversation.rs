use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Conversation participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One part of a message: literal text or a tool-invocation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentPart {
    /// Literal text.
    Text { text: String },
    /// A tool call requested by the assistant.
    ToolCall {
        id: String,
        name: String,
        arguments: Value,
    },
    /// The value or failure produced by executing a tool call.
    ToolResult {
        #[serde(rename = "callId")]
        call_id: String,
        name: String,
        output: Value,
        #[serde(rename = "isError", default)]
        is_error: bool,
    },
}

/// A message in an append-only conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: Vec<ContentPart>,
}

impl ConversationMessage {
    /// Plain user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentPart::Text { text: text.into() }],
        }
    }

    /// Plain assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: vec![ContentPart::Text { text: text.into() }],
        }
    }

    /// Assistant turn that requested tools, with any accompanying text first.
    pub fn assistant_tool_calls(text: Option<String>, calls: &[ToolRequest]) -> Self {
        let mut content = Vec::with_capacity(calls.len() + 1);
        if let Some(text) = text.filter(|t| !t.trim().is_empty()) {
            content.push(ContentPart::Text { text });
        }
        content.extend(calls.iter().map(|call| ContentPart::ToolCall {
            id: call.id.clone(),
            name: call.name.clone(),
            arguments: call.arguments.clone(),
        }));
        Self {
            role: Role::Assistant,
            content,
        }
    }

    /// User-side message carrying tool results in request order.
    pub fn tool_results(records: &[ToolInvocationRecord]) -> Self {
        Self {
            role: Role::User,
            content: records.iter().map(ToolInvocationRecord::to_part).collect(),
        }
    }

    /// Concatenated text parts.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Whether any part is a tool call or tool result.
    pub fn has_tool_parts(&self) -> bool {
        self.content
            .iter()
            .any(|part| !matches!(part, ContentPart::Text { .. }))
    }
}

/// A tool execution requested by the backend during a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

/// Result of one tool execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ToolOutcome {
    Success { value: Value },
    Failure { error: String },
}

/// Audit record for an executed tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocationRecord {
    pub id: String,
    pub name: String,
    pub arguments: Value,
    pub outcome: ToolOutcome,
}

impl ToolInvocationRecord {
    /// Whether the tool failed.
    pub fn is_error(&self) -> bool {
        matches!(self.outcome, ToolOutcome::Failure { .. })
    }

    /// The conversation part folding this result back to the backend.
    pub fn to_part(&self) -> ContentPart {
        let output = match &self.outcome {
            ToolOutcome::Success { value } => value.clone(),
            ToolOutcome::Failure { error } => json!({ "error": error }),
        };
        ContentPart::ToolResult {
            call_id: self.id.clone(),
            name: self.name.clone(),
            output,
            is_error: self.is_error(),
        }
    }
}

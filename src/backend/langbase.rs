use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::{AssistantTurn, ConversationRequest, GenerationBackend, StructuredRequest};
use crate::agent::{ContentPart, ConversationMessage, Role, ToolRequest};
use crate::error::{LangbaseError, LangbaseResult};
use crate::langbase::{LangbaseClient, Message, PipeRequest, ToolCall};

#[async_trait]
impl GenerationBackend for LangbaseClient {
    async fn invoke_structured(&self, request: StructuredRequest) -> LangbaseResult<String> {
        let schema = serde_json::to_string_pretty(&request.output_schema).map_err(|e| {
            LangbaseError::InvalidResponse {
                message: format!("Failed to encode output schema: {}", e),
            }
        })?;

        let messages = vec![
            Message::system(format!(
                "{}\n\nRespond with a single JSON object matching this JSON Schema, no other text:\n{}",
                request.system_prompt, schema
            )),
            Message::user(request.instructions),
        ];

        let response = self
            .call_pipe(PipeRequest::new(&request.pipe, messages))
            .await?;

        response.text().ok_or_else(|| LangbaseError::InvalidResponse {
            message: format!("Empty completion for operation {}", request.operation),
        })
    }

    async fn invoke_conversational(
        &self,
        request: ConversationRequest,
    ) -> LangbaseResult<AssistantTurn> {
        let messages = to_wire_messages(&request.system_instruction, &request.messages);
        let pipe_request = PipeRequest::new(&request.pipe, messages).with_tools(request.tools);

        let response = self.call_pipe(pipe_request).await?;
        let tool_calls = response.tool_calls();

        if tool_calls.is_empty() {
            return Ok(AssistantTurn::Final(response.text().unwrap_or_default()));
        }

        debug!(
            pipe = %request.pipe,
            tool_calls = tool_calls.len(),
            "Backend requested tools"
        );

        Ok(AssistantTurn::ToolRequests {
            text: response.text(),
            calls: tool_calls.into_iter().map(from_wire_call).collect(),
        })
    }
}

/// Convert a tool call from the wire. Unparseable arguments are passed through
/// as a string so the registry rejects them as invalid arguments.
fn from_wire_call(call: ToolCall) -> ToolRequest {
    let arguments = call.parsed_arguments().unwrap_or_else(|e| {
        warn!(
            tool = %call.function.name,
            error = %e,
            "Tool call arguments are not valid JSON"
        );
        Value::String(call.function.arguments.clone())
    });

    ToolRequest {
        id: call.id,
        name: call.function.name,
        arguments,
    }
}

/// Flatten conversation messages into Langbase chat messages.
pub(crate) fn to_wire_messages(system: &str, messages: &[ConversationMessage]) -> Vec<Message> {
    let mut wire = vec![Message::system(system)];

    for message in messages {
        let text = message.text();
        let text = if text.trim().is_empty() { None } else { Some(text) };

        match message.role {
            Role::User => {
                for part in &message.content {
                    if let ContentPart::ToolResult {
                        call_id,
                        name,
                        output,
                        ..
                    } = part
                    {
                        wire.push(Message::tool(call_id, name, output.to_string()));
                    }
                }
                if let Some(text) = text {
                    wire.push(Message::user(text));
                }
            }
            Role::Assistant => {
                let calls: Vec<ToolCall> = message
                    .content
                    .iter()
                    .filter_map(|part| match part {
                        ContentPart::ToolCall {
                            id,
                            name,
                            arguments,
                        } => Some(ToolCall::new(id, name, encode_arguments(arguments))),
                        _ => None,
                    })
                    .collect();

                if calls.is_empty() {
                    if let Some(text) = text {
                        wire.push(Message::assistant(text));
                    }
                } else {
                    wire.push(Message::assistant_tool_calls(text, calls));
                }
            }
        }
    }

    wire
}

fn encode_arguments(arguments: &Value) -> String {
    match arguments {
        Value::String(raw) => raw.clone(),
        other => other.to_string(),
    }
}

//! Unit tests for Langbase API types.
//!
//! Tests request/response types, tool-call wire format, serialization,
//! and builder patterns for Langbase pipe communication.

use super::*;
use serde_json::json;

// Message tests
#[test]
fn test_message_system() {
    let msg = Message::system("You are a helpful assistant");
    assert_eq!(msg.role, MessageRole::System);
    assert_eq!(msg.content.as_deref(), Some("You are a helpful assistant"));
    assert!(msg.tool_calls.is_none());
}

#[test]
fn test_message_user_and_assistant() {
    assert_eq!(Message::user("Hello").role, MessageRole::User);
    assert_eq!(Message::assistant("Hi").role, MessageRole::Assistant);
}

#[test]
fn test_message_tool() {
    let msg = Message::tool("call_1", "list_companies", "{\"count\":0}");
    assert_eq!(msg.role, MessageRole::Tool);
    assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
    assert_eq!(msg.name.as_deref(), Some("list_companies"));
}

#[test]
fn test_message_serialize_skips_absent_tool_fields() {
    let value = serde_json::to_value(Message::user("Hello")).unwrap();
    assert_eq!(value, json!({"role": "user", "content": "Hello"}));
}

#[test]
fn test_assistant_tool_calls_serialize() {
    let msg = Message::assistant_tool_calls(
        None,
        vec![ToolCall::new("call_1", "list_open_tasks", "{}")],
    );
    let value = serde_json::to_value(&msg).unwrap();
    assert_eq!(value["role"], "assistant");
    assert!(value["content"].is_null());
    assert_eq!(value["tool_calls"][0]["type"], "function");
    assert_eq!(value["tool_calls"][0]["function"]["name"], "list_open_tasks");
}

#[test]
fn test_message_deserialize_null_content() {
    let msg: Message =
        serde_json::from_value(json!({"role": "assistant", "content": null})).unwrap();
    assert!(msg.content.is_none());
}

#[test]
fn test_message_role_serialize() {
    assert_eq!(serde_json::to_string(&MessageRole::System).unwrap(), "\"system\"");
    assert_eq!(serde_json::to_string(&MessageRole::Tool).unwrap(), "\"tool\"");
}

// ToolCall tests
#[test]
fn test_tool_call_parsed_arguments() {
    let call = ToolCall::new("c", "list_projects", r#"{"companyName":"Acme"}"#);
    assert_eq!(call.parsed_arguments().unwrap(), json!({"companyName": "Acme"}));
}

#[test]
fn test_tool_call_empty_arguments_parse_as_object() {
    let call = ToolCall::new("c", "list_companies", "  ");
    assert_eq!(call.parsed_arguments().unwrap(), json!({}));
}

#[test]
fn test_tool_call_invalid_arguments() {
    let call = ToolCall::new("c", "list_companies", "{not json");
    assert!(call.parsed_arguments().is_err());
}

#[test]
fn test_tool_call_deserialize_defaults_type() {
    let call: ToolCall = serde_json::from_value(json!({
        "id": "call_9",
        "function": {"name": "list_contacts", "arguments": "{}"}
    }))
    .unwrap();
    assert_eq!(call.call_type, "function");
}

#[test]
fn test_tool_spec_function() {
    let spec = ToolSpec::function("list_companies", "List companies", json!({"type": "object"}));
    let value = serde_json::to_value(&spec).unwrap();
    assert_eq!(value["type"], "function");
    assert_eq!(value["function"]["name"], "list_companies");
    assert_eq!(value["function"]["parameters"]["type"], "object");
}

// PipeRequest tests
#[test]
fn test_pipe_request_new() {
    let req = PipeRequest::new("test-pipe", vec![Message::user("test")]);
    assert_eq!(req.name, "test-pipe");
    assert_eq!(req.messages.len(), 1);
    assert!(!req.stream);
    assert!(req.tools.is_none());
}

#[test]
fn test_pipe_request_with_empty_tools_stays_none() {
    let req = PipeRequest::new("test", vec![]).with_tools(vec![]);
    assert!(req.tools.is_none());
}

#[test]
fn test_pipe_request_serialize() {
    let req = PipeRequest::new("agent", vec![Message::user("hi")])
        .with_tools(vec![ToolSpec::function("a", "b", json!({}))]);
    let value = serde_json::to_value(&req).unwrap();
    assert_eq!(value["name"], "agent");
    assert_eq!(value["stream"], false);
    assert!(value.get("threadId").is_none());
    assert_eq!(value["tools"][0]["function"]["name"], "a");
    assert!(value.get("variables").is_none());
}

// PipeResponse tests
#[test]
fn test_pipe_response_deserialize() {
    let resp: PipeResponse = serde_json::from_value(json!({
        "success": true,
        "completion": "Hello",
        "threadId": "thread-1",
        "raw": {
            "model": "gpt-4o-mini",
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15},
            "choices": [{"message": {"role": "assistant", "content": "Hello"}}]
        }
    }))
    .unwrap();
    assert!(resp.success);
    assert_eq!(resp.text().as_deref(), Some("Hello"));
    assert!(resp.tool_calls().is_empty());
    assert_eq!(resp.raw.map(|raw| raw.choices.len()), Some(1));
}

#[test]
fn test_pipe_response_deserialize_minimal() {
    let resp: PipeResponse = serde_json::from_value(json!({"completion": "ok"})).unwrap();
    assert!(resp.success);
    assert!(resp.raw.is_none());
}

#[test]
fn test_pipe_response_tool_calls() {
    let resp: PipeResponse = serde_json::from_value(json!({
        "success": true,
        "completion": "",
        "raw": {
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "list_open_tasks", "arguments": "{}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }
    }))
    .unwrap();
    let calls = resp.tool_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].function.name, "list_open_tasks");
    assert!(resp.text().is_none());
}

#[test]
fn test_pipe_response_text_falls_back_to_choice_content() {
    let resp: PipeResponse = serde_json::from_value(json!({
        "completion": "",
        "raw": {"choices": [{"message": {"content": "From choice"}}]}
    }))
    .unwrap();
    assert_eq!(resp.text().as_deref(), Some("From choice"));
}

// CreatePipeRequest tests
#[test]
fn test_create_pipe_request_new() {
    let req = CreatePipeRequest::new("my-pipe");
    assert_eq!(req.name, "my-pipe");
    assert!(req.description.is_none());
    assert!(req.model.is_none());
}

#[test]
fn test_create_pipe_request_builder_chain() {
    let req = CreatePipeRequest::new("gtm-maturity-v1")
        .with_description("Maturity")
        .with_model("openai:gpt-4o-mini")
        .with_upsert(true)
        .with_json_output(true)
        .with_store(false)
        .with_temperature(0.2)
        .with_max_tokens(1500)
        .with_messages(vec![Message::system("prompt")]);

    assert_eq!(req.description.as_deref(), Some("Maturity"));
    assert_eq!(req.upsert, Some(true));
    assert_eq!(req.json, Some(true));
    assert_eq!(req.store, Some(false));
    assert_eq!(req.max_tokens, Some(1500));
    assert_eq!(req.messages.as_ref().map(Vec::len), Some(1));
}

#[test]
fn test_create_pipe_request_serialize_skips_none() {
    let value = serde_json::to_value(CreatePipeRequest::new("p").with_upsert(true)).unwrap();
    assert_eq!(value, json!({"name": "p", "upsert": true}));
}

#[test]
fn test_create_pipe_response_deserialize() {
    let resp: CreatePipeResponse = serde_json::from_value(json!({
        "name": "p",
        "description": null,
        "status": "private",
        "owner_login": "me",
        "url": "https://langbase.com/me/p",
        "type": "chat",
        "api_key": "pipe_key"
    }))
    .unwrap();
    assert_eq!(resp.name, "p");
    assert_eq!(resp.url, "https://langbase.com/me/p");
    assert!(resp.description.is_none());
}

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::{extract_json_from_completion, render_template, OperationContract};
use crate::backend::{GenerationBackend, StructuredRequest};
use crate::error::{ContractStage, ContractViolation, InvocationResult};

/// One contract-bound call to the generation backend.
///
/// `I` is serialized and validated against the contract's input shape before
/// any call is made; the completion is validated against the output shape
/// before being deserialized into `O`. The backend is called exactly once per
/// [`invoke`](Self::invoke) and nothing is retried or coerced.
pub struct StructuredInvocation<I, O> {
    contract: Arc<OperationContract>,
    pipe: String,
    system_prompt: &'static str,
    template: &'static str,
    _types: PhantomData<fn(&I) -> O>,
}

impl<I, O> StructuredInvocation<I, O>
where
    I: Serialize,
    O: DeserializeOwned,
{
    /// Bind a contract to a pipe, a system prompt, and an input template.
    pub fn new(
        contract: OperationContract,
        pipe: impl Into<String>,
        system_prompt: &'static str,
        template: &'static str,
    ) -> Self {
        Self {
            contract: Arc::new(contract),
            pipe: pipe.into(),
            system_prompt,
            template,
            _types: PhantomData,
        }
    }

    /// The bound contract.
    pub fn contract(&self) -> &OperationContract {
        &self.contract
    }

    /// Operation name.
    pub fn name(&self) -> &'static str {
        self.contract.name
    }

    /// Validate `input`, render it, call the backend once, validate the result.
    pub async fn invoke(&self, backend: &dyn GenerationBackend, input: &I) -> InvocationResult<O> {
        let start = Instant::now();
        let operation = self.contract.name;

        let input_value = serde_json::to_value(input).map_err(|e| ContractViolation {
            operation: operation.to_string(),
            stage: ContractStage::Input,
            field: "$".to_string(),
            reason: format!("input is not serializable: {}", e),
        })?;

        self.contract.validate_input(&input_value)?;
        let instructions = render_template(operation, self.template, &input_value)?;

        debug!(
            operation = %operation,
            pipe = %self.pipe,
            instructions_len = instructions.len(),
            "Invoking structured operation"
        );

        let completion = backend
            .invoke_structured(StructuredRequest {
                operation: operation.to_string(),
                pipe: self.pipe.clone(),
                system_prompt: self.system_prompt.to_string(),
                instructions,
                output_schema: self.contract.output.to_json_schema(),
            })
            .await?;

        let output = self.parse_output(&completion).map_err(|violation| {
            warn!(
                operation = %operation,
                field = %violation.field,
                reason = %violation.reason,
                "Structured output rejected"
            );
            violation
        })?;

        info!(
            operation = %operation,
            latency_ms = start.elapsed().as_millis(),
            "Structured operation completed"
        );

        Ok(output)
    }

    fn parse_output(&self, completion: &str) -> Result<O, ContractViolation> {
        let operation = self.contract.name;
        let violation = |reason: String| ContractViolation {
            operation: operation.to_string(),
            stage: ContractStage::Output,
            field: "$".to_string(),
            reason,
        };

        let json_str = extract_json_from_completion(completion).map_err(violation)?;
        let value: serde_json::Value = serde_json::from_str(json_str)
            .map_err(|e| violation(format!("completion is not valid JSON: {}", e)))?;

        self.contract.validate_output(&value)?;

        serde_json::from_value(value)
            .map_err(|e| violation(format!("output does not match declared type: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{AssistantTurn, ConversationRequest};
    use crate::contract::{FieldKind, Shape};
    use crate::error::{InvocationError, LangbaseError, LangbaseResult};
    use async_trait::async_trait;
    use serde::Deserialize;
    use std::sync::Mutex;

    #[derive(Serialize)]
    struct EchoInput {
        topic: String,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct EchoOutput {
        answer: String,
    }

    struct ScriptedBackend {
        completion: Result<String, u16>,
        requests: Mutex<Vec<StructuredRequest>>,
    }

    impl ScriptedBackend {
        fn replying(completion: &str) -> Self {
            Self {
                completion: Ok(completion.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                completion: Err(status),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl GenerationBackend for ScriptedBackend {
        async fn invoke_structured(&self, request: StructuredRequest) -> LangbaseResult<String> {
            self.requests.lock().unwrap().push(request);
            match &self.completion {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(LangbaseError::Api {
                    status: *status,
                    message: "boom".to_string(),
                }),
            }
        }

        async fn invoke_conversational(
            &self,
            _request: ConversationRequest,
        ) -> LangbaseResult<AssistantTurn> {
            unreachable!("structured tests never converse")
        }
    }

    fn echo() -> StructuredInvocation<EchoInput, EchoOutput> {
        let contract = OperationContract::new(
            "echo",
            Shape::new().required("topic", "Topic", FieldKind::Text { min_len: 5 }),
            Shape::new().required("answer", "Answer", FieldKind::Text { min_len: 1 }),
        );
        StructuredInvocation::new(contract, "echo-pipe", "You echo.", "Topic: {{topic}}")
    }

    fn input(topic: &str) -> EchoInput {
        EchoInput {
            topic: topic.to_string(),
        }
    }

    #[tokio::test]
    async fn test_invoke_success_renders_template_and_schema() {
        let backend = ScriptedBackend::replying(r#"{"answer": "pricing"}"#);
        let output = echo().invoke(&backend, &input("pricing strategy")).await.unwrap();
        assert_eq!(output.answer, "pricing");

        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].operation, "echo");
        assert_eq!(requests[0].pipe, "echo-pipe");
        assert_eq!(requests[0].instructions, "Topic: pricing strategy");
        assert_eq!(requests[0].output_schema["required"][0], "answer");
    }

    #[tokio::test]
    async fn test_invalid_input_never_calls_backend() {
        let backend = ScriptedBackend::replying(r#"{"answer": "x"}"#);
        let err = echo().invoke(&backend, &input("abc")).await.unwrap_err();
        match err {
            InvocationError::Contract(v) => {
                assert_eq!(v.stage, ContractStage::Input);
                assert_eq!(v.field, "topic");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_output_violation() {
        let backend = ScriptedBackend::replying(r#"{"answer": ""}"#);
        let err = echo().invoke(&backend, &input("pricing")).await.unwrap_err();
        match err {
            InvocationError::Contract(v) => {
                assert_eq!(v.stage, ContractStage::Output);
                assert_eq!(v.field, "answer");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_non_json_completion_is_output_violation() {
        let backend = ScriptedBackend::replying("Sure! Here are my thoughts.");
        let err = echo().invoke(&backend, &input("pricing")).await.unwrap_err();
        assert!(matches!(
            err,
            InvocationError::Contract(ContractViolation {
                stage: ContractStage::Output,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_fenced_json_is_accepted() {
        let backend = ScriptedBackend::replying("```json\n{\"answer\": \"ok\"}\n```");
        let output = echo().invoke(&backend, &input("pricing")).await.unwrap();
        assert_eq!(output.answer, "ok");
    }

    #[tokio::test]
    async fn test_backend_failure_is_not_retried() {
        let backend = ScriptedBackend::failing(503);
        let err = echo().invoke(&backend, &input("pricing")).await.unwrap_err();
        assert!(matches!(err, InvocationError::Backend(_)));
        assert_eq!(backend.calls(), 1);
    }
}

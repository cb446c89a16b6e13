use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::contract::Shape;
use crate::error::{ContractStage, ToolError, ToolResult};
use crate::langbase::ToolSpec;

/// Executes one tool against already-validated arguments.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, arguments: Value) -> ToolResult<Value>;
}

/// A named, described, typed tool.
#[derive(Clone)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input: Shape,
    pub output: Shape,
    pub handler: Arc<dyn ToolHandler>,
}

impl ToolDefinition {
    pub fn new(
        name: &'static str,
        description: &'static str,
        input: Shape,
        output: Shape,
        handler: Arc<dyn ToolHandler>,
    ) -> Self {
        Self {
            name,
            description,
            input,
            output,
            handler,
        }
    }

    /// Function spec advertised to the backend.
    pub fn spec(&self) -> ToolSpec {
        ToolSpec::function(self.name, self.description, self.input.to_json_schema())
    }
}

impl std::fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Tools available to the agent, keyed by unique name.
#[derive(Debug, Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<&'static str, ToolDefinition>,
    order: Vec<&'static str>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool. Fails if the name is already taken.
    pub fn register(&mut self, definition: ToolDefinition) -> ToolResult<()> {
        if self.tools.contains_key(definition.name) {
            return Err(ToolError::DuplicateTool {
                tool_name: definition.name.to_string(),
            });
        }

        self.order.push(definition.name);
        self.tools.insert(definition.name, definition);
        Ok(())
    }

    /// Validate arguments, run the handler, validate its result.
    ///
    /// The handler never runs when the arguments violate the input shape.
    pub async fn invoke(&self, name: &str, arguments: Value) -> ToolResult<Value> {
        let definition = self.tools.get(name).ok_or_else(|| ToolError::UnknownTool {
            tool_name: name.to_string(),
        })?;

        definition
            .input
            .validate(name, ContractStage::Input, &arguments)
            .map_err(|v| ToolError::InvalidArguments {
                tool_name: name.to_string(),
                message: format!("{}: {}", v.field, v.reason),
            })?;

        let start = Instant::now();
        let value = definition.handler.call(arguments).await?;

        definition
            .output
            .validate(name, ContractStage::Output, &value)
            .map_err(|v| {
                warn!(
                    tool = %name,
                    field = %v.field,
                    reason = %v.reason,
                    "Tool output violates contract"
                );
                ToolError::ContractViolation {
                    tool_name: name.to_string(),
                    message: format!("{}: {}", v.field, v.reason),
                }
            })?;

        debug!(
            tool = %name,
            latency_ms = start.elapsed().as_millis(),
            "Tool invocation completed"
        );

        Ok(value)
    }

    /// Specs for every tool, in registration order.
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(ToolDefinition::spec)
            .collect()
    }

    /// Tool names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.order.clone()
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

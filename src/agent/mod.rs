//! Tool-augmented conversational agent.
//!
//! Each call to [`Agent::ask`] runs sequential backend turns. A turn either
//! ends the exchange with literal text or requests tools; requested tools run
//! concurrently through the [`ToolRegistry`] and their results (or failures)
//! are appended to the conversation before the next turn. The exchange is
//! bounded by a turn count and a wall-clock budget.

mod conversation;

pub use conversation::*;

use futures_util::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::backend::{AssistantTurn, ConversationRequest, GenerationBackend};
use crate::config::AgentConfig;
use crate::error::{AgentError, AgentResult};
use crate::prompts::AGENT_SYSTEM_PROMPT;
use crate::tools::ToolRegistry;

/// Lifecycle of one agent exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    AwaitingModel,
    ToolsRequested,
    ExecutingTools,
    FinalAnswer,
    Terminated,
}

/// Final answer plus the audit trail of the exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentReply {
    pub answer: String,
    /// Number of backend turns taken.
    pub turns: u32,
    /// Every tool execution, in the order it was requested.
    pub tool_calls: Vec<ToolInvocationRecord>,
    /// The full conversation including the final assistant message.
    pub conversation: Vec<ConversationMessage>,
}

/// Business data agent.
pub struct Agent {
    backend: Arc<dyn GenerationBackend>,
    registry: Arc<ToolRegistry>,
    pipe: String,
    config: AgentConfig,
}

impl Agent {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        registry: Arc<ToolRegistry>,
        pipe: impl Into<String>,
        config: AgentConfig,
    ) -> Self {
        Self {
            backend,
            registry,
            pipe: pipe.into(),
            config,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Answer `message` given the prior conversation.
    ///
    /// Tool failures are folded into the conversation. Backend failures end
    /// the exchange with [`AgentError::BackendUnreachable`].
    pub async fn ask(
        &self,
        history: &[ConversationMessage],
        message: &str,
    ) -> AgentResult<AgentReply> {
        if message.trim().is_empty() {
            return Err(AgentError::EmptyMessage);
        }

        let start = Instant::now();
        let deadline = start + self.config.time_budget();
        let tools = self.registry.specs();

        let mut conversation = history.to_vec();
        conversation.push(ConversationMessage::user(message));

        let mut records: Vec<ToolInvocationRecord> = Vec::new();
        let mut state = AgentState::AwaitingModel;

        for turn in 1..=self.config.max_turns {
            let remaining = remaining_budget(deadline)
                .ok_or_else(|| self.out_of_time(turn - 1))?;

            let request = ConversationRequest {
                pipe: self.pipe.clone(),
                system_instruction: AGENT_SYSTEM_PROMPT.to_string(),
                messages: conversation.clone(),
                tools: tools.clone(),
            };

            let response = tokio::time::timeout(
                remaining,
                self.backend.invoke_conversational(request),
            )
            .await
            .map_err(|_| self.out_of_time(turn))?;

            let outcome = match response {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(turn = turn, error = %e, "Agent backend call failed");
                    return Err(e.into());
                }
            };

            let (text, calls): (String, Vec<ToolRequest>) = match outcome {
                AssistantTurn::Final(text) => (text, Vec::new()),
                AssistantTurn::ToolRequests { text, calls } if calls.is_empty() => {
                    (text.unwrap_or_default(), Vec::new())
                }
                AssistantTurn::ToolRequests { text, calls } => {
                    transition(&mut state, AgentState::ToolsRequested);
                    conversation.push(ConversationMessage::assistant_tool_calls(text, &calls));

                    transition(&mut state, AgentState::ExecutingTools);
                    let executed = tokio::time::timeout(
                        remaining_budget(deadline).unwrap_or(Duration::ZERO),
                        self.execute_tools(calls),
                    )
                    .await
                    .map_err(|_| self.out_of_time(turn))?;

                    conversation.push(ConversationMessage::tool_results(&executed));
                    records.extend(executed);
                    transition(&mut state, AgentState::AwaitingModel);
                    continue;
                }
            };

            transition(&mut state, AgentState::FinalAnswer);
            conversation.push(ConversationMessage::assistant(text.clone()));
            transition(&mut state, AgentState::Terminated);

            info!(
                turns = turn,
                tool_calls = records.len(),
                latency_ms = start.elapsed().as_millis(),
                "Agent answered"
            );

            return Ok(AgentReply {
                answer: text,
                turns: turn,
                tool_calls: records,
                conversation,
            });
        }

        warn!(max_turns = self.config.max_turns, "Agent turn limit reached");
        Err(AgentError::Exhausted {
            turns: self.config.max_turns,
            reason: format!("no final answer within {} turns", self.config.max_turns),
        })
    }

    /// Run every requested tool concurrently; results keep request order.
    async fn execute_tools(&self, calls: Vec<ToolRequest>) -> Vec<ToolInvocationRecord> {
        let registry = self.registry.as_ref();

        let futures = calls.into_iter().map(|call| async move {
            let outcome = match registry.invoke(&call.name, call.arguments.clone()).await {
                Ok(value) => ToolOutcome::Success { value },
                Err(e) => {
                    warn!(tool = %call.name, call_id = %call.id, error = %e, "Tool call failed");
                    ToolOutcome::Failure {
                        error: e.to_string(),
                    }
                }
            };

            ToolInvocationRecord {
                id: call.id,
                name: call.name,
                arguments: call.arguments,
                outcome,
            }
        });

        join_all(futures).await
    }

    fn out_of_time(&self, turns: u32) -> AgentError {
        warn!(
            turns = turns,
            time_budget_ms = self.config.time_budget_ms,
            "Agent time budget exhausted"
        );
        AgentError::Exhausted {
            turns,
            reason: format!(
                "time budget of {}ms exceeded",
                self.config.time_budget_ms
            ),
        }
    }
}

fn remaining_budget(deadline: Instant) -> Option<Duration> {
    let remaining = deadline.saturating_duration_since(Instant::now());
    if remaining.is_zero() {
        None
    } else {
        Some(remaining)
    }
}

fn transition(state: &mut AgentState, next: AgentState) {
    debug!(from = ?state, to = ?next, "Agent state transition");
    *state = next;
}

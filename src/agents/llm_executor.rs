// ABOUTME: Stage executor that delegates each stage to a language model with calculator tools
// ABOUTME: Runs a bounded tool-calling loop and returns the model's final answer as a JSON string
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};
use vitacrew_core::errors::ToolError;
use vitacrew_intelligence::MetricsEngine;

use super::prompt::{system_prompt, task_prompt};
use crate::config::VitacrewConfig;
use crate::errors::{AppError, AppResult};
use crate::llm::{
    ChatMessage, ChatRequest, FunctionCall, LlmProvider, OpenAiCompatibleProvider, TokenUsage,
    Tool,
};
use crate::pipeline::{StageExecutor, StageInput};
use crate::stages::AgentDefinition;
use crate::tools::AgentTool;

/// Tool rounds allowed per stage when not configured
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 5;

/// Sent after the last allowed tool round to force a text answer
const FINAL_ANSWER_PROMPT: &str =
    "You have used every allowed tool call. Write your final answer now using the results above.";

/// Final text and token usage of one stage conversation
struct Completion {
    content: String,
    usage: TokenUsage,
}

/// Executes stages by prompting a language model as the delegated agent
pub struct LlmStageExecutor {
    provider: Arc<dyn LlmProvider>,
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    max_tool_rounds: usize,
}

impl LlmStageExecutor {
    /// Executor over any provider, using its default model
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            model: None,
            temperature: None,
            max_tokens: None,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    /// Executor backed by the OpenAI-compatible endpoint in `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &VitacrewConfig) -> AppResult<Self> {
        let provider = OpenAiCompatibleProvider::from_settings(&config.llm)?;
        let mut executor =
            Self::new(Arc::new(provider)).with_max_tool_rounds(config.pipeline.max_tool_rounds);
        executor.temperature = config.llm.temperature;
        executor.max_tokens = config.llm.max_tokens;
        Ok(executor)
    }

    /// Override the provider's default model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Limit the number of tool-calling rounds per stage
    #[must_use]
    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    /// Model requests are sent to
    #[must_use]
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    fn request(&self, messages: Vec<ChatMessage>) -> ChatRequest {
        let mut request = ChatRequest::new(messages).with_model(self.model());
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        request
    }

    /// Opening messages; the system prompt is folded into the task when the
    /// provider has no system role
    fn opening_messages(&self, input: &StageInput<'_>) -> Vec<ChatMessage> {
        let system = system_prompt(input.agent);
        let task = task_prompt(input);
        if self.provider.capabilities().supports_system_messages() {
            vec![ChatMessage::system(system), ChatMessage::user(task)]
        } else {
            vec![ChatMessage::user(format!("{system}\n\n{task}"))]
        }
    }

    /// Run one requested call, turning failures into a result the model can read
    fn run_tool_call(call: &FunctionCall, agent: &AgentDefinition) -> Value {
        let result = call.name.parse::<AgentTool>().and_then(|tool| {
            if agent.can_use(tool) {
                tool.invoke(&call.args, &MetricsEngine::global())
            } else {
                Err(ToolError::not_permitted(&call.name, &agent.role))
            }
        });
        match result {
            Ok(value) => value,
            Err(error) => {
                warn!(tool = %call.name, role = %agent.role, %error, "Tool call rejected");
                json!({ "error": error.to_string() })
            }
        }
    }

    async fn run_tool_loop(
        &self,
        mut messages: Vec<ChatMessage>,
        tools: &Tool,
        agent: &AgentDefinition,
    ) -> AppResult<Completion> {
        let mut usage = TokenUsage::default();

        for round in 0..self.max_tool_rounds {
            let response = self
                .provider
                .complete_with_tools(&self.request(messages.clone()), std::slice::from_ref(tools))
                .await?;
            if let Some(round_usage) = response.usage {
                usage = usage.accumulate(round_usage);
            }

            let Some(calls) = response.function_calls.filter(|calls| !calls.is_empty()) else {
                return Ok(Completion {
                    content: response.content.unwrap_or_default(),
                    usage,
                });
            };

            info!(round, calls = calls.len(), "Executing tool calls");
            if let Some(text) = response.content.filter(|text| !text.is_empty()) {
                messages.push(ChatMessage::assistant(text));
            }
            for call in &calls {
                let result = Self::run_tool_call(call, agent);
                messages.push(ChatMessage::user(format!(
                    "[Tool Result for {}]: {result}",
                    call.name
                )));
            }
        }

        debug!(
            rounds = self.max_tool_rounds,
            "Tool round limit reached; requesting final answer"
        );
        messages.push(ChatMessage::user(FINAL_ANSWER_PROMPT));
        let response = self.provider.complete(&self.request(messages)).await?;
        Ok(Completion {
            content: response.content,
            usage: response
                .usage
                .map_or(usage, |final_usage| usage.accumulate(final_usage)),
        })
    }
}

#[async_trait]
impl StageExecutor for LlmStageExecutor {
    async fn execute(&self, input: StageInput<'_>) -> AppResult<Value> {
        let messages = self.opening_messages(&input);
        let use_tools = !input.agent.tools.is_empty()
            && self.provider.capabilities().supports_function_calling();

        let completion = if use_tools {
            let tools = AgentTool::tool_set(&input.agent.tools);
            self.run_tool_loop(messages, &tools, input.agent).await?
        } else {
            let response = self.provider.complete(&self.request(messages)).await?;
            Completion {
                content: response.content,
                usage: response.usage.unwrap_or_default(),
            }
        };

        debug!(
            provider = self.provider.name(),
            model = self.model(),
            total_tokens = completion.usage.total_tokens,
            "Stage conversation finished"
        );

        let content = completion.content.trim();
        if content.is_empty() {
            return Err(AppError::external_service(
                self.provider.name(),
                format!("Empty response for stage '{}'", input.stage.stage_id),
            ));
        }
        Ok(Value::String(content.to_owned()))
    }
}

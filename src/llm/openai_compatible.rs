// ABOUTME: OpenAI-compatible chat-completions provider used to execute stages with a language model
// ABOUTME: Works with Ollama, vLLM, LocalAI or any hosted /chat/completions endpoint, with tool calls
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

//! # `OpenAI`-Compatible Provider
//!
//! One non-streaming `POST {base_url}/chat/completions` per call. Tool
//! results travel back as plain user messages, so the wire format only
//! needs `role` and `content` on the way out and the called function names
//! and arguments on the way back.
//!
//! Known local servers are recognized by port: Ollama (`11434`), vLLM
//! (`8000`) and `LocalAI` (`8080`).

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::{
    ChatRequest, ChatResponse, ChatResponseWithTools, FunctionCall, LlmCapabilities, LlmProvider,
    Tool,
};
use crate::config::LlmSettings;
use crate::errors::{AppError, AppResult, ErrorCode};

const SERVICE: &str = "LLM";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Local inference can take minutes for a long plan
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Longest slice of an unparseable body quoted in an error
const BODY_EXCERPT_CHARS: usize = 200;

/// Request and response bodies of the chat-completions endpoint
mod wire {
    use serde::{Deserialize, Serialize};

    use crate::llm::{ChatRequest, FunctionDeclaration, TokenUsage, Tool};

    #[derive(Debug, Serialize)]
    pub struct CompletionBody<'a> {
        pub model: &'a str,
        pub messages: Vec<OutgoingMessage<'a>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub temperature: Option<f32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub max_tokens: Option<u32>,
        pub stream: bool,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        pub tools: Vec<OfferedFunction<'a>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub tool_choice: Option<&'static str>,
    }

    impl<'a> CompletionBody<'a> {
        pub fn new(request: &'a ChatRequest, model: &'a str, tools: &'a [Tool]) -> Self {
            let tools: Vec<OfferedFunction<'a>> = tools
                .iter()
                .flat_map(|tool| &tool.function_declarations)
                .map(|function| OfferedFunction {
                    kind: "function",
                    function,
                })
                .collect();
            let tool_choice = (!tools.is_empty()).then_some("auto");

            Self {
                model,
                messages: request
                    .messages
                    .iter()
                    .map(|message| OutgoingMessage {
                        role: message.role.as_str(),
                        content: &message.content,
                    })
                    .collect(),
                temperature: request.temperature,
                max_tokens: request.max_tokens,
                stream: false,
                tools,
                tool_choice,
            }
        }
    }

    #[derive(Debug, Serialize)]
    pub struct OutgoingMessage<'a> {
        pub role: &'static str,
        pub content: &'a str,
    }

    /// `FunctionDeclaration` already serializes as `{name, description, parameters}`
    #[derive(Debug, Serialize)]
    pub struct OfferedFunction<'a> {
        #[serde(rename = "type")]
        pub kind: &'static str,
        pub function: &'a FunctionDeclaration,
    }

    #[derive(Debug, Deserialize)]
    pub struct Completion {
        pub model: String,
        pub choices: Vec<Choice>,
        #[serde(default)]
        pub usage: Option<TokenUsage>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Choice {
        pub message: Reply,
        #[serde(default)]
        pub finish_reason: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Reply {
        #[serde(default)]
        pub content: Option<String>,
        #[serde(default)]
        pub tool_calls: Option<Vec<RequestedCall>>,
    }

    #[derive(Debug, Deserialize)]
    pub struct RequestedCall {
        pub function: RequestedFunction,
    }

    #[derive(Debug, Deserialize)]
    pub struct RequestedFunction {
        pub name: String,
        /// JSON-encoded object, as a string
        pub arguments: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct ErrorEnvelope {
        pub error: ErrorBody,
    }

    #[derive(Debug, Deserialize)]
    pub struct ErrorBody {
        pub message: String,
    }
}

/// Configuration for the `OpenAI`-compatible provider
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleConfig {
    /// Base URL for the API (e.g., <http://localhost:11434/v1>)
    pub base_url: String,
    /// API key (optional for local servers)
    pub api_key: Option<String>,
    /// Model used when a request names none
    pub default_model: String,
    /// Provider name for display/logging
    pub provider_name: String,
    /// Capabilities of this provider
    pub capabilities: LlmCapabilities,
}

impl OpenAiCompatibleConfig {
    /// Build a provider configuration from the LLM settings
    ///
    /// The provider name is guessed from the well-known local ports.
    #[must_use]
    pub fn from_settings(settings: &LlmSettings) -> Self {
        let provider_name = [(":11434", "ollama"), (":8000", "vllm"), (":8080", "localai")]
            .into_iter()
            .find_map(|(port, name)| settings.base_url.contains(port).then_some(name))
            .unwrap_or("openai-compatible");

        Self {
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
            default_model: settings.model.clone(),
            provider_name: provider_name.to_owned(),
            capabilities: LlmCapabilities::FUNCTION_CALLING | LlmCapabilities::SYSTEM_MESSAGES,
        }
    }
}

/// Generic `OpenAI`-compatible LLM provider
pub struct OpenAiCompatibleProvider {
    client: Client,
    config: OpenAiCompatibleConfig,
}

impl OpenAiCompatibleProvider {
    /// Create a provider with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: OpenAiCompatibleConfig) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        debug!(
            provider = %config.provider_name,
            base_url = %config.base_url,
            model = %config.default_model,
            "LLM provider ready"
        );

        Ok(Self { client, config })
    }

    /// Create a provider from LLM settings
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_settings(settings: &LlmSettings) -> AppResult<Self> {
        Self::new(OpenAiCompatibleConfig::from_settings(settings))
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Send one completion request and decode the first choice
    async fn chat(
        &self,
        request: &ChatRequest,
        tools: &[Tool],
    ) -> AppResult<ChatResponseWithTools> {
        let model = request
            .model
            .as_deref()
            .unwrap_or(&self.config.default_model);
        let body = wire::CompletionBody::new(request, model, tools);
        debug!(
            messages = body.messages.len(),
            tools = body.tools.len(),
            "Sending chat completion"
        );

        let mut http = self.client.post(self.completions_url()).json(&body);
        if let Some(api_key) = &self.config.api_key {
            http = http.bearer_auth(api_key);
        }

        let response = http.send().await.map_err(|e| self.transport_error(&e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| {
            AppError::external_service(SERVICE, format!("Failed to read response: {e}"))
        })?;
        if !status.is_success() {
            return Err(status_error(status, &text));
        }

        let completion: wire::Completion = serde_json::from_str(&text).map_err(|e| {
            AppError::external_service(SERVICE, format!("Failed to parse response: {e}"))
        })?;
        let choice = completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::external_service(SERVICE, "API returned no choices"))?;

        let function_calls = choice
            .message
            .tool_calls
            .filter(|calls| !calls.is_empty())
            .map(|calls| calls.into_iter().map(into_function_call).collect());

        Ok(ChatResponseWithTools {
            content: choice.message.content,
            function_calls,
            model: completion.model,
            usage: completion.usage,
            finish_reason: choice.finish_reason,
        })
    }

    fn transport_error(&self, error: &reqwest::Error) -> AppError {
        let provider = &self.config.provider_name;
        warn!(%provider, %error, "LLM request failed");
        if error.is_connect() {
            AppError::new(
                ErrorCode::ExternalServiceUnavailable,
                format!(
                    "Cannot connect to {provider}. Is the server running at {}?",
                    self.config.base_url
                ),
            )
        } else if error.is_timeout() {
            AppError::new(
                ErrorCode::ExternalServiceUnavailable,
                format!("Request to {provider} timed out"),
            )
        } else {
            AppError::external_service(SERVICE, error.to_string())
        }
    }
}

/// Arguments that are not valid JSON become `null`; the tool then reports
/// its missing parameters back to the model
fn into_function_call(call: wire::RequestedCall) -> FunctionCall {
    let args = serde_json::from_str(&call.function.arguments).unwrap_or_default();
    FunctionCall {
        name: call.function.name,
        args,
    }
}

/// Map a non-success status to an error, quoting the server's message
fn status_error(status: StatusCode, body: &str) -> AppError {
    let detail = serde_json::from_str::<wire::ErrorEnvelope>(body).map_or_else(
        |_| body.chars().take(BODY_EXCERPT_CHARS).collect::<String>(),
        |envelope| envelope.error.message,
    );

    match status.as_u16() {
        401 | 403 => AppError::new(
            ErrorCode::ExternalAuthFailed,
            format!("API authentication failed: {detail}"),
        ),
        429 => AppError::new(
            ErrorCode::ExternalRateLimited,
            format!("LLM rate limit reached: {detail}"),
        ),
        400 => AppError::invalid_input(format!("API validation error: {detail}")),
        404 => AppError::not_found(format!("Model or endpoint ({detail})")),
        502..=504 => AppError::new(
            ErrorCode::ExternalServiceUnavailable,
            format!("LLM server is not responding ({status}): {detail}"),
        ),
        _ => AppError::external_service(SERVICE, format!("API error ({status}): {detail}")),
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.config.provider_name
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.config.capabilities
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(skip_all, fields(provider = %self.config.provider_name))]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let response = self.chat(request, &[]).await?;
        Ok(ChatResponse {
            content: response.content.unwrap_or_default(),
            model: response.model,
            usage: response.usage,
            finish_reason: response.finish_reason,
        })
    }

    #[instrument(skip_all, fields(provider = %self.config.provider_name))]
    async fn complete_with_tools(
        &self,
        request: &ChatRequest,
        tools: &[Tool],
    ) -> Result<ChatResponseWithTools, AppError> {
        self.chat(request, tools).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatMessage, FunctionDeclaration};

    fn provider(base_url: &str) -> OpenAiCompatibleProvider {
        let settings = LlmSettings {
            base_url: base_url.to_owned(),
            ..LlmSettings::default()
        };
        OpenAiCompatibleProvider::from_settings(&settings).unwrap()
    }

    fn declaration(name: &str) -> FunctionDeclaration {
        FunctionDeclaration {
            name: name.to_owned(),
            description: format!("{name} tool"),
            parameters: None,
        }
    }

    #[test]
    fn test_provider_name_detected_from_port() {
        assert_eq!(provider("http://localhost:11434/v1").name(), "ollama");
        assert_eq!(provider("http://localhost:8000/v1").name(), "vllm");
        assert_eq!(
            provider("https://api.example.com/v1").name(),
            "openai-compatible"
        );
    }

    #[test]
    fn test_completions_url_trims_trailing_slash() {
        assert_eq!(
            provider("http://localhost:11434/v1/").completions_url(),
            "http://localhost:11434/v1/chat/completions"
        );
    }

    #[test]
    fn test_status_errors() {
        let body = r#"{"error":{"message":"bad key","type":"auth"}}"#;
        let error = status_error(StatusCode::UNAUTHORIZED, body);
        assert_eq!(error.code, ErrorCode::ExternalAuthFailed);
        assert!(error.message.ends_with("bad key"));

        let error = status_error(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(error.code, ErrorCode::ExternalServiceUnavailable);
        assert!(error.message.contains("upstream down"));
    }

    #[test]
    fn test_body_flattens_tool_declarations() {
        let request = ChatRequest::new(vec![ChatMessage::user("plan")]).with_temperature(0.5);
        let tools = vec![Tool {
            function_declarations: vec![
                declaration("bmr_calculator"),
                declaration("macro_calculator"),
            ],
        }];

        let body = serde_json::to_value(wire::CompletionBody::new(&request, "m", &tools)).unwrap();
        assert_eq!(body["model"], "m");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["tool_choice"], "auto");
        assert_eq!(body["tools"][1]["type"], "function");
        assert_eq!(body["tools"][1]["function"]["name"], "macro_calculator");
        assert!(body["tools"][1]["function"].get("parameters").is_none());
    }

    #[test]
    fn test_body_without_tools_omits_tool_fields() {
        let request = ChatRequest::new(vec![ChatMessage::system("s")]);
        let body = serde_json::to_value(wire::CompletionBody::new(&request, "m", &[])).unwrap();
        assert!(body.get("tools").is_none());
        assert!(body.get("tool_choice").is_none());
        assert!(body.get("temperature").is_none());
        assert_eq!(body["stream"], false);
    }

    #[test]
    fn test_completion_decodes_tool_calls() {
        let json = r#"{
            "model": "llama3.1:8b",
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "bmr_calculator", "arguments": "{not json"}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        }"#;
        let completion: wire::Completion = serde_json::from_str(json).unwrap();
        assert_eq!(completion.usage.unwrap().total_tokens, 15);

        let choice = completion.choices.into_iter().next().unwrap();
        assert!(choice.message.content.is_none());
        let call = into_function_call(choice.message.tool_calls.unwrap().remove(0));
        assert_eq!(call.name, "bmr_calculator");
        assert!(call.args.is_null());
    }
}

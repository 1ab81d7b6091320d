//! Chat completion client for OpenAI-compatible APIs
//!
//! Groq is the default provider. Any service that accepts
//! `POST {base_url}/chat/completions` with a bearer key works the same way.

use std::time::Instant;

use async_trait::async_trait;
use repodoc_core::{ChatRequest, ErrorContext, LlmConfig, RepodocError, RepodocResult, Summarizer};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// HTTP summarizer backed by a chat completion endpoint
pub struct RepodocLlmClient {
    http: reqwest::Client,
    config: LlmConfig,
    api_key: Option<String>,
}

impl RepodocLlmClient {
    /// Create a client; the API key comes from the config or its environment variable
    pub fn new(config: LlmConfig) -> RepodocResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| RepodocError::Network {
                message: format!("Failed to build HTTP client: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("llm_client").with_operation("new"),
            })?;

        let api_key = config.resolve_api_key();

        info!(
            provider = %config.provider,
            base_url = %config.base_url,
            has_api_key = api_key.is_some(),
            "Created LLM client"
        );

        Ok(Self {
            http,
            config,
            api_key,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn llm_error(&self, message: String, model: &str, operation: &str) -> RepodocError {
        RepodocError::Llm {
            message,
            provider: Some(self.config.provider.clone()),
            model: Some(model.to_string()),
            context: ErrorContext::new("llm_client").with_operation(operation),
        }
    }
}

#[async_trait]
impl Summarizer for RepodocLlmClient {
    async fn complete(&self, request: ChatRequest) -> RepodocResult<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| RepodocError::Llm {
            message: format!("No API key configured for provider {}", self.config.provider),
            provider: Some(self.config.provider.clone()),
            model: Some(request.model.clone()),
            context: ErrorContext::new("llm_client")
                .with_operation("complete")
                .with_suggestion(&format!(
                    "Pass --api-key or set the {} environment variable",
                    self.config.api_key_env
                )),
        })?;

        let start_time = Instant::now();
        debug!(
            model = %request.model,
            prompt_chars = request.user_prompt.len(),
            "Sending chat completion request"
        );

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&wire_request(&request))
            .send()
            .await
            .map_err(|e| RepodocError::Network {
                message: format!("Chat completion request failed: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("llm_client")
                    .with_operation("complete")
                    .with_metadata("model", &request.model),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.llm_error(
                format!("{} returned {}: {}", self.config.provider, status, body.trim()),
                &request.model,
                "complete",
            ));
        }

        let body = response.text().await.map_err(|e| RepodocError::Network {
            message: format!("Failed to read chat completion response: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("llm_client").with_operation("read_response"),
        })?;

        let content = reply_content(&body).ok_or_else(|| {
            self.llm_error(
                "No text content in chat completion response".to_string(),
                &request.model,
                "parse_response",
            )
        })?;

        info!(
            model = %request.model,
            duration_ms = start_time.elapsed().as_millis() as u64,
            reply_chars = content.len(),
            "Chat completion finished"
        );

        Ok(content)
    }

    fn provider(&self) -> &str {
        &self.config.provider
    }
}

fn wire_request(request: &ChatRequest) -> ChatCompletionRequest<'_> {
    ChatCompletionRequest {
        model: &request.model,
        messages: vec![
            WireMessage {
                role: "system",
                content: &request.system_prompt,
            },
            WireMessage {
                role: "user",
                content: &request.user_prompt,
            },
        ],
        max_tokens: request.max_tokens,
        temperature: request.temperature,
    }
}

/// Text of the first choice, if the body has one
fn reply_content(body: &str) -> Option<String> {
    let response: ChatCompletionResponse = serde_json::from_str(body).ok()?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
}

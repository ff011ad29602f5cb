use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LlmError;
use crate::settings::Settings;

static FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*```[A-Za-z]*\s*\n?(.*?)\s*```\s*$").unwrap());

/// Schema descriptor sent as `response_format.json_schema`.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSchema {
    pub name: &'static str,
    pub strict: bool,
    pub schema: serde_json::Value,
}

pub struct CompletionRequest<'a> {
    pub system: &'a str,
    pub user: &'a str,
    pub schema: &'a JsonSchema,
}

/// Anything that can answer a schema-constrained chat request with raw JSON text.
#[async_trait]
pub trait CompletionBackend {
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError>;
}

/// OpenAI-compatible chat completions client (OpenRouter by default).
pub struct ChatClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    auth: HeaderValue,
}

impl ChatClient {
    pub fn from_settings(settings: &Settings) -> Result<Self, LlmError> {
        let api_key = std::env::var(&settings.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LlmError::MissingApiKey(settings.api_key_env.clone()))?;
        let auth = HeaderValue::from_str(&format!("Bearer {}", api_key.trim()))
            .map_err(|_| LlmError::InvalidApiKey(settings.api_key_env.clone()))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(ChatClient {
            client,
            endpoint: format!("{}/chat/completions", settings.base_url.trim_end_matches('/')),
            model: settings.model.clone(),
            auth,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionBackend for ChatClient {
    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<String, LlmError> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, self.auth.clone());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let body = build_body(&self.model, request);
        debug!(
            schema = request.schema.name,
            user_chars = request.user.len(),
            "sending chat completion"
        );
        let resp = self
            .client
            .post(&self.endpoint)
            .headers(headers)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(LlmError::Status { status, body });
        }

        let parsed: ChatResponse = resp.json().await?;
        first_content(parsed)
    }
}

fn build_body<'a>(model: &'a str, request: &'a CompletionRequest<'a>) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: request.system,
            },
            ChatMessage {
                role: "user",
                content: request.user,
            },
        ],
        response_format: ResponseFormat {
            kind: "json_schema",
            json_schema: request.schema,
        },
    }
}

fn first_content(resp: ChatResponse) -> Result<String, LlmError> {
    resp.choices
        .into_iter()
        .find_map(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or(LlmError::EmptyResponse)
}

/// Decode a model reply, tolerating a surrounding Markdown code fence.
pub fn parse_structured<T: DeserializeOwned>(content: &str) -> Result<T, LlmError> {
    let json = match FENCE_RE.captures(content) {
        Some(caps) => caps.get(1).map_or("", |m| m.as_str()),
        None => content.trim(),
    };
    Ok(serde_json::from_str(json)?)
}

/// One schema-constrained round trip, decoded into `T`.
pub async fn request_structured<B, T>(backend: &B, request: &CompletionRequest<'_>) -> Result<T, LlmError>
where
    B: CompletionBackend + ?Sized,
    T: DeserializeOwned,
{
    let content = backend.complete(request).await?;
    parse_structured(&content)
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat<'a>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    json_schema: &'a JsonSchema,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}

// ── Tests ──

use std::time::Duration;

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::{Deserialize, Serialize};

use crate::{
    config::GenerationSettings,
    types::{Credential, GatewayReply, ModelUsage},
    ModelGateway,
};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, thiserror::Error)]
pub enum OpenRouterError {
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Malformed completion envelope: {0}")]
    MalformedEnvelope(String),
}

impl OpenRouterError {
    pub fn is_transient(&self) -> bool {
        match self {
            OpenRouterError::Request(e) => e.is_timeout() || e.is_connect(),
            OpenRouterError::Middleware(reqwest_middleware::Error::Reqwest(e)) => {
                e.is_timeout() || e.is_connect()
            }
            OpenRouterError::Middleware(reqwest_middleware::Error::Middleware(_)) => false,
            OpenRouterError::Api { status, .. } => *status == 429 || *status >= 500,
            OpenRouterError::MalformedEnvelope(_) => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Retries for transient transport failures only. Zero disables retrying.
    pub max_retries: u32,
    pub referer: Option<String>,
    pub title: Option<String>,
    pub generation: GenerationSettings,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: 0,
            referer: None,
            title: None,
            generation: GenerationSettings::default(),
        }
    }
}

#[derive(Clone)]
pub struct OpenRouterClient {
    client: ClientWithMiddleware,
    config: OpenRouterConfig,
}

impl OpenRouterClient {
    pub fn new(config: OpenRouterConfig) -> Result<Self, OpenRouterError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(http)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self { client, config })
    }

    #[tracing::instrument(skip(self, prompt, credential), fields(prompt_chars = prompt.len()))]
    pub async fn send_completion_request(
        &self,
        model: &str,
        prompt: &str,
        credential: &Credential,
    ) -> Result<CompletionResponse, OpenRouterError> {
        let body = ChatCompletionRequest::new(model, prompt, &self.config.generation);

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(credential.expose())
            .json(&body);

        if let Some(referer) = &self.config.referer {
            request = request.header("HTTP-Referer", referer.as_str());
        }
        if let Some(title) = &self.config.title {
            request = request.header("X-Title", title.as_str());
        }

        let resp = request
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            tracing::error!(status, "Completion request rejected by provider");
            return Err(OpenRouterError::Api { status, message });
        }

        let raw = resp.text().await?;
        CompletionResponse::from_json(&raw)
    }
}

impl ModelGateway for OpenRouterClient {
    type Error = OpenRouterError;

    async fn invoke(
        &self,
        prompt: &str,
        model: &str,
        credential: &Credential,
    ) -> Result<GatewayReply, Self::Error> {
        self.send_completion_request(model, prompt, credential)
            .await?
            .into_reply()
    }
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: [ChatMessage<'a>; 2],
    pub temperature: f64,
    pub max_tokens: u32,
    pub response_format: ResponseFormat,
}

impl<'a> ChatCompletionRequest<'a> {
    pub fn new(model: &'a str, prompt: &'a str, generation: &'a GenerationSettings) -> Self {
        Self {
            model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &generation.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: generation.temperature,
            max_tokens: generation.max_tokens,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub id: Option<String>,
    pub choices: Vec<CompletionChoice>,
    pub usage: Option<ModelUsage>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    pub message: CompletionMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionMessage {
    pub role: String,
    pub content: Option<String>,
}

impl CompletionResponse {
    pub fn from_json(raw: &str) -> Result<Self, OpenRouterError> {
        serde_json::from_str(raw).map_err(|e| OpenRouterError::MalformedEnvelope(e.to_string()))
    }

    /// Takes `choices[0].message.content` and the usage counters.
    pub fn into_reply(self) -> Result<GatewayReply, OpenRouterError> {
        let usage = self.usage.ok_or_else(|| {
            OpenRouterError::MalformedEnvelope("Missing usage in response".into())
        })?;

        let content = self
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                OpenRouterError::MalformedEnvelope("No content in response".into())
            })?;

        Ok(GatewayReply { content, usage })
    }
}

use crate::config::{Config, LlmProvider};
use crate::error::ProviderError;
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// Generative-content endpoint used by the Gemini integration
pub const GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

/// Reply returned for providers that have no integration yet
pub const NOT_IMPLEMENTED_REPLY: &str = "Selected model is not implemented yet.";

/// Header carrying the Gemini API key
const API_KEY_HEADER: &str = "X-goog-api-key";

/// Longest slice of a raw error body kept in an error message
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Trait for chat provider implementations
pub trait ChatProvider: Send + Sync {
    /// Identifier of the provider, as stored in the configuration
    fn name(&self) -> &str;

    /// Send a single prompt and return the reply text
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ProviderError>> + Send + 'a>>;
}

/// Builds a provider from a configuration snapshot
pub type ProviderResolver =
    Arc<dyn Fn(&Config) -> Result<Arc<dyn ChatProvider>, ProviderError> + Send + Sync>;

/// Pick the provider for the given configuration
///
/// Fails with [`ProviderError::MissingApiKey`] before any request is built when
/// no key is configured. Providers other than Gemini resolve to
/// [`UnimplementedProvider`], which answers with a fixed reply.
pub fn resolve_provider(config: &Config) -> Result<Arc<dyn ChatProvider>, ProviderError> {
    if !config.has_api_key() {
        return Err(ProviderError::MissingApiKey);
    }

    match &config.llm {
        LlmProvider::Gemini => Ok(Arc::new(GeminiProvider::new(config.api_key.clone())?)),
        other => Ok(Arc::new(UnimplementedProvider::new(other.clone()))),
    }
}

/// The default resolver used by chat windows
pub fn default_resolver() -> ProviderResolver {
    Arc::new(resolve_provider)
}

/// Gemini backend for the generative-language API
///
/// Posts the raw prompt as a single content part and reads back the first
/// candidate's first text part.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    endpoint: String,
}

/// Request format for the generateContent API
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

impl GeminiProvider {
    /// Create a Gemini backend for the public endpoint
    pub fn new(api_key: String) -> Result<Self, ProviderError> {
        Self::with_endpoint(api_key, GEMINI_ENDPOINT.to_string())
    }

    /// Create a Gemini backend for a custom endpoint
    pub fn with_endpoint(api_key: String, endpoint: String) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60)) // 60 second timeout for LLM requests
            .build()?;

        Ok(Self {
            client,
            api_key,
            endpoint,
        })
    }

    fn build_request(prompt: &str) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
        }
    }

    /// Extract the reply text, or pretty-print the whole body if the shape differs
    ///
    /// Only `candidates[0].content.parts[0].text` is read; later candidates
    /// and parts may have any shape.
    fn extract_reply(body: &Value) -> String {
        let first_text = body
            .get("candidates")
            .and_then(|candidates| candidates.get(0))
            .and_then(|candidate| candidate.get("content"))
            .and_then(|content| content.get("parts"))
            .and_then(|parts| parts.get(0))
            .and_then(|part| part.get("text"))
            .and_then(Value::as_str);

        match first_text {
            Some(text) => text.to_string(),
            None => {
                warn!("Unexpected Gemini response shape, returning raw body");
                serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string())
            }
        }
    }

    /// Pull `error.message` out of an error body
    ///
    /// Bodies without one are reported as `<status>: <body>`, cut to
    /// [`MAX_ERROR_BODY_CHARS`]. An empty body gives "Unknown API error".
    fn extract_error_message(status: StatusCode, body: &str) -> String {
        let message = serde_json::from_str::<Value>(body).ok().and_then(|value| {
            value
                .get("error")
                .and_then(|error| error.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        });
        if let Some(message) = message {
            return message;
        }

        let body = body.trim();
        if body.is_empty() {
            return "Unknown API error".to_string();
        }

        let mut excerpt: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        if body.chars().count() > MAX_ERROR_BODY_CHARS {
            excerpt.push_str("...");
        }
        format!("{}: {}", status, excerpt)
    }
}

impl ChatProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn generate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ProviderError>> + Send + 'a>> {
        Box::pin(async move {
            let request = Self::build_request(prompt);

            let response = self
                .client
                .post(&self.endpoint)
                .header("Content-Type", "application/json")
                .header(API_KEY_HEADER, &self.api_key)
                .json(&request)
                .send()
                .await?;

            let status = response.status();
            let body = response.text().await?;
            debug!("Gemini responded with status {}", status);

            if !status.is_success() {
                return Err(ProviderError::BackendError(Self::extract_error_message(
                    status, &body,
                )));
            }

            let value: Value = serde_json::from_str(&body).map_err(|e| {
                ProviderError::InvalidResponse(format!("Failed to parse Gemini response: {}", e))
            })?;

            Ok(Self::extract_reply(&value))
        })
    }
}

/// Stand-in for providers without an integration
///
/// Always succeeds with [`NOT_IMPLEMENTED_REPLY`] and sends nothing.
pub struct UnimplementedProvider {
    provider: LlmProvider,
}

impl UnimplementedProvider {
    pub fn new(provider: LlmProvider) -> Self {
        Self { provider }
    }
}

impl ChatProvider for UnimplementedProvider {
    fn name(&self) -> &str {
        self.provider.as_str()
    }

    fn generate<'a>(
        &'a self,
        _prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, ProviderError>> + Send + 'a>> {
        Box::pin(async move { Ok(NOT_IMPLEMENTED_REPLY.to_string()) })
    }
}

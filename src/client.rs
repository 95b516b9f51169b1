//! The analysis client: one schema-constrained model call per audit attempt.
//!
//! This module is intentionally thin — all prompt and schema content lives
//! in [`crate::prompts`] so the contract can change without touching the
//! transport or decode logic here.
//!
//! ## Failure policy
//!
//! One attempt per invocation: no internal retry, no caching, no request
//! deduplication. Every failure on the way to a validated
//! [`AnalysisResult`] maps to a named [`AuditError`] variant — transport
//! errors and schema violations stay distinguishable in the log trail even
//! though the session shows one generic message for both.

use crate::config::AuditConfig;
use crate::error::AuditError;
use crate::prompts::{self, SYSTEM_INSTRUCTION};
use crate::result::{AnalysisRequest, AnalysisResult};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Environment variables consulted for the API credential, in order.
const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

fn api_key_from_env() -> Option<String> {
    API_KEY_ENV_VARS
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
}

// ── Shared HTTP client ───────────────────────────────────────────────────

static HTTP: OnceCell<reqwest::Client> = OnceCell::new();

/// Initialise the process-wide HTTP client.
///
/// Call once during application startup; calling again is a no-op. Library
/// users who skip it get the same initialisation lazily on first request.
pub fn init_http() {
    HTTP.get_or_init(build_http_client);
}

fn http() -> &'static reqwest::Client {
    HTTP.get_or_init(build_http_client)
}

fn build_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(concat!("cvinsight/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to build HTTP client")
}

// ── Provider seam ────────────────────────────────────────────────────────

/// A backend able to answer one audit prompt with raw JSON text.
///
/// [`GeminiClient`] is the production implementation; tests and embedders
/// substitute their own via [`AuditConfig::provider`].
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Send one prompt with the declared response schema and return the
    /// model's raw reply text.
    async fn generate(
        &self,
        system_instruction: &str,
        prompt: &str,
        schema: &Value,
    ) -> Result<String, AuditError>;
}

// ── Gemini wire types ────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: ContentPayload<'a>,
    contents: Vec<ContentPayload<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct ContentPayload<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
    response_schema: &'a Value,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// First text part of the first candidate, if any.
    fn text(self) -> Option<String> {
        self.candidates?
            .into_iter()
            .next()?
            .content?
            .parts?
            .into_iter()
            .find_map(|p| p.text)
    }
}

#[derive(Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Deserialize)]
struct GeminiErrorBody {
    message: String,
}

// ── Gemini provider ──────────────────────────────────────────────────────

/// Production provider against the Generative Language `generateContent`
/// endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    endpoint: String,
    model: String,
    api_key: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
            timeout,
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl AnalysisProvider for GeminiClient {
    async fn generate(
        &self,
        system_instruction: &str,
        prompt: &str,
        schema: &Value,
    ) -> Result<String, AuditError> {
        let body = GenerateContentRequest {
            system_instruction: ContentPayload {
                parts: vec![TextPart {
                    text: system_instruction,
                }],
            },
            contents: vec![ContentPayload {
                parts: vec![TextPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: schema,
            },
        };

        let response = http()
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AuditError::TransportFailure {
                        detail: format!("timed out after {}s", self.timeout.as_secs()),
                    }
                } else {
                    AuditError::TransportFailure {
                        detail: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            // The endpoint wraps errors as {"error": {"message": …}}.
            let message = serde_json::from_str::<GeminiErrorEnvelope>(&raw)
                .map(|e| e.error.message)
                .unwrap_or(raw);
            warn!("model endpoint returned {status}: {message}");
            return Err(AuditError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|e| AuditError::MalformedResponse {
                    detail: format!("reply envelope: {e}"),
                })?;

        envelope.text().ok_or(AuditError::MalformedResponse {
            detail: "reply carried no text candidate".into(),
        })
    }
}

// ── Analysis client ──────────────────────────────────────────────────────

/// Builds the payload, makes the call, and validates the reply.
#[derive(Clone)]
pub struct AnalysisClient {
    provider: Arc<dyn AnalysisProvider>,
}

impl AnalysisClient {
    /// Resolve a provider from the config, most-specific first:
    ///
    /// 1. A pre-built [`AuditConfig::provider`], used as-is.
    /// 2. An explicit [`AuditConfig::api_key`].
    /// 3. `GEMINI_API_KEY`, then `API_KEY`, from the environment.
    pub fn from_config(config: &AuditConfig) -> Result<Self, AuditError> {
        if let Some(ref provider) = config.provider {
            return Ok(Self {
                provider: Arc::clone(provider),
            });
        }

        let api_key = match config.api_key.clone() {
            Some(key) => key,
            None => api_key_from_env().ok_or(AuditError::MissingApiKey)?,
        };

        Ok(Self {
            provider: Arc::new(GeminiClient::new(
                config.endpoint.as_str(),
                config.model.as_str(),
                api_key,
                Duration::from_secs(config.api_timeout_secs),
            )),
        })
    }

    /// Wrap a pre-built provider.
    pub fn with_provider(provider: Arc<dyn AnalysisProvider>) -> Self {
        Self { provider }
    }

    /// Run one analysis attempt.
    ///
    /// # Errors
    /// [`AuditError::TransportFailure`] / [`AuditError::ApiError`] when the
    /// endpoint cannot be reached or refuses the call;
    /// [`AuditError::MalformedResponse`] when the reply fails JSON or
    /// schema validation. Never panics on an untrusted payload.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AuditError> {
        let prompt = prompts::build_prompt(request);
        debug!(
            resume_chars = request.resume_text.len(),
            has_jd = request.job_description.is_some(),
            "dispatching analysis"
        );

        let raw = self
            .provider
            .generate(SYSTEM_INSTRUCTION, &prompt, prompts::response_schema())
            .await?;

        decode_reply(&raw)
    }
}

/// Decode the model's raw reply text into a validated [`AnalysisResult`].
fn decode_reply(raw: &str) -> Result<AnalysisResult, AuditError> {
    let text = strip_json_fences(raw);
    serde_json::from_str(text).map_err(|e| AuditError::MalformedResponse {
        detail: e.to_string(),
    })
}

/// Strip ```json … ``` or ``` … ``` fences some models wrap JSON in.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(str::trim)
            .unwrap_or_else(|| stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(str::trim)
            .unwrap_or_else(|| stripped.trim_start())
    } else {
        text
    }
}

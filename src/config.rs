//! Configuration for resume audits.
//!
//! Everything tunable lives in [`AuditConfig`], built via its
//! [`AuditConfigBuilder`]. One struct keeps the knobs shareable across
//! calls and easy to log when two runs disagree.

use crate::client::AnalysisProvider;
use crate::error::AuditError;
use std::fmt;
use std::sync::Arc;

/// Default model identifier for the audit call.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Default base URL of the Generative Language API.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Configuration for a resume audit.
///
/// # Example
/// ```rust
/// use cvinsight::AuditConfig;
///
/// let config = AuditConfig::builder()
///     .model("gemini-3-flash-preview")
///     .api_timeout_secs(60)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct AuditConfig {
    /// Model identifier appended to the endpoint path.
    pub model: String,

    /// Base URL of the model API. Overridable for proxies and tests.
    pub endpoint: String,

    /// API credential. If `None`, `GEMINI_API_KEY` then `API_KEY` are read
    /// from the environment at provider-resolution time.
    pub api_key: Option<String>,

    /// Per-call request timeout in seconds. Default: 120.
    ///
    /// The original client let the call hang indefinitely; a bound here
    /// turns a dead endpoint into an ordinary transport failure the user
    /// can retry.
    pub api_timeout_secs: u64,

    /// Pre-constructed provider. Takes precedence over `api_key` and the
    /// environment; the seam tests and embedders inject through.
    pub provider: Option<Arc<dyn AnalysisProvider>>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            api_timeout_secs: 120,
            provider: None,
        }
    }
}

impl fmt::Debug for AuditConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditConfig")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn AnalysisProvider>"))
            .finish()
    }
}

impl AuditConfig {
    /// Create a new builder for `AuditConfig`.
    pub fn builder() -> AuditConfigBuilder {
        AuditConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AuditConfig`].
#[derive(Debug)]
pub struct AuditConfigBuilder {
    config: AuditConfig,
}

impl AuditConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn provider(mut self, provider: Arc<dyn AnalysisProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AuditConfig, AuditError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(AuditError::InvalidConfig("model must not be empty".into()));
        }
        if c.api_timeout_secs == 0 {
            return Err(AuditError::InvalidConfig(
                "api_timeout_secs must be ≥ 1".into(),
            ));
        }
        if c.endpoint.trim().is_empty() {
            return Err(AuditError::InvalidConfig("endpoint must not be empty".into()));
        }
        Ok(self.config)
    }
}

//! # cvinsight
//!
//! Audit PDF resumes for professional clarity and ATS compliance using a
//! generative-model backend.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF upload
//!  │
//!  ├─ 1. Extract   page-ordered text via lopdf (≥ 50 chars or rejected)
//!  ├─ 2. Prompt    fixed system instruction + JD / general framing
//!  ├─ 3. Analyze   one schema-constrained generateContent call
//!  ├─ 4. Gate      isEnglish=false suppresses every other field
//!  └─ 5. Publish   result or fixed error message in the session state
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cvinsight::{AnalysisClient, AuditConfig, AuditSession, UploadSlot, PDF_MEDIA_TYPE};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API key auto-detected from GEMINI_API_KEY / API_KEY
//!     let config = AuditConfig::default();
//!     let client = AnalysisClient::from_config(&config)?;
//!
//!     let mut session = AuditSession::new();
//!     let bytes = std::fs::read("resume.pdf")?;
//!     session.attach(UploadSlot::Resume, PDF_MEDIA_TYPE, &bytes)?;
//!     session.analyze(&client).await?;
//!
//!     let result = session.state().result.as_ref().expect("settled");
//!     println!("overall {} / ats {}", result.overall_score, result.ats_score);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `cvinsight` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! cvinsight = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod prompts;
pub mod report;
pub mod result;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::{init_http, AnalysisClient, AnalysisProvider, GeminiClient};
pub use config::{AuditConfig, AuditConfigBuilder, DEFAULT_ENDPOINT, DEFAULT_MODEL};
pub use error::AuditError;
pub use extract::{extract_text, MIN_EXTRACTED_CHARS};
pub use report::{render_report, save_report, REPORT_FILE_PREFIX};
pub use result::{AnalysisRequest, AnalysisResult, JobMatch, SectionFeedback, SectionScores};
pub use session::{AnalysisState, AuditSession, SessionPhase, UploadSlot, PDF_MEDIA_TYPE};

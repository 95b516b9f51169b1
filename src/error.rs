//! Error types for the cvinsight library.
//!
//! The taxonomy distinguishes three failure surfaces:
//!
//! * **Upload/extraction** ([`AuditError::UnsupportedFormat`],
//!   [`AuditError::ParseFailure`], [`AuditError::InsufficientText`]) —
//!   surfaced immediately and independently per upload action.
//!
//! * **Analysis** ([`AuditError::TransportFailure`], [`AuditError::ApiError`],
//!   [`AuditError::MalformedResponse`]) — the session collapses all of these
//!   into one generic user-facing message; the precise variant is kept for
//!   the log trail. See [`AuditError::user_message`].
//!
//! * **Gates** ([`AuditError::EmptyInput`], [`AuditError::NonEnglishContent`])
//!   — each with its own fixed, specifically-worded message.
//!
//! Every error is terminal for its attempt and recoverable by a new user
//! action (re-upload, edit, retry). There is no fatal class.

use std::path::PathBuf;
use thiserror::Error;

/// Fixed message shown when analysis fails for any transport or decode reason.
pub const GENERIC_FAILURE_MESSAGE: &str = "Audit failed. Check your document and try again.";

/// Fixed message for the language gate.
pub const NON_ENGLISH_MESSAGE: &str =
    "Only English content is supported. Please upload an English PDF resume.";

/// Fixed message when analyze is requested with no resume text held.
pub const EMPTY_INPUT_MESSAGE: &str = "Upload a PDF resume to start the audit.";

/// Fixed message for a non-PDF upload.
pub const UNSUPPORTED_FORMAT_MESSAGE: &str = "Strict Policy: Only PDF files are supported.";

/// Fixed message when extraction yields too little text to audit.
pub const INSUFFICIENT_TEXT_MESSAGE: &str = "Could not extract sufficient text. Is this a scan?";

/// All errors returned by the cvinsight library.
#[derive(Debug, Error)]
pub enum AuditError {
    // ── Upload / extraction errors ────────────────────────────────────────
    /// The uploaded file's declared media type is not `application/pdf`.
    #[error("Unsupported upload type '{media_type}': only application/pdf is accepted")]
    UnsupportedFormat { media_type: String },

    /// The PDF stream could not be parsed at all.
    #[error("Failed to parse PDF: {detail}")]
    ParseFailure { detail: String },

    /// Extraction succeeded but produced too little text to audit.
    ///
    /// Almost always a scanned image with no embedded text layer.
    #[error("Extracted only {chars} characters (minimum {min}); the PDF is likely a scan")]
    InsufficientText { chars: usize, min: usize },

    // ── Analysis gate errors ──────────────────────────────────────────────
    /// Analyze was requested with empty or whitespace-only resume text.
    #[error("No resume text held; upload a PDF before analyzing")]
    EmptyInput,

    /// The model reported the resume is not primarily in English.
    #[error("Resume content is not primarily in English")]
    NonEnglishContent,

    /// An upload or analyze action arrived while an attempt was in flight.
    ///
    /// The UI boundary is expected to disable these actions; this variant
    /// backs the same contract for direct library callers.
    #[error("An analysis is already in flight; the action was rejected")]
    AnalysisInFlight,

    // ── Analysis client errors ────────────────────────────────────────────
    /// Network-level failure reaching the model endpoint (DNS, TLS, timeout).
    #[error("Model endpoint unreachable: {detail}")]
    TransportFailure { detail: String },

    /// The endpoint answered with a non-success HTTP status.
    #[error("Model endpoint returned HTTP {status}: {message}")]
    ApiError { status: u16, message: String },

    /// The reply could not be decoded against the declared response schema.
    #[error("Model reply did not match the response schema: {detail}")]
    MalformedResponse { detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// No API key in the config and none found in the environment.
    #[error(
        "No API key configured.\nSet GEMINI_API_KEY (or API_KEY) in the environment, \
         or pass one explicitly."
    )]
    MissingApiKey,

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not write the report file.
    #[error("Failed to write report '{path}': {source}")]
    ReportWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AuditError {
    /// The fixed user-facing message for this error.
    ///
    /// Transport, API and decode failures deliberately collapse into one
    /// generic string; only the log trail retains which sub-case occurred.
    pub fn user_message(&self) -> &'static str {
        match self {
            AuditError::UnsupportedFormat { .. } => UNSUPPORTED_FORMAT_MESSAGE,
            AuditError::ParseFailure { .. } | AuditError::InsufficientText { .. } => {
                INSUFFICIENT_TEXT_MESSAGE
            }
            AuditError::EmptyInput => EMPTY_INPUT_MESSAGE,
            AuditError::NonEnglishContent => NON_ENGLISH_MESSAGE,
            AuditError::TransportFailure { .. }
            | AuditError::ApiError { .. }
            | AuditError::MalformedResponse { .. } => GENERIC_FAILURE_MESSAGE,
            AuditError::AnalysisInFlight
            | AuditError::MissingApiKey
            | AuditError::InvalidConfig(_)
            | AuditError::ReportWriteFailed { .. } => GENERIC_FAILURE_MESSAGE,
        }
    }
}

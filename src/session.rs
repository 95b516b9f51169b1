//! The audit session controller.
//!
//! [`AuditSession`] owns the UI-visible [`AnalysisState`] and drives the
//! extractor and the analysis client in response to user actions: upload,
//! edit, analyze, reset. All mutation happens through `&mut self` on one
//! logical timeline — there is no lock because there is no parallelism;
//! the [`AuditError::AnalysisInFlight`] guard backs the same "disabled
//! while analyzing" contract the UI boundary enforces.
//!
//! ## State machine
//!
//! ```text
//! Idle ──upload──▶ DocumentAttached ──analyze──▶ Analyzing
//!                                                   │
//!                     ┌─ Succeeded (result held) ◀──┤ isEnglish
//!                     ├─ RejectedNonEnglish ◀───────┤ !isEnglish
//!                     └─ Failed ◀───────────────────┘ client error
//!
//! reset: any state ──▶ Idle.  upload: Idle or any settled state ──▶
//! DocumentAttached (overwrites the held text, no reset required).
//! ```
//!
//! After any settled state, `result` and `error` are never both present.

use crate::client::AnalysisClient;
use crate::error::{
    AuditError, EMPTY_INPUT_MESSAGE, GENERIC_FAILURE_MESSAGE, NON_ENGLISH_MESSAGE,
};
use crate::extract::{self, MIN_EXTRACTED_CHARS};
use crate::result::{AnalysisRequest, AnalysisResult};
use tracing::{debug, info, warn};

/// The only media type the upload surface accepts.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// The two independent upload surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadSlot {
    /// The primary resume document.
    Resume,
    /// A job description supplied as a PDF instead of pasted text.
    JobDescription,
}

/// Where the session currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No resume text held.
    Idle,
    /// Resume text held, no attempt settled.
    DocumentAttached,
    /// An analysis attempt is in flight.
    Analyzing,
    /// Last attempt produced a result.
    Succeeded,
    /// Last attempt tripped the language gate.
    RejectedNonEnglish,
    /// Last attempt failed in the client.
    Failed,
}

/// The UI-visible session state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisState {
    pub resume_text: String,
    pub job_description: String,
    pub is_analyzing: bool,
    pub result: Option<AnalysisResult>,
    pub error: Option<String>,
}

/// Holds the session state and sequences upload → analyze → settle.
#[derive(Debug)]
pub struct AuditSession {
    state: AnalysisState,
    phase: SessionPhase,
}

impl Default for AuditSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditSession {
    pub fn new() -> Self {
        Self {
            state: AnalysisState::default(),
            phase: SessionPhase::Idle,
        }
    }

    /// The current UI-visible state.
    pub fn state(&self) -> &AnalysisState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Whether the upload surfaces should be enabled.
    pub fn can_upload(&self) -> bool {
        !self.state.is_analyzing
    }

    /// Whether the analyze action should be enabled.
    pub fn can_analyze(&self) -> bool {
        !self.state.is_analyzing && !self.state.resume_text.trim().is_empty()
    }

    /// Upload a document into one of the two slots.
    ///
    /// The declared `media_type` must be exactly `application/pdf`; anything
    /// else is rejected before the extractor runs. On any failure the
    /// previously held text is untouched and `state().error` carries the
    /// fixed message for that failure.
    pub fn attach(
        &mut self,
        slot: UploadSlot,
        media_type: &str,
        bytes: &[u8],
    ) -> Result<(), AuditError> {
        if self.state.is_analyzing {
            warn!("upload rejected: analysis in flight");
            return Err(AuditError::AnalysisInFlight);
        }

        self.state.error = None;

        let text = match self.extract_upload(media_type, bytes) {
            Ok(text) => text,
            Err(e) => {
                self.state.error = Some(e.user_message().to_string());
                return Err(e);
            }
        };

        match slot {
            UploadSlot::Resume => {
                info!("resume attached: {} characters", text.len());
                self.state.resume_text = text;
                self.state.result = None;
                self.phase = SessionPhase::DocumentAttached;
            }
            UploadSlot::JobDescription => {
                info!("job description attached: {} characters", text.len());
                // A JD upload never invalidates an existing result.
                self.state.job_description = text;
            }
        }
        Ok(())
    }

    fn extract_upload(&self, media_type: &str, bytes: &[u8]) -> Result<String, AuditError> {
        if media_type != PDF_MEDIA_TYPE {
            return Err(AuditError::UnsupportedFormat {
                media_type: media_type.to_string(),
            });
        }

        let text = extract::extract_text(bytes)?;
        if text.len() < MIN_EXTRACTED_CHARS {
            return Err(AuditError::InsufficientText {
                chars: text.len(),
                min: MIN_EXTRACTED_CHARS,
            });
        }
        Ok(text)
    }

    /// Edit the job-description text.
    ///
    /// Allowed in any non-analyzing state; has no effect on an
    /// already-produced result.
    pub fn set_job_description(&mut self, text: impl Into<String>) -> Result<(), AuditError> {
        if self.state.is_analyzing {
            return Err(AuditError::AnalysisInFlight);
        }
        self.state.job_description = text.into();
        Ok(())
    }

    /// Run one analysis attempt and settle the session.
    ///
    /// The outcome lands in [`AnalysisState`]: `result` on success, the
    /// fixed non-English message on a language-gate rejection, the generic
    /// failure message otherwise. The returned error mirrors the settled
    /// state for callers that want control flow instead of state reads.
    pub async fn analyze(&mut self, client: &AnalysisClient) -> Result<(), AuditError> {
        if self.state.is_analyzing {
            return Err(AuditError::AnalysisInFlight);
        }
        if self.state.resume_text.trim().is_empty() {
            self.state.error = Some(EMPTY_INPUT_MESSAGE.to_string());
            return Err(AuditError::EmptyInput);
        }

        self.state.error = None;
        self.state.is_analyzing = true;
        self.phase = SessionPhase::Analyzing;

        let request = AnalysisRequest::new(
            self.state.resume_text.clone(),
            Some(self.state.job_description.clone()),
        );

        match client.analyze(&request).await {
            Ok(result) if !result.is_english => {
                debug!("language gate tripped; discarding result fields");
                self.state.is_analyzing = false;
                self.state.result = None;
                self.state.error = Some(NON_ENGLISH_MESSAGE.to_string());
                self.phase = SessionPhase::RejectedNonEnglish;
                Err(AuditError::NonEnglishContent)
            }
            Ok(result) => {
                info!(
                    overall = result.overall_score,
                    ats = result.ats_score,
                    "analysis succeeded"
                );
                self.state.is_analyzing = false;
                self.state.result = Some(result);
                self.state.error = None;
                self.phase = SessionPhase::Succeeded;
                Ok(())
            }
            Err(e) => {
                // The precise category stays in the log; the user sees one
                // generic message for every analysis-layer failure.
                warn!("analysis failed: {e}");
                self.state.is_analyzing = false;
                self.state.result = None;
                self.state.error = Some(GENERIC_FAILURE_MESSAGE.to_string());
                self.phase = SessionPhase::Failed;
                Err(e)
            }
        }
    }

    /// Discard everything and return to `Idle`.
    pub fn reset(&mut self) {
        self.state = AnalysisState::default();
        self.phase = SessionPhase::Idle;
    }
}

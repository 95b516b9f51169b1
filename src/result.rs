//! The canonical analysis request/response contract.
//!
//! [`AnalysisResult`] mirrors the schema declared to the model in
//! [`crate::prompts::response_schema`] field for field. Every field is
//! required: the reply is decoded strictly, so a structurally short reply
//! (e.g. a missing section key) fails as
//! [`crate::error::AuditError::MalformedResponse`] instead of producing a
//! half-populated result the renderer would trip over.
//!
//! Wire names are camelCase; Rust names are snake_case via serde renames.

use serde::{Deserialize, Serialize};

/// One analysis attempt's input, built fresh per attempt and immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    /// Extracted resume text. Guaranteed non-empty by the session gate.
    pub resume_text: String,
    /// Optional job description. `None` changes the prompt framing and is
    /// expected to come back as `job_match.provided == false`.
    pub job_description: Option<String>,
}

impl AnalysisRequest {
    /// Build a request, normalising a blank job description to `None`.
    pub fn new(resume_text: impl Into<String>, job_description: Option<String>) -> Self {
        let job_description = job_description.filter(|jd| !jd.trim().is_empty());
        Self {
            resume_text: resume_text.into(),
            job_description,
        }
    }
}

/// Score and critique for one resume section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionFeedback {
    pub score: f64,
    pub feedback: String,
}

/// The six fixed resume categories, each independently scored.
///
/// All six are required by the contract even when a section is absent from
/// the source document — the model is instructed to score absences low and
/// say so in the feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionScores {
    pub summary: SectionFeedback,
    pub experience: SectionFeedback,
    pub education: SectionFeedback,
    pub skills: SectionFeedback,
    pub projects: SectionFeedback,
    pub certifications: SectionFeedback,
}

/// Comparison outcome between the resume and an optionally supplied JD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobMatch {
    /// True iff a job description was supplied in the request.
    pub provided: bool,
    /// 0–100 fit score; meaningful only when `provided`.
    pub matching_score: f64,
    pub missing_keywords: Vec<String>,
    pub matching_sections: Vec<String>,
}

/// The validated model reply.
///
/// Scores are integers 0–100 by convention but are passed through unclamped;
/// consumers that need a hard range clamp at render time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Language gate: when false every other field is unreliable and must
    /// not be shown to the user.
    pub is_english: bool,
    pub overall_score: f64,
    pub ats_score: f64,
    pub sections: SectionScores,
    /// Display order, not significance order.
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
    pub job_match: JobMatch,
}

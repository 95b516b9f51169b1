//! Prompt and response-schema constants for the audit call.
//!
//! Centralising the contract here serves two purposes:
//!
//! 1. **Single source of truth** — the system instruction, the user-prompt
//!    framing, and the declared schema must agree with the decode types in
//!    [`crate::result`]; keeping them in one module makes drift visible.
//!
//! 2. **Testability** — unit tests inspect the built prompt and the schema
//!    directly without a live model call.

use crate::result::AnalysisRequest;
use once_cell::sync::Lazy;
use serde_json::{json, Value};

/// System instruction sent with every audit call.
pub const SYSTEM_INSTRUCTION: &str = "You are CVInsight AI, an advanced resume analyzer. Your role is to evaluate resumes for professional clarity and ATS compliance.

RULES:
1. Base feedback strictly on the resume content provided.
2. If the provided resume text is NOT primarily in English, set the \"isEnglish\" property to false and return minimal scores.
3. If primarily in English, set \"isEnglish\" to true and perform a deep analysis.
4. Identify sections: Summary, Experience, Education, Skills, Projects, Certifications.
5. Provide actionable feedback and suggest better phrasing.
6. Return a valid JSON object matching the provided schema.";

/// Framing used when no job description is supplied.
///
/// Signalled explicitly rather than omitted: the model keys
/// `jobMatch.provided` off this sentence.
pub const GENERAL_ANALYSIS_FRAMING: &str = "Analyze for general professional strength.";

/// Build the user prompt for one analysis attempt.
pub fn build_prompt(request: &AnalysisRequest) -> String {
    let framing = match request.job_description.as_deref() {
        Some(jd) => format!("Compare against this JD: {jd}"),
        None => GENERAL_ANALYSIS_FRAMING.to_string(),
    };

    format!(
        "Analyze the following resume content. Check for language first.\n\
         {framing}\n\n\
         Resume Content:\n\
         {resume}",
        resume = request.resume_text
    )
}

/// The six section keys the schema requires, in declaration order.
pub const SECTION_KEYS: [&str; 6] = [
    "summary",
    "experience",
    "education",
    "skills",
    "projects",
    "certifications",
];

fn section_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "score":    { "type": "NUMBER" },
            "feedback": { "type": "STRING" },
        },
        "required": ["score", "feedback"],
    })
}

/// The response schema declared to the model.
///
/// Structurally constrains the reply; the client still re-validates the
/// decoded JSON because the payload is untrusted until proven otherwise.
static RESPONSE_SCHEMA: Lazy<Value> = Lazy::new(|| {
    let sections: serde_json::Map<String, Value> = SECTION_KEYS
        .iter()
        .map(|key| (key.to_string(), section_schema()))
        .collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "isEnglish": {
                "type": "BOOLEAN",
                "description": "True if the resume is primarily in English, false otherwise.",
            },
            "overallScore": { "type": "NUMBER" },
            "atsScore":     { "type": "NUMBER" },
            "sections": {
                "type": "OBJECT",
                "properties": sections,
                "required": SECTION_KEYS,
            },
            "strengths":       { "type": "ARRAY", "items": { "type": "STRING" } },
            "weaknesses":      { "type": "ARRAY", "items": { "type": "STRING" } },
            "recommendations": { "type": "ARRAY", "items": { "type": "STRING" } },
            "jobMatch": {
                "type": "OBJECT",
                "properties": {
                    "provided":         { "type": "BOOLEAN" },
                    "matchingScore":    { "type": "NUMBER" },
                    "missingKeywords":  { "type": "ARRAY", "items": { "type": "STRING" } },
                    "matchingSections": { "type": "ARRAY", "items": { "type": "STRING" } },
                },
                "required": ["provided", "matchingScore", "missingKeywords", "matchingSections"],
            },
        },
        "required": [
            "isEnglish", "overallScore", "atsScore", "sections",
            "strengths", "weaknesses", "recommendations", "jobMatch",
        ],
    })
});

/// The declared response schema.
pub fn response_schema() -> &'static Value {
    &RESPONSE_SCHEMA
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_with_jd_frames_comparison() {
        let req = AnalysisRequest::new("resume body", Some("Senior Rust Engineer".into()));
        let prompt = build_prompt(&req);
        assert!(prompt.contains("Compare against this JD: Senior Rust Engineer"));
        assert!(prompt.contains("Resume Content:\nresume body"));
        assert!(!prompt.contains(GENERAL_ANALYSIS_FRAMING));
    }

    #[test]
    fn prompt_without_jd_frames_general_analysis() {
        let req = AnalysisRequest::new("resume body", None);
        let prompt = build_prompt(&req);
        assert!(prompt.contains(GENERAL_ANALYSIS_FRAMING));
        assert!(!prompt.contains("Compare against this JD"));
    }

    #[test]
    fn schema_requires_all_six_sections() {
        let schema = response_schema();
        let required: Vec<&str> = schema["properties"]["sections"]["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(required, SECTION_KEYS);
        for key in SECTION_KEYS {
            assert!(
                schema["properties"]["sections"]["properties"][key].is_object(),
                "missing section schema for {key}"
            );
        }
    }

    #[test]
    fn schema_requires_all_top_level_fields() {
        let required = response_schema()["required"].as_array().unwrap();
        for field in [
            "isEnglish",
            "overallScore",
            "atsScore",
            "sections",
            "strengths",
            "weaknesses",
            "recommendations",
            "jobMatch",
        ] {
            assert!(
                required.iter().any(|v| v == field),
                "{field} missing from required list"
            );
        }
    }
}

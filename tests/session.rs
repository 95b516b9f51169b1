//! End-to-end tests for the audit session state machine.
//!
//! A stub [`AnalysisProvider`] stands in for the model endpoint so every
//! path through upload → analyze → settle is exercised without network
//! access, including the exact payload the client would have sent.

use async_trait::async_trait;
use cvinsight::error::{
    AuditError, EMPTY_INPUT_MESSAGE, GENERIC_FAILURE_MESSAGE, NON_ENGLISH_MESSAGE,
};
use cvinsight::prompts::{response_schema, GENERAL_ANALYSIS_FRAMING, SYSTEM_INSTRUCTION};
use cvinsight::{
    extract_text, AnalysisClient, AnalysisProvider, AuditSession, SessionPhase, UploadSlot,
    PDF_MEDIA_TYPE,
};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Build a minimal PDF: each inner slice is one page, each string one item.
fn build_pdf(pages: &[&[&str]]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for items in pages {
        let mut operations = Vec::new();
        for (i, item) in items.iter().enumerate() {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
            operations.push(Operation::new(
                "Td",
                vec![72.into(), (720 - 20 * i as i64).into()],
            ));
            operations.push(Operation::new("Tj", vec![Object::string_literal(*item)]));
            operations.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// A resume PDF comfortably above the 50-character floor.
fn resume_pdf() -> Vec<u8> {
    build_pdf(&[
        &[
            "Alice Example, Senior Software Engineer.",
            "Twelve years building distributed systems in Rust and Go.",
        ],
        &["Led a team of six; cut p99 latency by 40 percent."],
    ])
}

/// A structurally valid model reply.
fn reply(is_english: bool, provided: bool) -> String {
    json!({
        "isEnglish": is_english,
        "overallScore": 72,
        "atsScore": 65,
        "sections": {
            "summary": {"score": 70, "feedback": "Concise."},
            "experience": {"score": 80, "feedback": "Strong metrics."},
            "education": {"score": 75, "feedback": "Clear."},
            "skills": {"score": 60, "feedback": "List core tools."},
            "projects": {"score": 55, "feedback": "Add outcomes."},
            "certifications": {"score": 20, "feedback": "Section missing."},
        },
        "strengths": ["Clear metrics"],
        "weaknesses": ["No summary"],
        "recommendations": ["Add a summary"],
        "jobMatch": {
            "provided": provided,
            "matchingScore": (if provided { 66 } else { 0 }),
            "missingKeywords": (if provided { json!(["Kubernetes"]) } else { json!([]) }),
            "matchingSections": (if provided { json!(["experience"]) } else { json!([]) }),
        },
    })
    .to_string()
}

enum StubReply {
    Json(String),
    TransportFailure,
}

struct CapturedCall {
    system: String,
    prompt: String,
    schema: Value,
}

/// Records every call and answers with a canned reply.
struct StubProvider {
    reply: StubReply,
    calls: Mutex<Vec<CapturedCall>>,
}

impl StubProvider {
    fn with_json(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            reply: StubReply::Json(reply.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: StubReply::TransportFailure,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn last_call<T>(&self, f: impl FnOnce(&CapturedCall) -> T) -> T {
        let calls = self.calls.lock().unwrap();
        f(calls.last().expect("provider was never called"))
    }
}

#[async_trait]
impl AnalysisProvider for StubProvider {
    async fn generate(
        &self,
        system_instruction: &str,
        prompt: &str,
        schema: &Value,
    ) -> Result<String, AuditError> {
        self.calls.lock().unwrap().push(CapturedCall {
            system: system_instruction.to_string(),
            prompt: prompt.to_string(),
            schema: schema.clone(),
        });
        match &self.reply {
            StubReply::Json(s) => Ok(s.clone()),
            StubReply::TransportFailure => Err(AuditError::TransportFailure {
                detail: "stub: connection refused".into(),
            }),
        }
    }
}

fn client_for(provider: &Arc<StubProvider>) -> AnalysisClient {
    AnalysisClient::with_provider(Arc::clone(provider) as Arc<dyn AnalysisProvider>)
}

// ── Extraction scenarios ─────────────────────────────────────────────────────

#[test]
fn two_page_extraction_joins_items_and_pages() {
    let bytes = build_pdf(&[&["Alice", "Engineer"], &["5 years experience"]]);
    let text = extract_text(&bytes).unwrap();
    assert_eq!(text, "Alice Engineer\n5 years experience");
}

#[test]
fn short_extraction_fails_upload_and_preserves_state() {
    let mut session = AuditSession::new();
    session
        .attach(UploadSlot::Resume, PDF_MEDIA_TYPE, &resume_pdf())
        .unwrap();
    let held = session.state().resume_text.clone();

    let short = build_pdf(&[&["Alice"]]);
    let err = session
        .attach(UploadSlot::Resume, PDF_MEDIA_TYPE, &short)
        .unwrap_err();
    assert!(matches!(err, AuditError::InsufficientText { .. }));
    assert_eq!(session.state().resume_text, held);
    assert!(session.state().error.is_some());
}

// ── Analyze paths ────────────────────────────────────────────────────────────

#[tokio::test]
async fn successful_audit_publishes_the_result_verbatim() {
    let provider = StubProvider::with_json(reply(true, false));
    let client = client_for(&provider);
    let mut session = AuditSession::new();

    session
        .attach(UploadSlot::Resume, PDF_MEDIA_TYPE, &resume_pdf())
        .unwrap();
    assert_eq!(session.phase(), SessionPhase::DocumentAttached);

    session.analyze(&client).await.unwrap();

    assert_eq!(session.phase(), SessionPhase::Succeeded);
    let state = session.state();
    assert!(!state.is_analyzing);
    assert!(state.error.is_none());
    let result = state.result.as_ref().unwrap();
    assert_eq!(result.overall_score, 72.0);
    assert_eq!(result.ats_score, 65.0);
    assert_eq!(result.sections.certifications.score, 20.0);
    assert_eq!(result.strengths, vec!["Clear metrics".to_string()]);
}

#[tokio::test]
async fn empty_input_never_reaches_the_provider() {
    let provider = StubProvider::with_json(reply(true, false));
    let client = client_for(&provider);
    let mut session = AuditSession::new();

    let err = session.analyze(&client).await.unwrap_err();
    assert!(matches!(err, AuditError::EmptyInput));
    assert_eq!(session.state().error.as_deref(), Some(EMPTY_INPUT_MESSAGE));
    assert_eq!(provider.call_count(), 0);
    assert_eq!(session.phase(), SessionPhase::Idle);
}

#[tokio::test]
async fn non_english_reply_trips_the_language_gate() {
    let provider = StubProvider::with_json(reply(false, false));
    let client = client_for(&provider);
    let mut session = AuditSession::new();
    session
        .attach(UploadSlot::Resume, PDF_MEDIA_TYPE, &resume_pdf())
        .unwrap();

    let err = session.analyze(&client).await.unwrap_err();

    assert!(matches!(err, AuditError::NonEnglishContent));
    assert_eq!(session.phase(), SessionPhase::RejectedNonEnglish);
    assert!(session.state().result.is_none());
    assert_eq!(session.state().error.as_deref(), Some(NON_ENGLISH_MESSAGE));
    assert!(!session.state().is_analyzing);
}

#[tokio::test]
async fn reply_missing_a_section_key_fails_generically() {
    // Scenario: `certifications` dropped from the sections object.
    let mut value: Value = serde_json::from_str(&reply(true, false)).unwrap();
    value["sections"]
        .as_object_mut()
        .unwrap()
        .remove("certifications");
    let provider = StubProvider::with_json(value.to_string());
    let client = client_for(&provider);
    let mut session = AuditSession::new();
    session
        .attach(UploadSlot::Resume, PDF_MEDIA_TYPE, &resume_pdf())
        .unwrap();

    let err = session.analyze(&client).await.unwrap_err();

    assert!(matches!(err, AuditError::MalformedResponse { .. }));
    assert_eq!(session.phase(), SessionPhase::Failed);
    assert!(session.state().result.is_none());
    assert_eq!(
        session.state().error.as_deref(),
        Some(GENERIC_FAILURE_MESSAGE)
    );
}

#[tokio::test]
async fn transport_failure_shows_the_same_generic_message() {
    let provider = StubProvider::failing();
    let client = client_for(&provider);
    let mut session = AuditSession::new();
    session
        .attach(UploadSlot::Resume, PDF_MEDIA_TYPE, &resume_pdf())
        .unwrap();

    let err = session.analyze(&client).await.unwrap_err();

    assert!(matches!(err, AuditError::TransportFailure { .. }));
    assert_eq!(session.phase(), SessionPhase::Failed);
    assert_eq!(
        session.state().error.as_deref(),
        Some(GENERIC_FAILURE_MESSAGE)
    );
    // A failed attempt is retryable: the resume text is still held.
    assert!(session.can_analyze());
}

// ── Request contract ─────────────────────────────────────────────────────────

#[tokio::test]
async fn payload_carries_the_fixed_contract() {
    let provider = StubProvider::with_json(reply(true, false));
    let client = client_for(&provider);
    let mut session = AuditSession::new();
    session
        .attach(UploadSlot::Resume, PDF_MEDIA_TYPE, &resume_pdf())
        .unwrap();

    session.analyze(&client).await.unwrap();

    provider.last_call(|call| {
        assert_eq!(call.system, SYSTEM_INSTRUCTION);
        assert_eq!(call.schema, *response_schema());
        assert!(call.prompt.contains("Alice Example, Senior Software Engineer."));
    });
}

#[tokio::test]
async fn missing_jd_is_signalled_as_general_analysis() {
    let provider = StubProvider::with_json(reply(true, false));
    let client = client_for(&provider);
    let mut session = AuditSession::new();
    session
        .attach(UploadSlot::Resume, PDF_MEDIA_TYPE, &resume_pdf())
        .unwrap();
    // Whitespace-only JD counts as absent.
    session.set_job_description("   \n").unwrap();

    session.analyze(&client).await.unwrap();

    provider.last_call(|call| {
        assert!(call.prompt.contains(GENERAL_ANALYSIS_FRAMING));
        assert!(!call.prompt.contains("Compare against this JD"));
    });
    assert!(!session.state().result.as_ref().unwrap().job_match.provided);
}

#[tokio::test]
async fn supplied_jd_is_framed_as_a_comparison_target() {
    let provider = StubProvider::with_json(reply(true, true));
    let client = client_for(&provider);
    let mut session = AuditSession::new();
    session
        .attach(UploadSlot::Resume, PDF_MEDIA_TYPE, &resume_pdf())
        .unwrap();
    session
        .set_job_description("Senior Rust Engineer, Kubernetes required")
        .unwrap();

    session.analyze(&client).await.unwrap();

    provider.last_call(|call| {
        assert!(call
            .prompt
            .contains("Compare against this JD: Senior Rust Engineer, Kubernetes required"));
        assert!(!call.prompt.contains(GENERAL_ANALYSIS_FRAMING));
    });
    let job_match = &session.state().result.as_ref().unwrap().job_match;
    assert!(job_match.provided);
    assert_eq!(job_match.missing_keywords, vec!["Kubernetes".to_string()]);
}

// ── Lifecycle ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn reupload_after_success_reenters_document_attached() {
    let provider = StubProvider::with_json(reply(true, false));
    let client = client_for(&provider);
    let mut session = AuditSession::new();
    session
        .attach(UploadSlot::Resume, PDF_MEDIA_TYPE, &resume_pdf())
        .unwrap();
    session.analyze(&client).await.unwrap();
    assert_eq!(session.phase(), SessionPhase::Succeeded);

    // No reset required: a fresh upload overwrites and clears the result.
    session
        .attach(UploadSlot::Resume, PDF_MEDIA_TYPE, &resume_pdf())
        .unwrap();
    assert_eq!(session.phase(), SessionPhase::DocumentAttached);
    assert!(session.state().result.is_none());
    assert!(session.state().error.is_none());
}

#[tokio::test]
async fn editing_the_jd_does_not_invalidate_a_result() {
    let provider = StubProvider::with_json(reply(true, false));
    let client = client_for(&provider);
    let mut session = AuditSession::new();
    session
        .attach(UploadSlot::Resume, PDF_MEDIA_TYPE, &resume_pdf())
        .unwrap();
    session.analyze(&client).await.unwrap();

    session.set_job_description("a different listing").unwrap();

    assert_eq!(session.phase(), SessionPhase::Succeeded);
    assert!(session.state().result.is_some());
}

#[tokio::test]
async fn reset_from_a_terminal_state_returns_to_idle() {
    let provider = StubProvider::with_json(reply(false, false));
    let client = client_for(&provider);
    let mut session = AuditSession::new();
    session
        .attach(UploadSlot::Resume, PDF_MEDIA_TYPE, &resume_pdf())
        .unwrap();
    session.set_job_description("some jd").unwrap();
    let _ = session.analyze(&client).await;
    assert_eq!(session.phase(), SessionPhase::RejectedNonEnglish);

    session.reset();

    assert_eq!(session.phase(), SessionPhase::Idle);
    let state = session.state();
    assert_eq!(state.resume_text, "");
    assert_eq!(state.job_description, "");
    assert!(!state.is_analyzing);
    assert!(state.result.is_none());
    assert!(state.error.is_none());
}

#[tokio::test]
async fn jd_pdf_upload_fills_the_job_description_slot() {
    let provider = StubProvider::with_json(reply(true, true));
    let client = client_for(&provider);
    let mut session = AuditSession::new();
    session
        .attach(UploadSlot::Resume, PDF_MEDIA_TYPE, &resume_pdf())
        .unwrap();

    let jd_pdf = build_pdf(&[&[
        "Senior Rust Engineer.",
        "Must have Kubernetes and five years of systems experience.",
    ]]);
    session
        .attach(UploadSlot::JobDescription, PDF_MEDIA_TYPE, &jd_pdf)
        .unwrap();
    assert!(session
        .state()
        .job_description
        .contains("Senior Rust Engineer."));

    session.analyze(&client).await.unwrap();
    provider.last_call(|call| {
        assert!(call.prompt.contains("Compare against this JD:"));
    });
}

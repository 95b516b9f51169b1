//! CLI binary for cvinsight.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `AuditConfig`, drives one `AuditSession`, and prints results.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use cvinsight::{
    init_http, render_report, save_report, AnalysisClient, AnalysisResult, AuditConfig,
    AuditSession, SectionFeedback, UploadSlot, DEFAULT_MODEL, PDF_MEDIA_TYPE,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

/// Colour a 0–100 score by the thresholds the gauges use.
fn score(value: f64) -> String {
    let text = format!("{value}");
    if value >= 75.0 {
        green(&text)
    } else if value >= 50.0 {
        yellow(&text)
    } else {
        red(&text)
    }
}

// ── CLI definition ───────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "cvinsight",
    version,
    about = "Audit a PDF resume for professional clarity and ATS compliance",
    after_help = "The API key is read from --api-key, then GEMINI_API_KEY, then API_KEY."
)]
struct Cli {
    /// Path to the resume PDF
    resume: PathBuf,

    /// Job description to match against: a PDF or a plain-text file
    #[arg(long, short = 'j', value_name = "FILE")]
    job_description: Option<PathBuf>,

    /// Job description passed inline (takes precedence over --job-description)
    #[arg(long, value_name = "TEXT")]
    jd_text: Option<String>,

    /// Model identifier
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// API key for the model endpoint
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 120)]
    timeout: u64,

    /// Write the plain-text report; PATH defaults to CVInsight-Report.txt
    #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = "CVInsight-Report.txt")]
    report: Option<PathBuf>,

    /// Print the raw JSON result instead of the rendered summary
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Declared media type for an uploaded file, by extension.
///
/// Mirrors the browser upload surface: only the declared type gates the
/// strict PDF policy; content validation happens in the extractor.
fn media_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => PDF_MEDIA_TYPE,
        Some("txt") | Some("text") | Some("md") => "text/plain",
        _ => "application/octet-stream",
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = match cli.verbose {
        0 => "warn",
        1 => "cvinsight=info",
        _ => "cvinsight=debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    init_http();

    let mut builder = AuditConfig::builder()
        .model(cli.model.as_str())
        .api_timeout_secs(cli.timeout);
    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key.clone());
    }
    let config = builder.build().map_err(|e| anyhow!("{e}"))?;
    let client = AnalysisClient::from_config(&config).map_err(|e| anyhow!("{e}"))?;

    let mut session = AuditSession::new();

    // ── Attach the resume ────────────────────────────────────────────────
    let resume_bytes = std::fs::read(&cli.resume)
        .with_context(|| format!("failed to read {}", cli.resume.display()))?;
    session
        .attach(UploadSlot::Resume, media_type_for(&cli.resume), &resume_bytes)
        .map_err(|e| anyhow!("{}", e.user_message()))?;
    eprintln!(
        "{} {}",
        green("✓"),
        dim(&format!(
            "resume attached ({} characters extracted)",
            session.state().resume_text.len()
        ))
    );

    // ── Attach or set the job description ────────────────────────────────
    if let Some(text) = cli.jd_text.clone() {
        session.set_job_description(text).map_err(|e| anyhow!("{e}"))?;
    } else if let Some(ref jd_path) = cli.job_description {
        let media_type = media_type_for(jd_path);
        if media_type == PDF_MEDIA_TYPE {
            let jd_bytes = std::fs::read(jd_path)
                .with_context(|| format!("failed to read {}", jd_path.display()))?;
            session
                .attach(UploadSlot::JobDescription, media_type, &jd_bytes)
                .map_err(|e| anyhow!("{}", e.user_message()))?;
        } else {
            let jd_text = std::fs::read_to_string(jd_path)
                .with_context(|| format!("failed to read {}", jd_path.display()))?;
            session.set_job_description(jd_text).map_err(|e| anyhow!("{e}"))?;
        }
    }
    let jd_supplied = !session.state().job_description.trim().is_empty();

    // ── Analyze ──────────────────────────────────────────────────────────
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Analyzing metrics…");
    spinner.enable_steady_tick(Duration::from_millis(80));

    let outcome = session.analyze(&client).await;
    spinner.finish_and_clear();

    if outcome.is_err() {
        let message = session
            .state()
            .error
            .clone()
            .unwrap_or_else(|| "Audit failed.".to_string());
        return Err(anyhow!("{message}"));
    }
    let result = session
        .state()
        .result
        .as_ref()
        .ok_or_else(|| anyhow!("analysis settled without a result"))?;

    // ── Render ───────────────────────────────────────────────────────────
    if cli.json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        print_summary(result, jd_supplied);
    }

    if let Some(ref report_path) = cli.report {
        save_report(result, report_path)
            .await
            .map_err(|e| anyhow!("{e}"))?;
        eprintln!(
            "{} {}",
            green("✓"),
            dim(&format!("report written to {}", report_path.display()))
        );
        tracing::debug!("report preview:\n{}", render_report(result));
    }

    Ok(())
}

fn print_summary(result: &AnalysisResult, jd_supplied: bool) {
    println!();
    println!("{}", bold("CVInsight Audit"));
    println!("  Overall score     {}", score(result.overall_score));
    println!("  ATS compatibility {}", score(result.ats_score));

    println!();
    println!("{}", bold("Sections"));
    let sections: [(&str, &SectionFeedback); 6] = [
        ("summary", &result.sections.summary),
        ("experience", &result.sections.experience),
        ("education", &result.sections.education),
        ("skills", &result.sections.skills),
        ("projects", &result.sections.projects),
        ("certifications", &result.sections.certifications),
    ];
    for (name, feedback) in sections {
        // Pad before colouring: ANSI escapes confuse width specifiers.
        println!(
            "  {} {}  {}",
            cyan(&format!("{name:<16}")),
            score(feedback.score),
            dim(&feedback.feedback)
        );
    }

    print_list("Strengths", &result.strengths, green);
    print_list("Weaknesses", &result.weaknesses, red);
    print_list("Recommendations", &result.recommendations, cyan);

    // The job-match block renders only when the request carried a JD and
    // the model confirmed it; otherwise its fields are meaningless.
    if jd_supplied && result.job_match.provided {
        println!();
        println!("{}", bold("Job match"));
        println!("  Matching score    {}", score(result.job_match.matching_score));
        if !result.job_match.matching_sections.is_empty() {
            println!(
                "  Matching sections {}",
                result.job_match.matching_sections.join(", ")
            );
        }
        if !result.job_match.missing_keywords.is_empty() {
            println!(
                "  Missing keywords  {}",
                yellow(&result.job_match.missing_keywords.join(", "))
            );
        }
    }
    println!();
}

fn print_list(title: &str, items: &[String], colour: fn(&str) -> String) {
    if items.is_empty() {
        return;
    }
    println!();
    println!("{}", bold(title));
    for item in items {
        println!("  {} {}", colour("•"), item);
    }
}

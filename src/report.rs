//! Plain-text report export.
//!
//! The format is fixed — downstream tooling greps these lines — so the
//! renderer is a single function with a byte-exact test rather than a
//! templating layer.

use crate::error::AuditError;
use crate::result::AnalysisResult;
use std::path::Path;
use tracing::info;

/// Fixed stem for exported report files.
pub const REPORT_FILE_PREFIX: &str = "CVInsight-Report";

/// Default file name for [`save_report`] when the caller has no preference.
pub fn default_report_file_name() -> String {
    format!("{REPORT_FILE_PREFIX}.txt")
}

/// Render the audit result as the plain-text report.
pub fn render_report(result: &AnalysisResult) -> String {
    format!(
        "CVInsight Audit Report\nOverall: {}\nATS Compatibility: {}\n\nStrengths:\n{}\n\nWeaknesses:\n{}",
        result.overall_score,
        result.ats_score,
        result.strengths.join("\n"),
        result.weaknesses.join("\n"),
    )
}

/// Render and write the report to `path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn save_report(result: &AnalysisResult, path: impl AsRef<Path>) -> Result<(), AuditError> {
    let path = path.as_ref();
    let report = render_report(result);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| AuditError::ReportWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
    }

    let tmp_path = path.with_extension("txt.tmp");
    tokio::fs::write(&tmp_path, &report)
        .await
        .map_err(|e| AuditError::ReportWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| AuditError::ReportWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    info!("report written to {}", path.display());
    Ok(())
}

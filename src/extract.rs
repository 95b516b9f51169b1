//! Resume text extraction from PDF bytes.
//!
//! The heavy lifting is lopdf's; this module only sequences it: pages are
//! walked in ascending order, each page's text items are joined with single
//! spaces in the order the parser yields them (no reflow, no reordering),
//! pages are joined with newlines, and the result is trimmed. The goal is a
//! deterministic flattening the audit prompt can consume, not a faithful
//! visual layout.
//!
//! Enforcement of the minimum-length threshold is deliberately left to the
//! caller: the session needs to reject a too-short extraction *without*
//! overwriting the text it already holds.

use crate::error::AuditError;
use lopdf::Document;
use tracing::debug;

/// Minimum number of extracted characters for a usable resume.
///
/// Anything shorter is almost certainly a scanned image with no embedded
/// text layer. The check is applied by the session, not here.
pub const MIN_EXTRACTED_CHARS: usize = 50;

/// Extract plain text from a PDF payload.
///
/// # Returns
/// The trimmed, newline-joined, page-ordered concatenation of per-page
/// text, where each page's text items are joined with single spaces.
///
/// # Errors
/// [`AuditError::ParseFailure`] when the payload is not a parseable PDF
/// stream or a page's content cannot be decoded.
pub fn extract_text(bytes: &[u8]) -> Result<String, AuditError> {
    if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
        return Err(AuditError::ParseFailure {
            detail: "missing %PDF header".into(),
        });
    }

    let doc = Document::load_mem(bytes).map_err(|e| AuditError::ParseFailure {
        detail: e.to_string(),
    })?;

    let mut page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    page_numbers.sort_unstable();
    debug!("PDF loaded: {} pages", page_numbers.len());

    let mut pages = Vec::with_capacity(page_numbers.len());
    for number in page_numbers {
        let raw = doc
            .extract_text(&[number])
            .map_err(|e| AuditError::ParseFailure {
                detail: format!("page {number}: {e}"),
            })?;
        pages.push(join_text_items(&raw));
    }

    let full_text = pages.join("\n").trim().to_string();
    debug!("Extracted {} characters", full_text.len());
    Ok(full_text)
}

/// Join one page's text items with single spaces.
///
/// lopdf yields one line per text-showing run; those runs are the "items".
/// Empty runs are dropped rather than contributing doubled separators.
fn join_text_items(page_text: &str) -> String {
    page_text
        .lines()
        .map(str::trim_end)
        .filter(|item| !item.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

//! Error types for the docappraise library.
//!
//! Two distinct error layers reflect two distinct failure modes:
//!
//! * [`AppraiseError`] — **Fatal**: the appraisal cannot proceed at all
//!   (missing file, unsupported format, nothing extractable). Returned as
//!   `Err(AppraiseError)` from the top-level [`crate::run`] entry points.
//!   No document model means nothing downstream can run.
//!
//! * [`CheckerFailure`] and [`RenderError`] — **Non-fatal**: a single
//!   checker or a single renderer failed, but the siblings are fine. These
//!   are collected inside [`crate::output::PipelineResult`] so callers can
//!   inspect partial success rather than losing the whole run to one bad
//!   heuristic or one unwritable artifact.
//!
//! The separation lets callers decide their own tolerance: abort on the
//! first per-unit failure, log and continue, or collect everything for a
//! post-run report.

use crate::output::ArtifactKind;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the docappraise library.
///
/// Per-checker and per-renderer failures use [`CheckerFailure`] /
/// [`RenderError`] and are stored in [`crate::output::PipelineResult`]
/// rather than propagated here.
#[derive(Debug, Error)]
pub enum AppraiseError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Document not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The path exists but could not be read (e.g. it is a directory).
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists and was read, but is neither a PDF nor a DOCX.
    #[error("Unsupported document format: '{path}'\nFirst bytes: {magic:?}\nOnly PDF and DOCX inputs are supported.")]
    UnsupportedFormat { path: PathBuf, magic: [u8; 4] },

    // ── Normalisation errors ──────────────────────────────────────────────
    /// The underlying parser ran but recovered no textual blocks.
    ///
    /// Typical causes: a scanned PDF with no text layer, or a DOCX whose
    /// body is empty.
    #[error("No text could be recovered from '{path}': {detail}")]
    MalformedDocument { path: PathBuf, detail: String },

    /// The format-specific parsing service rejected the input outright.
    #[error("Failed to parse {format} content of '{path}': {detail}")]
    ParseFailed {
        format: &'static str,
        path: PathBuf,
        detail: String,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output artifact.
    #[error("Failed to write artifact '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder or config-file validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Cancellation ──────────────────────────────────────────────────────
    /// The run was cancelled at a stage boundary before any artifact work
    /// started. Cancellations after the render stage begins are reported
    /// per-artifact instead, so completed artifacts are preserved.
    #[error("Run cancelled before the {stage} stage")]
    Cancelled { stage: &'static str },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal failure of a single checker.
///
/// The rule engine never short-circuits: a failing checker is recorded here
/// and the remaining checkers still run. Heuristics are deterministic given
/// the same input, so failures are reported once and never retried.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
#[error("Checker '{checker_id}' failed: {detail}")]
pub struct CheckerFailure {
    /// Registry id of the checker that failed.
    pub checker_id: String,
    /// Underlying cause, already rendered to text (panic payload or error).
    pub detail: String,
}

/// A non-fatal failure of a single renderer.
///
/// Carries the failing stage within the renderer so the error is actionable
/// without re-running under a debugger.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum RenderError {
    /// A finding's target span falls outside the document model.
    ///
    /// This is a contract violation by whoever produced the review; it is
    /// surfaced loudly rather than silently dropping the finding.
    #[error("{artifact} renderer: finding from '{checker_id}' targets {start}..{end} but the document text ends at {len}")]
    SpanOutOfRange {
        artifact: ArtifactKind,
        checker_id: String,
        start: usize,
        end: usize,
        len: usize,
    },

    /// Assembling the artifact bytes failed (zip/XML serialisation).
    #[error("{artifact} renderer failed during {stage}: {detail}")]
    Encode {
        artifact: ArtifactKind,
        stage: &'static str,
        detail: String,
    },
}

impl RenderError {
    /// The artifact this failure belongs to.
    pub fn artifact(&self) -> ArtifactKind {
        match self {
            RenderError::SpanOutOfRange { artifact, .. } => *artifact,
            RenderError::Encode { artifact, .. } => *artifact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_format_display() {
        let e = AppraiseError::UnsupportedFormat {
            path: PathBuf::from("notes.txt"),
            magic: *b"Hell",
        };
        let msg = e.to_string();
        assert!(msg.contains("notes.txt"));
        assert!(msg.contains("PDF and DOCX"));
    }

    #[test]
    fn checker_failure_display() {
        let e = CheckerFailure {
            checker_id: "stat-reporting".into(),
            detail: "regex blew up".into(),
        };
        assert!(e.to_string().contains("stat-reporting"));
    }

    #[test]
    fn span_out_of_range_display() {
        let e = RenderError::SpanOutOfRange {
            artifact: ArtifactKind::MarkdownReport,
            checker_id: "clarity".into(),
            start: 10,
            end: 900,
            len: 120,
        };
        let msg = e.to_string();
        assert!(msg.contains("10..900"));
        assert!(msg.contains("120"));
    }
}

//! Result types returned by the pipeline orchestrator.

use crate::error::CheckerFailure;
use crate::model::SourceFormat;
use crate::review::ReviewSummary;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// The five artifact projections the pipeline can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    /// Narrative markdown report (`<stem>.review.md`).
    MarkdownReport,
    /// PPTX summary deck (`<stem>.deck.pptx`).
    SlideDeck,
    /// Formal peer-review DOCX (`<stem>.review.docx`).
    FormalReview,
    /// Annotated copy of the original text (`<stem>.annotated.{docx,md}`).
    AnnotatedText,
    /// Tracked-changes-style redline (`<stem>.redline.{docx,md}`).
    Redline,
}

impl ArtifactKind {
    /// Fixed presentation/render order.
    pub const ALL: [ArtifactKind; 5] = [
        ArtifactKind::MarkdownReport,
        ArtifactKind::SlideDeck,
        ArtifactKind::FormalReview,
        ArtifactKind::AnnotatedText,
        ArtifactKind::Redline,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ArtifactKind::MarkdownReport => "report",
            ArtifactKind::SlideDeck => "deck",
            ArtifactKind::FormalReview => "peer-review",
            ArtifactKind::AnnotatedText => "annotated",
            ArtifactKind::Redline => "redline",
        }
    }

    /// File name for this artifact, derived from the source file stem.
    ///
    /// Annotated and redline artifacts follow the source format: DOCX
    /// sources get real DOCX output (comments / tracked changes); PDF
    /// sources get markdown, since the only binary writing service in scope
    /// covers DOCX and PPTX.
    pub fn file_name(&self, stem: &str, format: SourceFormat) -> String {
        let rich_ext = match format {
            SourceFormat::Docx => "docx",
            SourceFormat::Pdf => "md",
        };
        match self {
            ArtifactKind::MarkdownReport => format!("{stem}.review.md"),
            ArtifactKind::SlideDeck => format!("{stem}.deck.pptx"),
            ArtifactKind::FormalReview => format!("{stem}.review.docx"),
            ArtifactKind::AnnotatedText => format!("{stem}.annotated.{rich_ext}"),
            ArtifactKind::Redline => format!("{stem}.redline.{rich_ext}"),
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Terminal state of one requested artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "state", content = "reason")]
pub enum ArtifactState {
    /// Rendered and written to disk.
    Rendered,
    /// Output path already existed and `force` was not set. A policy
    /// outcome, not an error.
    SkippedExisting,
    /// The renderer or the write failed; the reason is self-contained.
    Failed(String),
    /// The run was cancelled before this artifact started.
    Cancelled,
}

impl ArtifactState {
    pub fn is_failed(&self) -> bool {
        matches!(self, ArtifactState::Failed(_))
    }
}

/// Status of one requested artifact after the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactStatus {
    pub kind: ArtifactKind,
    /// Where the artifact was (or would have been) written.
    pub path: PathBuf,
    pub state: ArtifactState,
}

/// Wall-clock timings and unit counts for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub blocks: usize,
    pub checkers_run: usize,
    pub checkers_failed: usize,
    pub total_duration_ms: u64,
    pub normalize_duration_ms: u64,
    pub check_duration_ms: u64,
    pub render_duration_ms: u64,
}

/// Everything the orchestrator reports about one run.
///
/// Partial failure is the normal shape here: individual checker failures and
/// per-artifact failures live inside this result rather than aborting the
/// run. [`Self::is_success`] implements the exit-status contract — skips and
/// cancellations are not failures, a `Failed` artifact is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Per-artifact outcome, in the order artifacts were requested.
    pub artifacts: Vec<ArtifactStatus>,
    /// Checkers that failed; their findings are simply absent.
    pub checker_failures: Vec<CheckerFailure>,
    /// Summary of the review the artifacts were rendered from.
    pub review_summary: ReviewSummary,
    pub stats: RunStats,
}

impl PipelineResult {
    /// True when no requested artifact ended in `Failed`.
    pub fn is_success(&self) -> bool {
        !self.artifacts.iter().any(|a| a.state.is_failed())
    }

    /// Artifacts that were actually written this run.
    pub fn rendered(&self) -> impl Iterator<Item = &ArtifactStatus> {
        self.artifacts
            .iter()
            .filter(|a| a.state == ArtifactState::Rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_follow_source_format() {
        assert_eq!(
            ArtifactKind::AnnotatedText.file_name("paper", SourceFormat::Docx),
            "paper.annotated.docx"
        );
        assert_eq!(
            ArtifactKind::AnnotatedText.file_name("paper", SourceFormat::Pdf),
            "paper.annotated.md"
        );
        assert_eq!(
            ArtifactKind::SlideDeck.file_name("paper", SourceFormat::Pdf),
            "paper.deck.pptx"
        );
    }

    #[test]
    fn skips_and_cancels_are_not_failures() {
        let result = PipelineResult {
            artifacts: vec![
                ArtifactStatus {
                    kind: ArtifactKind::MarkdownReport,
                    path: PathBuf::from("a.review.md"),
                    state: ArtifactState::SkippedExisting,
                },
                ArtifactStatus {
                    kind: ArtifactKind::Redline,
                    path: PathBuf::from("a.redline.md"),
                    state: ArtifactState::Cancelled,
                },
            ],
            checker_failures: vec![],
            review_summary: Default::default(),
            stats: Default::default(),
        };
        assert!(result.is_success());
    }

    #[test]
    fn a_failed_artifact_fails_the_run() {
        let result = PipelineResult {
            artifacts: vec![ArtifactStatus {
                kind: ArtifactKind::SlideDeck,
                path: PathBuf::from("a.deck.pptx"),
                state: ArtifactState::Failed("zip error".into()),
            }],
            checker_failures: vec![],
            review_summary: Default::default(),
            stats: Default::default(),
        };
        assert!(!result.is_success());
    }
}

//! Findings: located, classified appraisal issues produced by checkers.

use crate::model::Span;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// How serious a finding is. Ordering is ascending (`Info < Critical`) so
/// that `Reverse(severity)` gives the severity-descending review order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Minor,
    Major,
    Critical,
}

impl Severity {
    /// All severities, most severe first — the order summaries print in.
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::Major,
        Severity::Minor,
        Severity::Info,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Minor => "minor",
            Severity::Major => "major",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What aspect of the manuscript a finding concerns.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Methodology,
    Statistics,
    Clarity,
    Citation,
    Structure,
    Other,
}

impl Category {
    /// All categories in their fixed presentation order. The slide deck and
    /// the formal review document iterate this so their layout is stable
    /// across runs even when a category has no findings.
    pub const ALL: [Category; 6] = [
        Category::Methodology,
        Category::Statistics,
        Category::Clarity,
        Category::Citation,
        Category::Structure,
        Category::Other,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Methodology => "methodology",
            Category::Statistics => "statistics",
            Category::Clarity => "clarity",
            Category::Citation => "citation",
            Category::Structure => "structure",
            Category::Other => "other",
        }
    }

    /// Title-case label for section headings and slide titles.
    pub fn title(&self) -> &'static str {
        match self {
            Category::Methodology => "Methodology",
            Category::Statistics => "Statistics",
            Category::Clarity => "Clarity",
            Category::Citation => "Citations",
            Category::Structure => "Structure",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One located, classified appraisal issue.
///
/// Immutable once created. Identity for dedup purposes is the SHA-256 of
/// (checker id, target span, message) — two checkers reporting the same text
/// at the same place with the same wording collapse into one finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Registry id of the checker that produced this finding.
    pub checker_id: &'static str,
    pub severity: Severity,
    pub category: Category,
    /// Contiguous range of the flattened document text this refers to.
    pub target: Span,
    /// Human-readable description of the issue.
    pub message: String,
    /// Replacement text for `target`, when the checker can propose one.
    /// Consumed by the redline renderer.
    pub suggested_fix: Option<String>,
}

impl Finding {
    pub fn new(
        checker_id: &'static str,
        severity: Severity,
        category: Category,
        target: Span,
        message: impl Into<String>,
    ) -> Self {
        Self {
            checker_id,
            severity,
            category,
            target,
            message: message.into(),
            suggested_fix: None,
        }
    }

    /// Attach a suggested replacement for the target span.
    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.suggested_fix = Some(fix.into());
        self
    }

    /// Dedup identity: hash of (checker_id, target, message).
    ///
    /// Severity, category, and the suggested fix are deliberately excluded —
    /// they are attributes of the finding, not of what it points at.
    pub fn identity(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.checker_id.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.target.start.to_le_bytes());
        hasher.update(self.target.end.to_le_bytes());
        hasher.update(self.message.as_bytes());
        hasher.finalize().into()
    }
}

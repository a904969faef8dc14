//! Finding aggregation: dedup, total ordering, summary statistics.
//!
//! The review order is a strict total order — severity descending, then
//! target start ascending, then checker id ascending — and every downstream
//! renderer depends on it: the report's table of contents, slide ordering,
//! annotation order, and the redline overlap tie-break all reproduce it.
//! Changing this sort changes every artifact; treat it as a wire format.

use crate::finding::{Category, Finding, Severity};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashSet;

/// Counts per severity and category for one review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub total: usize,
    /// Indexed in the order of [`Severity::ALL`] (critical first).
    pub by_severity: Vec<(Severity, usize)>,
    /// Indexed in the order of [`Category::ALL`].
    pub by_category: Vec<(Category, usize)>,
}

impl ReviewSummary {
    pub fn count_of(&self, severity: Severity) -> usize {
        self.by_severity
            .iter()
            .find(|(s, _)| *s == severity)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    pub fn count_in(&self, category: Category) -> usize {
        self.by_category
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}

/// The ordered, deduplicated set of findings for one document, plus summary
/// counts. Derived data: regenerated on every pipeline run, never edited.
#[derive(Debug, Clone, Serialize)]
pub struct Review {
    findings: Vec<Finding>,
    summary: ReviewSummary,
}

impl Review {
    /// Findings in review order.
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn summary(&self) -> &ReviewSummary {
        &self.summary
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Findings of one category, preserving review order.
    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(move |f| f.category == category)
    }
}

/// Build a [`Review`] from raw checker output.
///
/// Deduplicates by [`Finding::identity`], sorts into the review total order,
/// and computes summary counts. Idempotent: feeding a review's findings back
/// in reproduces the same review. The input is consumed but individual
/// findings are never mutated.
pub fn aggregate(findings: Vec<Finding>) -> Review {
    let mut seen: HashSet<[u8; 32]> = HashSet::with_capacity(findings.len());
    let mut kept: Vec<Finding> = findings
        .into_iter()
        .filter(|f| seen.insert(f.identity()))
        .collect();

    kept.sort_by(|a, b| {
        (Reverse(a.severity), a.target.start, a.checker_id)
            .cmp(&(Reverse(b.severity), b.target.start, b.checker_id))
    });

    let by_severity = Severity::ALL
        .iter()
        .map(|&s| (s, kept.iter().filter(|f| f.severity == s).count()))
        .collect();
    let by_category = Category::ALL
        .iter()
        .map(|&c| (c, kept.iter().filter(|f| f.category == c).count()))
        .collect();

    let summary = ReviewSummary {
        total: kept.len(),
        by_severity,
        by_category,
    };

    Review {
        findings: kept,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Span;

    fn finding(id: &'static str, sev: Severity, start: usize, msg: &str) -> Finding {
        Finding::new(id, sev, Category::Clarity, Span::new(start, start + 5), msg)
    }

    #[test]
    fn sorts_severity_desc_then_offset_then_checker() {
        let review = aggregate(vec![
            finding("b-check", Severity::Minor, 10, "m1"),
            finding("a-check", Severity::Minor, 10, "m2"),
            finding("z-check", Severity::Critical, 90, "c1"),
            finding("a-check", Severity::Minor, 2, "m3"),
        ]);
        let order: Vec<(&str, Severity, usize)> = review
            .findings()
            .iter()
            .map(|f| (f.checker_id, f.severity, f.target.start))
            .collect();
        assert_eq!(
            order,
            vec![
                ("z-check", Severity::Critical, 90),
                ("a-check", Severity::Minor, 2),
                ("a-check", Severity::Minor, 10),
                ("b-check", Severity::Minor, 10),
            ]
        );
    }

    #[test]
    fn dedups_by_identity() {
        let review = aggregate(vec![
            finding("a", Severity::Major, 0, "same"),
            finding("a", Severity::Major, 0, "same"),
            finding("a", Severity::Major, 0, "different"),
        ]);
        assert_eq!(review.summary().total, 2);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let first = aggregate(vec![
            finding("b", Severity::Minor, 7, "x"),
            finding("a", Severity::Critical, 3, "y"),
            finding("a", Severity::Critical, 3, "y"),
        ]);
        let second = aggregate(first.findings().to_vec());
        assert_eq!(first.findings(), second.findings());
        assert_eq!(first.summary(), second.summary());
    }

    #[test]
    fn summary_counts_cover_all_buckets() {
        let review = aggregate(vec![finding("a", Severity::Major, 0, "x")]);
        assert_eq!(review.summary().by_severity.len(), 4);
        assert_eq!(review.summary().by_category.len(), 6);
        assert_eq!(review.summary().count_of(Severity::Major), 1);
        assert_eq!(review.summary().count_of(Severity::Info), 0);
        assert_eq!(review.summary().count_in(Category::Clarity), 1);
    }

    #[test]
    fn review_serialises_to_json() {
        // Reviews are derived data: serialised for `--json` output, never
        // read back in.
        let review = aggregate(vec![finding("a-check", Severity::Major, 3, "x")]);
        let json = serde_json::to_string(&review).unwrap();
        assert!(json.contains("\"checker_id\":\"a-check\""));
        assert!(json.contains("\"severity\":\"major\""));
    }

    #[test]
    fn empty_input_gives_empty_review() {
        let review = aggregate(vec![]);
        assert!(review.is_empty());
        assert_eq!(review.summary().total, 0);
    }
}

//! Artifact renderers: independent projections of one review.
//!
//! Every renderer consumes the same immutable `(DocumentModel, Review)` pair
//! and produces finished artifact bytes; none of them write files or talk to
//! each other, which is what makes rendering embarrassingly parallel in the
//! orchestrator. A renderer that fails surfaces a [`RenderError`] for its
//! artifact only.
//!
//! All renderers validate finding spans up front: an out-of-range span is a
//! contract violation by the review producer and is reported loudly instead
//! of being clipped or dropped.

pub mod annotate;
pub mod deck;
pub mod formal;
pub mod markdown;
pub mod redline;

use crate::config::AppraisalConfig;
use crate::error::RenderError;
use crate::finding::Severity;
use crate::model::DocumentModel;
use crate::ooxml::docx::Highlight;
use crate::output::ArtifactKind;
use crate::review::Review;

/// One artifact projection.
pub trait Renderer: Send + Sync {
    fn kind(&self) -> ArtifactKind;

    /// Produce the finished artifact bytes. Pure: no filesystem access.
    fn render(&self, model: &DocumentModel, review: &Review) -> Result<Vec<u8>, RenderError>;
}

/// Construct the renderer for one artifact kind.
pub fn renderer_for(kind: ArtifactKind, config: &AppraisalConfig) -> Box<dyn Renderer> {
    match kind {
        ArtifactKind::MarkdownReport => Box::new(markdown::MarkdownReportRenderer),
        ArtifactKind::SlideDeck => Box::new(deck::SlideDeckRenderer {
            max_findings_per_slide: config.max_findings_per_slide,
        }),
        ArtifactKind::FormalReview => Box::new(formal::FormalReviewRenderer),
        ArtifactKind::AnnotatedText => Box::new(annotate::AnnotatedTextRenderer),
        ArtifactKind::Redline => Box::new(redline::RedlineRenderer),
    }
}

/// Reject any finding whose target span falls outside the model text.
pub(crate) fn validate_review(
    artifact: ArtifactKind,
    model: &DocumentModel,
    review: &Review,
) -> Result<(), RenderError> {
    let len = model.text().len();
    for f in review.findings() {
        if f.target.end > len || f.target.start > f.target.end {
            return Err(RenderError::SpanOutOfRange {
                artifact,
                checker_id: f.checker_id.to_string(),
                start: f.target.start,
                end: f.target.end,
                len,
            });
        }
    }
    Ok(())
}

/// A short, single-line excerpt of the span's source text for quoting in
/// reports and slides.
pub(crate) fn excerpt(model: &DocumentModel, span: crate::model::Span) -> String {
    const MAX: usize = 160;
    let raw = model.slice(span).replace('\n', " ");
    let trimmed = raw.trim();
    if trimmed.len() <= MAX {
        return trimmed.to_string();
    }
    let mut cut = MAX;
    while !trimmed.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…", &trimmed[..cut])
}

/// Severity colour coding shared by the DOCX-producing renderers.
pub(crate) fn severity_highlight(severity: Severity) -> Highlight {
    match severity {
        Severity::Critical => Highlight::Red,
        Severity::Major => Highlight::Yellow,
        Severity::Minor => Highlight::Cyan,
        Severity::Info => Highlight::Green,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::{Category, Finding};
    use crate::model::{BlockKind, Locator, Span, SourceFormat};
    use crate::review::aggregate;

    fn tiny_model() -> DocumentModel {
        let mut b = DocumentModel::builder(SourceFormat::Docx, "t");
        b.push_block(BlockKind::Paragraph, Locator::Paragraph(0), "short text");
        b.build()
    }

    #[test]
    fn out_of_range_span_is_rejected() {
        let model = tiny_model();
        let review = aggregate(vec![Finding::new(
            "bogus",
            Severity::Major,
            Category::Other,
            Span::new(0, 999),
            "points past the end",
        )]);
        let err = validate_review(ArtifactKind::MarkdownReport, &model, &review).unwrap_err();
        assert!(matches!(err, RenderError::SpanOutOfRange { end: 999, .. }));
        assert_eq!(err.artifact(), ArtifactKind::MarkdownReport);
    }

    #[test]
    fn in_range_review_passes() {
        let model = tiny_model();
        let review = aggregate(vec![Finding::new(
            "ok",
            Severity::Info,
            Category::Other,
            Span::new(0, 5),
            "fine",
        )]);
        assert!(validate_review(ArtifactKind::Redline, &model, &review).is_ok());
    }

    #[test]
    fn excerpt_truncates_on_char_boundaries() {
        let mut b = DocumentModel::builder(SourceFormat::Docx, "t");
        let long = "é".repeat(200);
        b.push_block(BlockKind::Paragraph, Locator::Paragraph(0), &long);
        let model = b.build();
        let span = model.blocks()[0].span;
        let quoted = excerpt(&model, Span::new(span.start, span.end - 1));
        assert!(quoted.ends_with('…'));
        assert!(quoted.len() <= 164);
    }
}

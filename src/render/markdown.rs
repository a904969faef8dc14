//! The narrative markdown report.
//!
//! Executive summary first, then every finding in review order with the
//! quoted source text it refers to. This is the artifact people read in a
//! terminal or a PR, so it stays plain: no HTML, no tables wider than a
//! finding.

use crate::error::RenderError;
use crate::model::DocumentModel;
use crate::output::ArtifactKind;
use crate::render::{excerpt, validate_review, Renderer};
use crate::review::Review;

pub struct MarkdownReportRenderer;

impl Renderer for MarkdownReportRenderer {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::MarkdownReport
    }

    fn render(&self, model: &DocumentModel, review: &Review) -> Result<Vec<u8>, RenderError> {
        validate_review(self.kind(), model, review)?;

        let mut out = String::new();
        out.push_str(&format!("# Review: {}\n\n", model.stem()));
        out.push_str(&format!(
            "Appraised {} blocks from a {} source.\n\n",
            model.blocks().len(),
            model.format().name()
        ));

        out.push_str("## Summary\n\n");
        let summary = review.summary();
        if summary.total == 0 {
            out.push_str("**0 issues found.** The document passed every enabled check.\n");
        } else {
            out.push_str(&format!(
                "**{} issue{} found.**\n\n",
                summary.total,
                if summary.total == 1 { "" } else { "s" }
            ));
            for (severity, count) in &summary.by_severity {
                out.push_str(&format!("- {severity}: {count}\n"));
            }
        }
        out.push('\n');

        if !review.is_empty() {
            out.push_str("## Findings\n\n");
            for (idx, f) in review.findings().iter().enumerate() {
                let location = model
                    .locate(f.target)
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| "end of document".to_string());
                out.push_str(&format!(
                    "### {}. [{}] {}\n\n",
                    idx + 1,
                    f.severity,
                    f.message
                ));
                out.push_str(&format!(
                    "*{} — {}, reported by `{}`*\n\n",
                    f.category.title(),
                    location,
                    f.checker_id
                ));
                let quoted = excerpt(model, f.target);
                if !quoted.is_empty() {
                    out.push_str(&format!("> {quoted}\n\n"));
                }
                if let Some(fix) = &f.suggested_fix {
                    out.push_str(&format!("Suggested fix: {fix}\n\n"));
                }
            }
        }

        Ok(out.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::{Category, Finding, Severity};
    use crate::model::{BlockKind, Locator, Span, SourceFormat};
    use crate::review::aggregate;

    fn model() -> DocumentModel {
        let mut b = DocumentModel::builder(SourceFormat::Docx, "paper");
        b.push_block(BlockKind::Heading, Locator::Paragraph(0), "METHODS");
        b.push_block(
            BlockKind::Paragraph,
            Locator::Paragraph(1),
            "The difference was significant.",
        );
        b.build()
    }

    fn render_to_string(review: &Review) -> String {
        let bytes = MarkdownReportRenderer.render(&model(), review).unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn empty_review_reports_zero_issues() {
        let text = render_to_string(&aggregate(vec![]));
        assert!(text.contains("# Review: paper"));
        assert!(text.contains("0 issues found"));
        assert!(!text.contains("## Findings"));
    }

    #[test]
    fn findings_appear_in_review_order_with_quotes() {
        let m = model();
        let body = m.blocks()[1].span;
        let review = aggregate(vec![
            Finding::new(
                "clarity",
                Severity::Minor,
                Category::Clarity,
                Span::new(body.start, body.end - 1),
                "minor wording issue",
            ),
            Finding::new(
                "stat-reporting",
                Severity::Major,
                Category::Statistics,
                Span::new(body.start, body.end - 1),
                "significance without p-value",
            ),
        ]);
        let text = render_to_string(&review);
        let major_at = text.find("significance without p-value").unwrap();
        let minor_at = text.find("minor wording issue").unwrap();
        assert!(major_at < minor_at, "major findings come first");
        assert!(text.contains("> The difference was significant."));
        assert!(text.contains("paragraph 2"));
        assert!(text.contains("`stat-reporting`"));
    }

    #[test]
    fn suggested_fix_is_printed() {
        let m = model();
        let body = m.blocks()[1].span;
        let review = aggregate(vec![Finding::new(
            "clarity",
            Severity::Minor,
            Category::Clarity,
            Span::new(body.start, body.start + 3),
            "duplicated word",
        )
        .with_fix("The")]);
        assert!(render_to_string(&review).contains("Suggested fix: The"));
    }
}

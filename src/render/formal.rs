//! The formal peer-review DOCX.
//!
//! Fixed skeleton: Summary, Methodology Concerns, Statistical Concerns,
//! Clarity, Recommendation. All five sections render whether or not they
//! have findings, so reviewers always see the same document shape and an
//! empty section reads as an explicit "no concerns" statement.

use crate::error::RenderError;
use crate::finding::{Category, Finding, Severity};
use crate::model::DocumentModel;
use crate::ooxml::docx::{write_docx, DocxParagraph, DocxRun};
use crate::output::ArtifactKind;
use crate::render::{validate_review, Renderer};
use crate::review::Review;

pub struct FormalReviewRenderer;

/// The fixed review sections, with the categories folded into each.
const SECTIONS: [(&str, &[Category]); 3] = [
    (
        "Methodology Concerns",
        &[Category::Methodology, Category::Structure],
    ),
    ("Statistical Concerns", &[Category::Statistics]),
    (
        "Clarity",
        &[Category::Clarity, Category::Citation, Category::Other],
    ),
];

impl Renderer for FormalReviewRenderer {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::FormalReview
    }

    fn render(&self, model: &DocumentModel, review: &Review) -> Result<Vec<u8>, RenderError> {
        validate_review(self.kind(), model, review)?;

        let mut paragraphs = vec![DocxParagraph::heading1(format!(
            "Peer Review: {}",
            model.stem()
        ))];

        paragraphs.push(DocxParagraph::heading2("Summary"));
        paragraphs.push(DocxParagraph::text(summary_text(review)));

        for (title, categories) in SECTIONS {
            paragraphs.push(DocxParagraph::heading2(title));
            let findings: Vec<&Finding> = review
                .findings()
                .iter()
                .filter(|f| categories.contains(&f.category))
                .collect();
            if findings.is_empty() {
                paragraphs.push(DocxParagraph::text("No concerns identified."));
                continue;
            }
            for f in findings {
                let location = model
                    .locate(f.target)
                    .map(|l| format!(" ({l})"))
                    .unwrap_or_default();
                let mut runs = vec![
                    DocxRun::bold(format!("[{}] ", f.severity)),
                    DocxRun::plain(format!("{}{location}", f.message)),
                ];
                if let Some(fix) = &f.suggested_fix {
                    runs.push(DocxRun::italic(format!(" Suggested: {fix}")));
                }
                paragraphs.push(DocxParagraph::from_runs(runs));
            }
        }

        paragraphs.push(DocxParagraph::heading2("Recommendation"));
        paragraphs.push(DocxParagraph::text(recommendation(review)));

        write_docx(&paragraphs).map_err(|e| RenderError::Encode {
            artifact: self.kind(),
            stage: "docx assembly",
            detail: e.to_string(),
        })
    }
}

fn summary_text(review: &Review) -> String {
    let s = review.summary();
    if s.total == 0 {
        return "The appraisal found no issues with the enabled checks.".to_string();
    }
    let counts: Vec<String> = s
        .by_severity
        .iter()
        .filter(|(_, n)| *n > 0)
        .map(|(sev, n)| format!("{n} {sev}"))
        .collect();
    format!(
        "The appraisal raised {} finding{}: {}.",
        s.total,
        if s.total == 1 { "" } else { "s" },
        counts.join(", ")
    )
}

fn recommendation(review: &Review) -> String {
    let s = review.summary();
    if s.count_of(Severity::Critical) > 0 {
        "Major revision required; critical issues must be resolved before the manuscript can \
         be assessed further."
            .to_string()
    } else if s.count_of(Severity::Major) > 0 {
        "Major revision recommended to address the concerns above.".to_string()
    } else if s.count_of(Severity::Minor) > 0 {
        "Minor revision recommended.".to_string()
    } else {
        "Acceptable as submitted with respect to the automated checks.".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BlockKind, Locator, Span, SourceFormat};
    use crate::review::aggregate;
    use std::io::Read;

    fn model() -> DocumentModel {
        let mut b = DocumentModel::builder(SourceFormat::Docx, "paper");
        b.push_block(BlockKind::Paragraph, Locator::Paragraph(0), "Body text.");
        b.build()
    }

    fn document_xml(bytes: &[u8]) -> String {
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes.to_vec())).unwrap();
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    #[test]
    fn all_sections_render_for_an_empty_review() {
        let bytes = FormalReviewRenderer
            .render(&model(), &aggregate(vec![]))
            .unwrap();
        let xml = document_xml(&bytes);
        for section in [
            "Summary",
            "Methodology Concerns",
            "Statistical Concerns",
            "Clarity",
            "Recommendation",
        ] {
            assert!(xml.contains(section), "missing section {section}");
        }
        assert!(xml.contains("No concerns identified."));
        assert!(xml.contains("Acceptable as submitted"));
    }

    #[test]
    fn findings_land_in_their_sections() {
        let review = aggregate(vec![
            Finding::new(
                "stat-reporting",
                Severity::Major,
                Category::Statistics,
                Span::new(0, 4),
                "significance without p-value",
            ),
            Finding::new(
                "structure",
                Severity::Major,
                Category::Structure,
                Span::new(0, 4),
                "missing METHODS section",
            ),
        ]);
        let xml = document_xml(&FormalReviewRenderer.render(&model(), &review).unwrap());
        let methodology_at = xml.find("Methodology Concerns").unwrap();
        let statistical_at = xml.find("Statistical Concerns").unwrap();
        let structure_finding_at = xml.find("missing METHODS section").unwrap();
        let stats_finding_at = xml.find("significance without p-value").unwrap();
        assert!(methodology_at < structure_finding_at);
        assert!(structure_finding_at < statistical_at);
        assert!(statistical_at < stats_finding_at);
        assert!(xml.contains("Major revision recommended"));
    }

    #[test]
    fn summary_counts_by_severity() {
        let review = aggregate(vec![Finding::new(
            "clarity",
            Severity::Minor,
            Category::Clarity,
            Span::new(0, 4),
            "wording",
        )]);
        let xml = document_xml(&FormalReviewRenderer.render(&model(), &review).unwrap());
        assert!(xml.contains("1 finding: 1 minor."));
        assert!(xml.contains("Minor revision recommended."));
    }
}

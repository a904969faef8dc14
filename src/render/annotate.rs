//! The annotated copy: the full flattened text with every finding attached
//! at its exact span.
//!
//! DOCX sources get a real DOCX with highlighted runs and Word comment
//! parts. PDF sources get markdown with footnote markers, since the only
//! binary document writer in the crate targets OOXML.
//!
//! Overlapping findings are all kept here — unlike the redline, annotation
//! has no exclusivity requirement. A character covered by several findings
//! is highlighted with the most severe one's colour and its comment lists
//! every message.

use crate::error::RenderError;
use crate::finding::Finding;
use crate::model::{Block, BlockKind, DocumentModel, Span};
use crate::ooxml::docx::{write_docx, DocxParagraph, DocxRun, ParaStyle};
use crate::output::ArtifactKind;
use crate::render::{severity_highlight, validate_review, Renderer};
use crate::review::Review;
use crate::model::SourceFormat;

pub struct AnnotatedTextRenderer;

impl Renderer for AnnotatedTextRenderer {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::AnnotatedText
    }

    fn render(&self, model: &DocumentModel, review: &Review) -> Result<Vec<u8>, RenderError> {
        validate_review(self.kind(), model, review)?;
        match model.format() {
            SourceFormat::Docx => self.render_docx(model, review),
            SourceFormat::Pdf => Ok(self.render_markdown(model, review).into_bytes()),
        }
    }
}

impl AnnotatedTextRenderer {
    fn render_docx(&self, model: &DocumentModel, review: &Review) -> Result<Vec<u8>, RenderError> {
        let mut paragraphs = Vec::with_capacity(model.blocks().len());

        for block in model.blocks() {
            let runs = annotate_block(model, block, review.findings());
            let style = match block.kind {
                BlockKind::Heading => ParaStyle::Heading2,
                _ => ParaStyle::Normal,
            };
            paragraphs.push(DocxParagraph { style, runs });
        }

        write_docx(&paragraphs).map_err(|e| RenderError::Encode {
            artifact: self.kind(),
            stage: "docx assembly",
            detail: e.to_string(),
        })
    }

    fn render_markdown(&self, model: &DocumentModel, review: &Review) -> String {
        let mut out = format!("# Annotated: {}\n\n", model.stem());

        for block in model.blocks() {
            let content = block_content(block);
            let text = model.slice(content);
            // Footnote markers at each finding's end offset, inserted right
            // to left so earlier offsets stay valid.
            let mut markers: Vec<(usize, usize)> = review
                .findings()
                .iter()
                .enumerate()
                .filter(|(_, f)| f.target.overlaps(&content))
                .map(|(idx, f)| (f.target.end.clamp(content.start, content.end) - content.start, idx + 1))
                .collect();
            markers.sort_by(|a, b| b.cmp(a));

            let mut line = text.to_string();
            for (offset, number) in markers {
                let at = clamp_to_char_boundary(&line, offset);
                line.insert_str(at, &format!("[^{number}]"));
            }
            if block.kind == BlockKind::Heading {
                out.push_str(&format!("## {line}\n\n"));
            } else {
                out.push_str(&format!("{line}\n\n"));
            }
        }

        if !review.is_empty() {
            out.push_str("## Annotations\n\n");
            for (idx, f) in review.findings().iter().enumerate() {
                out.push_str(&format!(
                    "[^{}]: [{}] {} ({})\n",
                    idx + 1,
                    f.severity,
                    f.message,
                    f.checker_id
                ));
            }
        }
        out
    }
}

/// Content span of a block, without its trailing newline.
fn block_content(block: &Block) -> Span {
    Span::new(block.span.start, block.span.end.saturating_sub(1))
}

/// Split one block's text into runs at finding boundaries. Segments covered
/// by at least one finding become commented, highlighted runs.
fn annotate_block(model: &DocumentModel, block: &Block, findings: &[Finding]) -> Vec<DocxRun> {
    let content = block_content(block);
    let covering: Vec<&Finding> = findings
        .iter()
        .filter(|f| f.target.overlaps(&content))
        .collect();
    if covering.is_empty() {
        return vec![DocxRun::plain(model.slice(content))];
    }

    // Cut points: block edges plus every finding edge inside the block.
    let mut cuts: Vec<usize> = vec![content.start, content.end];
    for f in &covering {
        cuts.push(f.target.start.clamp(content.start, content.end));
        cuts.push(f.target.end.clamp(content.start, content.end));
    }
    cuts.sort_unstable();
    cuts.dedup();

    let mut runs = Vec::new();
    for pair in cuts.windows(2) {
        let segment = Span::new(pair[0], pair[1]);
        if segment.is_empty() {
            continue;
        }
        let text = model.slice(segment);
        let over: Vec<&&Finding> = covering
            .iter()
            .filter(|f| f.target.overlaps(&segment))
            .collect();
        if over.is_empty() {
            runs.push(DocxRun::plain(text));
        } else {
            // Findings arrive in review order, so the first is the most
            // severe and its colour wins.
            let comment = over
                .iter()
                .map(|f| format!("[{}] {} ({})", f.severity, f.message, f.checker_id))
                .collect::<Vec<_>>()
                .join(" | ");
            runs.push(DocxRun::Commented {
                text: text.to_string(),
                highlight: Some(severity_highlight(over[0].severity)),
                comment,
            });
        }
    }
    runs
}

fn clamp_to_char_boundary(text: &str, mut idx: usize) -> usize {
    idx = idx.min(text.len());
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::{Category, Severity};
    use crate::model::Locator;
    use crate::review::aggregate;
    use std::io::Read;

    fn docx_model() -> DocumentModel {
        let mut b = DocumentModel::builder(SourceFormat::Docx, "paper");
        b.push_block(BlockKind::Heading, Locator::Paragraph(0), "RESULTS");
        b.push_block(
            BlockKind::Paragraph,
            Locator::Paragraph(1),
            "The difference was significant overall.",
        );
        b.build()
    }

    fn pdf_model() -> DocumentModel {
        let mut b = DocumentModel::builder(SourceFormat::Pdf, "paper");
        b.push_block(BlockKind::Heading, Locator::Page(1), "RESULTS");
        b.push_block(
            BlockKind::Paragraph,
            Locator::Page(1),
            "The difference was significant overall.",
        );
        b.build()
    }

    fn one_finding(model: &DocumentModel) -> Review {
        let body = model.blocks()[1].span;
        aggregate(vec![Finding::new(
            "stat-reporting",
            Severity::Major,
            Category::Statistics,
            Span::new(body.start + 19, body.start + 30),
            "significance without p-value",
        )])
    }

    #[test]
    fn docx_output_carries_comment_and_highlight() {
        let model = docx_model();
        let bytes = AnnotatedTextRenderer
            .render(&model, &one_finding(&model))
            .unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        let mut comments = String::new();
        archive
            .by_name("word/comments.xml")
            .unwrap()
            .read_to_string(&mut comments)
            .unwrap();
        assert!(comments.contains("significance without p-value"));
    }

    #[test]
    fn docx_preserves_full_text() {
        let model = docx_model();
        let bytes = AnnotatedTextRenderer
            .render(&model, &one_finding(&model))
            .unwrap();
        let blocks = crate::ooxml::docx::read_docx(&bytes).unwrap();
        let rebuilt: String = blocks.iter().map(|(_, t)| t.as_str()).collect::<Vec<_>>().join("\n");
        assert_eq!(
            rebuilt,
            "RESULTS\nThe difference was significant overall."
        );
    }

    #[test]
    fn pdf_source_gets_markdown_with_footnotes() {
        let model = pdf_model();
        let bytes = AnnotatedTextRenderer
            .render(&model, &one_finding(&model))
            .unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("# Annotated: paper"));
        assert!(text.contains("[^1]"));
        assert!(text.contains("[^1]: [major] significance without p-value"));
    }

    #[test]
    fn uncovered_text_stays_plain() {
        let model = docx_model();
        let runs = annotate_block(
            &model,
            &model.blocks()[1],
            one_finding(&model).findings(),
        );
        assert!(matches!(runs.first(), Some(DocxRun::Text { .. })));
        assert!(runs.iter().any(|r| matches!(r, DocxRun::Commented { .. })));
    }
}

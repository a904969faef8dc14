//! Document normalisation: heterogeneous parsed input → one positional model.
//!
//! This is the only place PDF and DOCX coordinates exist side by side.
//! Everything downstream sees flattened character offsets plus a per-block
//! [`Locator`](crate::model::Locator) for human-readable positions.
//!
//! ## PDF
//!
//! `pdf-extract` gives the whole text layer in one string with form-feed
//! page separators. Pages are split on `\x0C`, paragraphs on blank lines,
//! and wrapped lines within a paragraph are rejoined. A document whose text
//! layer is essentially empty (a scanned PDF) is rejected as
//! `MalformedDocument` — there is nothing to appraise.
//!
//! ## DOCX
//!
//! The OOXML reader already yields typed blocks in body order; normalisation
//! is a straight re-labelling with paragraph-index locators.

use crate::error::AppraiseError;
use crate::model::{BlockKind, DocumentModel, Locator, SourceFormat};
use crate::ooxml::docx::read_docx;
use crate::pipeline::input::ResolvedInput;
use tracing::{debug, info};

/// Minimum characters of extractable text below which a PDF is treated as
/// scanned (no useful text layer).
const SCANNED_PDF_THRESHOLD: usize = 50;

/// Convert a resolved input into the canonical document model.
///
/// Fatal by design: with no model, nothing downstream can run.
pub fn normalize(input: &ResolvedInput) -> Result<DocumentModel, AppraiseError> {
    let model = match input.format {
        SourceFormat::Pdf => normalize_pdf(input)?,
        SourceFormat::Docx => normalize_docx(input)?,
    };

    if model.blocks().is_empty() {
        return Err(AppraiseError::MalformedDocument {
            path: input.path.clone(),
            detail: "parser recovered no textual blocks".into(),
        });
    }

    info!(
        "Normalised {} into {} blocks, {} chars",
        input.path.display(),
        model.blocks().len(),
        model.text().len()
    );
    Ok(model)
}

fn normalize_pdf(input: &ResolvedInput) -> Result<DocumentModel, AppraiseError> {
    let raw_text = pdf_extract::extract_text_from_mem(&input.bytes).map_err(|e| {
        AppraiseError::ParseFailed {
            format: "PDF",
            path: input.path.clone(),
            detail: e.to_string(),
        }
    })?;

    let trimmed = raw_text.trim();
    if trimmed.len() < SCANNED_PDF_THRESHOLD
        || trimmed.chars().filter(|c| !c.is_whitespace()).count() < 20
    {
        return Err(AppraiseError::MalformedDocument {
            path: input.path.clone(),
            detail: "text layer is empty or near-empty; the PDF is likely scanned".into(),
        });
    }

    let mut builder = DocumentModel::builder(SourceFormat::Pdf, input.stem.clone());

    // pdf-extract separates pages with form feeds; absent those, the whole
    // text is one page.
    for (page_idx, page_text) in raw_text.split('\x0C').enumerate() {
        let locator = Locator::Page(page_idx + 1);
        for paragraph in split_paragraphs(page_text) {
            let kind = classify_pdf_block(&paragraph);
            builder.push_block(kind, locator, &paragraph);
        }
    }

    debug!("PDF normalisation produced {} blocks", builder.len());
    Ok(builder.build())
}

fn normalize_docx(input: &ResolvedInput) -> Result<DocumentModel, AppraiseError> {
    let blocks = read_docx(&input.bytes).map_err(|e| AppraiseError::ParseFailed {
        format: "DOCX",
        path: input.path.clone(),
        detail: e.to_string(),
    })?;

    let mut builder = DocumentModel::builder(SourceFormat::Docx, input.stem.clone());
    for (idx, (kind, text)) in blocks.into_iter().enumerate() {
        builder.push_block(kind, Locator::Paragraph(idx), &text);
    }

    debug!("DOCX normalisation produced {} blocks", builder.len());
    Ok(builder.build())
}

/// Split page text on blank lines, rejoining hard-wrapped lines within each
/// paragraph.
fn split_paragraphs(page_text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current = String::new();

    for line in page_text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
        } else {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }
    paragraphs
}

/// Structural guess for a PDF paragraph. PDF has no style information in the
/// text layer, so this is purely lexical.
fn classify_pdf_block(text: &str) -> BlockKind {
    let lower = text.to_lowercase();
    if lower.starts_with("figure ") || lower.starts_with("fig. ") || lower.starts_with("table ") {
        return BlockKind::FigureCaption;
    }

    // Short line, no sentence-ending punctuation, mostly upper-case letters:
    // almost certainly a section heading.
    if text.len() < 60 && !text.ends_with('.') {
        let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
        if !letters.is_empty() {
            let upper = letters.iter().filter(|c| c.is_uppercase()).count();
            if upper * 2 >= letters.len() {
                return BlockKind::Heading;
            }
        }
    }

    if text.starts_with("- ") || text.starts_with("• ") {
        return BlockKind::ListItem;
    }

    BlockKind::Paragraph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::docx::{write_docx, DocxParagraph};
    use crate::pipeline::input::ResolvedInput;
    use std::path::PathBuf;

    fn docx_input(paragraphs: &[DocxParagraph]) -> ResolvedInput {
        ResolvedInput {
            path: PathBuf::from("mem.docx"),
            stem: "mem".into(),
            format: SourceFormat::Docx,
            bytes: write_docx(paragraphs).unwrap(),
        }
    }

    #[test]
    fn docx_blocks_get_paragraph_locators() {
        let model = normalize(&docx_input(&[
            DocxParagraph::heading1("METHODS"),
            DocxParagraph::text("We enrolled patients."),
        ]))
        .unwrap();
        assert_eq!(model.blocks().len(), 2);
        assert_eq!(model.blocks()[0].kind, BlockKind::Heading);
        assert_eq!(model.blocks()[1].locator, Locator::Paragraph(1));
        assert!(model.verify_span_totality());
    }

    #[test]
    fn empty_docx_is_malformed() {
        let err = normalize(&docx_input(&[])).unwrap_err();
        assert!(matches!(err, AppraiseError::MalformedDocument { .. }));
    }

    #[test]
    fn paragraph_splitting_rejoins_wrapped_lines() {
        let paragraphs = split_paragraphs("first line\nstill first\n\nsecond paragraph\n");
        assert_eq!(
            paragraphs,
            vec!["first line still first", "second paragraph"]
        );
    }

    #[test]
    fn pdf_heading_classification() {
        assert_eq!(classify_pdf_block("INTRODUCTION"), BlockKind::Heading);
        assert_eq!(
            classify_pdf_block("Figure 2: survival curves"),
            BlockKind::FigureCaption
        );
        assert_eq!(
            classify_pdf_block("This is an ordinary sentence of body text."),
            BlockKind::Paragraph
        );
        assert_eq!(classify_pdf_block("- enrolment criteria"), BlockKind::ListItem);
    }

    #[test]
    fn flattened_text_concatenates_blocks() {
        let model = normalize(&docx_input(&[
            DocxParagraph::text("one"),
            DocxParagraph::text("two"),
        ]))
        .unwrap();
        assert_eq!(model.text(), "one\ntwo\n");
    }
}

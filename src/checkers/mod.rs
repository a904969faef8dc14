//! The heuristic checker registry.
//!
//! A checker is a named, pure predicate over the document model: no I/O, no
//! shared state, no dependency on other checkers or on execution order.
//! That contract is what lets the engine run them as independent parallel
//! tasks and what makes each one unit-testable with nothing but a model
//! built in the test.
//!
//! New heuristics register by appending to [`default_registry`]; nothing
//! else in the crate changes. Heuristics are structural/lexical/statistical
//! only — no checker attempts semantic understanding of the manuscript.

pub mod citation;
pub mod clarity;
pub mod guidance;
pub mod methodology;
pub mod statistics;
pub mod structure;

use crate::config::AppraisalConfig;
use crate::finding::Finding;
use crate::model::{Block, BlockKind, DocumentModel, Span};
use std::sync::Arc;

/// One heuristic rule.
///
/// `check` receives a read-only model and configuration and returns the
/// findings it can justify, or an error string describing why it could not
/// run (surfaced as a [`crate::error::CheckerFailure`], never aborting
/// sibling checkers).
pub trait Checker: Send + Sync {
    /// Stable registry id, recorded on every finding.
    fn id(&self) -> &'static str;

    fn check(
        &self,
        model: &DocumentModel,
        config: &AppraisalConfig,
    ) -> Result<Vec<Finding>, String>;
}

/// The built-in checker set, in registry order.
///
/// Order is irrelevant to output — the aggregator imposes the review order —
/// but keeping a fixed list makes the registry easy to audit.
pub fn default_registry() -> Vec<Arc<dyn Checker>> {
    vec![
        Arc::new(methodology::StudyDesignChecker),
        Arc::new(statistics::StatReportingChecker),
        Arc::new(clarity::ClarityChecker),
        Arc::new(citation::CitationChecker),
        Arc::new(structure::StructureChecker),
        Arc::new(guidance::SectionGuidanceChecker),
    ]
}

/// Find the heading block introducing the named section, if present.
///
/// Matching is case-insensitive on the heading text containing the section
/// name, so "STATISTICAL ANALYSIS", "Statistical analysis", and
/// "2. Statistical Analysis" all match.
pub(crate) fn find_section<'m>(model: &'m DocumentModel, section: &str) -> Option<&'m Block> {
    let needle = section.to_uppercase();
    model
        .blocks()
        .iter()
        .find(|b| b.kind == BlockKind::Heading && model.block_text(b).to_uppercase().contains(&needle))
}

/// Span of a block's text without the trailing newline the builder appends.
/// Findings target content, not separators.
pub(crate) fn content_span(block: &Block) -> Span {
    Span::new(block.span.start, block.span.end.saturating_sub(1))
}

/// Round `idx` up to the nearest UTF-8 char boundary so fixed-width scan
/// windows never slice through a multibyte character.
pub(crate) fn clamp_to_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx < text.len() && !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

/// Body blocks of the named section: everything between its heading and the
/// next heading (or the end of the document).
pub(crate) fn section_body<'m>(
    model: &'m DocumentModel,
    section: &str,
) -> impl Iterator<Item = &'m Block> {
    let heading = find_section(model, section);
    let start = heading.map(|h| h.id.0 as usize + 1).unwrap_or(usize::MAX);
    model
        .blocks()
        .iter()
        .skip(start)
        .take_while(|b| b.kind != BlockKind::Heading)
}

#[cfg(test)]
pub(crate) mod testutil {
    use crate::model::{BlockKind, DocumentModel, Locator, SourceFormat};

    /// Build a DOCX-flavoured model from (kind, text) pairs.
    pub fn model_of(blocks: &[(BlockKind, &str)]) -> DocumentModel {
        let mut b = DocumentModel::builder(SourceFormat::Docx, "test");
        for (idx, (kind, text)) in blocks.iter().enumerate() {
            b.push_block(*kind, Locator::Paragraph(idx), text);
        }
        b.build()
    }

    /// Shorthand: headings + paragraphs for a plausible manuscript skeleton.
    pub fn manuscript(sections: &[(&str, &str)]) -> DocumentModel {
        let mut blocks: Vec<(BlockKind, String)> = Vec::new();
        for (heading, body) in sections {
            blocks.push((BlockKind::Heading, heading.to_string()));
            blocks.push((BlockKind::Paragraph, body.to_string()));
        }
        let mut b = DocumentModel::builder(SourceFormat::Docx, "test");
        for (idx, (kind, text)) in blocks.iter().enumerate() {
            b.push_block(*kind, Locator::Paragraph(idx), text);
        }
        b.build()
    }
}

//! The positional document model shared by every pipeline stage.
//!
//! ## One coordinate system
//!
//! PDF pages, DOCX paragraph indices, and character offsets are three
//! different coordinate systems. All of the cross-format mapping lives here
//! and in the normaliser; every downstream component (checkers, aggregator,
//! renderers) sees only **flattened character offsets** into one canonical
//! text. Each block still remembers its original-format [`Locator`] so
//! human-readable output can say "page 4" or "paragraph 12".
//!
//! ## The span-totality invariant
//!
//! Concatenating all block texts in order reproduces the canonical flattened
//! text exactly — no gaps, no overlaps; every character belongs to exactly
//! one block. The annotation and redline renderers re-anchor findings by
//! offset, so a single off-by-one here corrupts those outputs. The invariant
//! is therefore enforced *by construction*: [`DocumentModel`] can only be
//! built through [`DocumentModelBuilder`], which assigns spans itself while
//! appending to the flattened text. Each block contributes its text plus
//! exactly one trailing newline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which parser produced the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFormat {
    Pdf,
    Docx,
}

impl SourceFormat {
    /// Lower-case name used in error messages and artifact decisions.
    pub fn name(&self) -> &'static str {
        match self {
            SourceFormat::Pdf => "PDF",
            SourceFormat::Docx => "DOCX",
        }
    }
}

/// Stable identity of a block within one document model.
///
/// Ids are assigned in document order by the builder and never reused, so
/// they double as a sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockId(pub u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

/// A contiguous half-open character range `start..end` in the canonical
/// flattened text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start must not exceed end");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True when the two spans share at least one character.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True when `other` lies entirely within `self`.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Original-format position of a block, preserved for human-readable output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locator {
    /// 1-indexed PDF page number.
    Page(usize),
    /// 0-indexed DOCX body paragraph (or table-cell) index.
    Paragraph(usize),
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Page(n) => write!(f, "page {n}"),
            Locator::Paragraph(n) => write!(f, "paragraph {}", n + 1),
        }
    }
}

/// Structural role of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Paragraph,
    Heading,
    TableCell,
    FigureCaption,
    ListItem,
}

/// One structural unit of the document: a paragraph, heading, table cell,
/// figure caption, or list item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    /// Position of this block's text in the canonical flattened text,
    /// including the single trailing newline the builder appends.
    pub span: Span,
    pub locator: Locator,
}

/// An immutable, positional view of one input document.
///
/// Created once per input file by the normaliser and shared by reference
/// (`Arc`) between concurrently running checkers and renderers. There is no
/// mutation API: derived data (the review, the artifacts) is regenerated,
/// never edited in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentModel {
    format: SourceFormat,
    /// File stem of the source document, used to derive artifact paths.
    stem: String,
    text: String,
    blocks: Vec<Block>,
}

impl DocumentModel {
    /// Start building a model for the given source.
    pub fn builder(format: SourceFormat, stem: impl Into<String>) -> DocumentModelBuilder {
        DocumentModelBuilder {
            format,
            stem: stem.into(),
            text: String::new(),
            blocks: Vec::new(),
        }
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// The canonical flattened text. Every checker offset and every finding
    /// span indexes into this string.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Blocks in document order, spans strictly increasing.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Text of a single block, without the trailing newline.
    pub fn block_text(&self, block: &Block) -> &str {
        self.text[block.span.start..block.span.end].trim_end_matches('\n')
    }

    /// Slice of the flattened text covered by `span`.
    ///
    /// Callers must have validated the span against [`Self::text`] length;
    /// renderers do this up front and treat violations as contract errors.
    pub fn slice(&self, span: Span) -> &str {
        &self.text[span.start..span.end]
    }

    /// The block containing the given flattened offset, if any.
    pub fn block_at(&self, offset: usize) -> Option<&Block> {
        // Spans partition the text, so binary search on start offsets works.
        match self
            .blocks
            .binary_search_by(|b| b.span.start.cmp(&offset))
        {
            Ok(i) => Some(&self.blocks[i]),
            Err(0) => None,
            Err(i) => {
                let b = &self.blocks[i - 1];
                (offset < b.span.end).then_some(b)
            }
        }
    }

    /// All blocks whose span intersects the given span, in document order.
    pub fn blocks_in(&self, span: Span) -> impl Iterator<Item = &Block> {
        self.blocks.iter().filter(move |b| b.span.overlaps(&span))
    }

    /// Human-readable location of a span: the locator of its first block.
    pub fn locate(&self, span: Span) -> Option<Locator> {
        self.block_at(span.start).map(|b| b.locator)
    }
}

/// Builder that owns span assignment, making the totality invariant
/// unbreakable: callers supply text and metadata, never offsets.
#[derive(Debug)]
pub struct DocumentModelBuilder {
    format: SourceFormat,
    stem: String,
    text: String,
    blocks: Vec<Block>,
}

impl DocumentModelBuilder {
    /// Append one block. A single `\n` is appended to the flattened text
    /// after `text`, and belongs to this block's span.
    ///
    /// Interior newlines in `text` are collapsed to spaces so that "one line
    /// per block" holds in the flattened text, which the redline diff and
    /// the annotated output both rely on.
    pub fn push_block(&mut self, kind: BlockKind, locator: Locator, text: &str) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        let start = self.text.len();
        let cleaned = text.replace(['\r', '\n'], " ");
        self.text.push_str(cleaned.trim());
        self.text.push('\n');
        self.blocks.push(Block {
            id,
            kind,
            span: Span::new(start, self.text.len()),
            locator,
        });
        id
    }

    /// Number of blocks pushed so far.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Finish the model.
    pub fn build(self) -> DocumentModel {
        let model = DocumentModel {
            format: self.format,
            stem: self.stem,
            text: self.text,
            blocks: self.blocks,
        };
        debug_assert!(model.verify_span_totality());
        model
    }
}

impl DocumentModel {
    /// Check the span-totality invariant. Always true for models produced by
    /// the builder; exposed so tests can assert it directly.
    pub fn verify_span_totality(&self) -> bool {
        let mut cursor = 0usize;
        for b in &self.blocks {
            if b.span.start != cursor || b.span.end < b.span.start {
                return false;
            }
            cursor = b.span.end;
        }
        cursor == self.text.len()
    }
}

//! OOXML container services: DOCX reading, DOCX and PPTX writing.
//!
//! This module is the crate's binding of the "parse file → structured
//! content" and "structured content → file bytes" collaborator services.
//! It deliberately speaks a tiny structural dialect — paragraphs, styled
//! runs, comments, tracked changes, slides with bullets — rather than
//! modelling OOXML in full. Everything the renderers need fits in that
//! dialect, and the generated packages open cleanly in Word and PowerPoint.
//!
//! All generated parts are deterministic: revision ids, comment ids, and
//! timestamps are derived from content order, never from the clock, so the
//! same review always produces byte-identical artifacts.

pub mod docx;
pub mod pptx;

use thiserror::Error;

/// Failures while reading or writing an OOXML package.
#[derive(Debug, Error)]
pub enum OoxmlError {
    #[error("zip container error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("package is missing required part '{0}'")]
    MissingPart(&'static str),
}

impl From<quick_xml::Error> for OoxmlError {
    fn from(e: quick_xml::Error) -> Self {
        OoxmlError::Xml(e.to_string())
    }
}

/// Escape text for inclusion in XML character data or attribute values.
pub(crate) fn xml_escape(s: &str) -> String {
    quick_xml::escape::escape(s).into_owned()
}

/// Fixed revision timestamp used for tracked changes and comments.
///
/// OOXML requires a `w:date` on insertions/deletions; using the wall clock
/// would make reruns produce different bytes for identical reviews.
pub(crate) const REVISION_DATE: &str = "2000-01-01T00:00:00Z";

/// Author recorded on comments and tracked changes.
pub(crate) const REVISION_AUTHOR: &str = "docappraise";

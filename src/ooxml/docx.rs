//! DOCX reading and writing.
//!
//! Reading extracts a flat block sequence (text + structural role) from
//! `word/document.xml` with a streaming `quick-xml` pass — no DOM, no style
//! resolution beyond the paragraph style name. Writing assembles a minimal
//! but valid WordprocessingML package supporting styled runs, real comment
//! parts, and tracked-change insertions/deletions, which is everything the
//! formal-review, annotated, and redline renderers need.

use super::{xml_escape, OoxmlError, REVISION_AUTHOR, REVISION_DATE};
use crate::model::BlockKind;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

// ── Reading ──────────────────────────────────────────────────────────────

/// Read the body of a DOCX file into a sequence of (structural role, text)
/// blocks, in document order. Empty paragraphs are dropped.
pub fn read_docx(bytes: &[u8]) -> Result<Vec<(BlockKind, String)>, OoxmlError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut document_xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|_| OoxmlError::MissingPart("word/document.xml"))?
        .read_to_string(&mut document_xml)?;

    let mut reader = Reader::from_str(&document_xml);
    let mut blocks: Vec<(BlockKind, String)> = Vec::new();

    let mut text = String::new();
    let mut style: Option<String> = None;
    let mut numbered = false;
    let mut in_text_run = false;
    let mut table_depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => {
                    text.clear();
                    style = None;
                    numbered = false;
                }
                b"t" => in_text_run = true,
                b"tbl" => table_depth += 1,
                b"numPr" => numbered = true,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"pStyle" => {
                    if let Some(attr) = e.try_get_attribute("w:val").map_err(|e| {
                        OoxmlError::Xml(format!("bad pStyle attribute: {e}"))
                    })? {
                        style = Some(
                            attr.unescape_value()
                                .map_err(|e| OoxmlError::Xml(e.to_string()))?
                                .into_owned(),
                        );
                    }
                }
                b"tab" | b"br" => text.push(' '),
                _ => {}
            },
            Event::Text(t) if in_text_run => {
                text.push_str(
                    &t.unescape().map_err(|e| OoxmlError::Xml(e.to_string()))?,
                );
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"tbl" => table_depth = table_depth.saturating_sub(1),
                b"p" => {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        blocks.push((classify(style.as_deref(), numbered, table_depth > 0), trimmed.to_string()));
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(blocks)
}

/// Map paragraph style + context to a structural role.
fn classify(style: Option<&str>, numbered: bool, in_table: bool) -> BlockKind {
    if in_table {
        return BlockKind::TableCell;
    }
    match style {
        Some(s) if s.starts_with("Heading") || s == "Title" => BlockKind::Heading,
        Some("Caption") => BlockKind::FigureCaption,
        _ if numbered => BlockKind::ListItem,
        _ => BlockKind::Paragraph,
    }
}

// ── Writing ──────────────────────────────────────────────────────────────

/// Text highlight colours, severity-coded by the annotated renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    Yellow,
    Cyan,
    Red,
    Green,
}

impl Highlight {
    fn val(&self) -> &'static str {
        match self {
            Highlight::Yellow => "yellow",
            Highlight::Cyan => "cyan",
            Highlight::Red => "red",
            Highlight::Green => "green",
        }
    }
}

/// One run of text within a paragraph.
#[derive(Debug, Clone)]
pub enum DocxRun {
    /// Plain (optionally styled) text.
    Text {
        text: String,
        bold: bool,
        italic: bool,
        highlight: Option<Highlight>,
    },
    /// Tracked-change insertion.
    Inserted(String),
    /// Tracked-change deletion.
    Deleted(String),
    /// Highlighted text carrying an attached Word comment.
    Commented {
        text: String,
        highlight: Option<Highlight>,
        comment: String,
    },
}

impl DocxRun {
    pub fn plain(text: impl Into<String>) -> Self {
        DocxRun::Text {
            text: text.into(),
            bold: false,
            italic: false,
            highlight: None,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        DocxRun::Text {
            text: text.into(),
            bold: true,
            italic: false,
            highlight: None,
        }
    }

    pub fn italic(text: impl Into<String>) -> Self {
        DocxRun::Text {
            text: text.into(),
            bold: false,
            italic: true,
            highlight: None,
        }
    }
}

/// Paragraph style in the generated document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParaStyle {
    Normal,
    Heading1,
    Heading2,
}

/// One paragraph of the generated document.
#[derive(Debug, Clone)]
pub struct DocxParagraph {
    pub style: ParaStyle,
    pub runs: Vec<DocxRun>,
}

impl DocxParagraph {
    pub fn heading1(text: impl Into<String>) -> Self {
        Self {
            style: ParaStyle::Heading1,
            runs: vec![DocxRun::plain(text)],
        }
    }

    pub fn heading2(text: impl Into<String>) -> Self {
        Self {
            style: ParaStyle::Heading2,
            runs: vec![DocxRun::plain(text)],
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            style: ParaStyle::Normal,
            runs: vec![DocxRun::plain(text)],
        }
    }

    pub fn from_runs(runs: Vec<DocxRun>) -> Self {
        Self {
            style: ParaStyle::Normal,
            runs,
        }
    }
}

/// Serialise paragraphs into a complete DOCX package.
pub fn write_docx(paragraphs: &[DocxParagraph]) -> Result<Vec<u8>, OoxmlError> {
    let mut comments: Vec<String> = Vec::new();
    let mut body = String::new();
    let mut rev_id = 0u32;

    for para in paragraphs {
        body.push_str("<w:p>");
        match para.style {
            ParaStyle::Normal => {}
            ParaStyle::Heading1 => body.push_str(r#"<w:pPr><w:pStyle w:val="Heading1"/></w:pPr>"#),
            ParaStyle::Heading2 => body.push_str(r#"<w:pPr><w:pStyle w:val="Heading2"/></w:pPr>"#),
        }
        for run in &para.runs {
            rev_id += 1;
            write_run(&mut body, run, rev_id, &mut comments);
        }
        body.push_str("</w:p>");
    }

    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}<w:sectPr/></w:body></w:document>"#
    );

    let mut zw = ZipWriter::new(Cursor::new(Vec::new()));
    let opts = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zw.start_file("[Content_Types].xml", opts)?;
    zw.write_all(content_types(!comments.is_empty()).as_bytes())?;

    zw.start_file("_rels/.rels", opts)?;
    zw.write_all(ROOT_RELS.as_bytes())?;

    zw.start_file("word/_rels/document.xml.rels", opts)?;
    zw.write_all(document_rels(!comments.is_empty()).as_bytes())?;

    zw.start_file("word/styles.xml", opts)?;
    zw.write_all(STYLES_XML.as_bytes())?;

    zw.start_file("word/document.xml", opts)?;
    zw.write_all(document.as_bytes())?;

    if !comments.is_empty() {
        let comments_xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:comments xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">{}</w:comments>"#,
            comments.join("")
        );
        zw.start_file("word/comments.xml", opts)?;
        zw.write_all(comments_xml.as_bytes())?;
    }

    Ok(zw.finish()?.into_inner())
}

fn write_run(body: &mut String, run: &DocxRun, rev_id: u32, comments: &mut Vec<String>) {
    match run {
        DocxRun::Text {
            text,
            bold,
            italic,
            highlight,
        } => {
            body.push_str("<w:r>");
            push_run_props(body, *bold, *italic, *highlight);
            push_text(body, text);
            body.push_str("</w:r>");
        }
        DocxRun::Inserted(text) => {
            body.push_str(&format!(
                r#"<w:ins w:id="{rev_id}" w:author="{REVISION_AUTHOR}" w:date="{REVISION_DATE}"><w:r>"#
            ));
            push_text(body, text);
            body.push_str("</w:r></w:ins>");
        }
        DocxRun::Deleted(text) => {
            body.push_str(&format!(
                r#"<w:del w:id="{rev_id}" w:author="{REVISION_AUTHOR}" w:date="{REVISION_DATE}"><w:r><w:delText xml:space="preserve">{}</w:delText></w:r></w:del>"#,
                xml_escape(text)
            ));
        }
        DocxRun::Commented {
            text,
            highlight,
            comment,
        } => {
            let cid = comments.len() as u32;
            comments.push(format!(
                r#"<w:comment w:id="{cid}" w:author="{REVISION_AUTHOR}" w:date="{REVISION_DATE}"><w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p></w:comment>"#,
                xml_escape(comment)
            ));
            body.push_str(&format!(r#"<w:commentRangeStart w:id="{cid}"/>"#));
            body.push_str("<w:r>");
            push_run_props(body, false, false, *highlight);
            push_text(body, text);
            body.push_str("</w:r>");
            body.push_str(&format!(
                r#"<w:commentRangeEnd w:id="{cid}"/><w:r><w:commentReference w:id="{cid}"/></w:r>"#
            ));
        }
    }
}

fn push_run_props(body: &mut String, bold: bool, italic: bool, highlight: Option<Highlight>) {
    if !bold && !italic && highlight.is_none() {
        return;
    }
    body.push_str("<w:rPr>");
    if bold {
        body.push_str("<w:b/>");
    }
    if italic {
        body.push_str("<w:i/>");
    }
    if let Some(h) = highlight {
        body.push_str(&format!(r#"<w:highlight w:val="{}"/>"#, h.val()));
    }
    body.push_str("</w:rPr>");
}

fn push_text(body: &mut String, text: &str) {
    body.push_str(&format!(
        r#"<w:t xml:space="preserve">{}</w:t>"#,
        xml_escape(text)
    ));
}

// ── Static package parts ─────────────────────────────────────────────────

fn content_types(with_comments: bool) -> String {
    let comments_override = if with_comments {
        r#"<Override PartName="/word/comments.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.comments+xml"/>"#
    } else {
        ""
    };
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>{comments_override}</Types>"#
    )
}

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

fn document_rels(with_comments: bool) -> String {
    let comments_rel = if with_comments {
        r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/comments" Target="comments.xml"/>"#
    } else {
        ""
    };
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>{comments_rel}</Relationships>"#
    )
}

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:pPr><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="32"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:pPr><w:outlineLvl w:val="1"/></w:pPr><w:rPr><w:b/><w:sz w:val="26"/></w:rPr></w:style></w:styles>"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(paragraphs: &[DocxParagraph]) -> Vec<(BlockKind, String)> {
        let bytes = write_docx(paragraphs).unwrap();
        read_docx(&bytes).unwrap()
    }

    #[test]
    fn writes_and_reads_back_paragraphs() {
        let blocks = roundtrip(&[
            DocxParagraph::heading1("METHODS"),
            DocxParagraph::text("We enrolled 2006 patients."),
        ]);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], (BlockKind::Heading, "METHODS".to_string()));
        assert_eq!(
            blocks[1],
            (BlockKind::Paragraph, "We enrolled 2006 patients.".to_string())
        );
    }

    #[test]
    fn empty_paragraphs_are_dropped_on_read() {
        let blocks = roundtrip(&[
            DocxParagraph::text("kept"),
            DocxParagraph::text("   "),
            DocxParagraph::text("also kept"),
        ]);
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn special_characters_survive_the_roundtrip() {
        let blocks = roundtrip(&[DocxParagraph::text("a < b & c > d \"quoted\"")]);
        assert_eq!(blocks[0].1, "a < b & c > d \"quoted\"");
    }

    #[test]
    fn comments_produce_a_comments_part() {
        let para = DocxParagraph::from_runs(vec![DocxRun::Commented {
            text: "flagged".into(),
            highlight: Some(Highlight::Yellow),
            comment: "needs a CI".into(),
        }]);
        let bytes = write_docx(&[para]).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert!(archive.by_name("word/comments.xml").is_ok());
    }

    #[test]
    fn tracked_changes_serialise_ins_and_del() {
        let para = DocxParagraph::from_runs(vec![
            DocxRun::Deleted("old text".into()),
            DocxRun::Inserted("new text".into()),
        ]);
        let bytes = write_docx(&[para]).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut xml = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        assert!(xml.contains("<w:del "));
        assert!(xml.contains("<w:delText"));
        assert!(xml.contains("<w:ins "));
    }

    #[test]
    fn output_is_deterministic() {
        let paras = vec![DocxParagraph::heading1("A"), DocxParagraph::text("b")];
        assert_eq!(write_docx(&paras).unwrap(), write_docx(&paras).unwrap());
    }

    #[test]
    fn missing_document_part_is_reported() {
        // A zip that is not a DOCX.
        let mut zw = ZipWriter::new(Cursor::new(Vec::new()));
        let opts = SimpleFileOptions::default();
        zw.start_file("hello.txt", opts).unwrap();
        zw.write_all(b"hi").unwrap();
        let bytes = zw.finish().unwrap().into_inner();
        match read_docx(&bytes) {
            Err(OoxmlError::MissingPart(p)) => assert_eq!(p, "word/document.xml"),
            other => panic!("expected MissingPart, got {other:?}"),
        }
    }
}

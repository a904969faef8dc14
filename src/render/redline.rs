//! The tracked-changes redline.
//!
//! Two phases. First, overlap resolution: suggested fixes are considered in
//! review order (severity descending, then position, then checker id), and
//! a fix whose target overlaps an already-accepted fix is demoted to
//! comment-only — so when two fixes compete for the same text, the higher
//! severity wins and ties go to the earlier review entry. Second, the
//! accepted fixes are applied to the flattened text and the result is
//! diffed against the original at block granularity; changed blocks render
//! as tracked deletions and insertions.
//!
//! DOCX sources get real `w:del`/`w:ins` runs; PDF sources get
//! `~~strikethrough~~` / `**bold**` markdown.

use crate::error::RenderError;
use crate::finding::Finding;
use crate::model::{DocumentModel, SourceFormat, Span};
use crate::ooxml::docx::{write_docx, DocxParagraph, DocxRun};
use crate::output::ArtifactKind;
use crate::render::{validate_review, Renderer};
use crate::review::Review;

pub struct RedlineRenderer;

impl Renderer for RedlineRenderer {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::Redline
    }

    fn render(&self, model: &DocumentModel, review: &Review) -> Result<Vec<u8>, RenderError> {
        validate_review(self.kind(), model, review)?;

        let resolution = resolve_overlaps(review);
        let revised = apply_fixes(model.text(), &resolution.accepted);

        let original: Vec<&str> = model.text().lines().collect();
        let revised_lines: Vec<&str> = revised.lines().collect();
        let ops = diff_blocks(&original, &revised_lines);

        match model.format() {
            SourceFormat::Docx => self.render_docx(&ops, &resolution.demoted),
            SourceFormat::Pdf => Ok(self
                .render_markdown(model.stem(), &ops, &resolution.demoted)
                .into_bytes()),
        }
    }
}

impl RedlineRenderer {
    fn render_docx(
        &self,
        ops: &[DiffOp<'_>],
        demoted: &[&Finding],
    ) -> Result<Vec<u8>, RenderError> {
        let mut paragraphs = Vec::new();
        for op in merge_replacements(ops) {
            match op {
                MergedOp::Equal(line) => paragraphs.push(DocxParagraph::text(line)),
                MergedOp::Replace { old, new } => paragraphs.push(DocxParagraph::from_runs(vec![
                    DocxRun::Deleted(old.to_string()),
                    DocxRun::Inserted(new.to_string()),
                ])),
                MergedOp::Delete(line) => paragraphs.push(DocxParagraph::from_runs(vec![
                    DocxRun::Deleted(line.to_string()),
                ])),
                MergedOp::Insert(line) => paragraphs.push(DocxParagraph::from_runs(vec![
                    DocxRun::Inserted(line.to_string()),
                ])),
            }
        }

        if !demoted.is_empty() {
            paragraphs.push(DocxParagraph::heading2("Fixes not applied due to overlap"));
            for f in demoted {
                paragraphs.push(DocxParagraph::from_runs(vec![
                    DocxRun::bold(format!("[{}] ", f.severity)),
                    DocxRun::plain(f.message.clone()),
                ]));
            }
        }

        write_docx(&paragraphs).map_err(|e| RenderError::Encode {
            artifact: self.kind(),
            stage: "docx assembly",
            detail: e.to_string(),
        })
    }

    fn render_markdown(&self, stem: &str, ops: &[DiffOp<'_>], demoted: &[&Finding]) -> String {
        let mut out = format!("# Redline: {stem}\n\n");
        for op in merge_replacements(ops) {
            match op {
                MergedOp::Equal(line) => out.push_str(&format!("{line}\n\n")),
                MergedOp::Replace { old, new } => {
                    out.push_str(&format!("~~{old}~~ **{new}**\n\n"));
                }
                MergedOp::Delete(line) => out.push_str(&format!("~~{line}~~\n\n")),
                MergedOp::Insert(line) => out.push_str(&format!("**{line}**\n\n")),
            }
        }
        if !demoted.is_empty() {
            out.push_str("## Fixes not applied due to overlap\n\n");
            for f in demoted {
                out.push_str(&format!("- [{}] {}\n", f.severity, f.message));
            }
        }
        out
    }
}

/// Outcome of the overlap policy over one review.
struct OverlapResolution<'r> {
    /// Fixes to apply, mutually non-overlapping, in review order.
    accepted: Vec<&'r Finding>,
    /// Fixes demoted to comment-only because they lost an overlap.
    demoted: Vec<&'r Finding>,
}

/// First-accepted-wins over the review order implements "higher severity
/// wins, ties to earlier review order" exactly, because the review order
/// already sorts by severity first.
fn resolve_overlaps(review: &Review) -> OverlapResolution<'_> {
    let mut accepted: Vec<&Finding> = Vec::new();
    let mut demoted: Vec<&Finding> = Vec::new();

    for f in review.findings() {
        if f.suggested_fix.is_none() {
            continue;
        }
        if accepted.iter().any(|a| a.target.overlaps(&f.target)) {
            demoted.push(f);
        } else {
            accepted.push(f);
        }
    }
    OverlapResolution { accepted, demoted }
}

/// Splice the accepted replacements into the flattened text.
fn apply_fixes(text: &str, accepted: &[&Finding]) -> String {
    let mut by_position: Vec<&&Finding> = accepted.iter().collect();
    by_position.sort_by_key(|f| f.target.start);

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0usize;
    for f in by_position {
        let Span { start, end } = f.target;
        out.push_str(&text[cursor..start]);
        if let Some(fix) = &f.suggested_fix {
            out.push_str(fix);
        }
        cursor = end;
    }
    out.push_str(&text[cursor..]);
    out
}

#[derive(Debug, PartialEq, Eq)]
enum DiffOp<'a> {
    Equal(&'a str),
    Delete(&'a str),
    Insert(&'a str),
}

/// Classic LCS diff over block lines. Documents are paragraph-sized, so the
/// quadratic table is fine.
fn diff_blocks<'a>(old: &[&'a str], new: &[&'a str]) -> Vec<DiffOp<'a>> {
    let n = old.len();
    let m = new.len();
    let mut lcs = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if old[i] == new[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut ops = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old[i] == new[j] {
            ops.push(DiffOp::Equal(old[i]));
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            ops.push(DiffOp::Delete(old[i]));
            i += 1;
        } else {
            ops.push(DiffOp::Insert(new[j]));
            j += 1;
        }
    }
    while i < n {
        ops.push(DiffOp::Delete(old[i]));
        i += 1;
    }
    while j < m {
        ops.push(DiffOp::Insert(new[j]));
        j += 1;
    }
    ops
}

#[derive(Debug, PartialEq, Eq)]
enum MergedOp<'a> {
    Equal(&'a str),
    Replace { old: &'a str, new: &'a str },
    Delete(&'a str),
    Insert(&'a str),
}

/// Pair each deletion with the insertion that immediately follows it, so a
/// modified block reads as one replace rather than two unrelated edits.
fn merge_replacements<'a>(ops: &[DiffOp<'a>]) -> Vec<MergedOp<'a>> {
    let mut merged = Vec::with_capacity(ops.len());
    let mut idx = 0;
    while idx < ops.len() {
        match (&ops[idx], ops.get(idx + 1)) {
            (&DiffOp::Delete(old), Some(&DiffOp::Insert(new))) => {
                merged.push(MergedOp::Replace { old, new });
                idx += 2;
            }
            (&DiffOp::Equal(line), _) => {
                merged.push(MergedOp::Equal(line));
                idx += 1;
            }
            (&DiffOp::Delete(line), _) => {
                merged.push(MergedOp::Delete(line));
                idx += 1;
            }
            (&DiffOp::Insert(line), _) => {
                merged.push(MergedOp::Insert(line));
                idx += 1;
            }
        }
    }
    merged
}

//! Readability heuristics: duplicated words, run-on sentences, walls of
//! text.
//!
//! The duplicated-word rule is the one checker that can propose a purely
//! mechanical fix, so its findings carry a suggested replacement for the
//! redline renderer.

use crate::checkers::{content_span, Checker};
use crate::config::AppraisalConfig;
use crate::finding::{Category, Finding, Severity};
use crate::model::{BlockKind, DocumentModel, Span};
use once_cell::sync::Lazy;
use regex::Regex;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z][A-Za-z'\-]*").unwrap());

/// Words per sentence above which we flag a run-on.
const LONG_SENTENCE_WORDS: usize = 40;

/// Characters per paragraph above which we flag a wall of text.
const WALL_OF_TEXT_CHARS: usize = 1500;

pub struct ClarityChecker;

impl Checker for ClarityChecker {
    fn id(&self) -> &'static str {
        "clarity"
    }

    fn check(
        &self,
        model: &DocumentModel,
        _config: &AppraisalConfig,
    ) -> Result<Vec<Finding>, String> {
        let mut findings = Vec::new();

        for block in model.blocks() {
            if block.kind == BlockKind::Heading {
                continue;
            }
            let text = model.block_text(block);
            let base = block.span.start;

            findings.extend(duplicated_words(self.id(), text, base));

            for (start, end, words) in long_sentences(text) {
                findings.push(Finding::new(
                    self.id(),
                    Severity::Minor,
                    Category::Clarity,
                    Span::new(base + start, base + end),
                    format!("Sentence runs to {words} words; consider splitting it"),
                ));
            }

            if text.len() > WALL_OF_TEXT_CHARS {
                findings.push(Finding::new(
                    self.id(),
                    Severity::Minor,
                    Category::Clarity,
                    content_span(block),
                    format!(
                        "Paragraph is {} characters without a break; consider splitting it",
                        text.len()
                    ),
                ));
            }
        }

        Ok(findings)
    }
}

/// Adjacent identical words (case-insensitive), separated only by
/// whitespace. `regex` has no backreferences, so this is a manual scan over
/// word matches.
fn duplicated_words(checker_id: &'static str, text: &str, base: usize) -> Vec<Finding> {
    let mut findings = Vec::new();
    let mut prev: Option<regex::Match> = None;

    for m in WORD.find_iter(text) {
        if let Some(p) = prev {
            let gap = &text[p.end()..m.start()];
            if gap.chars().all(char::is_whitespace)
                && !gap.is_empty()
                && p.as_str().eq_ignore_ascii_case(m.as_str())
            {
                findings.push(
                    Finding::new(
                        checker_id,
                        Severity::Minor,
                        Category::Clarity,
                        Span::new(base + p.start(), base + m.end()),
                        format!("Duplicated word \"{}\"", p.as_str()),
                    )
                    .with_fix(p.as_str()),
                );
            }
        }
        prev = Some(m);
    }
    findings
}

/// Sentence ranges (byte offsets within `text`) exceeding the word limit.
fn long_sentences(text: &str) -> Vec<(usize, usize, usize)> {
    let mut out = Vec::new();
    let mut start = 0usize;

    let mut boundaries: Vec<usize> = text
        .char_indices()
        .filter(|&(i, c)| {
            matches!(c, '.' | '?' | '!')
                && text[i + c.len_utf8()..]
                    .chars()
                    .next()
                    .map_or(true, |next| next.is_whitespace())
        })
        .map(|(i, c)| i + c.len_utf8())
        .collect();
    if boundaries.last() != Some(&text.len()) {
        boundaries.push(text.len());
    }

    for end in boundaries {
        let sentence = text[start..end].trim();
        if !sentence.is_empty() {
            let words = sentence.split_whitespace().count();
            if words > LONG_SENTENCE_WORDS {
                let lead = text[start..end].len() - text[start..end].trim_start().len();
                out.push((start + lead, end, words));
            }
        }
        start = end;
    }
    out
}

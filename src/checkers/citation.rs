//! Citation hygiene: bracketed citations vs the reference list, "et al."
//! without a year, bare URLs in running text.

use crate::checkers::{clamp_to_char_boundary, find_section, section_body, Checker};
use crate::config::AppraisalConfig;
use crate::finding::{Category, Finding, Severity};
use crate::model::{DocumentModel, Span};
use once_cell::sync::Lazy;
use regex::Regex;

static BRACKET_CITE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(\d{1,3})(?:\s*[-–]\s*(\d{1,3}))?\]").unwrap());
static ET_AL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bet al\.?").unwrap());
static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(19|20)\d{2}\b").unwrap());
static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://[^\s)\]>]+").unwrap());

/// Window after an "et al." in which a publication year must appear.
const YEAR_WINDOW: usize = 30;

pub struct CitationChecker;

impl Checker for CitationChecker {
    fn id(&self) -> &'static str {
        "citations"
    }

    fn check(
        &self,
        model: &DocumentModel,
        _config: &AppraisalConfig,
    ) -> Result<Vec<Finding>, String> {
        let mut findings = Vec::new();

        let references_heading = find_section(model, "REFERENCES");
        let reference_count = section_body(model, "REFERENCES").count();
        // Body = everything before the reference list (or the whole document
        // when there is none).
        let body_end = references_heading
            .map(|h| h.span.start)
            .unwrap_or_else(|| model.text().len());
        let body = &model.text()[..body_end];

        let mut first_citation: Option<Span> = None;
        for caps in BRACKET_CITE.captures_iter(body) {
            let whole = caps.get(0).ok_or("bracket capture missing")?;
            let span = Span::new(whole.start(), whole.end());
            first_citation.get_or_insert(span);

            if references_heading.is_none() {
                continue;
            }
            let low: usize = caps[1].parse().map_err(|_| "unparseable citation number")?;
            let high: usize = match caps.get(2) {
                Some(m) => m.as_str().parse().map_err(|_| "unparseable citation number")?,
                None => low,
            };
            if high > reference_count {
                findings.push(Finding::new(
                    self.id(),
                    Severity::Major,
                    Category::Citation,
                    span,
                    format!(
                        "Citation {} exceeds the {} entries in the reference list",
                        whole.as_str(),
                        reference_count
                    ),
                ));
            }
        }

        if references_heading.is_none() {
            if let Some(span) = first_citation {
                findings.push(Finding::new(
                    self.id(),
                    Severity::Major,
                    Category::Citation,
                    span,
                    "Bracketed citations present but no reference list section found",
                ));
            }
        }

        for m in ET_AL.find_iter(body) {
            let window_end = (m.end() + YEAR_WINDOW).min(body.len());
            let window = clamp_to_char_boundary(body, window_end);
            if !YEAR.is_match(&body[m.end()..window]) {
                findings.push(Finding::new(
                    self.id(),
                    Severity::Minor,
                    Category::Citation,
                    Span::new(m.start(), m.end()),
                    "Citation 'et al.' without a publication year",
                ));
            }
        }

        for m in URL.find_iter(body) {
            findings.push(Finding::new(
                self.id(),
                Severity::Info,
                Category::Citation,
                Span::new(m.start(), m.end()),
                "Bare URL in running text; cite it in the reference list instead",
            ));
        }

        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::testutil::model_of;
    use crate::model::BlockKind;

    fn run(model: &DocumentModel) -> Vec<Finding> {
        CitationChecker
            .check(model, &AppraisalConfig::default())
            .unwrap()
    }

    fn with_references(body: &str, refs: &[&str]) -> DocumentModel {
        let mut blocks = vec![
            (BlockKind::Paragraph, body),
            (BlockKind::Heading, "REFERENCES"),
        ];
        blocks.extend(refs.iter().map(|r| (BlockKind::Paragraph, *r)));
        model_of(&blocks)
    }

    #[test]
    fn citation_beyond_reference_list() {
        let m = with_references(
            "Prior work [1] and [5] support this.",
            &["1. Smith 2019.", "2. Jones 2021."],
        );
        let findings = run(&m);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("[5]"));
        assert!(findings[0].message.contains("2 entries"));
        assert_eq!(m.slice(findings[0].target), "[5]");
    }

    #[test]
    fn range_citations_use_the_upper_bound() {
        let m = with_references("Earlier studies [1-4] agree.", &["1. A.", "2. B."]);
        assert_eq!(run(&m).len(), 1);
    }

    #[test]
    fn in_range_citations_pass() {
        let m = with_references("Prior work [1] and [2].", &["1. A.", "2. B."]);
        assert!(run(&m).is_empty());
    }

    #[test]
    fn citations_without_reference_section() {
        let m = model_of(&[(BlockKind::Paragraph, "As shown in [3], rates rose.")]);
        let findings = run(&m);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("no reference list"));
    }

    #[test]
    fn et_al_without_year() {
        let m = with_references(
            "Garcia et al. reported similar rates; Chen et al. (2020) did not.",
            &["1. Garcia."],
        );
        let findings = run(&m);
        assert_eq!(findings.len(), 1);
        assert_eq!(m.slice(findings[0].target), "et al.");
    }

    #[test]
    fn bare_url_is_info() {
        let m = with_references(
            "Data are at https://example.org/data for review.",
            &["1. A."],
        );
        let findings = run(&m);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Info);
        assert_eq!(m.slice(findings[0].target), "https://example.org/data");
    }

    #[test]
    fn reference_list_itself_is_not_scanned() {
        // URLs inside the reference list are where URLs belong.
        let m = with_references("Clean body text.", &["1. WHO. https://who.int/tb 2023."]);
        assert!(run(&m).is_empty());
    }
}

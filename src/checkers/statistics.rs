//! Statistical-reporting heuristics.
//!
//! Every rule here is block-local: a claim and its supporting number are
//! expected in the same paragraph. Cross-paragraph reporting ("see Table 2")
//! is out of reach for lexical rules and deliberately not attempted.

use crate::checkers::{clamp_to_char_boundary, content_span, Checker};
use crate::config::AppraisalConfig;
use crate::finding::{Category, Finding, Severity};
use crate::model::{BlockKind, DocumentModel, Span};
use once_cell::sync::Lazy;
use regex::Regex;

static P_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bp\s*[<=>≤]\s*0?\.\d+").unwrap());
static ZERO_P: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bp\s*[=<]\s*0\.000\b").unwrap());
static SIGNIFICANT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bsignificant").unwrap());
static PERCENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?\s*%").unwrap());
static RATIO: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+\s*/\s*\d+").unwrap());
static EFFECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(odds ratio|hazard ratio|risk ratio|relative risk|rate ratio)").unwrap()
});
static CONF_INT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(confidence interval|95\s*%\s*CI|\bCI\b)").unwrap());

pub struct StatReportingChecker;

impl Checker for StatReportingChecker {
    fn id(&self) -> &'static str {
        "stat-reporting"
    }

    fn check(
        &self,
        model: &DocumentModel,
        config: &AppraisalConfig,
    ) -> Result<Vec<Finding>, String> {
        let mut findings = Vec::new();

        for block in model.blocks() {
            if block.kind == BlockKind::Heading {
                continue;
            }
            let text = model.block_text(block);
            let base = block.span.start;

            if SIGNIFICANT.is_match(text) && !P_VALUE.is_match(text) {
                findings.push(Finding::new(
                    self.id(),
                    Severity::Major,
                    Category::Statistics,
                    content_span(block),
                    "Statistical significance claimed without a supporting p-value",
                ));
            }

            for m in ZERO_P.find_iter(text) {
                findings.push(
                    Finding::new(
                        self.id(),
                        Severity::Major,
                        Category::Statistics,
                        Span::new(base + m.start(), base + m.end()),
                        format!("Impossible p-value '{}'; report as p < 0.001", m.as_str()),
                    )
                    .with_fix("p < 0.001"),
                );
            }

            if has_bare_percentage(text) && !RATIO.is_match(text) {
                findings.push(Finding::new(
                    self.id(),
                    Severity::Minor,
                    Category::Statistics,
                    content_span(block),
                    "Percentages reported without numerators/denominators",
                ));
            }

            if EFFECT.is_match(text) && !CONF_INT.is_match(text) {
                findings.push(Finding::new(
                    self.id(),
                    Severity::Major,
                    Category::Statistics,
                    content_span(block),
                    "Effect estimate reported without a confidence interval",
                ));
            }
        }

        // Recognised analysis methods, first occurrence each, as context for
        // the reviewer.
        for kw in &config.stat_methods {
            let pattern = format!("(?i){}", regex::escape(&kw.keyword));
            let re = Regex::new(&pattern).map_err(|e| format!("bad stat keyword: {e}"))?;
            if let Some(m) = re.find(model.text()) {
                findings.push(Finding::new(
                    self.id(),
                    Severity::Info,
                    Category::Statistics,
                    Span::new(m.start(), m.end()),
                    format!("Statistical method identified: {}", kw.label),
                ));
            }
        }

        Ok(findings)
    }
}

/// A percentage not serving as part of a "95% CI"-style interval phrase.
fn has_bare_percentage(text: &str) -> bool {
    PERCENT.find_iter(text).any(|m| {
        let tail_end = clamp_to_char_boundary(text, (m.end() + 20).min(text.len()));
        let tail = &text[m.end()..tail_end];
        let lowered = tail.to_lowercase();
        !(lowered.trim_start().starts_with("ci") || lowered.contains("confidence"))
    })
}

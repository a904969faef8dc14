//! Study-design identification.
//!
//! A manuscript that never states its design (cohort, case-control, RCT, …)
//! cannot be methodologically appraised, so the absence is a major finding.
//! The keyword table comes from the configuration and can be replaced per
//! run.

use crate::checkers::{content_span, Checker};
use crate::config::AppraisalConfig;
use crate::finding::{Category, Finding, Severity};
use crate::model::{DocumentModel, Span};
use once_cell::sync::Lazy;
use regex::Regex;

static SAMPLE_SIZE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bn\s*=\s*\d").unwrap());

pub struct StudyDesignChecker;

impl Checker for StudyDesignChecker {
    fn id(&self) -> &'static str {
        "study-design"
    }

    fn check(
        &self,
        model: &DocumentModel,
        config: &AppraisalConfig,
    ) -> Result<Vec<Finding>, String> {
        let text = model.text();
        let mut findings = Vec::new();

        // Earliest design keyword anywhere in the text wins; scanning all
        // keywords keeps the result independent of table order. An empty
        // table disables the scan — it does not mean every document is
        // missing its design statement.
        if !config.design_keywords.is_empty() {
            let mut earliest: Option<(usize, usize, &str)> = None;
            for kw in &config.design_keywords {
                let pattern = format!("(?i){}", regex::escape(&kw.keyword));
                let re = Regex::new(&pattern).map_err(|e| format!("bad design keyword: {e}"))?;
                if let Some(m) = re.find(text) {
                    let replace = match earliest {
                        Some((start, _, _)) => m.start() < start,
                        None => true,
                    };
                    if replace {
                        earliest = Some((m.start(), m.end(), kw.label.as_str()));
                    }
                }
            }

            match earliest {
                Some((start, end, label)) => {
                    findings.push(Finding::new(
                        self.id(),
                        Severity::Info,
                        Category::Methodology,
                        Span::new(start, end),
                        format!("Study design identified: {label}"),
                    ));
                }
                None => {
                    let mut labels: Vec<&str> = config
                        .design_keywords
                        .iter()
                        .map(|k| k.label.as_str())
                        .collect();
                    labels.sort_unstable();
                    labels.dedup();
                    let target = model
                        .blocks()
                        .first()
                        .map(content_span)
                        .ok_or_else(|| "document model has no blocks".to_string())?;
                    findings.push(Finding::new(
                        self.id(),
                        Severity::Major,
                        Category::Methodology,
                        target,
                        format!(
                            "No study design statement detected; expected one of: {}",
                            labels.join(", ")
                        ),
                    ));
                }
            }
        }

        if !SAMPLE_SIZE.is_match(text) {
            let target = model
                .blocks()
                .first()
                .map(content_span)
                .ok_or_else(|| "document model has no blocks".to_string())?;
            findings.push(Finding::new(
                self.id(),
                Severity::Minor,
                Category::Methodology,
                target,
                "No sample size statement (e.g. 'n = 120') detected",
            ));
        }

        Ok(findings)
    }
}

//! Per-section reviewer guidance.
//!
//! For every configured section that is actually present, attach its
//! guidance comment to the section's first body paragraph, with the
//! configured rewrite as the suggested fix. These are advisory (`Info`)
//! findings; the redline renderer turns their suggestions into tracked
//! changes.

use crate::checkers::{content_span, find_section, section_body, Checker};
use crate::config::AppraisalConfig;
use crate::finding::{Category, Finding, Severity};
use crate::model::DocumentModel;

pub struct SectionGuidanceChecker;

impl Checker for SectionGuidanceChecker {
    fn id(&self) -> &'static str {
        "section-guidance"
    }

    fn check(
        &self,
        model: &DocumentModel,
        config: &AppraisalConfig,
    ) -> Result<Vec<Finding>, String> {
        let mut findings = Vec::new();

        for guidance in &config.section_guidance {
            let Some(heading) = find_section(model, &guidance.section) else {
                continue; // absence is the structure checker's concern
            };
            // Anchor on the first body paragraph so the suggested rewrite
            // replaces content, not the heading itself.
            let anchor = section_body(model, &guidance.section)
                .next()
                .unwrap_or(heading);

            findings.push(
                Finding::new(
                    self.id(),
                    Severity::Info,
                    category_for(&guidance.section),
                    content_span(anchor),
                    guidance.comment.clone(),
                )
                .with_fix(guidance.suggestion.clone()),
            );
        }

        Ok(findings)
    }
}

/// Which review category a section's guidance belongs to.
fn category_for(section: &str) -> Category {
    match section.to_uppercase().as_str() {
        "METHODS" => Category::Methodology,
        "STATISTICAL ANALYSIS" | "RESULTS" => Category::Statistics,
        "REFERENCES" => Category::Citation,
        "ABSTRACT" | "INTRODUCTION" | "DISCUSSION" | "CONCLUSION" => Category::Clarity,
        _ => Category::Structure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::testutil::manuscript;

    #[test]
    fn guidance_lands_on_first_body_paragraph() {
        let m = manuscript(&[("METHODS", "We enrolled adults with confirmed TB.")]);
        let findings = SectionGuidanceChecker
            .check(&m, &AppraisalConfig::default())
            .unwrap();
        assert_eq!(findings.len(), 1);
        let f = &findings[0];
        assert_eq!(f.severity, Severity::Info);
        assert_eq!(f.category, Category::Methodology);
        assert!(f.suggested_fix.is_some());
        assert_eq!(m.slice(f.target), "We enrolled adults with confirmed TB.");
    }

    #[test]
    fn absent_sections_produce_nothing() {
        let m = manuscript(&[("APPENDIX", "extra material")]);
        let findings = SectionGuidanceChecker
            .check(&m, &AppraisalConfig::default())
            .unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn category_mapping() {
        assert_eq!(category_for("STATISTICAL ANALYSIS"), Category::Statistics);
        assert_eq!(category_for("References"), Category::Citation);
        assert_eq!(category_for("APPENDIX"), Category::Structure);
    }
}

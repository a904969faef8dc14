//! Manuscript structure: are the expected top-level sections present?
//!
//! The expected section list is whatever the configured guidance table
//! names, so overriding the guidance automatically changes what this
//! checker demands.

use crate::checkers::{content_span, find_section, Checker};
use crate::config::AppraisalConfig;
use crate::finding::{Category, Finding, Severity};
use crate::model::{BlockKind, DocumentModel};

pub struct StructureChecker;

impl Checker for StructureChecker {
    fn id(&self) -> &'static str {
        "structure"
    }

    fn check(
        &self,
        model: &DocumentModel,
        config: &AppraisalConfig,
    ) -> Result<Vec<Finding>, String> {
        let first_block = model
            .blocks()
            .first()
            .ok_or_else(|| "document model has no blocks".to_string())?;

        // A document with no headings at all gets one critical finding
        // rather than one major per expected section.
        if !model.blocks().iter().any(|b| b.kind == BlockKind::Heading) {
            return Ok(vec![Finding::new(
                self.id(),
                Severity::Critical,
                Category::Structure,
                content_span(first_block),
                "No section headings detected; the manuscript cannot be structurally appraised",
            )]);
        }

        let mut findings = Vec::new();
        for guidance in &config.section_guidance {
            if find_section(model, &guidance.section).is_none() {
                findings.push(Finding::new(
                    self.id(),
                    Severity::Major,
                    Category::Structure,
                    content_span(first_block),
                    format!("Expected section '{}' was not found", guidance.section),
                ));
            }
        }
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkers::testutil::{manuscript, model_of};

    #[test]
    fn complete_manuscript_passes() {
        let sections: Vec<(&str, &str)> = [
            "ABSTRACT",
            "INTRODUCTION",
            "METHODS",
            "STATISTICAL ANALYSIS",
            "RESULTS",
            "DISCUSSION",
            "CONCLUSION",
            "REFERENCES",
        ]
        .iter()
        .map(|s| (*s, "body"))
        .collect();
        let m = manuscript(&sections);
        let findings = StructureChecker
            .check(&m, &AppraisalConfig::default())
            .unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn each_missing_section_is_major() {
        let m = manuscript(&[("ABSTRACT", "body"), ("METHODS", "body")]);
        let findings = StructureChecker
            .check(&m, &AppraisalConfig::default())
            .unwrap();
        assert_eq!(findings.len(), 6);
        assert!(findings.iter().all(|f| f.severity == Severity::Major));
        assert!(findings
            .iter()
            .any(|f| f.message.contains("'STATISTICAL ANALYSIS'")));
    }

    #[test]
    fn headingless_document_is_critical() {
        let m = model_of(&[(BlockKind::Paragraph, "Just one long paragraph of prose.")]);
        let findings = StructureChecker
            .check(&m, &AppraisalConfig::default())
            .unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Critical);
    }
}

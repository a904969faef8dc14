//! End-to-end pipeline tests over synthetic DOCX inputs.

use docappraise::ooxml::docx::{write_docx, DocxParagraph};
use docappraise::{run, AppraisalConfig, ArtifactKind, ArtifactState, Severity};
use std::io::Read;
use std::path::{Path, PathBuf};

fn write_input(dir: &Path, name: &str, paragraphs: &[DocxParagraph]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, write_docx(paragraphs).unwrap()).unwrap();
    path
}

fn flawed_manuscript() -> Vec<DocxParagraph> {
    vec![
        DocxParagraph::heading1("ABSTRACT"),
        DocxParagraph::text(
            "We studied treatment outcomes. The difference between groups was significant.",
        ),
        DocxParagraph::heading1("METHODS"),
        DocxParagraph::text("Patients were were enrolled at two sites."),
        DocxParagraph::heading1("RESULTS"),
        DocxParagraph::text("Cure was achieved in 82% of patients, p = 0.000."),
    ]
}

fn zip_part(path: &Path, part: &str) -> String {
    let bytes = std::fs::read(path).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    let mut content = String::new();
    archive
        .by_name(part)
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    content
}

#[tokio::test]
async fn flawed_manuscript_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "paper.docx", &flawed_manuscript());

    let config = AppraisalConfig::default();
    let result = run(&input, &config).await.unwrap();

    assert!(result.is_success());
    assert!(result.checker_failures.is_empty());
    assert_eq!(result.artifacts.len(), 5);
    for status in &result.artifacts {
        assert_eq!(status.state, ArtifactState::Rendered);
        assert!(status.path.exists());
    }

    // The known flaws surface in the review summary.
    assert!(result.review_summary.count_of(Severity::Major) >= 2);
    assert!(result.review_summary.total > result.review_summary.count_of(Severity::Major));

    let report = std::fs::read_to_string(dir.path().join("paper.review.md")).unwrap();
    assert!(report.contains("# Review: paper"));
    assert!(report.contains("Statistical significance claimed without a supporting p-value"));
    assert!(report.contains("Duplicated word \"were\""));
    assert!(report.contains("Impossible p-value"));
    assert!(report.contains("Expected section 'REFERENCES' was not found"));
}

#[tokio::test]
async fn redline_applies_higher_severity_fix_and_demotes_the_overlap() {
    let dir = tempfile::tempdir().unwrap();
    // One METHODS section. Two fixes compete for its body paragraph: the
    // clarity duplicate-word fix (minor, narrow span) and the section
    // guidance rewrite (info, whole paragraph). Minor outranks info, so the
    // word fix applies and the rewrite is demoted.
    let input = write_input(
        dir.path(),
        "paper.docx",
        &[
            DocxParagraph::heading1("METHODS"),
            DocxParagraph::text("Patients were were enrolled at two sites."),
        ],
    );

    let config = AppraisalConfig::builder()
        .artifacts(vec![ArtifactKind::Redline])
        .build()
        .unwrap();
    let result = run(&input, &config).await.unwrap();
    assert!(result.is_success());

    let xml = zip_part(&dir.path().join("paper.redline.docx"), "word/document.xml");
    // The duplicated word is corrected as a tracked change.
    assert!(xml.contains("<w:ins"));
    assert!(xml.contains("Patients were enrolled at two sites."));
    // The losing guidance rewrite is reported, not applied.
    assert!(xml.contains("Fixes not applied due to overlap"));
    assert!(xml.contains("inclusion/exclusion criteria"));
    assert!(!xml.contains("consecutively enrolled; MDR cases"));
}

#[tokio::test]
async fn clean_document_with_stripped_tables_reports_zero_issues() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        "clean.docx",
        &[
            DocxParagraph::heading1("OVERVIEW"),
            DocxParagraph::text(
                "We enrolled n = 120 adults. Cure occurred in 60/120 (50%), p < 0.001.",
            ),
        ],
    );

    let config = AppraisalConfig::builder()
        .artifacts(vec![ArtifactKind::MarkdownReport, ArtifactKind::FormalReview])
        .design_keywords(vec![])
        .stat_methods(vec![])
        .section_guidance(vec![])
        .build()
        .unwrap();
    let result = run(&input, &config).await.unwrap();

    assert!(result.is_success());
    assert_eq!(result.review_summary.total, 0);

    let report = std::fs::read_to_string(dir.path().join("clean.review.md")).unwrap();
    assert!(report.contains("0 issues found"));

    // The formal review still renders every fixed section.
    let xml = zip_part(&dir.path().join("clean.review.docx"), "word/document.xml");
    for section in [
        "Summary",
        "Methodology Concerns",
        "Statistical Concerns",
        "Clarity",
        "Recommendation",
    ] {
        assert!(xml.contains(section), "missing section {section}");
    }
    assert!(xml.contains("No concerns identified."));
}

#[tokio::test]
async fn repeated_runs_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "paper.docx", &flawed_manuscript());

    let config = AppraisalConfig::builder().force(true).build().unwrap();
    run(&input, &config).await.unwrap();
    let first: Vec<Vec<u8>> = artifact_bytes(dir.path());

    run(&input, &config).await.unwrap();
    let second: Vec<Vec<u8>> = artifact_bytes(dir.path());

    assert_eq!(first, second);
}

fn artifact_bytes(dir: &Path) -> Vec<Vec<u8>> {
    [
        "paper.review.md",
        "paper.deck.pptx",
        "paper.review.docx",
        "paper.annotated.docx",
        "paper.redline.docx",
    ]
    .iter()
    .map(|name| std::fs::read(dir.join(name)).unwrap())
    .collect()
}

#[tokio::test]
async fn second_run_without_force_skips_everything() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(dir.path(), "paper.docx", &flawed_manuscript());

    let config = AppraisalConfig::default();
    let first = run(&input, &config).await.unwrap();
    assert!(first.artifacts.iter().all(|a| a.state == ArtifactState::Rendered));

    let second = run(&input, &config).await.unwrap();
    assert!(second.is_success());
    assert!(second
        .artifacts
        .iter()
        .all(|a| a.state == ArtifactState::SkippedExisting));
}

#[tokio::test]
async fn plain_text_input_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notes.txt");
    std::fs::write(&input, "not a manuscript").unwrap();

    let err = run(&input, &AppraisalConfig::default()).await.unwrap_err();
    assert!(matches!(
        err,
        docappraise::AppraiseError::UnsupportedFormat { .. }
    ));
}

#[tokio::test]
async fn config_overrides_change_the_review() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        "paper.docx",
        &[
            DocxParagraph::heading1("OVERVIEW"),
            DocxParagraph::text("A bespoke-design study of n = 40 participants."),
        ],
    );
    let overrides = dir.path().join("checks.json");
    std::fs::write(
        &overrides,
        r#"{
            "design_keywords": [{"keyword": "bespoke-design", "label": "Bespoke design"}],
            "stat_methods": [],
            "section_guidance": []
        }"#,
    )
    .unwrap();

    let mut config = AppraisalConfig::builder()
        .artifacts(vec![ArtifactKind::MarkdownReport])
        .build()
        .unwrap();
    config.apply_overrides_file(&overrides).unwrap();

    let result = run(&input, &config).await.unwrap();
    assert!(result.is_success());
    let report = std::fs::read_to_string(dir.path().join("paper.review.md")).unwrap();
    assert!(report.contains("Study design identified: Bespoke design"));
}

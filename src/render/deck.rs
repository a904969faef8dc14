//! The PPTX summary deck.
//!
//! Title slide with summary counts, then one slide per category that has
//! findings. A category with more findings than fit on one slide overflows
//! onto numbered continuation slides; findings are never dropped to fit the
//! layout.

use crate::error::RenderError;
use crate::finding::{Category, Finding};
use crate::model::DocumentModel;
use crate::ooxml::pptx::{write_pptx, Bullet, Slide};
use crate::output::ArtifactKind;
use crate::render::{validate_review, Renderer};
use crate::review::Review;

pub struct SlideDeckRenderer {
    pub max_findings_per_slide: usize,
}

impl Renderer for SlideDeckRenderer {
    fn kind(&self) -> ArtifactKind {
        ArtifactKind::SlideDeck
    }

    fn render(&self, model: &DocumentModel, review: &Review) -> Result<Vec<u8>, RenderError> {
        validate_review(self.kind(), model, review)?;

        let mut slides = vec![self.title_slide(model, review)];

        for category in Category::ALL {
            let findings: Vec<&Finding> = review.in_category(category).collect();
            if findings.is_empty() {
                continue;
            }
            let per_slide = self.max_findings_per_slide.max(1);
            let chunk_count = findings.len().div_ceil(per_slide);
            for (chunk_idx, chunk) in findings.chunks(per_slide).enumerate() {
                let title = if chunk_count == 1 {
                    category.title().to_string()
                } else {
                    format!("{} ({}/{})", category.title(), chunk_idx + 1, chunk_count)
                };
                let mut bullets = Vec::new();
                for f in chunk {
                    bullets.push(Bullet::new(bullet_text(model, f)));
                    if let Some(fix) = &f.suggested_fix {
                        bullets.push(Bullet::indented(format!("Fix: {fix}")));
                    }
                }
                slides.push(Slide::new(title, bullets));
            }
        }

        write_pptx(&slides).map_err(|e| RenderError::Encode {
            artifact: self.kind(),
            stage: "pptx assembly",
            detail: e.to_string(),
        })
    }
}

impl SlideDeckRenderer {
    fn title_slide(&self, model: &DocumentModel, review: &Review) -> Slide {
        let summary = review.summary();
        let mut bullets = vec![Bullet::new(format!(
            "{} finding{} across {} blocks",
            summary.total,
            if summary.total == 1 { "" } else { "s" },
            model.blocks().len()
        ))];
        for (severity, count) in &summary.by_severity {
            if *count > 0 {
                bullets.push(Bullet::indented(format!("{severity}: {count}")));
            }
        }
        if summary.total == 0 {
            bullets.push(Bullet::indented("No issues were identified"));
        }
        Slide::new(format!("Review: {}", model.stem()), bullets)
    }
}

fn bullet_text(model: &DocumentModel, f: &Finding) -> String {
    match model.locate(f.target) {
        Some(locator) => format!("[{}] {} ({})", f.severity, f.message, locator),
        None => format!("[{}] {}", f.severity, f.message),
    }
}

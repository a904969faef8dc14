//! # docappraise
//!
//! Automated appraisal of PDF and DOCX manuscripts: normalize the document
//! into a positional model, run independent heuristic checkers in parallel,
//! aggregate their findings into an ordered review, and render the review as
//! up to five artifacts — a markdown report, a PPTX summary deck, a formal
//! peer-review DOCX, an annotated copy, and a tracked-changes redline.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use docappraise::{run, AppraisalConfig, ArtifactKind};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), docappraise::AppraiseError> {
//!     let config = AppraisalConfig::builder()
//!         .artifacts(vec![ArtifactKind::MarkdownReport, ArtifactKind::Redline])
//!         .force(true)
//!         .build()?;
//!
//!     let result = run(Path::new("manuscript.docx"), &config).await?;
//!     for artifact in result.rendered() {
//!         println!("wrote {}", artifact.path.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! resolve ─▶ normalize ─▶ check (parallel) ─▶ aggregate ─▶ render (parallel)
//! ```
//!
//! The stages share two immutable values: the [`DocumentModel`] (one
//! coordinate system of flattened character offsets; block spans partition
//! the text exactly) and the [`Review`] (deduplicated findings in a strict
//! total order). Checkers and renderers fail individually — one bad
//! heuristic or one unwritable artifact never takes down the run.
//!
//! ## Failure model
//!
//! Fatal problems (missing file, unsupported format, nothing extractable)
//! return [`AppraiseError`]. Per-unit problems are collected in the
//! [`PipelineResult`]: checker failures alongside the findings of the
//! checkers that succeeded, and a terminal [`ArtifactState`] per requested
//! artifact.

pub mod checkers;
pub mod config;
pub mod error;
pub mod finding;
pub mod model;
pub mod ooxml;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod review;
pub mod run;

pub use config::{AppraisalConfig, AppraisalConfigBuilder, CancelToken, Keyword, SectionGuidance};
pub use error::{AppraiseError, CheckerFailure, RenderError};
pub use finding::{Category, Finding, Severity};
pub use model::{Block, BlockId, BlockKind, DocumentModel, Locator, SourceFormat, Span};
pub use output::{ArtifactKind, ArtifactState, ArtifactStatus, PipelineResult, RunStats};
pub use review::{aggregate, Review, ReviewSummary};
pub use run::run;

//! The pipeline orchestrator: one entry point that sequences input
//! resolution, normalisation, checking, aggregation, and rendering.
//!
//! Stage boundaries are also the cancellation points. A cancel before the
//! render stage aborts the run with [`AppraiseError::Cancelled`]; once
//! rendering has begun, cancellation is reported per-artifact instead, so
//! artifacts already written stay on disk and the result says which ones
//! completed.
//!
//! Artifact writes are atomic (temp file in the target directory, then
//! rename): a crash mid-write never leaves a truncated artifact behind that
//! a later run would skip as "existing".

use crate::checkers::default_registry;
use crate::config::AppraisalConfig;
use crate::error::AppraiseError;
use crate::model::DocumentModel;
use crate::output::{ArtifactState, ArtifactStatus, PipelineResult, RunStats};
use crate::pipeline::engine::run_checkers;
use crate::pipeline::input::resolve_input;
use crate::pipeline::normalize::normalize;
use crate::render::renderer_for;
use crate::review::{aggregate, Review};
use futures::stream::{self, StreamExt};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Appraise one document and render the configured artifacts.
///
/// Fatal conditions (unreadable input, unsupported format, nothing to
/// appraise, cancellation before rendering) return `Err`; everything else —
/// failing checkers, failing renderers, skipped artifacts — is reported
/// inside the `Ok` result.
pub async fn run(input: &Path, config: &AppraisalConfig) -> Result<PipelineResult, AppraiseError> {
    let total_start = Instant::now();
    let config = Arc::new(config.clone());

    if config.cancel.is_cancelled() {
        return Err(AppraiseError::Cancelled { stage: "input" });
    }
    let input_path = input.to_path_buf();
    let resolved = tokio::task::spawn_blocking(move || resolve_input(&input_path))
        .await
        .map_err(|e| AppraiseError::Internal(format!("input task failed: {e}")))??;
    let input_dir = input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    if config.cancel.is_cancelled() {
        return Err(AppraiseError::Cancelled { stage: "normalize" });
    }
    let normalize_start = Instant::now();
    let model = tokio::task::spawn_blocking(move || normalize(&resolved))
        .await
        .map_err(|e| AppraiseError::Internal(format!("normalize task failed: {e}")))??;
    let normalize_duration = normalize_start.elapsed();
    let model = Arc::new(model);

    if config.cancel.is_cancelled() {
        return Err(AppraiseError::Cancelled { stage: "checkers" });
    }
    let check_start = Instant::now();
    let registry = default_registry();
    let outcome = run_checkers(&model, &config, &registry, config.concurrency).await;
    let check_duration = check_start.elapsed();
    let review = Arc::new(aggregate(outcome.findings));
    info!(
        "Appraisal produced {} findings ({} checker failures)",
        review.summary().total,
        outcome.failures.len()
    );

    if config.cancel.is_cancelled() {
        return Err(AppraiseError::Cancelled { stage: "render" });
    }
    let out_dir = config.out_dir.clone().unwrap_or(input_dir);
    std::fs::create_dir_all(&out_dir).map_err(|source| AppraiseError::OutputWriteFailed {
        path: out_dir.clone(),
        source,
    })?;

    let render_start = Instant::now();
    let mut indexed: Vec<(usize, ArtifactStatus)> =
        stream::iter(config.artifacts.iter().copied().enumerate().map(|(idx, kind)| {
            let model = Arc::clone(&model);
            let review = Arc::clone(&review);
            let config = Arc::clone(&config);
            let path = out_dir.join(kind.file_name(model.stem(), model.format()));
            async move {
                let state = render_one(kind, &path, model, review, config).await;
                (idx, ArtifactStatus { kind, path, state })
            }
        }))
        .buffer_unordered(config.concurrency.max(1))
        .collect()
        .await;
    indexed.sort_by_key(|(idx, _)| *idx);
    let artifacts: Vec<ArtifactStatus> = indexed.into_iter().map(|(_, s)| s).collect();
    let render_duration = render_start.elapsed();

    for status in &artifacts {
        match &status.state {
            ArtifactState::Rendered => info!("Wrote {}", status.path.display()),
            ArtifactState::SkippedExisting => {
                info!("Skipped {} (exists; use force to overwrite)", status.path.display())
            }
            ArtifactState::Failed(reason) => {
                warn!("Artifact {} failed: {reason}", status.kind)
            }
            ArtifactState::Cancelled => debug!("Artifact {} cancelled", status.kind),
        }
    }

    Ok(PipelineResult {
        artifacts,
        review_summary: review.summary().clone(),
        stats: RunStats {
            blocks: model.blocks().len(),
            checkers_run: registry.len(),
            checkers_failed: outcome.failures.len(),
            total_duration_ms: total_start.elapsed().as_millis() as u64,
            normalize_duration_ms: normalize_duration.as_millis() as u64,
            check_duration_ms: check_duration.as_millis() as u64,
            render_duration_ms: render_duration.as_millis() as u64,
        },
        checker_failures: outcome.failures,
    })
}

/// Render and write one artifact, mapping every outcome to a terminal
/// [`ArtifactState`]. Never returns an error: per-artifact failure is data.
async fn render_one(
    kind: crate::output::ArtifactKind,
    path: &Path,
    model: Arc<DocumentModel>,
    review: Arc<Review>,
    config: Arc<AppraisalConfig>,
) -> ArtifactState {
    if config.cancel.is_cancelled() {
        return ArtifactState::Cancelled;
    }
    if path.exists() && !config.force {
        return ArtifactState::SkippedExisting;
    }

    let target = path.to_path_buf();
    let joined = tokio::task::spawn_blocking(move || -> Result<(), String> {
        let renderer = renderer_for(kind, &config);
        let bytes = renderer.render(&model, &review).map_err(|e| e.to_string())?;
        write_atomic(&target, &bytes)
            .map_err(|e| format!("failed to write '{}': {e}", target.display()))
    })
    .await;

    match joined {
        Ok(Ok(())) => ArtifactState::Rendered,
        Ok(Err(reason)) => ArtifactState::Failed(reason),
        Err(join_err) => ArtifactState::Failed(format!("renderer panicked: {join_err}")),
    }
}

/// Write via a temp file in the same directory, then rename into place.
fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let mut tmp = tempfile::NamedTempFile::new_in(dir.unwrap_or(Path::new(".")))?;
    tmp.write_all(bytes)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

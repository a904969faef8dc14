//! The heuristic rule engine: parallel checker execution with partial
//! failure.
//!
//! Checkers are CPU-bound string scans over an immutable model, so each one
//! runs in `spawn_blocking` and the engine bounds parallelism with
//! `buffer_unordered`. A checker that returns an error *or panics* becomes a
//! [`CheckerFailure`]; the remaining checkers still run. The engine never
//! retries — heuristics are deterministic, so a second attempt would fail
//! identically.
//!
//! Completion order is nondeterministic under concurrency, but content is
//! not: checkers are independent by contract, and the aggregator imposes
//! the total order, so the same model and registry always yield the same
//! review.

use crate::checkers::Checker;
use crate::config::AppraisalConfig;
use crate::error::CheckerFailure;
use crate::finding::Finding;
use crate::model::DocumentModel;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{debug, warn};

/// Everything the engine produced: findings from the checkers that
/// succeeded, failures from the ones that did not.
#[derive(Debug, Default)]
pub struct EngineOutcome {
    pub findings: Vec<Finding>,
    pub failures: Vec<CheckerFailure>,
}

/// Run every registered checker against the model.
///
/// `concurrency` bounds the number of in-flight checkers. The outcome's
/// findings are unordered; callers pass them to
/// [`crate::review::aggregate`] which owns ordering and dedup.
pub async fn run_checkers(
    model: &Arc<DocumentModel>,
    config: &Arc<AppraisalConfig>,
    registry: &[Arc<dyn Checker>],
    concurrency: usize,
) -> EngineOutcome {
    let results: Vec<Result<Vec<Finding>, CheckerFailure>> =
        stream::iter(registry.iter().cloned().map(|checker| {
            let model = Arc::clone(model);
            let config = Arc::clone(config);
            async move {
                let id = checker.id();
                let joined =
                    tokio::task::spawn_blocking(move || checker.check(&model, &config)).await;
                match joined {
                    Ok(Ok(findings)) => {
                        debug!("Checker '{}' produced {} findings", id, findings.len());
                        Ok(findings)
                    }
                    Ok(Err(detail)) => Err(CheckerFailure {
                        checker_id: id.to_string(),
                        detail,
                    }),
                    Err(join_err) => Err(CheckerFailure {
                        checker_id: id.to_string(),
                        detail: if join_err.is_panic() {
                            format!("checker panicked: {join_err}")
                        } else {
                            format!("checker task cancelled: {join_err}")
                        },
                    }),
                }
            }
        }))
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut outcome = EngineOutcome::default();
    for result in results {
        match result {
            Ok(findings) => outcome.findings.extend(findings),
            Err(failure) => {
                warn!("{failure}");
                outcome.failures.push(failure);
            }
        }
    }
    outcome
}

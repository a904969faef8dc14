//! Pipeline stages for document appraisal.
//!
//! Each submodule implements exactly one transformation step. Keeping the
//! stages separate makes each independently testable and lets us swap an
//! implementation (e.g. a different PDF text extractor) without touching
//! the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ normalize ──▶ engine ──▶ aggregate ──▶ render ×5
//! (path)    (one model)   (findings) (review)      (artifacts)
//! ```
//!
//! 1. [`input`]     — validate the path, read bytes, sniff PDF vs DOCX
//! 2. [`normalize`] — build the positional document model; the only stage
//!    that knows about source-format coordinates
//! 3. [`engine`]    — run registered checkers as independent parallel
//!    tasks; one failing checker never blocks the rest
//!
//! Aggregation lives in [`crate::review`] and the renderers in
//! [`crate::render`]; the orchestrator in [`crate::run`] sequences it all.

pub mod engine;
pub mod input;
pub mod normalize;

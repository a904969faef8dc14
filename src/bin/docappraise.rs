//! CLI binary for docappraise.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `AppraisalConfig`, runs the pipeline, and prints per-artifact results.

use anyhow::{Context, Result};
use clap::Parser;
use docappraise::{run, AppraisalConfig, ArtifactKind, ArtifactState, CancelToken};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Full appraisal: all five artifacts next to the input
  docappraise manuscript.docx

  # Just the markdown report and the redline, overwriting old output
  docappraise --report --redline --force manuscript.docx

  # Collect artifacts in a separate directory
  docappraise --out-dir review/ manuscript.pdf

  # Custom heuristic tables
  docappraise --config checks.json manuscript.docx

  # Machine-readable result
  docappraise --json manuscript.docx > result.json

ARTIFACTS:
  report       <stem>.review.md          narrative markdown report
  deck         <stem>.deck.pptx          summary slide deck
  peer-review  <stem>.review.docx        formal peer-review document
  annotated    <stem>.annotated.{docx,md}  source text with inline comments
  redline      <stem>.redline.{docx,md}  tracked-changes edit proposal

  Selecting no artifact flag renders all five. Annotated and redline
  artifacts are DOCX for DOCX inputs and markdown for PDF inputs.

CONFIG FILE (JSON):
  {
    "design_keywords":  [{"keyword": "...", "label": "..."}],
    "stat_methods":     [{"keyword": "...", "label": "..."}],
    "section_guidance": [{"section": "...", "comment": "...", "suggestion": "..."}]
  }
  Keyword tables replace the defaults wholesale; guidance entries merge by
  section name.

EXIT STATUS:
  0  every requested artifact rendered or was skipped as already existing
  1  at least one artifact failed, or the appraisal itself failed
"#;

/// Appraise PDF/DOCX manuscripts and render review artifacts.
#[derive(Parser, Debug)]
#[command(
    name = "docappraise",
    version,
    about = "Appraise PDF/DOCX manuscripts and render review artifacts",
    long_about = "Run automated heuristic appraisal over a PDF or DOCX manuscript and render \
the review as a markdown report, a PPTX summary deck, a formal peer-review DOCX, an \
annotated copy, and a tracked-changes redline.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the PDF or DOCX manuscript.
    input: PathBuf,

    /// Render the markdown report.
    #[arg(long)]
    report: bool,

    /// Render the PPTX summary deck.
    #[arg(long)]
    deck: bool,

    /// Render the formal peer-review DOCX.
    #[arg(long)]
    peer_review: bool,

    /// Render the annotated copy.
    #[arg(long)]
    annotate: bool,

    /// Render the tracked-changes redline.
    #[arg(long)]
    redline: bool,

    /// Overwrite artifacts that already exist.
    #[arg(short, long, env = "DOCAPPRAISE_FORCE")]
    force: bool,

    /// Directory to write artifacts to (default: the input's directory).
    #[arg(short, long, env = "DOCAPPRAISE_OUT_DIR")]
    out_dir: Option<PathBuf>,

    /// JSON file overriding the heuristic keyword/guidance tables.
    #[arg(long, env = "DOCAPPRAISE_CONFIG")]
    config: Option<PathBuf>,

    /// Number of concurrent checker/renderer tasks.
    #[arg(short, long, env = "DOCAPPRAISE_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Print the full pipeline result as JSON instead of status lines.
    #[arg(long, env = "DOCAPPRAISE_JSON")]
    json: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOCAPPRAISE_QUIET")]
    quiet: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCAPPRAISE_VERBOSE")]
    verbose: bool,
}

impl Cli {
    /// Selected artifacts, in the fixed render order. No flags means all.
    fn artifacts(&self) -> Vec<ArtifactKind> {
        let selected: Vec<ArtifactKind> = [
            (self.report, ArtifactKind::MarkdownReport),
            (self.deck, ArtifactKind::SlideDeck),
            (self.peer_review, ArtifactKind::FormalReview),
            (self.annotate, ArtifactKind::AnnotatedText),
            (self.redline, ArtifactKind::Redline),
        ]
        .into_iter()
        .filter_map(|(on, kind)| on.then_some(kind))
        .collect();
        if selected.is_empty() {
            ArtifactKind::ALL.to_vec()
        } else {
            selected
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let mut builder = AppraisalConfig::builder()
        .artifacts(cli.artifacts())
        .force(cli.force)
        .concurrency(cli.concurrency)
        .cancel_token(CancelToken::new());
    if let Some(ref dir) = cli.out_dir {
        builder = builder.out_dir(dir);
    }
    let mut config = builder.build().context("Invalid configuration")?;
    if let Some(ref path) = cli.config {
        config
            .apply_overrides_file(path)
            .with_context(|| format!("Failed to load config overrides from {:?}", path))?;
    }

    // ── Run the pipeline ─────────────────────────────────────────────────
    let result = run(&cli.input, &config).await.context("Appraisal failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&result).context("Failed to serialise result")?
        );
    } else if !cli.quiet {
        let summary = &result.review_summary;
        eprintln!(
            "{} {} finding{} in {} blocks  {}",
            cyan("◆"),
            bold(&summary.total.to_string()),
            if summary.total == 1 { "" } else { "s" },
            result.stats.blocks,
            dim(&format!("{}ms", result.stats.total_duration_ms)),
        );
        for failure in &result.checker_failures {
            eprintln!("  {} {failure}", red("✗"));
        }
        for status in &result.artifacts {
            let path = status.path.display().to_string();
            match &status.state {
                ArtifactState::Rendered => {
                    eprintln!("  {} {:<12} {}", green("✓"), status.kind.to_string(), path)
                }
                ArtifactState::SkippedExisting => eprintln!(
                    "  {} {:<12} {}",
                    cyan("↷"),
                    status.kind.to_string(),
                    dim(&format!("{path} (exists; use --force)"))
                ),
                ArtifactState::Failed(reason) => eprintln!(
                    "  {} {:<12} {}",
                    red("✗"),
                    status.kind.to_string(),
                    red(reason)
                ),
                ArtifactState::Cancelled => eprintln!(
                    "  {} {:<12} {}",
                    dim("∅"),
                    status.kind.to_string(),
                    dim("cancelled")
                ),
            }
        }
    }

    if !result.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

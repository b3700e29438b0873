//! Pipeline Orchestrator — the fixed six-stage sequence.
//!
//! ```text
//! generate-records → render-documents → convert-pdf → rasterize-images
//!                  → partition-variants → emit-annotations
//! ```
//!
//! Stages run strictly in order. A stage that returns a [`StageReport`] has
//! succeeded, even if some records failed inside it; recoverable per-record
//! errors are counted, not fatal. A non-recoverable error (see
//! [`PipelineError::is_recoverable`]) ends the stage, the stage error aborts the
//! run and nothing after it starts. Files already written by earlier stages
//! stay on disk.
//!
//! Every stage locates its inputs by listing the previous stage's directory
//! and carries the artifact stem through unchanged, so a rerun of any single
//! stage overwrites the same files.

use std::fmt;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::errors::PipelineError;
use crate::identity::TemplateId;
use crate::state::PipelineContext;

pub mod partition;
pub mod stages;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    GenerateRecords,
    RenderDocuments,
    ConvertPdf,
    RasterizeImages,
    PartitionVariants,
    EmitAnnotations,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::GenerateRecords,
        Stage::RenderDocuments,
        Stage::ConvertPdf,
        Stage::RasterizeImages,
        Stage::PartitionVariants,
        Stage::EmitAnnotations,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::GenerateRecords => "generate-records",
            Stage::RenderDocuments => "render-documents",
            Stage::ConvertPdf => "convert-pdf",
            Stage::RasterizeImages => "rasterize-images",
            Stage::PartitionVariants => "partition-variants",
            Stage::EmitAnnotations => "emit-annotations",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tallies
// ────────────────────────────────────────────────────────────────────────────

/// Per-stage success/failure tally.
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub succeeded: usize,
    pub failed: usize,
    /// Records left alone on purpose, e.g. a template without a layout file.
    pub skipped: usize,
    /// Records whose template id had to be guessed from an unparseable name.
    pub fallbacks: usize,
    pub elapsed_ms: u64,
}

impl StageReport {
    pub fn new(stage: Stage) -> Self {
        StageReport {
            stage,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            fallbacks: 0,
            elapsed_ms: 0,
        }
    }

    /// Counts a per-record error. Skips (missing layout) and failures are
    /// tallied separately; both are logged.
    pub(crate) fn record_error(&mut self, subject: &str, err: &PipelineError) {
        match err {
            PipelineError::MissingConfig { .. } => {
                self.skipped += 1;
                warn!(stage = %self.stage, subject, error = %err, "Record skipped");
            }
            _ => {
                self.failed += 1;
                warn!(stage = %self.stage, subject, error = %err, "Record failed");
            }
        }
    }

    /// Tallies a recoverable per-record error. Anything else is handed back so
    /// the stage can stop.
    pub(crate) fn absorb(&mut self, subject: &str, err: PipelineError) -> Result<(), PipelineError> {
        if !err.is_recoverable() {
            return Err(err);
        }
        self.record_error(subject, &err);
        Ok(())
    }

    /// Counts a record whose template id was guessed; the record itself succeeded.
    pub(crate) fn record_fallback(&mut self, subject: &str) {
        self.fallbacks += 1;
        let err = PipelineError::UnparseableIdentity(subject.to_string());
        warn!(stage = %self.stage, error = %err, "Falling back to template {}", TemplateId::FIRST);
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.skipped
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StageFailure {
    pub stage: Stage,
    pub reason: String,
}

/// Outcome of one orchestrated run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub stages: Vec<StageReport>,
    pub aborted: Option<StageFailure>,
}

impl RunSummary {
    /// True only when every stage reported and none aborted.
    pub fn is_complete(&self) -> bool {
        self.aborted.is_none() && self.stages.len() == Stage::ALL.len()
    }

    pub fn total_failed(&self) -> usize {
        self.stages.iter().map(|s| s.failed).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.stages.iter().map(|s| s.skipped).sum()
    }

    pub fn total_fallbacks(&self) -> usize {
        self.stages.iter().map(|s| s.fallbacks).sum()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Orchestrator
// ────────────────────────────────────────────────────────────────────────────

pub struct Pipeline {
    ctx: PipelineContext,
}

impl Pipeline {
    pub fn new(ctx: PipelineContext) -> Self {
        Pipeline { ctx }
    }

    /// Runs one stage with its precondition checks and times it.
    pub async fn run_stage(&self, stage: Stage) -> Result<StageReport, PipelineError> {
        info!(stage = %stage, "Stage starting");
        let started = Instant::now();
        let mut report = match stage {
            Stage::GenerateRecords => stages::generate_records(&self.ctx).await?,
            Stage::RenderDocuments => stages::render_documents(&self.ctx).await?,
            Stage::ConvertPdf => stages::convert_pdf(&self.ctx).await?,
            Stage::RasterizeImages => stages::rasterize_images(&self.ctx).await?,
            Stage::PartitionVariants => partition::partition_variants(&self.ctx).await?,
            Stage::EmitAnnotations => stages::emit_annotations(&self.ctx).await?,
        };
        report.elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            stage = %stage,
            succeeded = report.succeeded,
            failed = report.failed,
            skipped = report.skipped,
            fallbacks = report.fallbacks,
            elapsed_ms = report.elapsed_ms,
            "Stage finished"
        );
        if report.fallbacks > 0 {
            warn!(
                stage = %stage,
                fallbacks = report.fallbacks,
                "Some template ids were guessed from unparseable names"
            );
        }
        Ok(report)
    }

    /// Runs all six stages in order, stopping at the first stage that errors.
    pub async fn run(&self) -> RunSummary {
        let started_at = Utc::now();
        let mut stages = Vec::with_capacity(Stage::ALL.len());
        let mut aborted = None;

        for stage in Stage::ALL {
            match self.run_stage(stage).await {
                Ok(report) => stages.push(report),
                Err(e) => {
                    error!(stage = %stage, error = %e, "Stage failed; aborting run");
                    aborted = Some(StageFailure {
                        stage,
                        reason: e.to_string(),
                    });
                    break;
                }
            }
        }

        RunSummary {
            started_at,
            finished_at: Utc::now(),
            stages,
            aborted,
        }
    }
}

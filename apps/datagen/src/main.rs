mod annotation;
mod config;
mod dataset;
mod errors;
mod generation;
mod identity;
mod layout;
mod models;
mod noise;
mod pipeline;
mod raster;
mod render;
mod state;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::dataset::{split_dataset, verify_dataset};
use crate::pipeline::{stages, Pipeline, Stage};
use crate::state::PipelineContext;

#[derive(Parser)]
#[command(name = "datagen")]
#[command(about = "Synthetic resume dataset generator for section detection")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Records to generate; also the expected total when verifying
    #[arg(long, global = true)]
    records: Option<u32>,

    /// Seed for record content
    #[arg(long, global = true)]
    record_seed: Option<u64>,

    /// Seed for template assignment
    #[arg(long, global = true)]
    template_seed: Option<u64>,

    /// Concurrent rasterization jobs
    #[arg(long, global = true)]
    workers: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all six stages in order
    Run {
        /// Write the run summary as JSON to this path
        #[arg(long, value_name = "PATH")]
        summary: Option<PathBuf>,
    },
    /// Generate record JSON files
    Generate,
    /// Render records into HTML documents
    Render,
    /// Convert documents to PDF
    Pdf,
    /// Rasterize PDFs to PNG
    Images,
    /// Move images into clean/ and write noisy variants
    Partition,
    /// Write label files for clean images
    Annotate,
    /// Inline each template stylesheet into its rendered documents
    InlineCss,
    /// Audit all artifact directories
    Verify {
        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Copy clean images and labels into a train/val split
    Split,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first
    let mut config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Some(records) = cli.records {
        config.record_count = records;
    }
    if let Some(seed) = cli.record_seed {
        config.record_seed = seed;
    }
    if let Some(seed) = cli.template_seed {
        config.template_seed = seed;
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    config.validate()?;

    info!("Starting datagen v{}", env!("CARGO_PKG_VERSION"));
    info!(
        records = config.record_count,
        template_pool = config.template_pool,
        workers = config.workers,
        "Configuration loaded"
    );

    let ctx = PipelineContext::new(config.clone());
    let pipeline = Pipeline::new(ctx.clone());

    match cli.command {
        Commands::Run { summary } => {
            let outcome = pipeline.run().await;
            info!(
                stages = outcome.stages.len(),
                failed = outcome.total_failed(),
                skipped = outcome.total_skipped(),
                fallbacks = outcome.total_fallbacks(),
                elapsed_s = (outcome.finished_at - outcome.started_at).num_seconds(),
                "Run finished"
            );
            if let Some(path) = summary {
                let json = serde_json::to_string_pretty(&outcome)?;
                std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write run summary to {}", path.display()))?;
                info!("Run summary written to {}", path.display());
            }
            if !outcome.is_complete() {
                match outcome.aborted {
                    Some(failure) => {
                        anyhow::bail!("Stage {} failed: {}", failure.stage, failure.reason)
                    }
                    None => anyhow::bail!(
                        "Run stopped after {} of {} stages",
                        outcome.stages.len(),
                        Stage::ALL.len()
                    ),
                }
            }
        }
        Commands::Generate => run_stage(&pipeline, Stage::GenerateRecords).await?,
        Commands::Render => run_stage(&pipeline, Stage::RenderDocuments).await?,
        Commands::Pdf => run_stage(&pipeline, Stage::ConvertPdf).await?,
        Commands::Images => run_stage(&pipeline, Stage::RasterizeImages).await?,
        Commands::Partition => run_stage(&pipeline, Stage::PartitionVariants).await?,
        Commands::Annotate => run_stage(&pipeline, Stage::EmitAnnotations).await?,
        Commands::InlineCss => {
            stages::inline_documents(&ctx).await?;
        }
        Commands::Verify { json } => {
            let report = verify_dataset(&config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{report}");
            }
            if !report.is_complete() {
                anyhow::bail!("Verification found {} issue(s)", report.issues.len());
            }
        }
        Commands::Split => {
            let report = split_dataset(&config)?;
            println!(
                "Total images: {}\nTraining images: {}\nValidation images: {}",
                report.total, report.train, report.val
            );
        }
    }

    Ok(())
}

async fn run_stage(pipeline: &Pipeline, stage: Stage) -> Result<()> {
    let report = pipeline.run_stage(stage).await?;
    if report.failed > 0 || report.skipped > 0 {
        warn!(
            stage = %stage,
            failed = report.failed,
            skipped = report.skipped,
            total = report.total(),
            "Stage finished with per-record errors"
        );
    }
    Ok(())
}

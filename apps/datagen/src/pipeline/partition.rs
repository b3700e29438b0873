//! Clean/noisy partition.
//!
//! Freshly rasterized pages are moved from the drop directory into `clean/`,
//! then every clean page gets an augmented copy in `noisy/` under the very same
//! file name. The shared stem is what lets one label file describe both.

use tracing::info;

use crate::errors::PipelineError;
use crate::identity::{sibling_path, ArtifactKind};
use crate::noise;
use crate::pipeline::stages::{list_artifacts, run_concurrent, JobOutcome};
use crate::pipeline::{Stage, StageReport};
use crate::state::PipelineContext;

pub async fn partition_variants(ctx: &PipelineContext) -> Result<StageReport, PipelineError> {
    let config = &ctx.config;
    let clean_dir = config.clean_dir();
    let noisy_dir = config.noisy_dir();
    tokio::fs::create_dir_all(&clean_dir).await?;
    tokio::fs::create_dir_all(&noisy_dir).await?;

    let mut move_failures = StageReport::new(Stage::PartitionVariants);
    let mut moved = 0usize;
    for image in list_artifacts(&config.images_dir, "png")? {
        let target = sibling_path(&image, &clean_dir, ArtifactKind::Image);
        match tokio::fs::rename(&image, &target).await {
            Ok(()) => moved += 1,
            Err(e) => move_failures.record_error(&image.display().to_string(), &e.into()),
        }
    }
    info!(moved, clean = %clean_dir.display(), "Moved images into clean collection");

    let clean = list_artifacts(&clean_dir, "png")?;
    if clean.is_empty() {
        return Err(PipelineError::fatal(
            Stage::PartitionVariants,
            format!("no images in {} or {}", config.images_dir.display(), clean_dir.display()),
        ));
    }

    let mut report = run_concurrent(Stage::PartitionVariants, ctx, clean, |ctx, clean| async move {
        let noisy = sibling_path(&clean, &ctx.config.noisy_dir(), ArtifactKind::Image);
        let seed = noise::variant_seed(ctx.config.noise_seed, &clean);
        tokio::task::spawn_blocking(move || noise::write_noisy_variant(&clean, &noisy, seed))
            .await??;
        Ok::<_, PipelineError>(JobOutcome::default())
    })
    .await?;

    report.failed += move_failures.failed;
    Ok(report)
}

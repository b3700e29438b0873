use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::annotation::{self, read_image_dimensions, render_label_file};
use crate::errors::PipelineError;
use crate::generation::{generate_record, record_file_name};
use crate::identity::{
    self, sibling_path, ArtifactIdentity, ArtifactKind, TemplateId, TemplatePool, TemplateSelector,
};
use crate::layout::{LayoutResolver, ResolvedLayout};
use crate::models::resume::Record;
use crate::pipeline::{Stage, StageReport};
use crate::render::{inline_stylesheet, render_document, STYLESHEET_FILE_NAME, TEMPLATE_FILE_NAME};
use crate::state::PipelineContext;

/// Files in `dir` with extension `ext`, sorted by name. A missing directory is empty.
pub fn list_artifacts(dir: &Path, ext: &str) -> std::io::Result<Vec<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };
    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|x| x == ext) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

pub(crate) fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn subject_of(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// ────────────────────────────────────────────────────────────────────────────
// Stage 1: generate records
// ────────────────────────────────────────────────────────────────────────────

pub async fn generate_records(ctx: &PipelineContext) -> Result<StageReport, PipelineError> {
    let config = &ctx.config;
    if config.record_count == 0 {
        return Err(PipelineError::fatal(
            Stage::GenerateRecords,
            "record count is zero",
        ));
    }
    tokio::fs::create_dir_all(&config.records_dir).await?;

    let mut rng = StdRng::seed_from_u64(config.record_seed);
    let records: Vec<(String, Record)> = (0..config.record_count)
        .map(|_| {
            let record = generate_record(&mut rng);
            (record_file_name(&mut rng), record)
        })
        .collect();

    let mut report = StageReport::new(Stage::GenerateRecords);
    for (file_name, record) in records {
        let path = config.records_dir.join(&file_name);
        let written = match serde_json::to_string_pretty(&record) {
            Ok(json) => tokio::fs::write(&path, json).await.map_err(PipelineError::from),
            Err(e) => Err(e.into()),
        };
        match written {
            Ok(()) => report.succeeded += 1,
            Err(e) => report.absorb(&file_name, e)?,
        }
    }

    info!(
        count = report.succeeded,
        dir = %config.records_dir.display(),
        "Records written"
    );
    Ok(report)
}

// ────────────────────────────────────────────────────────────────────────────
// Stage 2: render documents
// ────────────────────────────────────────────────────────────────────────────

/// Renders every record, in filename order, numbering from 1.
///
/// The template is drawn once per record by the selector and the resulting
/// identity is the only source of the output name.
pub async fn render_documents(ctx: &PipelineContext) -> Result<StageReport, PipelineError> {
    let config = &ctx.config;
    let records = list_artifacts(&config.records_dir, "json")?;
    if records.is_empty() {
        return Err(PipelineError::fatal(
            Stage::RenderDocuments,
            format!("no records in {}", config.records_dir.display()),
        ));
    }
    let pool = TemplatePool::new(config.template_pool)
        .map_err(|e| PipelineError::fatal(Stage::RenderDocuments, e.to_string()))?;
    tokio::fs::create_dir_all(&config.html_dir).await?;

    let mut selector = TemplateSelector::new(config.template_seed, pool);
    let mut templates: HashMap<TemplateId, String> = HashMap::new();
    let mut report = StageReport::new(Stage::RenderDocuments);

    for (i, record_path) in records.iter().enumerate() {
        let identity = selector.assign(i as u32 + 1)?;
        match render_one(ctx, &mut templates, identity, record_path).await {
            Ok(out) => {
                report.succeeded += 1;
                debug!(record = %record_path.display(), out = %out.display(), "Rendered");
            }
            Err(e) => report.absorb(&identity.stem(), e)?,
        }
    }
    Ok(report)
}

async fn render_one(
    ctx: &PipelineContext,
    templates: &mut HashMap<TemplateId, String>,
    identity: ArtifactIdentity,
    record_path: &Path,
) -> Result<PathBuf, PipelineError> {
    let config = &ctx.config;
    let invalid = |reason: String| PipelineError::InvalidRecord {
        path: record_path.to_path_buf(),
        reason,
    };

    let raw = tokio::fs::read_to_string(record_path).await?;
    let record: Record = serde_json::from_str(&raw).map_err(|e| invalid(e.to_string()))?;
    record.validate().map_err(invalid)?;

    let template_id = identity.template_id();
    if !templates.contains_key(&template_id) {
        let path = config
            .templates_dir
            .join(template_id.dir_name())
            .join(TEMPLATE_FILE_NAME);
        let text = tokio::fs::read_to_string(&path).await?;
        templates.insert(template_id, text);
    }
    let html = render_document(&templates[&template_id], &record)?;

    let out = config
        .html_dir
        .join(identity.file_name(ArtifactKind::Document));
    tokio::fs::write(&out, html).await?;
    Ok(out)
}

// ────────────────────────────────────────────────────────────────────────────
// Stages 3 and 4: rasterization
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub(crate) struct JobOutcome {
    pub fallback: bool,
}

/// Runs `job` for every input with at most `workers` in flight and tallies the
/// results. A job that panics, is cancelled or returns a non-recoverable error
/// fails the stage; the remaining jobs are aborted.
pub(crate) async fn run_concurrent<F, Fut>(
    stage: Stage,
    ctx: &PipelineContext,
    inputs: Vec<PathBuf>,
    job: F,
) -> Result<StageReport, PipelineError>
where
    F: Fn(PipelineContext, PathBuf) -> Fut,
    Fut: Future<Output = Result<JobOutcome, PipelineError>> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(ctx.config.workers.max(1)));
    let mut jobs = JoinSet::new();

    for input in inputs {
        let semaphore = semaphore.clone();
        let subject = subject_of(&input);
        let work = job(ctx.clone(), input);
        jobs.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            (subject, work.await)
        });
    }

    let mut report = StageReport::new(stage);
    while let Some(joined) = jobs.join_next().await {
        let (subject, result) = joined?;
        match result {
            Ok(outcome) => {
                report.succeeded += 1;
                if outcome.fallback {
                    report.record_fallback(&subject);
                }
            }
            Err(e) => report.absorb(&subject, e)?,
        }
    }
    Ok(report)
}

pub async fn convert_pdf(ctx: &PipelineContext) -> Result<StageReport, PipelineError> {
    let config = &ctx.config;
    let documents = list_artifacts(&config.html_dir, "html")?;
    if documents.is_empty() {
        return Err(PipelineError::fatal(
            Stage::ConvertPdf,
            format!("no documents in {}", config.html_dir.display()),
        ));
    }
    tokio::fs::create_dir_all(&config.pdf_dir).await?;

    run_concurrent(Stage::ConvertPdf, ctx, documents, |ctx, html| async move {
        convert_one(&ctx, &html).await
    })
    .await
}

/// Converts one document with its template's stylesheet inlined into a private
/// temporary copy. The rendered document on disk is left untouched.
async fn convert_one(ctx: &PipelineContext, html: &Path) -> Result<JobOutcome, PipelineError> {
    let parsed = identity::parse(html);
    let template_id = parsed.template_or_fallback();
    let stem = stem_of(html);
    let pdf = sibling_path(html, &ctx.config.pdf_dir, ArtifactKind::Pdf);

    let document = tokio::fs::read_to_string(html).await?;
    let css_path = ctx
        .config
        .templates_dir
        .join(template_id.dir_name())
        .join(STYLESHEET_FILE_NAME);
    let inlined = match tokio::fs::read_to_string(&css_path).await {
        Ok(css) => inline_stylesheet(&document, &css),
        Err(e) => {
            warn!(
                stem = %stem,
                css = %css_path.display(),
                error = %e,
                "Stylesheet unavailable; converting as-is"
            );
            None
        }
    };

    match inlined {
        Some(content) => {
            let tmp = tempfile::Builder::new()
                .prefix(&format!("{stem}."))
                .suffix(".html")
                .tempfile()?;
            tokio::fs::write(tmp.path(), content).await?;
            ctx.rasterizer.document_to_pdf(tmp.path(), &pdf).await?;
        }
        None => ctx.rasterizer.document_to_pdf(html, &pdf).await?,
    }

    debug!(stem = %stem, template_id = %template_id, "PDF written");
    Ok(JobOutcome {
        fallback: parsed.is_unparseable(),
    })
}

pub async fn rasterize_images(ctx: &PipelineContext) -> Result<StageReport, PipelineError> {
    let config = &ctx.config;
    let pdfs = list_artifacts(&config.pdf_dir, "pdf")?;
    if pdfs.is_empty() {
        return Err(PipelineError::fatal(
            Stage::RasterizeImages,
            format!("no PDFs in {}", config.pdf_dir.display()),
        ));
    }
    tokio::fs::create_dir_all(&config.images_dir).await?;

    run_concurrent(Stage::RasterizeImages, ctx, pdfs, |ctx, pdf| async move {
        let image = sibling_path(&pdf, &ctx.config.images_dir, ArtifactKind::Image);
        ctx.rasterizer.pdf_to_image(&pdf, &image).await?;
        Ok::<_, PipelineError>(JobOutcome::default())
    })
    .await
}

// ────────────────────────────────────────────────────────────────────────────
// Stage 6: emit annotations
// ────────────────────────────────────────────────────────────────────────────

/// Writes one label file per clean image. Runs on the blocking pool.
pub async fn emit_annotations(ctx: &PipelineContext) -> Result<StageReport, PipelineError> {
    let config = &ctx.config;
    let images = list_artifacts(&config.clean_dir(), "png")?;
    if images.is_empty() {
        return Err(PipelineError::fatal(
            Stage::EmitAnnotations,
            format!("no clean images in {}", config.clean_dir().display()),
        ));
    }
    tokio::fs::create_dir_all(&config.labels_dir).await?;

    let resolver = LayoutResolver::new(config.templates_dir.clone());
    let labels_dir = config.labels_dir.clone();
    let report =
        tokio::task::spawn_blocking(move || annotate_all(&resolver, &images, &labels_dir)).await?;
    Ok(report)
}

fn annotate_all(resolver: &LayoutResolver, images: &[PathBuf], labels_dir: &Path) -> StageReport {
    let mut layouts: HashMap<TemplateId, ResolvedLayout> = HashMap::new();
    let mut report = StageReport::new(Stage::EmitAnnotations);

    for image in images {
        let parsed = identity::parse(image);
        let template_id = parsed.template_or_fallback();
        let subject = subject_of(image);

        match annotate_one(resolver, &mut layouts, template_id, image, labels_dir) {
            Ok(lines) => {
                report.succeeded += 1;
                if parsed.is_unparseable() {
                    report.record_fallback(&subject);
                }
                debug!(image = %subject, lines, "Label written");
            }
            Err(e) => report.record_error(&subject, &e),
        }
    }
    report
}

fn annotate_one(
    resolver: &LayoutResolver,
    layouts: &mut HashMap<TemplateId, ResolvedLayout>,
    template_id: TemplateId,
    image: &Path,
    labels_dir: &Path,
) -> Result<usize, PipelineError> {
    if !layouts.contains_key(&template_id) {
        layouts.insert(template_id, resolver.resolve(template_id)?);
    }
    let layout = &layouts[&template_id];

    let (width, height) = read_image_dimensions(image)?;
    let lines = annotation::emit(layout, width, height)?;
    std::fs::write(
        sibling_path(image, labels_dir, ArtifactKind::Label),
        render_label_file(&lines),
    )?;
    Ok(lines.len())
}

// ────────────────────────────────────────────────────────────────────────────
// Stylesheet inlining in place
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Serialize)]
pub struct InlineReport {
    pub rewritten: usize,
    pub unchanged: usize,
    pub failed: usize,
}

/// Rewrites rendered documents so they carry their template's stylesheet
/// inline. Documents without the stylesheet link are left as they are.
pub async fn inline_documents(ctx: &PipelineContext) -> Result<InlineReport, PipelineError> {
    let config = &ctx.config;
    let documents = list_artifacts(&config.html_dir, "html")?;
    let mut report = InlineReport::default();

    for html in documents {
        let template_id = identity::parse(&html).template_or_fallback();
        let css_path = config
            .templates_dir
            .join(template_id.dir_name())
            .join(STYLESHEET_FILE_NAME);
        let result: Result<bool, PipelineError> = async {
            let document = tokio::fs::read_to_string(&html).await?;
            let css = tokio::fs::read_to_string(&css_path).await?;
            match inline_stylesheet(&document, &css) {
                Some(inlined) => {
                    tokio::fs::write(&html, inlined).await?;
                    Ok(true)
                }
                None => Ok(false),
            }
        }
        .await;

        match result {
            Ok(true) => report.rewritten += 1,
            Ok(false) => report.unchanged += 1,
            Err(e) => {
                report.failed += 1;
                warn!(document = %html.display(), error = %e, "Could not inline stylesheet");
            }
        }
    }

    info!(
        rewritten = report.rewritten,
        unchanged = report.unchanged,
        failed = report.failed,
        "Stylesheet inlining finished"
    );
    Ok(report)
}

//! Dataset Verifier — read-only audit of every artifact directory.
//!
//! Counts files per directory and reconciles them with the expected total,
//! checks that every noisy image has a clean twin and a label, samples one
//! label file, reports how documents spread over templates and audits the
//! template folders. Nothing is ever moved, rewritten or deleted; every
//! discrepancy ends up in [`VerificationReport::issues`].

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::annotation::parse_label_file;
use crate::config::Config;
use crate::errors::PipelineError;
use crate::identity::{self, TemplateId, TemplatePool};
use crate::layout::resolver::LAYOUT_FILE_NAME;
use crate::layout::LayoutResolver;
use crate::pipeline::stages::{list_artifacts, stem_of};
use crate::render::{STYLESHEET_FILE_NAME, TEMPLATE_FILE_NAME};

const STORAGE_SAMPLE: usize = 10;
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ArtifactCounts {
    pub records: usize,
    pub documents: usize,
    pub pdfs: usize,
    pub clean_images: usize,
    pub noisy_images: usize,
    pub labels: usize,
}

impl ArtifactCounts {
    fn by_kind(&self) -> [(&'static str, usize); 6] {
        [
            ("records", self.records),
            ("documents", self.documents),
            ("PDFs", self.pdfs),
            ("clean images", self.clean_images),
            ("noisy images", self.noisy_images),
            ("labels", self.labels),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LabelSample {
    pub file: String,
    pub lines: usize,
    pub expected_lines: Option<usize>,
    pub first_line: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateAudit {
    pub name: String,
    pub has_document: bool,
    pub has_stylesheet: bool,
    pub has_layout: bool,
}

impl TemplateAudit {
    pub fn is_complete(&self) -> bool {
        self.has_document && self.has_stylesheet && self.has_layout
    }
}

/// Stems that break the noisy → clean → label chain.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IntegrityReport {
    pub noisy_without_clean: Vec<String>,
    pub noisy_without_label: Vec<String>,
    pub clean_without_label: Vec<String>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.noisy_without_clean.is_empty()
            && self.noisy_without_label.is_empty()
            && self.clean_without_label.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StorageEstimate {
    pub pdf_mb: Option<f64>,
    pub image_mb: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub expected_total: u32,
    pub counts: ArtifactCounts,
    pub template_distribution: BTreeMap<TemplateId, usize>,
    pub unparseable_documents: usize,
    /// Documents tagged with a template id the configured pool does not have.
    pub outside_pool_documents: usize,
    pub label_sample: Option<LabelSample>,
    pub templates: Vec<TemplateAudit>,
    pub integrity: IntegrityReport,
    pub storage: StorageEstimate,
    pub issues: Vec<String>,
}

impl VerificationReport {
    pub fn is_complete(&self) -> bool {
        self.issues.is_empty()
    }
}

pub fn verify_dataset(config: &Config) -> Result<VerificationReport, PipelineError> {
    let records = list_artifacts(&config.records_dir, "json")?;
    let documents = list_artifacts(&config.html_dir, "html")?;
    let pdfs = list_artifacts(&config.pdf_dir, "pdf")?;
    let clean = list_artifacts(&config.clean_dir(), "png")?;
    let noisy = list_artifacts(&config.noisy_dir(), "png")?;
    let labels = list_artifacts(&config.labels_dir, "txt")?;

    let counts = ArtifactCounts {
        records: records.len(),
        documents: documents.len(),
        pdfs: pdfs.len(),
        clean_images: clean.len(),
        noisy_images: noisy.len(),
        labels: labels.len(),
    };

    let pool = TemplatePool::new(config.template_pool)?;
    let mut template_distribution = BTreeMap::new();
    let mut unparseable_documents = 0;
    let mut outside_pool_documents = 0;
    for document in &documents {
        match identity::parse(document).template_id {
            Some(id) => {
                *template_distribution.entry(id).or_insert(0) += 1;
                if !pool.contains(id) {
                    outside_pool_documents += 1;
                }
            }
            None => unparseable_documents += 1,
        }
    }

    let resolver = LayoutResolver::new(config.templates_dir.clone());
    let label_sample = labels.first().map(|path| sample_label(path, &resolver));
    let templates = audit_templates(&config.templates_dir)?;
    let integrity = check_integrity(&clean, &noisy, &labels);
    let storage = StorageEstimate {
        pdf_mb: estimate_mb(&pdfs, pdfs.len()),
        image_mb: estimate_mb(&clean, clean.len() + noisy.len()),
    };

    let mut issues = Vec::new();
    for (kind, count) in counts.by_kind() {
        if count != config.record_count as usize {
            issues.push(format!("{kind}: {count} (expected {})", config.record_count));
        }
    }
    if unparseable_documents > 0 {
        issues.push(format!(
            "{unparseable_documents} documents carry no template id in their name"
        ));
    }
    if outside_pool_documents > 0 {
        issues.push(format!(
            "{outside_pool_documents} documents use a template outside the pool of {}",
            pool.size()
        ));
    }
    if !integrity.is_clean() {
        for stem in &integrity.noisy_without_clean {
            issues.push(format!("noisy image {stem} has no clean counterpart"));
        }
        for stem in &integrity.noisy_without_label {
            issues.push(format!("noisy image {stem} has no label"));
        }
        for stem in &integrity.clean_without_label {
            issues.push(format!("clean image {stem} has no label"));
        }
    }
    if let Some(sample) = &label_sample {
        if let Some(error) = &sample.error {
            issues.push(format!("label {}: {error}", sample.file));
        } else if let Some(expected) = sample.expected_lines.filter(|&n| n != sample.lines) {
            issues.push(format!(
                "label {}: {} lines, layout has {expected} sections",
                sample.file, sample.lines
            ));
        }
    }
    for audit in templates.iter().filter(|t| !t.is_complete()) {
        issues.push(format!("template folder {} is incomplete", audit.name));
    }

    info!(issues = issues.len(), "Verification finished");
    Ok(VerificationReport {
        expected_total: config.record_count,
        counts,
        template_distribution,
        unparseable_documents,
        outside_pool_documents,
        label_sample,
        templates,
        integrity,
        storage,
        issues,
    })
}

fn sample_label(path: &Path, resolver: &LayoutResolver) -> LabelSample {
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let expected_lines = identity::parse(path)
        .template_id
        .and_then(|id| resolver.resolve(id).ok())
        .map(|layout| layout.sections.len());

    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|content| parse_label_file(&content));
    match parsed {
        Ok(lines) => LabelSample {
            file,
            lines: lines.len(),
            expected_lines,
            first_line: lines.first().map(|l| l.to_string()),
            error: None,
        },
        Err(error) => LabelSample {
            file,
            lines: 0,
            expected_lines,
            first_line: None,
            error: Some(error),
        },
    }
}

fn audit_templates(templates_dir: &Path) -> Result<Vec<TemplateAudit>, PipelineError> {
    let entries = match std::fs::read_dir(templates_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut dirs: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();

    Ok(dirs
        .into_iter()
        .map(|dir| TemplateAudit {
            name: dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            has_document: dir.join(TEMPLATE_FILE_NAME).is_file(),
            has_stylesheet: dir.join(STYLESHEET_FILE_NAME).is_file(),
            has_layout: dir.join(LAYOUT_FILE_NAME).is_file(),
        })
        .collect())
}

fn check_integrity(clean: &[PathBuf], noisy: &[PathBuf], labels: &[PathBuf]) -> IntegrityReport {
    let clean_stems: HashSet<String> = clean.iter().map(|p| stem_of(p)).collect();
    let label_stems: HashSet<String> = labels.iter().map(|p| stem_of(p)).collect();

    let mut report = IntegrityReport::default();
    for stem in noisy.iter().map(|p| stem_of(p)) {
        if !clean_stems.contains(&stem) {
            report.noisy_without_clean.push(stem.clone());
        }
        if !label_stems.contains(&stem) {
            report.noisy_without_label.push(stem);
        }
    }
    for stem in clean.iter().map(|p| stem_of(p)) {
        if !label_stems.contains(&stem) {
            report.clean_without_label.push(stem);
        }
    }
    report
}

/// Average size of the first few files, scaled to `total_files`.
fn estimate_mb(files: &[PathBuf], total_files: usize) -> Option<f64> {
    let sizes: Vec<u64> = files
        .iter()
        .take(STORAGE_SAMPLE)
        .filter_map(|f| std::fs::metadata(f).ok())
        .map(|m| m.len())
        .collect();
    if sizes.is_empty() {
        return None;
    }
    let average = sizes.iter().sum::<u64>() as f64 / sizes.len() as f64;
    debug!(sampled = sizes.len(), average, "Storage sample");
    Some(average * total_files as f64 / BYTES_PER_MB)
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Artifacts (expected {} each):", self.expected_total)?;
        for (kind, count) in self.counts.by_kind() {
            writeln!(f, "  {kind:<13} {count}")?;
        }

        writeln!(f, "Template distribution (documents):")?;
        for (id, count) in &self.template_distribution {
            writeln!(f, "  template {id}: {count:4} {}", "#".repeat(count / 5))?;
        }
        if self.unparseable_documents > 0 {
            writeln!(f, "  unparseable: {}", self.unparseable_documents)?;
        }
        if self.outside_pool_documents > 0 {
            writeln!(f, "  outside pool: {}", self.outside_pool_documents)?;
        }
        writeln!(
            f,
            "Integrity: {}",
            if self.integrity.is_clean() { "ok" } else { "broken chains" }
        )?;

        if let Some(sample) = &self.label_sample {
            writeln!(f, "Sample label {}: {} lines", sample.file, sample.lines)?;
            if let Some(line) = &sample.first_line {
                writeln!(f, "  {line}")?;
            }
        }

        writeln!(f, "Templates: {} folders", self.templates.len())?;
        for audit in &self.templates {
            writeln!(
                f,
                "  {} {}: html={} css={} layout={}",
                if audit.is_complete() { "ok" } else { "!!" },
                audit.name,
                audit.has_document,
                audit.has_stylesheet,
                audit.has_layout
            )?;
        }

        if let Some(mb) = self.storage.pdf_mb {
            writeln!(f, "Estimated PDF storage: {mb:.1} MB")?;
        }
        if let Some(mb) = self.storage.image_mb {
            writeln!(f, "Estimated image storage: {mb:.1} MB")?;
        }

        if self.issues.is_empty() {
            write!(f, "All checks passed.")
        } else {
            writeln!(f, "Issues:")?;
            for issue in &self.issues {
                writeln!(f, "  - {issue}")?;
            }
            Ok(())
        }
    }
}

use std::path::PathBuf;

use thiserror::Error;

use crate::identity::{IdentityError, TemplateId};
use crate::pipeline::Stage;
use crate::render::template::TemplateError;

/// Pipeline-level error type.
///
/// The first four kinds are per-record and recoverable: the caller logs them,
/// counts them in the stage tally and moves on to the next record. `Fatal`
/// aborts the whole run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Layout config not found for template {template_id}: {}", path.display())]
    MissingConfig { template_id: TemplateId, path: PathBuf },

    #[error("Unparseable artifact identity: {0}")]
    UnparseableIdentity(String),

    #[error("{program} exited with {status}: {stderr}")]
    ExternalProcess {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("Malformed layout for template {template_id}: {detail}")]
    MalformedLayout { template_id: TemplateId, detail: String },

    #[error("Image has unusable dimensions {width}x{height}")]
    UnusableImage { width: u32, height: u32 },

    #[error("Invalid record {}: {reason}", path.display())]
    InvalidRecord { path: PathBuf, reason: String },

    #[error("Missing label for {}", image.display())]
    MissingLabel { image: PathBuf },

    #[error("Stage {stage} cannot run: {reason}")]
    Fatal { stage: Stage, reason: String },

    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl PipelineError {
    pub fn fatal(stage: Stage, reason: impl Into<String>) -> Self {
        PipelineError::Fatal {
            stage,
            reason: reason.into(),
        }
    }

    /// True for errors that only affect the record being processed.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, PipelineError::Fatal { .. } | PipelineError::Task(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_is_not_recoverable() {
        let err = PipelineError::fatal(Stage::RenderDocuments, "no records");
        assert!(!err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "Stage render-documents cannot run: no records"
        );
    }

    #[test]
    fn test_per_record_errors_are_recoverable() {
        let missing = PipelineError::MissingConfig {
            template_id: TemplateId::FIRST,
            path: PathBuf::from("templates/template_01/layout_config.json"),
        };
        let process = PipelineError::ExternalProcess {
            program: "pdftoppm".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "bad pdf".to_string(),
        };
        assert!(missing.is_recoverable());
        assert!(process.is_recoverable());
        assert!(PipelineError::UnparseableIdentity("x.png".into()).is_recoverable());
    }
}

//! Rasterization boundary — HTML → PDF → PNG through external converters.
//!
//! The `Rasterizer` trait is the seam: the pipeline holds an `Arc<dyn Rasterizer>`
//! and never knows which binaries sit behind it. Each call writes exactly one
//! output file at the path it is given. A non-zero exit, a converter that
//! cannot be started, or a missing output file are all `ExternalProcess` errors
//! for that one record. Any previous output at the target path is removed
//! before the converter starts.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::errors::PipelineError;

#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// Converts a self-contained HTML document into a PDF at `pdf`.
    async fn document_to_pdf(&self, html: &Path, pdf: &Path) -> Result<(), PipelineError>;

    /// Renders the first page of `pdf` into a PNG at `image`.
    async fn pdf_to_image(&self, pdf: &Path, image: &Path) -> Result<(), PipelineError>;
}

/// `wkhtmltopdf` + `pdftoppm`.
pub struct ExternalRasterizer {
    wkhtmltopdf: PathBuf,
    pdftoppm: PathBuf,
    dpi: u32,
}

impl ExternalRasterizer {
    pub fn new(wkhtmltopdf: impl Into<PathBuf>, pdftoppm: impl Into<PathBuf>, dpi: u32) -> Self {
        ExternalRasterizer {
            wkhtmltopdf: wkhtmltopdf.into(),
            pdftoppm: pdftoppm.into(),
            dpi,
        }
    }
}

#[async_trait]
impl Rasterizer for ExternalRasterizer {
    async fn document_to_pdf(&self, html: &Path, pdf: &Path) -> Result<(), PipelineError> {
        let mut cmd = Command::new(&self.wkhtmltopdf);
        cmd.args(["--quiet", "--enable-local-file-access"])
            .arg(html)
            .arg(pdf);
        clear_output(pdf).await?;
        run(cmd, &self.wkhtmltopdf).await?;
        expect_output(pdf, &self.wkhtmltopdf)
    }

    async fn pdf_to_image(&self, pdf: &Path, image: &Path) -> Result<(), PipelineError> {
        // -singlefile writes `<prefix>.png` with no page suffix, keeping the stem intact.
        let prefix = image.with_extension("");
        let mut cmd = Command::new(&self.pdftoppm);
        cmd.args(["-png", "-singlefile", "-r"])
            .arg(self.dpi.to_string())
            .arg(pdf)
            .arg(&prefix);
        clear_output(image).await?;
        run(cmd, &self.pdftoppm).await?;
        expect_output(image, &self.pdftoppm)
    }
}

async fn run(mut cmd: Command, program: &Path) -> Result<(), PipelineError> {
    debug!("Running {:?}", cmd);
    let output = cmd
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| PipelineError::ExternalProcess {
            program: program.display().to_string(),
            status: "failed to start".to_string(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(PipelineError::ExternalProcess {
            program: program.display().to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}

async fn clear_output(path: &Path) -> Result<(), PipelineError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!(path = %path.display(), "Removed previous output");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

fn expect_output(path: &Path, program: &Path) -> Result<(), PipelineError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(PipelineError::ExternalProcess {
            program: program.display().to_string(),
            status: "exit status: 0".to_string(),
            stderr: format!("expected output {} was not produced", path.display()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_external_process_failure() {
        let dir = tempfile::tempdir().unwrap();
        let rasterizer = ExternalRasterizer::new(
            dir.path().join("no-such-wkhtmltopdf"),
            dir.path().join("no-such-pdftoppm"),
            300,
        );
        let err = rasterizer
            .document_to_pdf(&dir.path().join("a.html"), &dir.path().join("a.pdf"))
            .await
            .unwrap_err();
        match err {
            PipelineError::ExternalProcess { status, .. } => assert_eq!(status, "failed to start"),
            other => panic!("expected ExternalProcess, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_reported_with_status() {
        let dir = tempfile::tempdir().unwrap();
        let rasterizer = ExternalRasterizer::new("false", "false", 300);
        let err = rasterizer
            .pdf_to_image(&dir.path().join("a.pdf"), &dir.path().join("a.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::ExternalProcess { .. }));
        assert!(err.is_recoverable());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_success_without_output_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let rasterizer = ExternalRasterizer::new("true", "true", 300);
        let err = rasterizer
            .document_to_pdf(&dir.path().join("a.html"), &dir.path().join("a.pdf"))
            .await
            .unwrap_err();
        match err {
            PipelineError::ExternalProcess { stderr, .. } => {
                assert!(stderr.contains("was not produced"))
            }
            other => panic!("expected ExternalProcess, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stale_output_does_not_count_as_produced() {
        let dir = tempfile::tempdir().unwrap();
        let pdf = dir.path().join("resume_0001_t01.pdf");
        let image = dir.path().join("resume_0001_t01.png");
        std::fs::write(&pdf, b"%PDF from an earlier run").unwrap();
        std::fs::write(&image, b"png from an earlier run").unwrap();

        let rasterizer = ExternalRasterizer::new("true", "true", 300);
        let err = rasterizer
            .document_to_pdf(&dir.path().join("resume_0001_t01.html"), &pdf)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::ExternalProcess { .. }));
        assert!(!pdf.exists());

        let err = rasterizer.pdf_to_image(&pdf, &image).await.unwrap_err();
        assert!(matches!(err, PipelineError::ExternalProcess { .. }));
        assert!(!image.exists());
    }
}

//! Thumbnail generation from converted PDFs.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;
use uuid::Uuid;

/// Errors raised by thumbnail generators.
#[derive(Debug, Error)]
pub enum ThumbnailError {
    /// Renderer could not be started or its output could not be read.
    #[error("Failed to run thumbnail renderer: {0}")]
    Io(#[from] std::io::Error),
    /// Renderer exited unsuccessfully.
    #[error("Thumbnail renderer failed for {}: {stderr}", .pdf.display())]
    RendererFailed {
        /// PDF that was being rendered.
        pdf: PathBuf,
        /// Captured standard error output.
        stderr: String,
    },
}

/// Host helper that renders a preview image from a PDF.
#[async_trait]
pub trait ThumbnailGenerator {
    /// Render a thumbnail of `pdf` into `tempdir`, returning the image path.
    async fn make_thumbnail_from_pdf(
        &self,
        pdf: &Path,
        tempdir: &Path,
        logging_group: Uuid,
    ) -> Result<PathBuf, ThumbnailError>;
}

/// Renders the first page with poppler's `pdftoppm`.
pub struct PdftoppmThumbnailer {
    program: PathBuf,
    width: u32,
}

impl PdftoppmThumbnailer {
    /// Renderer using `pdftoppm` from `PATH` at 500px width.
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("pdftoppm"),
            width: 500,
        }
    }

    /// Use a specific `pdftoppm` binary.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }
}

impl Default for PdftoppmThumbnailer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ThumbnailGenerator for PdftoppmThumbnailer {
    async fn make_thumbnail_from_pdf(
        &self,
        pdf: &Path,
        tempdir: &Path,
        logging_group: Uuid,
    ) -> Result<PathBuf, ThumbnailError> {
        // pdftoppm appends the extension to the prefix.
        let prefix = tempdir.join("convert");
        let width = self.width.to_string();
        tracing::debug!(
            pdf = %pdf.display(),
            %logging_group,
            width = self.width,
            "Rendering thumbnail"
        );

        let output = Command::new(&self.program)
            .arg("-png")
            .arg("-singlefile")
            .args(["-f", "1", "-l", "1"])
            .args(["-scale-to-x", width.as_str(), "-scale-to-y", "-1"])
            .arg(pdf)
            .arg(&prefix)
            .output()
            .await?;

        if !output.status.success() {
            return Err(ThumbnailError::RendererFailed {
                pdf: pdf.to_path_buf(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(prefix.with_extension("png"))
    }
}

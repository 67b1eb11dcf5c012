//! Parser coordinating Tika extraction, Gotenberg conversion and thumbnailing.

use crate::{
    config::Config,
    gotenberg::{GotenbergClient, GotenbergError, PdfFormat},
    logging::LOGGING_NAME,
    parser::{
        thumbnail::{PdftoppmThumbnailer, ThumbnailGenerator},
        types::{
            BestEffort, ConversionArtifact, ExtractionResult, MetadataEntry, ParseError, ParseJob,
            ProcessedDocument,
        },
    },
    tika::{TikaClient, TikaDocument, TikaError},
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::Instrument;

/// Parser contract the host pipeline drives.
///
/// Only [`ParseError`] escapes these operations; metadata extraction never fails.
#[async_trait]
pub trait DocumentParser: Send + Sync {
    /// Extract text and creation date, then convert the document to PDF and record the result in
    /// `job.archive`.
    async fn parse(
        &self,
        job: &mut ParseJob,
        path: &Path,
        mime_type: &str,
        file_name: Option<&str>,
    ) -> Result<ExtractionResult, ParseError>;

    /// Render a thumbnail from the job's archive, converting first when none exists yet.
    async fn get_thumbnail(
        &self,
        job: &mut ParseJob,
        path: &Path,
        mime_type: &str,
        file_name: Option<&str>,
    ) -> Result<PathBuf, ParseError>;

    /// Collect raw metadata; failures yield an empty list.
    async fn extract_metadata(&self, path: &Path, mime_type: &str)
    -> BestEffort<Vec<MetadataEntry>>;

    /// Run the full host pipeline: parse, thumbnail, then metadata.
    async fn process(
        &self,
        job: &mut ParseJob,
        path: &Path,
        mime_type: &str,
        file_name: Option<&str>,
    ) -> Result<ProcessedDocument, ParseError> {
        let mut extraction = self.parse(job, path, mime_type, file_name).await?;
        let thumbnail = self.get_thumbnail(job, path, mime_type, file_name).await?;
        extraction.metadata_entries = self.extract_metadata(path, mime_type).await.into_inner();

        Ok(ProcessedDocument {
            extraction,
            archive: job.archive.clone(),
            thumbnail,
        })
    }
}

/// Parser that sends documents to a Tika server and archives them through Gotenberg.
///
/// Holds no per-document state: everything a job accumulates lives in the [`ParseJob`] the
/// caller passes in, so one parser can serve many jobs.
pub struct TikaDocumentParser {
    config: Config,
    thumbnailer: Box<dyn ThumbnailGenerator + Send + Sync>,
}

impl TikaDocumentParser {
    /// Parser rendering thumbnails with `pdftoppm`.
    pub fn new(config: Config) -> Self {
        Self::with_thumbnailer(config, Box::new(PdftoppmThumbnailer::new()))
    }

    /// Parser using a host-supplied thumbnail helper.
    pub fn with_thumbnailer(
        config: Config,
        thumbnailer: Box<dyn ThumbnailGenerator + Send + Sync>,
    ) -> Self {
        Self {
            config,
            thumbnailer,
        }
    }

    /// Convert a document to PDF at the job's archive location.
    ///
    /// Nothing is left at the destination when the upload or the write fails.
    pub async fn convert_to_pdf(
        &self,
        job: &ParseJob,
        path: &Path,
        mime_type: &str,
    ) -> Result<ConversionArtifact, ParseError> {
        let pdf_path = job.archive_target();
        let endpoint = &self.config.gotenberg_endpoint;
        let pdf_format = PdfFormat::for_output_type(self.config.ocr_output_type);
        tracing::info!(
            target: LOGGING_NAME,
            path = %path.display(),
            pdf = %pdf_path.display(),
            pdf_format = ?pdf_format,
            "Converting {} to PDF as {}",
            path.display(),
            pdf_path.display()
        );

        let conversion_error = |source: GotenbergError| ParseError::Conversion {
            path: path.to_path_buf(),
            endpoint: endpoint.clone(),
            source,
        };
        let client = GotenbergClient::new(endpoint).map_err(conversion_error)?;
        let pdf = client
            .convert_with_libreoffice(path, mime_type, pdf_format)
            .await
            .map_err(conversion_error)?;

        if let Err(source) = tokio::fs::write(&pdf_path, &pdf).await {
            tracing::error!(
                target: LOGGING_NAME,
                pdf = %pdf_path.display(),
                error = %source,
                "Failed to write converted PDF"
            );
            let _ = tokio::fs::remove_file(&pdf_path).await;
            return Err(ParseError::WriteArchive {
                path: pdf_path,
                source,
            });
        }

        Ok(ConversionArtifact {
            source_path: path.to_path_buf(),
            pdf_path,
            mime_type: mime_type.to_string(),
        })
    }

    async fn fetch_documents(
        &self,
        path: &Path,
        mime_type: &str,
        file_name: Option<&str>,
    ) -> Result<Vec<TikaDocument>, TikaError> {
        let client = TikaClient::new(&self.config.tika_endpoint)?;
        client.rmeta_text_from_file(path, mime_type, file_name).await
    }

    async fn fetch_metadata(
        &self,
        path: &Path,
        mime_type: &str,
    ) -> Result<Vec<MetadataEntry>, TikaError> {
        let client = TikaClient::new(&self.config.tika_endpoint)?;
        let metadata = client.metadata_from_file(path, mime_type).await?;
        Ok(metadata
            .entries()
            .map(|(key, value)| MetadataEntry::unqualified(key, value))
            .collect())
    }
}

fn job_span(operation: &'static str, job: &ParseJob) -> tracing::Span {
    tracing::info_span!(
        target: LOGGING_NAME,
        "job",
        operation,
        logging_group = %job.logging_group
    )
}

#[async_trait]
impl DocumentParser for TikaDocumentParser {
    async fn parse(
        &self,
        job: &mut ParseJob,
        path: &Path,
        mime_type: &str,
        file_name: Option<&str>,
    ) -> Result<ExtractionResult, ParseError> {
        let span = job_span("parse", job);
        async move {
            tracing::info!(
                target: LOGGING_NAME,
                path = %path.display(),
                mime_type,
                "Sending {} to Tika server",
                path.display()
            );

            let documents = self
                .fetch_documents(path, mime_type, file_name)
                .await
                .map_err(|source| ParseError::Extraction {
                    path: path.to_path_buf(),
                    endpoint: self.config.tika_endpoint.clone(),
                    source,
                })?;

            let mut result = ExtractionResult::default();
            let mut documents = documents.into_iter();
            match documents.next() {
                None => {
                    tracing::warn!(
                        target: LOGGING_NAME,
                        path = %path.display(),
                        "Tika returned no parsed documents"
                    );
                }
                Some(document) => {
                    let discarded = documents.count();
                    if discarded > 0 {
                        tracing::warn!(
                            target: LOGGING_NAME,
                            path = %path.display(),
                            discarded,
                            "Tika returned multiple embedded documents, using the first"
                        );
                    }
                    result.text = Some(document.text());
                    result.created_date = document.created();
                }
            }

            if result.created_date.is_none() {
                tracing::warn!(
                    target: LOGGING_NAME,
                    path = %path.display(),
                    "Unable to extract date for document {}",
                    path.display()
                );
            }

            let archive = self.convert_to_pdf(job, path, mime_type).await?;
            job.archive = Some(archive);
            Ok::<_, ParseError>(result)
        }
        .instrument(span)
        .await
    }

    async fn get_thumbnail(
        &self,
        job: &mut ParseJob,
        path: &Path,
        mime_type: &str,
        _file_name: Option<&str>,
    ) -> Result<PathBuf, ParseError> {
        let span = job_span("get_thumbnail", job);
        async move {
            let pdf = match job.archive_path().map(Path::to_path_buf) {
                Some(pdf) => pdf,
                None => {
                    let artifact = self.convert_to_pdf(job, path, mime_type).await?;
                    let pdf = artifact.pdf_path.clone();
                    job.archive = Some(artifact);
                    pdf
                }
            };

            let thumbnail = self
                .thumbnailer
                .make_thumbnail_from_pdf(&pdf, &job.tempdir, job.logging_group)
                .await?;
            tracing::debug!(
                target: LOGGING_NAME,
                thumbnail = %thumbnail.display(),
                "Thumbnail ready"
            );
            Ok::<_, ParseError>(thumbnail)
        }
        .instrument(span)
        .await
    }

    async fn extract_metadata(
        &self,
        path: &Path,
        mime_type: &str,
    ) -> BestEffort<Vec<MetadataEntry>> {
        match self.fetch_metadata(path, mime_type).await {
            Ok(entries) => {
                tracing::debug!(
                    target: LOGGING_NAME,
                    path = %path.display(),
                    entries = entries.len(),
                    "Fetched document metadata"
                );
                BestEffort::complete(entries)
            }
            Err(error) => {
                tracing::warn!(
                    target: LOGGING_NAME,
                    path = %path.display(),
                    error = %error,
                    "Error while fetching document metadata for {}: {error}",
                    path.display()
                );
                BestEffort::degraded(Vec::new(), error.to_string())
            }
        }
    }
}

//! Core data types and error definitions for the parser.

use crate::{gotenberg::GotenbergError, parser::thumbnail::ThumbnailError, tika::TikaError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// File name of the converted PDF inside a job's scratch directory.
pub const ARCHIVE_FILE_NAME: &str = "convert.pdf";

/// The one error kind the host sees: the document could not be processed.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Tika could not extract text from the document.
    #[error("Could not parse {} with tika server at {endpoint}: {source}", .path.display())]
    Extraction {
        /// Document being parsed.
        path: PathBuf,
        /// Tika endpoint that was consulted.
        endpoint: String,
        /// Underlying client failure.
        #[source]
        source: TikaError,
    },
    /// Gotenberg could not convert the document to PDF.
    #[error(
        "Error while converting {} to PDF with gotenberg server at {endpoint}: {source}",
        .path.display()
    )]
    Conversion {
        /// Document being converted.
        path: PathBuf,
        /// Gotenberg endpoint that was consulted.
        endpoint: String,
        /// Underlying client failure.
        #[source]
        source: GotenbergError,
    },
    /// Converted PDF could not be written to the scratch directory.
    #[error("Failed to write converted PDF to {}: {source}", .path.display())]
    WriteArchive {
        /// Destination of the converted PDF.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },
    /// Thumbnail helper failed.
    #[error(transparent)]
    Thumbnail(#[from] ThumbnailError),
}

/// Result of an operation whose failures are logged and degraded instead of raised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BestEffort<T> {
    value: T,
    failure: Option<String>,
}

impl<T> BestEffort<T> {
    /// Operation completed normally.
    pub fn complete(value: T) -> Self {
        Self {
            value,
            failure: None,
        }
    }

    /// Operation failed; `value` is the fallback payload.
    pub fn degraded(value: T, failure: impl Into<String>) -> Self {
        Self {
            value,
            failure: Some(failure.into()),
        }
    }

    /// Payload, whether or not the operation succeeded.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Description of the swallowed failure, if any.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Whether the payload is a fallback.
    pub fn is_degraded(&self) -> bool {
        self.failure.is_some()
    }

    /// Discard the failure description and keep the payload.
    pub fn into_inner(self) -> T {
        self.value
    }
}

/// One metadata record handed to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataEntry {
    /// XML namespace of the key; always empty for Tika metadata.
    pub namespace: String,
    /// Namespace prefix of the key; always empty for Tika metadata.
    pub prefix: String,
    /// Metadata key as reported by Tika.
    pub key: String,
    /// Value rendered as text.
    pub value: String,
}

impl MetadataEntry {
    /// Entry without namespace information.
    pub fn unqualified(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            namespace: String::new(),
            prefix: String::new(),
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Text, date and metadata extracted from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    /// Body text; `None` when Tika returned no documents.
    pub text: Option<String>,
    /// Creation timestamp reported by Tika.
    #[serde(serialize_with = "time::serde::rfc3339::option::serialize")]
    pub created_date: Option<OffsetDateTime>,
    /// Metadata records; empty when extraction failed.
    pub metadata_entries: Vec<MetadataEntry>,
}

/// A PDF rendition of a source document written to scratch storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionArtifact {
    /// Document that was converted.
    pub source_path: PathBuf,
    /// Location of the written PDF.
    pub pdf_path: PathBuf,
    /// MIME type declared for the source during conversion.
    pub mime_type: String,
}

/// Per-document state owned by the host for the duration of one job.
///
/// The host owns `tempdir` and removes it once the job is done; artifacts written there are never
/// deleted by the parser.
#[derive(Debug, Clone)]
pub struct ParseJob {
    /// Scratch directory for this job.
    pub tempdir: PathBuf,
    /// Identifier attached to every log line of the job.
    pub logging_group: Uuid,
    /// Converted PDF, once one exists. Set by `parse` or `get_thumbnail`.
    pub archive: Option<ConversionArtifact>,
}

impl ParseJob {
    /// Start a job rooted at `tempdir` with a fresh logging group.
    pub fn new(tempdir: impl Into<PathBuf>) -> Self {
        Self::with_logging_group(tempdir, Uuid::new_v4())
    }

    /// Start a job with a logging group supplied by the host.
    pub fn with_logging_group(tempdir: impl Into<PathBuf>, logging_group: Uuid) -> Self {
        Self {
            tempdir: tempdir.into(),
            logging_group,
            archive: None,
        }
    }

    /// Destination of the converted PDF for this job.
    pub fn archive_target(&self) -> PathBuf {
        self.tempdir.join(ARCHIVE_FILE_NAME)
    }

    /// Path of the converted PDF, if conversion has happened.
    pub fn archive_path(&self) -> Option<&Path> {
        self.archive.as_ref().map(|artifact| artifact.pdf_path.as_path())
    }
}

/// Everything the host pipeline collects for a document.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedDocument {
    /// Text, date and metadata.
    pub extraction: ExtractionResult,
    /// Converted PDF.
    pub archive: Option<ConversionArtifact>,
    /// Thumbnail image produced from the archive.
    pub thumbnail: PathBuf,
}

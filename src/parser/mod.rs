//! Document parser: Tika extraction, Gotenberg archiving and thumbnails.

mod service;
pub mod thumbnail;
pub mod types;

pub use service::{DocumentParser, TikaDocumentParser};
pub use thumbnail::{PdftoppmThumbnailer, ThumbnailError, ThumbnailGenerator};
pub use types::{
    ARCHIVE_FILE_NAME, BestEffort, ConversionArtifact, ExtractionResult, MetadataEntry,
    ParseError, ParseJob, ProcessedDocument,
};

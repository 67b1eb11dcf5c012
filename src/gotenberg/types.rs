//! Request options and errors for the Gotenberg client.

use crate::config::OcrOutputType;
use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned while interacting with Gotenberg.
#[derive(Debug, Error)]
pub enum GotenbergError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid Gotenberg URL: {0}")]
    InvalidUrl(String),
    /// Source document could not be read from disk.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        /// Document we attempted to upload.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Gotenberg responded with an unexpected status code.
    #[error("Unexpected Gotenberg response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from Gotenberg.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
}

/// PDF/A conformance levels accepted by the LibreOffice route's `pdfFormat` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PdfFormat {
    /// `PDF/A-1a`
    PdfA1a,
    /// `PDF/A-2b`
    PdfA2b,
    /// `PDF/A-3b`
    PdfA3b,
}

impl PdfFormat {
    /// Format requested for an OCR output type; `None` means no `pdfFormat` field is sent.
    pub fn for_output_type(output_type: OcrOutputType) -> Option<Self> {
        match output_type {
            OcrOutputType::PdfA | OcrOutputType::PdfA2 => Some(Self::PdfA2b),
            OcrOutputType::PdfA1 => Some(Self::PdfA1a),
            OcrOutputType::PdfA3 => Some(Self::PdfA3b),
            OcrOutputType::Pdf => None,
        }
    }

    /// Wire value of the `pdfFormat` form field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PdfA1a => "PDF/A-1a",
            Self::PdfA2b => "PDF/A-2b",
            Self::PdfA3b => "PDF/A-3b",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_types_map_to_pdf_formats() {
        let cases = [
            (OcrOutputType::PdfA, Some("PDF/A-2b")),
            (OcrOutputType::PdfA2, Some("PDF/A-2b")),
            (OcrOutputType::PdfA1, Some("PDF/A-1a")),
            (OcrOutputType::PdfA3, Some("PDF/A-3b")),
            (OcrOutputType::Pdf, None),
        ];
        for (output_type, expected) in cases {
            assert_eq!(
                PdfFormat::for_output_type(output_type).map(PdfFormat::as_str),
                expected,
                "{output_type:?}"
            );
        }
    }
}

use std::env;
use thiserror::Error;

/// Default base URL of the Tika server.
pub const DEFAULT_TIKA_ENDPOINT: &str = "http://localhost:9998";
/// Default base URL of the Gotenberg server.
pub const DEFAULT_GOTENBERG_ENDPOINT: &str = "http://localhost:3000";

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the parser.
///
/// Built once by the host and handed to [`crate::parser::TikaDocumentParser::new`]; nothing in
/// the crate reads it from a global.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Tika server used for text and metadata extraction.
    pub tika_endpoint: String,
    /// Base URL of the Gotenberg server used for PDF conversion.
    pub gotenberg_endpoint: String,
    /// Requested flavour of the archived PDF.
    pub ocr_output_type: OcrOutputType,
}

/// Output flavour requested for archived PDFs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OcrOutputType {
    /// Plain PDF, no conformance level requested.
    #[default]
    Pdf,
    /// PDF/A at the default conformance level (same as `pdfa-2`).
    PdfA,
    /// PDF/A-1.
    PdfA1,
    /// PDF/A-2.
    PdfA2,
    /// PDF/A-3.
    PdfA3,
}

impl Config {
    /// Configuration pointing at explicit endpoints with the default output type.
    pub fn new(tika_endpoint: impl Into<String>, gotenberg_endpoint: impl Into<String>) -> Self {
        Self {
            tika_endpoint: tika_endpoint.into(),
            gotenberg_endpoint: gotenberg_endpoint.into(),
            ocr_output_type: OcrOutputType::default(),
        }
    }

    /// Replace the OCR output type.
    pub fn with_ocr_output_type(mut self, ocr_output_type: OcrOutputType) -> Self {
        self.ocr_output_type = ocr_output_type;
        self
    }

    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            tika_endpoint: load_url("DOCRELAY_TIKA_ENDPOINT", DEFAULT_TIKA_ENDPOINT)?,
            gotenberg_endpoint: load_url("DOCRELAY_GOTENBERG_ENDPOINT", DEFAULT_GOTENBERG_ENDPOINT)?,
            ocr_output_type: load_env_optional("DOCRELAY_OCR_OUTPUT_TYPE")
                .map(|value| {
                    value.parse().map_err(|()| {
                        ConfigError::InvalidValue("DOCRELAY_OCR_OUTPUT_TYPE".to_string())
                    })
                })
                .transpose()?
                .unwrap_or_default(),
        })
    }

    /// Load a `.env` file when present, then read the environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config = Self::from_env()?;
        tracing::debug!(
            tika_endpoint = %config.tika_endpoint,
            gotenberg_endpoint = %config.gotenberg_endpoint,
            ocr_output_type = ?config.ocr_output_type,
            "Loaded configuration"
        );
        Ok(config)
    }
}

fn load_url(key: &str, default: &str) -> Result<String, ConfigError> {
    let value = load_env_optional(key).unwrap_or_else(|| default.to_string());
    reqwest::Url::parse(&value).map_err(|_| ConfigError::InvalidValue(key.to_string()))?;
    Ok(value.trim_end_matches('/').to_string())
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

impl std::str::FromStr for OcrOutputType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pdf" | "default" => Ok(Self::Pdf),
            "pdfa" => Ok(Self::PdfA),
            "pdfa-1" => Ok(Self::PdfA1),
            "pdfa-2" => Ok(Self::PdfA2),
            "pdfa-3" => Ok(Self::PdfA3),
            _ => Err(()),
        }
    }
}

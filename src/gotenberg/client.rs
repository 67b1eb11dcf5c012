//! HTTP client wrapper for interacting with Gotenberg.

use crate::gotenberg::types::{GotenbergError, PdfFormat};
use crate::http::{build_client, format_endpoint, normalize_base_url};
use reqwest::{
    Client,
    multipart::{Form, Part},
};
use std::path::Path;

/// Route of the LibreOffice conversion module.
pub const LIBREOFFICE_CONVERT_ROUTE: &str = "forms/libreoffice/convert";

/// Name of the multipart field carrying the source document.
pub const UPLOAD_FIELD: &str = "upload-file";

/// Lightweight HTTP client for the Gotenberg server.
pub struct GotenbergClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
}

impl GotenbergClient {
    /// Construct a client for the Gotenberg server at `endpoint`.
    pub fn new(endpoint: &str) -> Result<Self, GotenbergError> {
        let base_url = normalize_base_url(endpoint).map_err(GotenbergError::InvalidUrl)?;
        let client = build_client()?;
        tracing::debug!(url = %base_url, "Initialized Gotenberg HTTP client");
        Ok(Self { client, base_url })
    }

    /// Convert a document to PDF through LibreOffice, returning the PDF bytes.
    pub async fn convert_with_libreoffice(
        &self,
        path: &Path,
        mime_type: &str,
        pdf_format: Option<PdfFormat>,
    ) -> Result<Vec<u8>, GotenbergError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| GotenbergError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());

        let part = Part::bytes(bytes).file_name(file_name).mime_str(mime_type)?;
        let mut form = Form::new().part(UPLOAD_FIELD, part);
        for (name, value) in conversion_fields(pdf_format) {
            form = form.text(name, value);
        }

        let response = self
            .client
            .post(format_endpoint(&self.base_url, LIBREOFFICE_CONVERT_ROUTE))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = GotenbergError::UnexpectedStatus { status, body };
            tracing::error!(path = %path.display(), error = %error, "Gotenberg conversion failed");
            return Err(error);
        }

        let pdf = response.bytes().await?;
        tracing::debug!(path = %path.display(), size = pdf.len(), "Gotenberg conversion finished");
        Ok(pdf.to_vec())
    }
}

/// Text fields sent next to the uploaded file.
pub(crate) fn conversion_fields(pdf_format: Option<PdfFormat>) -> Vec<(&'static str, String)> {
    pdf_format
        .map(|format| ("pdfFormat", format.as_str().to_string()))
        .into_iter()
        .collect()
}

//! HTTP client wrapper for interacting with Tika.

use crate::http::{attachment_disposition, build_client, format_endpoint, normalize_base_url};
use crate::tika::types::{TikaDocument, TikaError, TikaMetadata};
use reqwest::{
    Client, Method, Response,
    header::{ACCEPT, CONTENT_DISPOSITION, CONTENT_TYPE},
};
use std::path::Path;

/// Lightweight HTTP client for the Tika server.
///
/// Built per operation; dropping it releases the connection.
pub struct TikaClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
}

impl TikaClient {
    /// Construct a client for the Tika server at `endpoint`.
    pub fn new(endpoint: &str) -> Result<Self, TikaError> {
        let base_url = normalize_base_url(endpoint).map_err(TikaError::InvalidUrl)?;
        let client = build_client()?;
        tracing::debug!(url = %base_url, "Initialized Tika HTTP client");
        Ok(Self { client, base_url })
    }

    /// Fetch the flat metadata of a file via `PUT /meta`.
    pub async fn metadata_from_file(
        &self,
        path: &Path,
        mime_type: &str,
    ) -> Result<TikaMetadata, TikaError> {
        let response = self.put_file("meta", path, mime_type, None).await?;
        let body = Self::success_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Recursively extract text and metadata via `PUT /rmeta/text`.
    ///
    /// Container formats yield one entry per embedded document, the container itself first.
    pub async fn rmeta_text_from_file(
        &self,
        path: &Path,
        mime_type: &str,
        file_name: Option<&str>,
    ) -> Result<Vec<TikaDocument>, TikaError> {
        let response = self
            .put_file("rmeta/text", path, mime_type, file_name)
            .await?;
        let body = Self::success_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn put_file(
        &self,
        route: &str,
        path: &Path,
        mime_type: &str,
        file_name: Option<&str>,
    ) -> Result<Response, TikaError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| TikaError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let mut request = self
            .client
            .request(Method::PUT, format_endpoint(&self.base_url, route))
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, mime_type);
        if let Some(disposition) = file_name.and_then(attachment_disposition) {
            request = request.header(CONTENT_DISPOSITION, disposition);
        }

        tracing::debug!(
            route,
            path = %path.display(),
            mime_type,
            size = bytes.len(),
            "Uploading document to Tika"
        );
        Ok(request.body(bytes).send().await?)
    }

    async fn success_body(response: Response) -> Result<String, TikaError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.text().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(TikaError::UnexpectedStatus { status, body })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::PUT, MockServer};
    use serde_json::json;
    use std::io::Write;

    fn sample_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write sample");
        file
    }

    #[tokio::test]
    async fn rmeta_text_emits_expected_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/rmeta/text")
                    .header("accept", "application/json")
                    .header("content-type", "application/msword")
                    .header("content-disposition", "attachment; filename=\"memo.doc\"")
                    .body("memo body");
                then.status(200).json_body(json!([
                    { "X-TIKA:content": " memo ", "dcterms:created": "2022-02-02T02:02:02Z" },
                    { "X-TIKA:content": "attachment" }
                ]));
            })
            .await;

        let file = sample_file("memo body");
        let client = TikaClient::new(&server.base_url()).expect("client");
        let documents = client
            .rmeta_text_from_file(file.path(), "application/msword", Some("memo.doc"))
            .await
            .expect("rmeta request");

        mock.assert();
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].text(), "memo");
        assert!(documents[0].created().is_some());
        assert_eq!(documents[1].text(), "attachment");
    }

    #[tokio::test]
    async fn metadata_rejects_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/meta");
                then.status(422).body("Unprocessable");
            })
            .await;

        let file = sample_file("broken");
        let client = TikaClient::new(&server.base_url()).expect("client");
        let error = client
            .metadata_from_file(file.path(), "application/pdf")
            .await
            .expect_err("status should fail");

        match error {
            TikaError::UnexpectedStatus { status, body } => {
                assert_eq!(status.as_u16(), 422);
                assert_eq!(body, "Unprocessable");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn malformed_json_is_a_decode_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/meta");
                then.status(200).body("<html>not json</html>");
            })
            .await;

        let file = sample_file("doc");
        let client = TikaClient::new(&server.base_url()).expect("client");
        let error = client
            .metadata_from_file(file.path(), "text/plain")
            .await
            .expect_err("decode should fail");

        assert!(matches!(error, TikaError::Decode(_)));
    }

    #[tokio::test]
    async fn missing_file_is_reported_before_any_request() {
        let client = TikaClient::new("http://127.0.0.1:9").expect("client");
        let error = client
            .metadata_from_file(Path::new("/nonexistent/docrelay.pdf"), "application/pdf")
            .await
            .expect_err("read should fail");

        assert!(matches!(error, TikaError::Io { .. }));
    }
}

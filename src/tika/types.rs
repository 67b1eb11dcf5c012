//! Response types and errors for the Tika client.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::PathBuf;
use thiserror::Error;
use time::{
    Date, OffsetDateTime, PrimitiveDateTime,
    format_description::well_known::{Iso8601, Rfc3339},
};

/// Key under which `/rmeta/text` places the extracted body text.
pub const CONTENT_KEY: &str = "X-TIKA:content";

/// Metadata keys consulted, in order, for a document's creation timestamp.
const CREATED_KEYS: [&str; 3] = ["dcterms:created", "meta:creation-date", "Creation-Date"];

/// Errors returned while interacting with Tika.
#[derive(Debug, Error)]
pub enum TikaError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid Tika URL: {0}")]
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
    /// Tika responded with an unexpected status code.
    #[error("Unexpected Tika response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from Tika.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// Response body was not the JSON shape Tika documents.
    #[error("Malformed Tika response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Flat metadata map returned by `/meta`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct TikaMetadata {
    /// Raw key/value pairs in the order Tika produced them.
    pub data: Map<String, Value>,
}

impl TikaMetadata {
    /// Iterate over the metadata with every value rendered as a string.
    pub fn entries(&self) -> impl Iterator<Item = (&str, String)> + '_ {
        self.data
            .iter()
            .map(|(key, value)| (key.as_str(), stringify_value(value)))
    }
}

/// One (sub-)document from a recursive `/rmeta/text` extraction.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct TikaDocument {
    /// Extracted body text, when Tika produced any.
    pub content: Option<String>,
    /// Remaining metadata reported for the document.
    pub metadata: Map<String, Value>,
}

impl From<Map<String, Value>> for TikaDocument {
    fn from(mut metadata: Map<String, Value>) -> Self {
        let content = metadata.remove(CONTENT_KEY).and_then(|value| match value {
            Value::String(text) => Some(text),
            Value::Null => None,
            other => Some(stringify_value(&other)),
        });
        Self { content, metadata }
    }
}

impl TikaDocument {
    /// Body text with surrounding whitespace removed; empty when Tika sent none.
    pub fn text(&self) -> String {
        self.content
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string()
    }

    /// Creation timestamp, if one is present and parseable.
    pub fn created(&self) -> Option<OffsetDateTime> {
        CREATED_KEYS
            .iter()
            .filter_map(|key| self.metadata.get(*key))
            .filter_map(first_string)
            .find_map(parse_timestamp)
    }
}

/// Parse a Tika timestamp; values without an offset are taken as UTC and bare dates as
/// midnight UTC.
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    OffsetDateTime::parse(raw, &Rfc3339)
        .ok()
        .or_else(|| {
            PrimitiveDateTime::parse(raw, &Iso8601::DEFAULT)
                .ok()
                .map(PrimitiveDateTime::assume_utc)
        })
        .or_else(|| {
            Date::parse(raw, &Iso8601::DEFAULT)
                .ok()
                .map(|date| date.midnight().assume_utc())
        })
}

fn first_string(value: &Value) -> Option<&str> {
    match value {
        Value::String(text) => Some(text),
        Value::Array(items) => items.iter().find_map(Value::as_str),
        _ => None,
    }
}

fn stringify_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items
            .iter()
            .map(stringify_value)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn document_splits_content_from_metadata() {
        let document: TikaDocument = serde_json::from_value(json!({
            "X-TIKA:content": "\n\n  Invoice 42 \n",
            "dcterms:created": "2023-04-01T09:30:00Z",
            "Content-Type": "application/pdf"
        }))
        .expect("document");

        assert_eq!(document.text(), "Invoice 42");
        assert!(!document.metadata.contains_key(CONTENT_KEY));
        assert_eq!(document.created(), Some(datetime!(2023-04-01 09:30:00 UTC)));
    }

    #[test]
    fn created_falls_back_to_legacy_keys_and_naive_times() {
        let document: TikaDocument = serde_json::from_value(json!({
            "meta:creation-date": ["2021-12-24T18:00:00"]
        }))
        .expect("document");

        assert_eq!(document.content, None);
        assert_eq!(document.text(), "");
        assert_eq!(document.created(), Some(datetime!(2021-12-24 18:00:00 UTC)));
    }

    #[test]
    fn unparseable_created_is_absent() {
        let document: TikaDocument = serde_json::from_value(json!({
            "X-TIKA:content": "body",
            "dcterms:created": "last tuesday"
        }))
        .expect("document");

        assert_eq!(document.created(), None);
    }

    #[test]
    fn bare_dates_are_midnight_utc() {
        assert_eq!(
            parse_timestamp("2021-12-24"),
            Some(datetime!(2021-12-24 00:00:00 UTC))
        );

        let document: TikaDocument = serde_json::from_value(json!({
            "dcterms:created": "2019-07-04"
        }))
        .expect("document");
        assert_eq!(document.created(), Some(datetime!(2019-07-04 00:00:00 UTC)));
    }

    #[test]
    fn offsets_are_preserved() {
        let parsed = parse_timestamp("2020-06-15T08:00:00+02:00").expect("timestamp");
        assert_eq!(parsed, datetime!(2020-06-15 06:00:00 UTC));
    }

    #[test]
    fn metadata_values_are_stringified_in_order() {
        let metadata: TikaMetadata = serde_json::from_value(json!({
            "pdf:PDFVersion": "1.7",
            "dc:creator": ["Ada", "Grace"],
            "xmpTPg:NPages": 3
        }))
        .expect("metadata");

        let entries: Vec<_> = metadata.entries().collect();
        assert_eq!(
            entries,
            vec![
                ("pdf:PDFVersion", "1.7".to_string()),
                ("dc:creator", "Ada, Grace".to_string()),
                ("xmpTPg:NPages", "3".to_string()),
            ]
        );
    }
}

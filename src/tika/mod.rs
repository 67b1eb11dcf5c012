//! Tika server integration.

pub mod client;
pub mod types;

pub use client::TikaClient;
pub use types::{TikaDocument, TikaError, TikaMetadata};

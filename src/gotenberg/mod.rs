//! Gotenberg server integration.

pub mod client;
pub mod types;

pub use client::GotenbergClient;
pub use types::{GotenbergError, PdfFormat};

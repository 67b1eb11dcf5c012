#![deny(missing_docs)]

//! Document parser that relays text extraction to Tika and PDF conversion to Gotenberg.

/// Environment-driven configuration management.
pub mod config;
/// Gotenberg conversion server integration.
pub mod gotenberg;
mod http;
/// Structured logging and tracing setup.
pub mod logging;
/// Parser contract and its Tika/Gotenberg implementation.
pub mod parser;
/// Tika content-analysis server integration.
pub mod tika;

//! Structured logging for the CLI and library diagnostics.

mod format;

pub use format::StructuredLogger;

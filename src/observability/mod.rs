//! Observability for the publish step
//!
//! Structured logging through `tracing`, with one span per run.

pub mod logging;

pub use logging::{init_default_logging, init_logging, LogFormat};

// Span macros for structured logging
pub use logging::publish_span;

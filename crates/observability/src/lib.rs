//! Tracing and logging setup shared by binaries and tests.

/// Initialize process-wide tracing/logging from an explicit configuration.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init(config: &LoggingConfig) {
    tracing::init(config);
}

/// Tracing configuration (filters, formats).
pub mod tracing;

pub use crate::tracing::{LogFormat, LoggingConfig};

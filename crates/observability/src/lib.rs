//! Tracing and logging (shared setup).

/// Initialize process-wide logging in the given format.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init(format: LogFormat) {
    tracing::init(format);
}

/// Subscriber configuration (filter, output format).
pub mod tracing;

pub use self::tracing::{LogFormat, UnknownLogFormat};

//! Diagnostic sink for failures that end in a 500.

use crate::translator::Payload;

/// Event tag of the record emitted for every failure resolving to status 500.
pub const UNCAUGHT_ERROR: &str = "uncaught error";

/// One diagnostic record, emitted exactly once per request that ends in a 500.
#[derive(Debug)]
pub struct UncaughtError<'a> {
    /// Always [`UNCAUGHT_ERROR`].
    pub event: &'static str,
    /// Full report of the original (outermost) failure, including its chain.
    pub error: String,
    /// Correlation identifier also embedded in the client response.
    pub correlation_id: &'a str,
    /// Token of the structured error the failure resolved to, if any.
    pub token: Option<&'a str>,
    /// Body as computed before redaction.
    pub body: &'a Payload,
}

/// Structured logging sink the translator writes to. Fire-and-forget.
pub trait ErrorSink: Send + Sync {
    fn log_error(&self, record: &UncaughtError<'_>);
}

/// Default sink: a `tracing` error event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ErrorSink for TracingSink {
    fn log_error(&self, record: &UncaughtError<'_>) {
        tracing::error!(
            err = %record.error,
            id = %record.correlation_id,
            code = record.token.unwrap_or_default(),
            msg = %record.body,
            "uncaught error"
        );
    }
}

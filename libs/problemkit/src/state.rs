//! Per-request translation state.

/// State scoped to a single request, carried in its extensions.
///
/// Never shared across requests: each request gets its own value and it is
/// dropped together with the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestState {
    /// Correlation identifier linking the client response to the log record.
    pub correlation_id: Option<String>,
    /// Token of the structured error the last failure resolved to, if any.
    pub resolved_token: Option<String>,
}

impl RequestState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an identifier assigned upstream (e.g. an incoming request-id header).
    #[must_use]
    pub fn with_correlation_id(id: impl Into<String>) -> Self {
        Self {
            correlation_id: Some(id.into()),
            resolved_token: None,
        }
    }

    /// Return the correlation identifier, creating it with `make` if the request has none yet.
    pub fn correlation_id_or_insert_with(&mut self, make: impl FnOnce() -> String) -> &str {
        self.correlation_id.get_or_insert_with(make)
    }
}

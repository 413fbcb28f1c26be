//! Structured service errors: errors that know their own HTTP status and body.

use std::borrow::Cow;
use std::error::Error as StdError;

use http::StatusCode;

use crate::problem::{ProblemDetails, reason_phrase};

/// Boxed error usable as the source of a [`ServiceError`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Capability of an error to describe itself as an HTTP problem.
///
/// Errors implementing this trait are surfaced to the client with their own
/// status and body. Everything else is opaque and maps to a generic 500.
///
/// Inside an `anyhow` chain only [`ServiceError`] and [`Failure`](crate::Failure)
/// links are recognized, so wrap other implementations with
/// [`Failure::structured`](crate::Failure::structured) before adding `anyhow` context.
pub trait StructuredError: StdError + Send + Sync + 'static {
    /// HTTP status to respond with.
    fn status(&self) -> StatusCode;

    /// Stable short token identifying the error kind, e.g. `"not_found"`.
    fn token(&self) -> &str;

    /// Body rendered as problem details. Its `status` must equal [`Self::status`].
    fn problem(&self) -> ProblemDetails;
}

/// Stock [`StructuredError`]: a problem body plus a stable token.
#[derive(Debug, thiserror::Error)]
#[error("{}", problem.detail)]
pub struct ServiceError {
    problem: ProblemDetails,
    token: Cow<'static, str>,
    #[source]
    source: Option<BoxError>,
}

impl ServiceError {
    #[must_use]
    pub fn new(token: impl Into<Cow<'static, str>>, problem: ProblemDetails) -> Self {
        Self {
            problem,
            token: token.into(),
            source: None,
        }
    }

    /// Shorthand for a problem whose title is the status reason phrase.
    #[must_use]
    pub fn with_status(
        status: StatusCode,
        token: impl Into<Cow<'static, str>>,
        detail: impl Into<String>,
    ) -> Self {
        Self::new(
            token,
            ProblemDetails::new(status, reason_phrase(status), detail),
        )
    }

    /// Attach the lower-level error that caused this one.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<BoxError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Modify the problem body in place, e.g. to add `meta` members.
    #[must_use]
    pub fn map_problem(mut self, f: impl FnOnce(ProblemDetails) -> ProblemDetails) -> Self {
        let status = self.problem.status;
        self.problem = f(self.problem);
        self.problem.status = status;
        self
    }

    #[must_use]
    pub fn problem_ref(&self) -> &ProblemDetails {
        &self.problem
    }
}

impl StructuredError for ServiceError {
    fn status(&self) -> StatusCode {
        self.problem.status
    }

    fn token(&self) -> &str {
        &self.token
    }

    fn problem(&self) -> ProblemDetails {
        self.problem.clone()
    }
}

#[must_use]
pub fn bad_request(detail: impl Into<String>) -> ServiceError {
    ServiceError::with_status(StatusCode::BAD_REQUEST, "bad_request", detail)
}

#[must_use]
pub fn not_found(detail: impl Into<String>) -> ServiceError {
    ServiceError::with_status(StatusCode::NOT_FOUND, "not_found", detail)
}

#[must_use]
pub fn conflict(detail: impl Into<String>) -> ServiceError {
    ServiceError::with_status(StatusCode::CONFLICT, "conflict", detail)
}

#[must_use]
pub fn internal(detail: impl Into<String>) -> ServiceError {
    ServiceError::with_status(StatusCode::INTERNAL_SERVER_ERROR, "internal", detail)
}

//! Ergonomic result types for API handlers
//!
//! Handlers return [`ApiResult`]; the `?` operator converts `anyhow::Error`,
//! [`ServiceError`] and [`Failure`] into [`ApiError`]. The error is handed to
//! the problem middleware through the response extensions, which performs the
//! actual translation.

use std::sync::Arc;

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use problemkit_errors::{Failure, ProblemDetails, ServiceError, reason_phrase};

/// Standard result type for API operations
///
/// ```ignore
/// async fn handler() -> ApiResult<Json<User>> {
///     let user = fetch_user().await.context("loading user")?;
///     Ok(Json(user))
/// }
/// ```
pub type ApiResult<T = ()> = Result<T, ApiError>;

/// Handler-side error carrying a [`Failure`] to the problem middleware.
#[derive(Debug)]
pub struct ApiError(pub Failure);

impl ApiError {
    /// Wrap the failure with a message describing what was being attempted.
    #[must_use]
    pub fn context(self, context: impl Into<String>) -> Self {
        Self(self.0.context(context))
    }

    #[must_use]
    pub fn into_failure(self) -> Failure {
        self.0
    }
}

impl From<Failure> for ApiError {
    fn from(failure: Failure) -> Self {
        Self(failure)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err.into())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self(err.into())
    }
}

/// Failure stashed in response extensions for the middleware to pick up.
#[derive(Clone)]
pub(crate) struct StashedFailure(pub(crate) Arc<Failure>);

impl IntoResponse for ApiError {
    /// Without the problem middleware installed the client still gets a
    /// generic, non-leaking 500.
    fn into_response(self) -> Response {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let fallback = ProblemDetails::internal(reason_phrase(status));
        let mut response = (status, Json(fallback)).into_response();
        response
            .extensions_mut()
            .insert(StashedFailure(Arc::new(self.0)));
        response
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use problemkit_errors::service;

    #[test]
    fn question_mark_conversions() {
        fn structured() -> ApiResult<()> {
            let lookup: Result<(), ServiceError> = Err(service::not_found("x"));
            lookup?;
            Ok(())
        }
        fn opaque() -> ApiResult<()> {
            let io: anyhow::Result<()> = Err(anyhow::anyhow!("boom"));
            io?;
            Ok(())
        }

        assert!(matches!(structured(), Err(ApiError(Failure::Structured(_)))));
        assert!(matches!(opaque(), Err(ApiError(Failure::Opaque(_)))));
    }

    #[test]
    fn into_response_stashes_failure_and_hides_detail() {
        let response = ApiError::from(anyhow::anyhow!("secret db password")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let stashed = response.extensions().get::<StashedFailure>().unwrap();
        assert_eq!(stashed.0.to_string(), "secret db password");
    }
}

//! axum middleware turning handler failures into problem responses.
//!
//! Place it below request logging/tracing layers so they observe the final
//! translated response. Handlers report failures by returning
//! [`ApiError`](crate::ApiError); responses without a failure pass through
//! untouched.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Request, State};
use axum::middleware::{Next, from_fn_with_state};
use axum::response::Response;
use http::{HeaderMap, HeaderName, HeaderValue};

use crate::config::{ConfigError, TranslatorConfig, parse_header};
use crate::result::StashedFailure;
use crate::sender::{AxumSender, SendError};
use crate::state::RequestState;
use crate::translator::ProblemTranslator;

/// Translator plus the header settings of the middleware.
#[derive(Debug, Clone)]
pub struct ProblemMiddleware {
    translator: ProblemTranslator,
    request_id_header: Option<HeaderName>,
    response_id_header: Option<HeaderName>,
}

impl ProblemMiddleware {
    /// Middleware with no header integration.
    #[must_use]
    pub fn new(translator: ProblemTranslator) -> Self {
        Self {
            translator,
            request_id_header: None,
            response_id_header: None,
        }
    }

    /// Build from configuration with the stock identifier generator and sink.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidHeaderName` for malformed header names.
    pub fn from_config(config: &TranslatorConfig) -> Result<Self, ConfigError> {
        Self::with_translator(ProblemTranslator::from_config(config), config)
    }

    /// Build from configuration around an existing translator.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidHeaderName` for malformed header names.
    pub fn with_translator(
        translator: ProblemTranslator,
        config: &TranslatorConfig,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            translator,
            request_id_header: parse_header(
                "request_id_header",
                config.request_id_header.as_deref(),
            )?,
            response_id_header: parse_header(
                "response_id_header",
                config.response_id_header.as_deref(),
            )?,
        })
    }

    #[must_use]
    pub fn translator(&self) -> &ProblemTranslator {
        &self.translator
    }

    /// Wrap every route of `router` with this middleware.
    #[must_use]
    pub fn install<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.layer(from_fn_with_state(Arc::new(self), problem_middleware))
    }

    fn initial_state(&self, headers: &HeaderMap) -> RequestState {
        self.request_id_header
            .as_ref()
            .and_then(|name| headers.get(name))
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map_or_else(RequestState::new, RequestState::with_correlation_id)
    }
}

/// Middleware function translating stashed failures.
///
/// The per-request [`RequestState`] is taken from the request extensions when
/// an outer layer already put one there, otherwise it is seeded from the
/// configured request-id header.
///
/// # Errors
/// Returns `SendError` when the problem body cannot be encoded.
pub async fn problem_middleware(
    State(mw): State<Arc<ProblemMiddleware>>,
    mut request: Request,
    next: Next,
) -> Result<Response, SendError> {
    let sender = AxumSender::for_request(request.headers());
    let mut state = match request.extensions().get::<RequestState>() {
        Some(existing) => existing.clone(),
        None => mw.initial_state(request.headers()),
    };
    request.extensions_mut().insert(state.clone());

    let mut response = next.run(request).await;
    let stashed = response.extensions_mut().remove::<StashedFailure>();

    let Some(mut translated) = mw
        .translator
        .handle(stashed.as_ref().map(|s| s.0.as_ref()), &mut state, &sender)?
    else {
        return Ok(response);
    };

    if let (Some(header), Some(id)) = (&mw.response_id_header, &state.correlation_id)
        && let Ok(value) = HeaderValue::from_str(id)
    {
        translated.headers_mut().insert(header.clone(), value);
    }
    Ok(translated)
}

//! Failure to problem-response translation.
//!
//! The translator resolves the cause of a failure, classifies it as structured
//! or opaque, and for anything ending in a 500 records the full error under a
//! correlation identifier before (unless verbose) redacting what the client sees.

use std::fmt;
use std::sync::Arc;

use http::StatusCode;
use problemkit_errors::{
    APPLICATION_PROBLEM_JSON, Failure, ProblemDetails, RootCause, TEXT_PLAIN, reason_phrase,
    resolve,
};

use crate::config::TranslatorConfig;
use crate::id::{IdGenerator, NanoIdGenerator};
use crate::sender::ResponseSender;
use crate::sink::{ErrorSink, TracingSink, UNCAUGHT_ERROR, UncaughtError};
use crate::state::RequestState;

/// Response body produced by the translator.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Problem(ProblemDetails),
    /// Raw error text, only produced for opaque failures in verbose mode.
    Text(String),
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Problem(problem) => match serde_json::to_string(problem) {
                Ok(json) => f.write_str(&json),
                Err(_) => f.write_str(&problem.detail),
            },
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Status, body and content type to hand to the response sender.
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    pub status: StatusCode,
    pub body: Payload,
    pub content_type: &'static str,
}

/// Outcome of classification, before the 500 policy is applied.
#[derive(Debug)]
struct Classified {
    status: StatusCode,
    body: Payload,
    content_type: &'static str,
    resolved_token: Option<String>,
}

fn classify(failure: &Failure) -> Classified {
    match resolve(failure) {
        RootCause::Structured(err) => {
            let status = err.status();
            let mut problem = err.problem();
            // the body always mirrors the transport status
            problem.status = status;
            Classified {
                status,
                body: Payload::Problem(problem),
                content_type: APPLICATION_PROBLEM_JSON,
                resolved_token: Some(err.token().to_owned()),
            }
        }
        // the outermost message is shown, wrappers may have added context
        RootCause::Opaque => Classified {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: Payload::Text(failure.to_string()),
            content_type: TEXT_PLAIN,
            resolved_token: None,
        },
    }
}

/// Generic body replacing any 500 when verbosity is off.
fn redacted(correlation_id: &str, resolved_token: Option<String>) -> ProblemDetails {
    let detail = format!(
        "{} [{correlation_id}]",
        reason_phrase(StatusCode::INTERNAL_SERVER_ERROR)
    );
    let trace_id = resolved_token.unwrap_or_else(|| correlation_id.to_owned());
    ProblemDetails::internal(detail).with_trace_id(trace_id)
}

/// Converts failures into problem responses.
///
/// Immutable after construction and meant to be shared behind an `Arc`;
/// everything request-specific lives in [`RequestState`].
#[derive(Clone)]
pub struct ProblemTranslator {
    verbose: bool,
    ids: Arc<dyn IdGenerator>,
    sink: Arc<dyn ErrorSink>,
}

impl fmt::Debug for ProblemTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProblemTranslator")
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

impl ProblemTranslator {
    /// Translator with `nanoid` identifiers and the `tracing` sink.
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            ids: Arc::new(NanoIdGenerator::default()),
            sink: Arc::new(TracingSink),
        }
    }

    #[must_use]
    pub fn from_config(config: &TranslatorConfig) -> Self {
        Self::new(config.verbose)
            .with_id_generator(NanoIdGenerator::new(config.correlation_id_len))
    }

    #[must_use]
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: impl ErrorSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    #[must_use]
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Translate a failure into the response to send.
    ///
    /// Structured errors keep their own status and body. Anything resolving to
    /// 500 gets a correlation identifier (created at most once per request) and
    /// exactly one `"uncaught error"` record; in non-verbose mode its body is
    /// replaced by a generic problem naming only that identifier.
    pub fn translate(&self, failure: &Failure, state: &mut RequestState) -> Translation {
        let Classified {
            status,
            body,
            content_type,
            resolved_token,
        } = classify(failure);

        if let Some(token) = &resolved_token {
            state.resolved_token = Some(token.clone());
        }

        if status != StatusCode::INTERNAL_SERVER_ERROR {
            return Translation {
                status,
                body,
                content_type,
            };
        }

        let correlation_id = state
            .correlation_id_or_insert_with(|| self.ids.new_short_id())
            .to_owned();

        self.sink.log_error(&UncaughtError {
            event: UNCAUGHT_ERROR,
            error: failure.report(),
            correlation_id: &correlation_id,
            token: resolved_token.as_deref(),
            body: &body,
        });

        if self.verbose {
            return Translation {
                status,
                body,
                content_type,
            };
        }

        Translation {
            status,
            body: Payload::Problem(redacted(&correlation_id, resolved_token)),
            content_type: APPLICATION_PROBLEM_JSON,
        }
    }

    /// Translate `failure`, if any, and send the result.
    ///
    /// With no failure nothing happens: no record is logged and no response is
    /// produced, the pipeline keeps its own result.
    ///
    /// # Errors
    /// Returns the sender's error unmodified.
    pub fn handle<S: ResponseSender>(
        &self,
        failure: Option<&Failure>,
        state: &mut RequestState,
        sender: &S,
    ) -> Result<Option<S::Output>, S::Error> {
        let Some(failure) = failure else {
            return Ok(None);
        };
        let translation = self.translate(failure, state);
        sender.send(translation).map(Some)
    }
}

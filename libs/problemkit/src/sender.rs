//! Response sending: content-negotiated serialization of translated failures.

use axum::body::Body;
use axum::response::{IntoResponse, Response};
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, StatusCode};
use problemkit_errors::ProblemDetails;
use serde::Serialize;

use crate::translator::{Payload, Translation};

/// Media type of form-encoded problem bodies.
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Writes a translated failure as an HTTP response.
pub trait ResponseSender {
    type Output;
    type Error;

    /// # Errors
    /// Returns an error when the response cannot be produced.
    fn send(&self, translation: Translation) -> Result<Self::Output, Self::Error>;
}

/// Failure to serialize a problem body.
#[derive(thiserror::Error, Debug)]
pub enum SendError {
    #[error("failed to encode problem as JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to encode problem as form: {0}")]
    Form(#[from] serde_urlencoded::ser::Error),
}

impl IntoResponse for SendError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "problem response could not be encoded");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(CONTENT_TYPE, HeaderValue::from_static("text/plain"))],
            "Internal Server Error",
        )
            .into_response()
    }
}

/// Wire encoding selected for problem bodies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Encoding {
    #[default]
    Json,
    Form,
}

impl Encoding {
    /// Pick an encoding from an `Accept` header value.
    ///
    /// Form encoding wins only when it has the highest quality among the
    /// supported media ranges; everything else, including XML, gets JSON.
    #[must_use]
    pub fn negotiate(accept: Option<&str>) -> Self {
        let Some(accept) = accept else {
            return Self::Json;
        };

        let mut best: Option<(Self, u16)> = None;
        for range in accept.split(',') {
            let mut parts = range.split(';').map(str::trim);
            let media = parts.next().unwrap_or_default().to_ascii_lowercase();
            let q = parts
                .find_map(|p| p.strip_prefix("q="))
                .map_or(1000, parse_quality);

            let candidate = match media.as_str() {
                FORM_URLENCODED => Self::Form,
                "application/json" | "application/problem+json" | "application/*" | "*/*" => {
                    Self::Json
                }
                _ => continue,
            };
            if q > 0 && best.is_none_or(|(_, bq)| q > bq) {
                best = Some((candidate, q));
            }
        }
        best.map_or(Self::Json, |(enc, _)| enc)
    }
}

/// Quality value in thousandths; malformed values count as zero.
fn parse_quality(raw: &str) -> u16 {
    let Ok(q) = raw.parse::<f32>() else {
        return 0;
    };
    if !(0.0..=1.0).contains(&q) {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let thousandths = (q * 1000.0).round() as u16;
    thousandths
}

/// Form view of a problem; `meta` has no flat representation and is omitted.
#[derive(Serialize)]
struct FormProblem<'a> {
    #[serde(rename = "type")]
    type_url: &'a str,
    title: &'a str,
    status: u16,
    detail: &'a str,
    instance: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<&'a str>,
}

impl<'a> From<&'a ProblemDetails> for FormProblem<'a> {
    fn from(p: &'a ProblemDetails) -> Self {
        Self {
            type_url: &p.type_url,
            title: &p.title,
            status: p.status.as_u16(),
            detail: &p.detail,
            instance: &p.instance,
            trace_id: p.trace_id.as_deref(),
        }
    }
}

/// Builds axum responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct AxumSender {
    encoding: Encoding,
}

impl AxumSender {
    #[must_use]
    pub fn new(encoding: Encoding) -> Self {
        Self { encoding }
    }

    /// Sender negotiated against the request's `Accept` header.
    #[must_use]
    pub fn for_request(headers: &HeaderMap) -> Self {
        let accept = headers.get(ACCEPT).and_then(|v| v.to_str().ok());
        Self::new(Encoding::negotiate(accept))
    }

    #[must_use]
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    fn encode(&self, body: &Payload, content_type: &'static str) -> Result<(Vec<u8>, &'static str), SendError> {
        match body {
            Payload::Text(text) => Ok((text.clone().into_bytes(), content_type)),
            Payload::Problem(problem) => match self.encoding {
                Encoding::Json => Ok((serde_json::to_vec(problem)?, content_type)),
                Encoding::Form => {
                    let form = serde_urlencoded::to_string(FormProblem::from(problem))?;
                    Ok((form.into_bytes(), FORM_URLENCODED))
                }
            },
        }
    }
}

impl ResponseSender for AxumSender {
    type Output = Response;
    type Error = SendError;

    fn send(&self, translation: Translation) -> Result<Response, SendError> {
        let (bytes, content_type) = self.encode(&translation.body, translation.content_type)?;
        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = translation.status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        Ok(response)
    }
}

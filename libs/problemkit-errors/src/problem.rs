//! RFC 7807 Problem Details for HTTP APIs (pure data model, no HTTP framework dependencies)

use http::StatusCode;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Content type for JSON-encoded Problem Details.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// Content type for XML-encoded Problem Details.
///
/// Only a media-type label: the stock sender never produces XML bodies.
pub const APPLICATION_PROBLEM_XML: &str = "application/problem+xml";

/// Content type used when an opaque error message is sent verbatim.
pub const TEXT_PLAIN: &str = "text/plain";

/// `type` used for problems that carry no more specific category.
pub const ABOUT_BLANK: &str = "about:blank";

#[allow(clippy::trivially_copy_pass_by_ref)] // serde requires &T signature
fn serialize_status_code<S>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u16(status.as_u16())
}

fn deserialize_status_code<'de, D>(deserializer: D) -> Result<StatusCode, D::Error>
where
    D: Deserializer<'de>,
{
    let code = u16::deserialize(deserializer)?;
    StatusCode::from_u16(code).map_err(serde::de::Error::custom)
}

/// RFC 7807 Problem Details payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct ProblemDetails {
    /// A URI reference that identifies the problem type.
    #[serde(rename = "type")]
    pub type_url: String,
    /// A short, human-readable summary of the problem type.
    pub title: String,
    /// The HTTP status code for this occurrence of the problem.
    /// Serializes as u16 and always mirrors the transport-level status.
    #[serde(
        serialize_with = "serialize_status_code",
        deserialize_with = "deserialize_status_code"
    )]
    pub status: StatusCode,
    /// A human-readable explanation specific to this occurrence of the problem.
    pub detail: String,
    /// A URI reference that identifies the specific occurrence of the problem.
    #[serde(default)]
    pub instance: String,
    /// Correlation identifier linking the response to the server logs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// Extension members carried by structured errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}

impl ProblemDetails {
    /// Create a new problem with the given status, title, and detail.
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            type_url: ABOUT_BLANK.to_owned(),
            title: title.into(),
            status,
            detail: detail.into(),
            instance: String::new(),
            trace_id: None,
            meta: None,
        }
    }

    /// The generic internal error body: status 500 with the standard reason phrase as title.
    pub fn internal(detail: impl Into<String>) -> Self {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        Self::new(status, reason_phrase(status), detail)
    }

    pub fn with_type(mut self, type_url: impl Into<String>) -> Self {
        self.type_url = type_url.into();
        self
    }

    pub fn with_instance(mut self, uri: impl Into<String>) -> Self {
        self.instance = uri.into();
        self
    }

    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    pub fn with_meta(mut self, meta: Map<String, Value>) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Add a single extension member, creating the `meta` map on first use.
    pub fn insert_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }
}

/// Standard reason phrase of a status, `"Unknown"` for unregistered codes.
#[must_use]
pub fn reason_phrase(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("Unknown")
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn problem_builder_pattern() {
        let p = ProblemDetails::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Validation Failed",
            "Input validation errors",
        )
        .with_type("https://errors.example.com/validation")
        .with_instance("/users/123")
        .with_trace_id("req-456")
        .insert_meta("field", "email");

        assert_eq!(p.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(p.type_url, "https://errors.example.com/validation");
        assert_eq!(p.instance, "/users/123");
        assert_eq!(p.trace_id.as_deref(), Some("req-456"));
        assert_eq!(p.meta.unwrap().get("field"), Some(&json!("email")));
    }

    #[test]
    fn internal_uses_reason_phrase_as_title() {
        let p = ProblemDetails::internal("boom");
        assert_eq!(p.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(p.title, "Internal Server Error");
        assert_eq!(p.type_url, ABOUT_BLANK);
        assert!(p.trace_id.is_none());
    }

    #[test]
    fn serializes_with_rfc7807_member_names() {
        let p = ProblemDetails::new(StatusCode::NOT_FOUND, "Not Found", "Resource not found");
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["type"], "about:blank");
        assert_eq!(v["status"], 404);
        assert!(v.get("trace_id").is_none(), "absent trace_id must be omitted");
        assert!(v.get("meta").is_none());
    }

    #[test]
    fn deserializes_status_from_u16() {
        let body = r#"{"type":"about:blank","title":"Not Found","status":404,"detail":"gone","trace_id":"abc"}"#;
        let p: ProblemDetails = serde_json::from_str(body).unwrap();
        assert_eq!(p.status, StatusCode::NOT_FOUND);
        assert_eq!(p.instance, "");
        assert_eq!(p.trace_id.as_deref(), Some("abc"));
    }

    #[test]
    fn rejects_out_of_range_status() {
        let body = r#"{"type":"about:blank","title":"x","status":1000,"detail":"x"}"#;
        assert!(serde_json::from_str::<ProblemDetails>(body).is_err());
    }
}

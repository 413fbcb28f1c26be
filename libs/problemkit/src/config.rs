//! Configuration for the problem translator and its axum middleware.

use http::HeaderName;
use serde::{Deserialize, Serialize};

use crate::id::DEFAULT_ID_LEN;

fn default_correlation_id_len() -> usize {
    DEFAULT_ID_LEN
}

fn default_response_id_header() -> Option<String> {
    Some("x-request-id".to_owned())
}

/// Translator settings, usually a section of the host's configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TranslatorConfig {
    /// Send full error detail to clients, including for 500s.
    /// Leave off in production.
    #[serde(default)]
    pub verbose: bool,

    /// Length of generated correlation identifiers.
    #[serde(default = "default_correlation_id_len")]
    pub correlation_id_len: usize,

    /// Adopt the value of this request header as the correlation identifier when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id_header: Option<String>,

    /// Echo the correlation identifier of a 500 response in this header.
    #[serde(default = "default_response_id_header")]
    pub response_id_header: Option<String>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            correlation_id_len: default_correlation_id_len(),
            request_id_header: None,
            response_id_header: default_response_id_header(),
        }
    }
}

/// Configuration error for translator settings
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid header name '{name}' in '{field}'")]
    InvalidHeaderName {
        field: &'static str,
        name: String,
        #[source]
        source: http::header::InvalidHeaderName,
    },
}

pub(crate) fn parse_header(
    field: &'static str,
    name: Option<&str>,
) -> Result<Option<HeaderName>, ConfigError> {
    name.map(|n| {
        HeaderName::from_bytes(n.as_bytes()).map_err(|source| ConfigError::InvalidHeaderName {
            field,
            name: n.to_owned(),
            source,
        })
    })
    .transpose()
}

//! Error catalog support: static definitions services declare once and instantiate per occurrence

use http::StatusCode;

use crate::problem::ProblemDetails;
use crate::service::ServiceError;

/// Static error definition from catalog
#[derive(Debug, Clone, Copy)]
pub struct ErrDef {
    pub status: u16,
    pub title: &'static str,
    pub token: &'static str,
    pub type_url: &'static str,
}

impl ErrDef {
    /// Instantiate this definition as a structured error with the given detail.
    #[must_use]
    pub fn error(&self, detail: impl Into<String>) -> ServiceError {
        ServiceError::new(self.token, self.problem(detail))
    }

    /// Convert this error definition into a problem body with the given detail
    pub fn problem(&self, detail: impl Into<String>) -> ProblemDetails {
        // Unregistered or out-of-range codes degrade to a generic 500
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        ProblemDetails::new(status, self.title, detail).with_type(self.type_url)
    }
}

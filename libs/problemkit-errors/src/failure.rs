//! The error type handlers hand to the problem translator.

use std::error::Error as StdError;
use std::fmt;

use crate::service::{ServiceError, StructuredError};

/// A failure produced by request handling logic.
///
/// Either a structured error that knows its own status and body, an opaque
/// error that always maps to a generic 500, or a wrapper adding context to
/// another failure.
#[derive(Debug)]
pub enum Failure {
    Structured(Box<dyn StructuredError>),
    Opaque(anyhow::Error),
    Wrapped {
        context: String,
        inner: Box<Failure>,
    },
}

impl Failure {
    #[must_use]
    pub fn structured(err: impl StructuredError) -> Self {
        Self::Structured(Box::new(err))
    }

    #[must_use]
    pub fn opaque(err: impl Into<anyhow::Error>) -> Self {
        Self::Opaque(err.into())
    }

    /// Wrap this failure with a message describing what was being attempted.
    #[must_use]
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Wrapped {
            context: context.into(),
            inner: Box::new(self),
        }
    }

    /// The failure this one wraps, if it is a wrapper.
    #[must_use]
    pub fn cause(&self) -> Option<&Failure> {
        match self {
            Self::Wrapped { inner, .. } => Some(inner),
            Self::Structured(_) | Self::Opaque(_) => None,
        }
    }

    /// Full diagnostic rendering for operator logs.
    ///
    /// Unlike `Display`, this includes the source chain of structured errors and
    /// the `Caused by` section (and backtrace, when captured) of opaque ones.
    #[must_use]
    #[allow(clippy::use_debug)] // anyhow's Debug output carries the cause list and backtrace
    pub fn report(&self) -> String {
        match self {
            Self::Structured(err) => {
                let mut out = err.to_string();
                let mut source = err.source();
                while let Some(s) = source {
                    out.push_str(": ");
                    out.push_str(&s.to_string());
                    source = s.source();
                }
                out
            }
            Self::Opaque(err) => format!("{err:?}"),
            Self::Wrapped { context, inner } => format!("{context}: {}", inner.report()),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structured(err) => fmt::Display::fmt(err, f),
            // Alternate form joins the whole context chain: "outer: inner: root"
            Self::Opaque(err) => write!(f, "{err:#}"),
            Self::Wrapped { context, inner } => write!(f, "{context}: {inner}"),
        }
    }
}

impl StdError for Failure {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Structured(err) => err.source(),
            Self::Opaque(err) => err.source(),
            Self::Wrapped { inner, .. } => Some(inner.as_ref()),
        }
    }
}

impl From<ServiceError> for Failure {
    fn from(err: ServiceError) -> Self {
        Self::structured(err)
    }
}

impl From<anyhow::Error> for Failure {
    fn from(err: anyhow::Error) -> Self {
        Self::Opaque(err)
    }
}

/// Adds [`Failure`] context to results, mirroring `anyhow::Context`.
pub trait ResultExt<T> {
    /// Wrap the error, if any, with a message describing what was being attempted.
    ///
    /// # Errors
    /// Returns the wrapped failure when `self` is `Err`.
    fn wrap_err(self, context: impl Into<String>) -> Result<T, Failure>;
}

impl<T, E: Into<Failure>> ResultExt<T> for Result<T, E> {
    fn wrap_err(self, context: impl Into<String>) -> Result<T, Failure> {
        self.map_err(|e| e.into().context(context))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::service::{internal, not_found};
    use anyhow::Context as _;

    #[test]
    fn display_puts_outer_context_first() {
        let f = Failure::from(not_found("row 3 missing")).context("failed to load");
        assert_eq!(f.to_string(), "failed to load: row 3 missing");
    }

    #[test]
    fn opaque_display_includes_anyhow_context_chain() {
        let err = Err::<(), _>(std::io::Error::other("disk full"))
            .context("write segment")
            .unwrap_err();
        let f = Failure::from(err);
        assert_eq!(f.to_string(), "write segment: disk full");
    }

    #[test]
    fn cause_only_for_wrappers() {
        let f = Failure::opaque(anyhow::anyhow!("boom"));
        assert!(f.cause().is_none());

        let wrapped = f.context("outer");
        assert!(matches!(wrapped.cause(), Some(Failure::Opaque(_))));
    }

    #[test]
    fn report_includes_structured_sources() {
        let f = Failure::from(internal("could not persist").with_source(std::io::Error::other("disk full")))
            .context("failed to save");
        assert_eq!(f.report(), "failed to save: could not persist: disk full");
    }

    #[test]
    fn wrap_err_converts_and_wraps() {
        let r: Result<(), ServiceError> = Err(not_found("nope"));
        let f = r.wrap_err("lookup").unwrap_err();
        assert_eq!(f.to_string(), "lookup: nope");
        assert!(f.source().is_some());
    }
}

//! Cause-chain resolution.
//!
//! A failure is unwound through [`Failure::Wrapped`] layers and through the
//! context chain of opaque `anyhow` errors until a structured error or the
//! innermost cause is reached. Walks are bounded by [`MAX_CAUSE_DEPTH`].

use std::error::Error as StdError;

use crate::failure::Failure;
use crate::service::{ServiceError, StructuredError};

/// Maximum number of links followed before giving up and treating the failure as opaque.
pub const MAX_CAUSE_DEPTH: usize = 64;

/// Classification of the innermost cause of a failure.
#[derive(Clone, Copy)]
pub enum RootCause<'a> {
    /// The chain ends in (or passes through) a structured error.
    Structured(&'a dyn StructuredError),
    /// No structured error was found.
    Opaque,
}

impl RootCause<'_> {
    #[must_use]
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured(_))
    }
}

impl std::fmt::Debug for RootCause<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Structured(err) => f
                .debug_struct("Structured")
                .field("status", &err.status())
                .field("token", &err.token())
                .finish(),
            Self::Opaque => f.write_str("Opaque"),
        }
    }
}

/// Follow [`Failure::cause`] links to the first failure that wraps nothing.
///
/// Returns `failure` itself when it is not a wrapper. If the chain is longer
/// than [`MAX_CAUSE_DEPTH`], the failure at the depth limit is returned.
#[must_use]
pub fn root_failure(failure: &Failure) -> &Failure {
    let mut current = failure;
    for _ in 0..MAX_CAUSE_DEPTH {
        match current.cause() {
            Some(inner) => current = inner,
            None => break,
        }
    }
    current
}

/// Resolve the cause of `failure` and classify it.
#[must_use]
pub fn resolve(failure: &Failure) -> RootCause<'_> {
    let root = root_failure(failure);
    if root.cause().is_some() {
        // depth limit reached
        return RootCause::Opaque;
    }
    match root {
        Failure::Structured(err) => RootCause::Structured(err.as_ref()),
        Failure::Opaque(err) => find_service_error(err.as_ref()),
        Failure::Wrapped { .. } => RootCause::Opaque,
    }
}

fn find_service_error<'a>(err: &'a (dyn StdError + Send + Sync + 'static)) -> RootCause<'a> {
    let start: &'a (dyn StdError + 'static) = err;
    let mut current = Some(start);
    for _ in 0..MAX_CAUSE_DEPTH {
        let Some(e) = current else { break };
        if let Some(service) = e.downcast_ref::<ServiceError>() {
            return RootCause::Structured(service);
        }
        if let Some(failure) = e.downcast_ref::<Failure>() {
            return resolve(failure);
        }
        current = e.source();
    }
    RootCause::Opaque
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::service::{internal, not_found};
    use anyhow::Context as _;
    use http::StatusCode;

    fn structured_status(cause: RootCause<'_>) -> Option<StatusCode> {
        match cause {
            RootCause::Structured(err) => Some(err.status()),
            RootCause::Opaque => None,
        }
    }

    #[test]
    fn terminal_failure_is_its_own_root() {
        let f = Failure::opaque(anyhow::anyhow!("disk full"));
        assert!(std::ptr::eq(root_failure(&f), &f));
    }

    #[test]
    fn root_failure_is_idempotent() {
        let f = Failure::from(not_found("x")).context("a").context("b");
        let root = root_failure(&f);
        assert!(std::ptr::eq(root_failure(root), root));
        assert!(matches!(root, Failure::Structured(_)));
    }

    #[test]
    fn resolves_structured_through_wrappers() {
        let f = Failure::from(internal("db down")).context("failed to save");
        assert_eq!(
            structured_status(resolve(&f)),
            Some(StatusCode::INTERNAL_SERVER_ERROR)
        );
    }

    #[test]
    fn resolves_service_error_inside_anyhow_chain() {
        let err = Err::<(), _>(not_found("no such user"))
            .context("loading profile")
            .unwrap_err();
        let f = Failure::from(err).context("handler");
        assert_eq!(structured_status(resolve(&f)), Some(StatusCode::NOT_FOUND));
    }

    #[test]
    fn resolves_failure_inside_anyhow_chain() {
        let inner = Failure::from(not_found("no such order")).context("lookup");
        let err = Err::<(), _>(inner).context("loading cart").unwrap_err();
        let f = Failure::from(err);
        assert_eq!(structured_status(resolve(&f)), Some(StatusCode::NOT_FOUND));

        let opaque = Err::<(), _>(Failure::opaque(anyhow::anyhow!("io")))
            .context("loading cart")
            .unwrap_err();
        assert!(!resolve(&Failure::from(opaque)).is_structured());
    }

    #[test]
    fn plain_errors_are_opaque() {
        let f = Failure::opaque(std::io::Error::other("disk full")).context("flush");
        assert!(!resolve(&f).is_structured());
    }

    #[test]
    fn overlong_chain_is_bounded_and_opaque() {
        let mut f = Failure::from(not_found("deep"));
        for i in 0..=MAX_CAUSE_DEPTH {
            f = f.context(format!("layer {i}"));
        }
        assert!(root_failure(&f).cause().is_some());
        assert!(!resolve(&f).is_structured());
    }
}

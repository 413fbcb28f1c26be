//! Core error types for problemkit
//!
//! This crate provides pure data types for error handling, with no dependencies
//! on HTTP frameworks. It includes:
//! - RFC 7807 Problem Details (`ProblemDetails`)
//! - The structured error capability (`StructuredError`, `ServiceError`)
//! - Error catalog support (`ErrDef`)
//! - The handler-facing failure union (`Failure`) and its cause resolution
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod catalog;
pub mod cause;
pub mod failure;
pub mod problem;
pub mod service;

// Re-export commonly used types
pub use catalog::ErrDef;
pub use cause::{MAX_CAUSE_DEPTH, RootCause, resolve, root_failure};
pub use failure::{Failure, ResultExt};
pub use problem::{
    ABOUT_BLANK, APPLICATION_PROBLEM_JSON, APPLICATION_PROBLEM_XML, ProblemDetails, TEXT_PLAIN,
    reason_phrase,
};
pub use service::{BoxError, ServiceError, StructuredError};

//! Problem-response translation for axum services
//!
//! Converts failures returned by request handlers into RFC 7807 problem
//! responses. Structured errors keep their status and body; everything that
//! ends in a 500 is logged once under a correlation identifier and, unless the
//! translator is verbose, redacted to a generic message naming that identifier.
//!
//! ```ignore
//! let mw = ProblemMiddleware::from_config(&TranslatorConfig::default())?;
//! let app = mw.install(Router::new().route("/users/{id}", get(get_user)));
//! ```
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod id;
pub mod logging;
pub mod middleware;
pub mod result;
pub mod sender;
pub mod sink;
pub mod state;
pub mod translator;

pub use config::{ConfigError, TranslatorConfig};
pub use id::{IdGenerator, NanoIdGenerator};
pub use logging::{LoggingConfig, init_logging};
pub use middleware::{ProblemMiddleware, problem_middleware};
pub use result::{ApiError, ApiResult};
pub use sender::{AxumSender, Encoding, ResponseSender, SendError};
pub use sink::{ErrorSink, TracingSink, UNCAUGHT_ERROR, UncaughtError};
pub use state::RequestState;
pub use translator::{Payload, ProblemTranslator, Translation};

pub use problemkit_errors as errors;

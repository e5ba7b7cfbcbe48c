//! Audit subsystem.
//!
//! # Data Flow
//! ```text
//! Rejection in transport::interceptor / privileges / scroll
//!     → GuardError::audit_category() (pick exactly one category)
//!     → record_rejection() (dispatch to the matching sink method)
//!     → AuditSink implementation (log_sink.rs writes to the `audit` target)
//! ```
//!
//! # Design Decisions
//! - Sinks are fire-and-forget: methods return nothing and must not panic
//! - Successful requests produce no audit record here
//! - Records carry a request summary, never the request body

pub mod log_sink;

use std::net::SocketAddr;

use crate::error::GuardError;

pub use log_sink::TracingAuditSink;

/// Category of an audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditCategory {
    MissingPrivileges,
    SslException,
    BadHeaders,
    ProtectedIndexAttempt,
}

impl AuditCategory {
    pub const ALL: [AuditCategory; 4] = [
        AuditCategory::MissingPrivileges,
        AuditCategory::SslException,
        AuditCategory::BadHeaders,
        AuditCategory::ProtectedIndexAttempt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditCategory::MissingPrivileges => "MISSING_PRIVILEGES",
            AuditCategory::SslException => "SSL_EXCEPTION",
            AuditCategory::BadHeaders => "BAD_HEADERS",
            AuditCategory::ProtectedIndexAttempt => "SG_INDEX_ATTEMPT",
        }
    }
}

impl std::str::FromStr for AuditCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AuditCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown audit category '{}'", s))
    }
}

impl std::fmt::Display for AuditCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an audit record knows about the request that triggered it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSummary {
    pub action: String,
    pub request_class: String,
    pub remote_address: Option<SocketAddr>,
    pub user: Option<String>,
    pub origin: Option<String>,
}

/// Receiver of security-relevant events.
pub trait AuditSink: Send + Sync {
    fn log_missing_privileges(&self, action: &str, request: &RequestSummary);

    fn log_ssl_exception(&self, request: &RequestSummary, error: &GuardError, action: &str);

    fn log_bad_headers(&self, request: &RequestSummary, action: &str);

    fn log_protected_index_attempt(&self, request: &RequestSummary, action: &str);
}

/// Write the single audit record a rejection calls for.
pub fn record_rejection(sink: &dyn AuditSink, error: &GuardError, action: &str, request: &RequestSummary) {
    match error.audit_category() {
        Some(AuditCategory::MissingPrivileges) => sink.log_missing_privileges(action, request),
        Some(AuditCategory::SslException) => sink.log_ssl_exception(request, error, action),
        Some(AuditCategory::BadHeaders) => sink.log_bad_headers(request, action),
        Some(AuditCategory::ProtectedIndexAttempt) => sink.log_protected_index_attempt(request, action),
        None => {}
    }
}

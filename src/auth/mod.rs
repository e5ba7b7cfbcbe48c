//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! Untrusted network request with verified principal
//!     → BackendAuthenticator::authenticate()
//!         Ok(Some(identity)) → installed in SecurityContext
//!         Ok(None)           → allow-list check, otherwise rejected
//!         Err(AuthError)     → rejected (never treated as "not authenticated")
//! ```
//!
//! # Design Decisions
//! - Backends are async; timeouts and cancellation belong to the backend
//! - The unauthenticated allow-list is an exact, reviewable constant

pub mod certificate;

use async_trait::async_trait;
use thiserror::Error;

use crate::context::Identity;
use crate::transport::request::TransportRequest;

pub use certificate::CertificateAuthenticator;

/// Actions that may proceed without an authenticated identity.
///
/// Widening this list is a security regression; it is matched by exact name.
pub const UNAUTHENTICATED_ACTIONS: [&str; 3] = [
    "cluster:monitor/nodes/liveness",
    "internal:transport/handshake",
    "cluster:admin/searchguard/whoami",
];

/// Returns true if `action` may run without an identity.
pub fn is_unauthenticated_action(action: &str) -> bool {
    UNAUTHENTICATED_ACTIONS.contains(&action)
}

/// Failure inside an authentication backend.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The backend could not be reached.
    #[error("authentication backend unavailable: {0}")]
    Unavailable(String),

    /// Any other backend fault.
    #[error("authentication backend error: {0}")]
    Backend(String),
}

/// Pluggable user authentication.
#[async_trait]
pub trait BackendAuthenticator: Send + Sync {
    /// Authenticate the caller identified by the verified certificate
    /// `principal`.
    ///
    /// # Errors
    /// * `AuthError` - the backend failed; the request is rejected
    async fn authenticate(
        &self,
        request: &TransportRequest,
        principal: &str,
        action: &str,
    ) -> Result<Option<Identity>, AuthError>;
}

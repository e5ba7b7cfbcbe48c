//! Rejection taxonomy for the request pipeline and the resource guards.
//!
//! Every variant is terminal for the request it belongs to; nothing in this
//! crate retries. [`GuardError::audit_category`] decides which audit record a
//! rejection produces so that each failure path writes exactly one.

use thiserror::Error;

use crate::audit::AuditCategory;

/// Errors raised while admitting a transport request or while guarding the
/// protected index and scroll cursors.
#[derive(Debug, Error)]
pub enum GuardError {
    /// The transport channel type is missing or unknown. Deployment error.
    #[error("unsupported transport channel type: {0}")]
    ChannelUnsupported(String),

    /// An internal or shard-level action arrived from a peer that is not a
    /// trusted node.
    #[error("internal or shard requests not allowed from a non-server node ({action})")]
    InternalActionForbidden { action: String },

    /// The channel layer did not provide a verified certificate principal.
    #[error("no client certificate principal found for transport type {channel}")]
    MissingCredential { channel: String },

    /// An untrusted caller tried to smuggle a private header.
    #[error("illegal parameter in header: {header}")]
    ForgedIdentityHeader { header: String },

    /// A forwarded header from a trusted or local peer did not decode.
    #[error("malformed header {header}: {reason}")]
    MalformedHeader { header: String, reason: String },

    /// The authentication backends did not recognise the caller.
    #[error("cannot authenticate request for {action}")]
    AuthenticationFailed { action: String },

    /// The authentication backend itself failed.
    #[error("authentication backend failure: {0}")]
    AuthenticatorFailure(String),

    /// An authenticated untrusted request carried no peer address.
    #[error("request has no proper remote address")]
    MissingRemoteAddress,

    /// The action would modify the protected configuration index.
    #[error("{action} on '{index}' is not allowed for a regular user")]
    ProtectedResourceDenied { action: String, index: String },

    /// A scroll continuation came from a different identity than the
    /// creator. The message is deliberately generic.
    #[error("forbidden")]
    CursorOwnershipMismatch,

    /// The scroll cursor has no owner to compare against.
    #[error("no user in scroll context")]
    NoCursorOwner,

    /// The transport channel closed before the pipeline finished.
    #[error("transport channel closed")]
    ChannelClosed,

    /// Error returned by the wrapped business handler.
    #[error(transparent)]
    Handler(Box<dyn std::error::Error + Send + Sync>),
}

impl GuardError {
    /// Wrap a handler error.
    pub fn handler<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        GuardError::Handler(err.into())
    }

    /// The audit category this rejection is recorded under, if any.
    pub fn audit_category(&self) -> Option<AuditCategory> {
        match self {
            GuardError::InternalActionForbidden { .. }
            | GuardError::AuthenticationFailed { .. }
            | GuardError::AuthenticatorFailure(_)
            | GuardError::MissingRemoteAddress
            | GuardError::CursorOwnershipMismatch
            | GuardError::NoCursorOwner => Some(AuditCategory::MissingPrivileges),
            GuardError::ChannelUnsupported(_) | GuardError::MissingCredential { .. } => {
                Some(AuditCategory::SslException)
            }
            GuardError::ForgedIdentityHeader { .. } | GuardError::MalformedHeader { .. } => {
                Some(AuditCategory::BadHeaders)
            }
            GuardError::ProtectedResourceDenied { .. } => Some(AuditCategory::ProtectedIndexAttempt),
            GuardError::ChannelClosed | GuardError::Handler(_) => None,
        }
    }

    /// Short label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            GuardError::ChannelUnsupported(_) => "channel_unsupported",
            GuardError::InternalActionForbidden { .. } => "internal_action_forbidden",
            GuardError::MissingCredential { .. } => "missing_credential",
            GuardError::ForgedIdentityHeader { .. } => "forged_identity_header",
            GuardError::MalformedHeader { .. } => "malformed_header",
            GuardError::AuthenticationFailed { .. } => "authentication_failed",
            GuardError::AuthenticatorFailure(_) => "authenticator_failure",
            GuardError::MissingRemoteAddress => "missing_remote_address",
            GuardError::ProtectedResourceDenied { .. } => "protected_resource_denied",
            GuardError::CursorOwnershipMismatch => "cursor_ownership_mismatch",
            GuardError::NoCursorOwner => "no_cursor_owner",
            GuardError::ChannelClosed => "channel_closed",
            GuardError::Handler(_) => "handler",
        }
    }
}

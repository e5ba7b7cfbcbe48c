//! Per-request security state.
//!
//! # Data Flow
//! ```text
//! Inbound transport request
//!     → transport::interceptor (classify channel, decode headers, authenticate)
//!     → SecurityContext (owned by this one request)
//!     → privileges::ProtectedIndexGuard / scroll::CursorOwnershipGuard (read-only)
//!     → transport::outbound (explicit copy into headers on re-dispatch)
//! ```
//!
//! # Design Decisions
//! - The context is a plain value moved along with the request; there is no
//!   thread-bound or global lookup
//! - Re-dispatch copies fields into headers, it never shares the context
//! - Header values use a private versioned encoding (see `codec`)

pub mod codec;
pub mod headers;
pub mod identity;

use std::net::SocketAddr;

use crate::error::GuardError;

pub use codec::{CodecError, IdentityCodec};
pub use headers::TransportHeaders;
pub use identity::Identity;

/// Kind of transport channel a request arrived on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// Delivered in-process; already authenticated once.
    Local,
    /// Arrived over the wire and must be authenticated.
    Network,
}

impl ChannelKind {
    /// Parse the channel type string reported by the transport layer.
    pub fn from_channel_type(raw: Option<&str>) -> Result<Self, GuardError> {
        match raw {
            Some("direct") => Ok(ChannelKind::Local),
            Some("netty") => Ok(ChannelKind::Network),
            Some(other) => Err(GuardError::ChannelUnsupported(other.to_string())),
            None => Err(GuardError::ChannelUnsupported("<none>".to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Local => "direct",
            ChannelKind::Network => "netty",
        }
    }
}

/// Where a request semantically originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    Local,
    Transport,
    Rest,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Local => "LOCAL",
            Origin::Transport => "TRANSPORT",
            Origin::Rest => "REST",
        }
    }
}

impl std::str::FromStr for Origin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOCAL" => Ok(Origin::Local),
            "TRANSPORT" => Ok(Origin::Transport),
            "REST" => Ok(Origin::Rest),
            other => Err(format!("unknown origin '{}'", other)),
        }
    }
}

/// Trust classification of a network peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trust {
    /// A verified node of our own cluster.
    InterClusterTrusted,
    /// A verified node of a different, federated cluster.
    RemoteClusterTrusted,
    /// A regular caller.
    Untrusted,
}

impl Trust {
    /// True for both flavours of node-to-node trust.
    pub fn is_trusted(&self) -> bool {
        !matches!(self, Trust::Untrusted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Trust::InterClusterTrusted => "inter_cluster",
            Trust::RemoteClusterTrusted => "remote_cluster",
            Trust::Untrusted => "untrusted",
        }
    }
}

/// Transient security facts for one inbound request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityContext {
    channel_kind: Option<ChannelKind>,
    origin: Option<Origin>,
    identity: Option<Identity>,
    remote_address: Option<SocketAddr>,
    trust: Option<Trust>,
    principal: Option<String>,
    action_name: String,
    resolved_action_class: String,
    initial_action_class: Option<String>,
    is_suggest: bool,
}

impl SecurityContext {
    pub fn new(action_name: impl Into<String>, resolved_action_class: impl Into<String>) -> Self {
        Self {
            action_name: action_name.into(),
            resolved_action_class: resolved_action_class.into(),
            ..Self::default()
        }
    }

    pub fn channel_kind(&self) -> Option<ChannelKind> {
        self.channel_kind
    }

    pub fn set_channel_kind(&mut self, kind: ChannelKind) {
        self.channel_kind = Some(kind);
    }

    pub fn origin(&self) -> Option<Origin> {
        self.origin
    }

    pub fn set_origin(&mut self, origin: Origin) {
        self.origin = Some(origin);
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn set_identity(&mut self, identity: Identity) {
        self.identity = Some(identity);
    }

    pub fn remote_address(&self) -> Option<SocketAddr> {
        self.remote_address
    }

    pub fn set_remote_address(&mut self, address: SocketAddr) {
        self.remote_address = Some(address);
    }

    /// Only set for network channels.
    pub fn trust(&self) -> Option<Trust> {
        self.trust
    }

    pub fn set_trust(&mut self, trust: Trust) {
        self.trust = Some(trust);
    }

    /// Verified certificate principal of the socket peer.
    pub fn principal(&self) -> Option<&str> {
        self.principal.as_deref()
    }

    pub fn set_principal(&mut self, principal: impl Into<String>) {
        self.principal = Some(principal.into());
    }

    pub fn action_name(&self) -> &str {
        &self.action_name
    }

    pub fn resolved_action_class(&self) -> &str {
        &self.resolved_action_class
    }

    /// Logical action class of the first request in this chain.
    pub fn initial_action_class(&self) -> Option<&str> {
        self.initial_action_class.as_deref()
    }

    pub fn set_initial_action_class(&mut self, class: impl Into<String>) {
        self.initial_action_class = Some(class.into());
    }

    /// True for shard searches that carry a suggest section.
    pub fn is_suggest(&self) -> bool {
        self.is_suggest
    }

    pub fn set_suggest(&mut self, suggest: bool) {
        self.is_suggest = suggest;
    }

    /// True when this request was issued by the cluster itself: local
    /// origin, and either delivered in-process or sent by one of our nodes.
    pub fn is_locally_authorized(&self) -> bool {
        self.origin == Some(Origin::Local)
            && (self.channel_kind == Some(ChannelKind::Local)
                || self.trust == Some(Trust::InterClusterTrusted))
    }

    /// Display name of the identity, for logs.
    pub fn user_name(&self) -> &str {
        self.identity.as_ref().map(Identity::name).unwrap_or("<none>")
    }
}

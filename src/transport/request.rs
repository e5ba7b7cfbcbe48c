//! Inbound transport request model.

use std::net::SocketAddr;

use crate::audit::RequestSummary;
use crate::context::{SecurityContext, TransportHeaders};

/// Shape of the request payload, as far as auditing cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    /// Any request, named by its class.
    Named(String),
    /// A bulk request routed to one shard, with the classes of its items.
    BulkShard { items: Vec<String> },
    /// A replication wrapper around a single request.
    ConcreteShard { inner: String },
    /// The shard-level phase of a search.
    ShardSearch { suggest: bool },
}

impl RequestKind {
    /// Logical operation name: unwraps one layer of batching or shard
    /// routing.
    pub fn logical_class(&self) -> String {
        match self {
            RequestKind::Named(class) => class.clone(),
            RequestKind::BulkShard { items } if items.len() == 1 => items[0].clone(),
            RequestKind::BulkShard { .. } => "BulkShardRequest".to_string(),
            RequestKind::ConcreteShard { inner } => inner.clone(),
            RequestKind::ShardSearch { .. } => "ShardSearchTransportRequest".to_string(),
        }
    }

    pub fn is_suggest(&self) -> bool {
        matches!(self, RequestKind::ShardSearch { suggest: true })
    }
}

impl Default for RequestKind {
    fn default() -> Self {
        RequestKind::Named("TransportRequest".to_string())
    }
}

/// A request received on the internal transport.
#[derive(Debug, Clone, Default)]
pub struct TransportRequest {
    /// Action name, e.g. `indices:data/read/search`.
    pub action: String,
    /// Headers sent by the peer.
    pub headers: TransportHeaders,
    /// Socket address of the peer, if known.
    pub remote_address: Option<SocketAddr>,
    pub kind: RequestKind,
}

impl TransportRequest {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_headers(mut self, headers: TransportHeaders) -> Self {
        for (name, value) in headers.iter() {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn with_remote_address(mut self, address: SocketAddr) -> Self {
        self.remote_address = Some(address);
        self
    }

    pub fn with_kind(mut self, kind: RequestKind) -> Self {
        self.kind = kind;
        self
    }

    /// Internal actions are reserved for node-to-node traffic.
    pub fn is_internal(&self) -> bool {
        self.action.starts_with("internal:")
    }

    /// Shard-routed actions carry a phase suffix such as `[phase/query]`.
    pub fn is_shard_level(&self) -> bool {
        self.action.contains('[')
    }

    pub fn is_handshake(&self) -> bool {
        self.action == HANDSHAKE_ACTION
    }

    /// Audit view of this request, enriched with whatever the context
    /// already knows.
    pub fn summary(&self, ctx: Option<&SecurityContext>) -> RequestSummary {
        RequestSummary {
            action: self.action.clone(),
            request_class: self.kind.logical_class(),
            remote_address: ctx.and_then(SecurityContext::remote_address).or(self.remote_address),
            user: ctx.and_then(|c| c.identity()).map(|i| i.name().to_string()),
            origin: ctx.and_then(SecurityContext::origin).map(|o| o.as_str().to_string()),
        }
    }
}

/// Transport handshake action name.
pub const HANDSHAKE_ACTION: &str = "internal:transport/handshake";

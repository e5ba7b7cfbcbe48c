//! Sender side of the header contract.
//!
//! When a node re-dispatches a request, to itself or to a peer, it copies
//! the relevant context fields into headers. The receiving interceptor
//! decodes them back into an equal context. Nothing is shared by reference.

use crate::context::headers::{
    INITIAL_ACTION_CLASS_HEADER, ORIGIN_HEADER, REMOTE_ADDRESS_HEADER, REMOTE_CLUSTER_NAME_HEADER,
    USER_HEADER,
};
use crate::context::{CodecError, IdentityCodec, Origin, SecurityContext, TransportHeaders};

/// Builds headers for outgoing internal requests.
#[derive(Debug, Clone)]
pub struct OutboundHeaders {
    cluster_name: String,
    codec: IdentityCodec,
}

impl OutboundHeaders {
    pub fn new(cluster_name: impl Into<String>) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            codec: IdentityCodec,
        }
    }

    /// Headers carrying an admitted request's context onward.
    pub fn from_context(&self, ctx: &SecurityContext) -> Result<TransportHeaders, CodecError> {
        let mut headers = self.base();

        if let Some(identity) = ctx.identity() {
            headers.insert(USER_HEADER, self.codec.encode_identity(identity)?);
        }
        if let Some(address) = ctx.remote_address() {
            headers.insert(REMOTE_ADDRESS_HEADER, self.codec.encode_address(&address)?);
        }
        if let Some(origin) = ctx.origin() {
            headers.insert(ORIGIN_HEADER, origin.as_str());
        }
        if let Some(class) = ctx.initial_action_class() {
            headers.insert(INITIAL_ACTION_CLASS_HEADER, class);
        }
        Ok(headers)
    }

    /// Headers for a request the node issues on its own behalf.
    pub fn for_node_request(&self) -> TransportHeaders {
        let mut headers = self.base();
        headers.insert(ORIGIN_HEADER, Origin::Local.as_str());
        headers
    }

    fn base(&self) -> TransportHeaders {
        let mut headers = TransportHeaders::new();
        headers.insert(REMOTE_CLUSTER_NAME_HEADER, self.cluster_name.as_str());
        headers
    }
}

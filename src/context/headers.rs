//! Transport header names and the header bag carried by each request.
//!
//! # Wire Contract
//! Every private header shares the [`PRIVATE_HEADER_PREFIX`]. Values of the
//! identity and remote-address headers use the versioned encoding in
//! [`crate::context::codec`]; origin and action-class values are plain text.
//! Nodes of one deployment must agree on these names byte for byte.

use std::collections::BTreeMap;

/// Prefix shared by every header this layer owns. An untrusted caller that
/// sends any header with this prefix is treated as forging.
pub const PRIVATE_HEADER_PREFIX: &str = "_sg_";

/// Forwarded authenticated identity.
pub const USER_HEADER: &str = "_sg_user_header";

/// Forwarded address of the originating caller.
pub const REMOTE_ADDRESS_HEADER: &str = "_sg_remote_address_header";

/// Where the request semantically originated.
pub const ORIGIN_HEADER: &str = "_sg_origin_header";

/// Cluster name of the sending node, compared during trust classification.
pub const REMOTE_CLUSTER_NAME_HEADER: &str = "_sg_remotecn";

/// Sticky logical action class of the first request in a chain.
pub const INITIAL_ACTION_CLASS_HEADER: &str = "_sg_initial_action_class_header";

/// String headers attached to a transport request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportHeaders {
    inner: BTreeMap<String, String>,
}

impl TransportHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `name`, treating empty values as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(name.into(), value.into());
    }

    /// Insert only if no non-empty value is present yet. Returns true if the
    /// value was written.
    pub fn insert_if_absent(&mut self, name: &str, value: impl Into<String>) -> bool {
        if self.contains(name) {
            return false;
        }
        self.inner.insert(name.to_string(), value.into());
        true
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.inner.remove(name)
    }

    /// First header name carrying the private prefix, if any.
    pub fn first_private(&self) -> Option<&str> {
        self.inner
            .keys()
            .map(String::as_str)
            .find(|k| k.starts_with(PRIVATE_HEADER_PREFIX))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for TransportHeaders
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

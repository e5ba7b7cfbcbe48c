//! Trust classification of network peers.
//!
//! # Decision Table
//! ```text
//! principal?  evaluator says node?  cluster-name header == ours?  → Trust
//! no          -                     -                             → Untrusted
//! yes         no                    -                             → Untrusted
//! yes         yes                   yes                           → InterClusterTrusted
//! yes         yes                   no / absent                   → RemoteClusterTrusted
//! ```
//!
//! Classification is pure: the same request, channel and settings always
//! produce the same answer.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::schema::TransportConfig;
use crate::context::headers::REMOTE_CLUSTER_NAME_HEADER;
use crate::context::Trust;
use crate::support::{matches_any, normalize_dn, Pattern};
use crate::transport::channel::{PeerCertificate, TransportChannel};
use crate::transport::request::TransportRequest;

/// Policy deciding whether a verified peer is one of our nodes.
pub trait InterClusterRequestEvaluator: Send + Sync {
    fn is_inter_cluster(
        &self,
        request: &TransportRequest,
        local_certs: &[PeerCertificate],
        peer_certs: &[PeerCertificate],
        principal: &str,
    ) -> bool;
}

#[derive(Debug, Default)]
struct NodeSettings {
    nodes_dn: Vec<Pattern>,
    certificate_oid: Option<String>,
}

impl From<&TransportConfig> for NodeSettings {
    fn from(config: &TransportConfig) -> Self {
        Self {
            nodes_dn: config
                .nodes_dn
                .iter()
                .map(|dn| Pattern::new(normalize_dn(dn)))
                .collect(),
            certificate_oid: config.certificate_oid.clone(),
        }
    }
}

/// Default evaluator: recognises nodes by certificate DN pattern or by a
/// marker OID on the peer certificate.
pub struct NodesDnEvaluator {
    settings: ArcSwap<NodeSettings>,
}

impl NodesDnEvaluator {
    pub fn new(config: &TransportConfig) -> Self {
        Self {
            settings: ArcSwap::from_pointee(NodeSettings::from(config)),
        }
    }

    /// Apply reloaded node settings.
    pub fn update(&self, config: &TransportConfig) {
        self.settings.store(Arc::new(NodeSettings::from(config)));
        tracing::info!(nodes_dn = config.nodes_dn.len(), "Node recognition settings updated");
    }
}

impl InterClusterRequestEvaluator for NodesDnEvaluator {
    fn is_inter_cluster(
        &self,
        _request: &TransportRequest,
        _local_certs: &[PeerCertificate],
        peer_certs: &[PeerCertificate],
        principal: &str,
    ) -> bool {
        let settings = self.settings.load();

        if matches_any(&settings.nodes_dn, &normalize_dn(principal)) {
            return true;
        }

        match (&settings.certificate_oid, peer_certs.first()) {
            (Some(oid), Some(leaf)) => leaf.extension_oids.iter().any(|o| o == oid),
            _ => false,
        }
    }
}

/// Computes [`Trust`] for network requests.
#[derive(Clone)]
pub struct TrustClassifier {
    evaluator: Arc<dyn InterClusterRequestEvaluator>,
    cluster_name: String,
}

impl TrustClassifier {
    pub fn new(evaluator: Arc<dyn InterClusterRequestEvaluator>, cluster_name: impl Into<String>) -> Self {
        Self {
            evaluator,
            cluster_name: cluster_name.into(),
        }
    }

    pub fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    pub fn classify(&self, request: &TransportRequest, channel: &TransportChannel) -> Trust {
        let Some(principal) = channel.principal.as_deref() else {
            return Trust::Untrusted;
        };

        if !self.evaluator.is_inter_cluster(
            request,
            &channel.local_certificates,
            &channel.peer_certificates,
            principal,
        ) {
            tracing::trace!("Is not an inter cluster request");
            return Trust::Untrusted;
        }

        if request.headers.get(REMOTE_CLUSTER_NAME_HEADER) == Some(self.cluster_name.as_str()) {
            if !request.is_internal() {
                tracing::trace!(action = %request.action, "Is inter cluster request");
            }
            Trust::InterClusterTrusted
        } else {
            Trust::RemoteClusterTrusted
        }
    }
}

//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use cluster_guard::audit::{AuditCategory, AuditSink, RequestSummary};
use cluster_guard::auth::{AuthError, BackendAuthenticator};
use cluster_guard::context::headers::REMOTE_CLUSTER_NAME_HEADER;
use cluster_guard::context::Identity;
use cluster_guard::error::GuardError;
use cluster_guard::transport::{
    InterClusterRequestEvaluator, PeerCertificate, RequestInterceptor, TransportRequest, TrustClassifier,
};

pub const CLUSTER: &str = "prod";
pub const NODE_DN: &str = "CN=node-1.example.com,OU=ops,O=Example";
pub const CLIENT_DN: &str = "CN=kirk,OU=client,O=Example";

pub fn peer() -> SocketAddr {
    "10.0.0.7:9300".parse().unwrap()
}

/// Keeps every audit record for inspection.
#[derive(Default)]
pub struct RecordingAuditSink {
    records: Mutex<Vec<(AuditCategory, String)>>,
}

impl RecordingAuditSink {
    pub fn records(&self) -> Vec<(AuditCategory, String)> {
        self.records.lock().unwrap().clone()
    }

    pub fn categories(&self) -> Vec<AuditCategory> {
        self.records().into_iter().map(|(c, _)| c).collect()
    }

    fn push(&self, category: AuditCategory, action: &str) {
        self.records.lock().unwrap().push((category, action.to_string()));
    }
}

impl AuditSink for RecordingAuditSink {
    fn log_missing_privileges(&self, action: &str, _request: &RequestSummary) {
        self.push(AuditCategory::MissingPrivileges, action);
    }

    fn log_ssl_exception(&self, _request: &RequestSummary, _error: &GuardError, action: &str) {
        self.push(AuditCategory::SslException, action);
    }

    fn log_bad_headers(&self, _request: &RequestSummary, action: &str) {
        self.push(AuditCategory::BadHeaders, action);
    }

    fn log_protected_index_attempt(&self, _request: &RequestSummary, action: &str) {
        self.push(AuditCategory::ProtectedIndexAttempt, action);
    }
}

/// Returns a fixed answer and counts calls.
pub struct CountingAuthenticator {
    result: Option<Identity>,
    calls: AtomicUsize,
}

impl CountingAuthenticator {
    pub fn returning(result: Option<Identity>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackendAuthenticator for CountingAuthenticator {
    async fn authenticate(
        &self,
        _request: &TransportRequest,
        _principal: &str,
        _action: &str,
    ) -> Result<Option<Identity>, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.result.clone())
    }
}

/// Always fails with a backend fault.
pub struct FailingAuthenticator;

#[async_trait]
impl BackendAuthenticator for FailingAuthenticator {
    async fn authenticate(
        &self,
        _request: &TransportRequest,
        _principal: &str,
        _action: &str,
    ) -> Result<Option<Identity>, AuthError> {
        Err(AuthError::Unavailable("ldap down".into()))
    }
}

/// Node recognition with a fixed answer.
pub struct FixedEvaluator(pub bool);

impl InterClusterRequestEvaluator for FixedEvaluator {
    fn is_inter_cluster(
        &self,
        _request: &TransportRequest,
        _local_certs: &[PeerCertificate],
        _peer_certs: &[PeerCertificate],
        _principal: &str,
    ) -> bool {
        self.0
    }
}

pub struct Harness {
    pub interceptor: RequestInterceptor,
    pub audit: Arc<RecordingAuditSink>,
    pub authenticator: Arc<CountingAuthenticator>,
}

/// Interceptor whose peers are nodes iff `nodes` is true.
pub fn harness(nodes: bool, auth_result: Option<Identity>) -> Harness {
    let audit = Arc::new(RecordingAuditSink::default());
    let authenticator = Arc::new(CountingAuthenticator::returning(auth_result));
    let classifier = TrustClassifier::new(Arc::new(FixedEvaluator(nodes)), CLUSTER);
    let interceptor = RequestInterceptor::new(classifier, authenticator.clone(), audit.clone());
    Harness {
        interceptor,
        audit,
        authenticator,
    }
}

/// Request as sent by a node of our own cluster.
pub fn from_cluster_node(action: &str) -> TransportRequest {
    TransportRequest::new(action)
        .with_header(REMOTE_CLUSTER_NAME_HEADER, CLUSTER)
        .with_remote_address(peer())
}

/// Request as sent by an external transport client.
pub fn from_client(action: &str) -> TransportRequest {
    TransportRequest::new(action).with_remote_address(peer())
}

//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the default collaborators from a validated config
//! - Assemble interceptor, protected index guard and cursor guard
//! - Apply hot reloads to the parts that may change at runtime

use std::sync::Arc;

use crate::audit::{AuditSink, TracingAuditSink};
use crate::auth::{BackendAuthenticator, CertificateAuthenticator};
use crate::config::schema::GuardConfig;
use crate::privileges::ProtectedIndexGuard;
use crate::scroll::CursorOwnershipGuard;
use crate::transport::{
    InterClusterRequestEvaluator, NodesDnEvaluator, OutboundHeaders, RequestInterceptor, TrustClassifier,
};

/// Everything a node needs to guard its transport layer.
pub struct GuardRuntime {
    startup: GuardConfig,
    evaluator: Arc<NodesDnEvaluator>,
    authenticator: Arc<CertificateAuthenticator>,
    audit: Arc<TracingAuditSink>,
    pub interceptor: RequestInterceptor,
    pub protected_index: ProtectedIndexGuard,
    pub cursors: CursorOwnershipGuard,
    pub outbound: OutboundHeaders,
}

impl GuardRuntime {
    /// Assemble from a config that already passed validation.
    pub fn build(config: GuardConfig) -> Self {
        let evaluator = Arc::new(NodesDnEvaluator::new(&config.transport));
        let authenticator = Arc::new(CertificateAuthenticator::new(&config.authentication));
        let audit = Arc::new(TracingAuditSink::new(&config.audit));

        let sink: Arc<dyn AuditSink> = audit.clone();
        let backend: Arc<dyn BackendAuthenticator> = authenticator.clone();
        let policy: Arc<dyn InterClusterRequestEvaluator> = evaluator.clone();

        let classifier = TrustClassifier::new(policy, &config.cluster.name);
        let interceptor = RequestInterceptor::new(classifier, backend, Arc::clone(&sink));
        let protected_index = ProtectedIndexGuard::new(&config.protected_index, Arc::clone(&sink));
        let cursors = CursorOwnershipGuard::new(sink);
        let outbound = OutboundHeaders::new(&config.cluster.name);

        tracing::info!(
            cluster = %config.cluster.name,
            protected_index = %config.protected_index.name,
            filter_mode = config.protected_index.filter_mode,
            restore_enabled = config.protected_index.restore_enabled,
            nodes_dn = config.transport.nodes_dn.len(),
            principals = authenticator.len(),
            "Guard runtime assembled"
        );

        Self {
            startup: config,
            evaluator,
            authenticator,
            audit,
            interceptor,
            protected_index,
            cursors,
            outbound,
        }
    }

    /// The configuration the runtime was built from.
    pub fn startup_config(&self) -> &GuardConfig {
        &self.startup
    }

    /// Swap in dynamic settings. Returns the static settings that changed
    /// and were ignored.
    pub fn apply_reload(&self, config: &GuardConfig) -> Vec<&'static str> {
        self.evaluator.update(&config.transport);
        self.authenticator.update(&config.authentication);
        self.audit.update(&config.audit);

        let ignored = self.startup.static_changes(config);
        if !ignored.is_empty() {
            tracing::warn!(settings = ?ignored, "Static settings changed, restart required to apply");
        }
        ignored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_reports_static_changes() {
        let runtime = GuardRuntime::build(GuardConfig::default());

        let mut next = GuardConfig::default();
        next.transport.nodes_dn.push("CN=node-*".into());
        assert!(runtime.apply_reload(&next).is_empty());

        next.cluster.name = "other".into();
        assert_eq!(runtime.apply_reload(&next), vec!["cluster.name"]);
        assert_eq!(runtime.startup_config().cluster.name, "cluster");
    }
}

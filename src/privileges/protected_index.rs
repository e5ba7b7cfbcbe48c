//! Protected index evaluation.

use std::sync::Arc;

use crate::audit::{AuditSink, RequestSummary};
use crate::config::schema::ProtectedIndexConfig;
use crate::error::GuardError;
use crate::observability::metrics;
use crate::privileges::resolved::{IndicesRequest, ResolvedIndices};
use crate::support::{matches_any, Pattern};

/// Actions that structurally change an index.
const DENIED_ACTIONS: &[&str] = &[
    "indices:data/write*",
    "indices:admin/delete*",
    "indices:admin/mapping/delete*",
    "indices:admin/mapping/put*",
    "indices:admin/freeze*",
    "indices:admin/settings/update*",
    "indices:admin/aliases",
];

/// Additionally denied when the deployment cannot restore the index.
const DENIED_WITHOUT_RESTORE: &[&str] = &["indices:admin/close*", "cluster:admin/snapshot/restore*"];

/// Outcome for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtectedIndexDecision {
    Allow,
    Deny,
    /// Allowed after the protected index was removed from the targets.
    AllowWithFilteredTargets(Vec<String>),
}

impl ProtectedIndexDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProtectedIndexDecision::Allow => "allow",
            ProtectedIndexDecision::Deny => "deny",
            ProtectedIndexDecision::AllowWithFilteredTargets(_) => "filter",
        }
    }

    pub fn is_allowed(&self) -> bool {
        !matches!(self, ProtectedIndexDecision::Deny)
    }
}

/// Guards the security configuration index against regular callers.
pub struct ProtectedIndexGuard {
    index: String,
    filter_mode: bool,
    denied: Vec<Pattern>,
    audit: Arc<dyn AuditSink>,
}

impl ProtectedIndexGuard {
    pub fn new(config: &ProtectedIndexConfig, audit: Arc<dyn AuditSink>) -> Self {
        let mut denied: Vec<Pattern> = DENIED_ACTIONS.iter().copied().map(Pattern::from).collect();
        if !config.restore_enabled {
            denied.extend(DENIED_WITHOUT_RESTORE.iter().copied().map(Pattern::from));
        }

        Self {
            index: config.name.clone(),
            filter_mode: config.filter_mode,
            denied,
            audit,
        }
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn filter_mode(&self) -> bool {
        self.filter_mode
    }

    pub fn is_denied_action(&self, action: &str) -> bool {
        matches_any(&self.denied, action)
    }

    /// Decide on a request. Filtering rewrites `request.indices` and the
    /// cache flags are downgraded in place.
    pub fn evaluate(
        &self,
        action: &str,
        request: &mut IndicesRequest,
        resolved: &ResolvedIndices,
        summary: &RequestSummary,
    ) -> ProtectedIndexDecision {
        let decision = self.decide(action, request, resolved, summary);
        metrics::record_index_decision(decision.as_str());
        decision
    }

    /// Like [`Self::evaluate`] but maps a denial to an error.
    pub fn enforce(
        &self,
        action: &str,
        request: &mut IndicesRequest,
        resolved: &ResolvedIndices,
        summary: &RequestSummary,
    ) -> Result<(), GuardError> {
        match self.evaluate(action, request, resolved, summary) {
            ProtectedIndexDecision::Deny => Err(GuardError::ProtectedResourceDenied {
                action: action.to_string(),
                index: self.index.clone(),
            }),
            _ => Ok(()),
        }
    }

    fn decide(
        &self,
        action: &str,
        request: &mut IndicesRequest,
        resolved: &ResolvedIndices,
        summary: &RequestSummary,
    ) -> ProtectedIndexDecision {
        let explicit = resolved.contains(&self.index);
        let denied_action = self.is_denied_action(action);

        if explicit && denied_action {
            if self.filter_mode {
                let remaining = resolved.without(&self.index);
                if remaining.is_empty() {
                    self.deny(action, summary);
                    return ProtectedIndexDecision::Deny;
                }
                tracing::debug!(index = %self.index, action, "Filtered protected index from request");
                request.indices = remaining.clone();
                return ProtectedIndexDecision::AllowWithFilteredTargets(remaining);
            }
            self.deny(action, summary);
            return ProtectedIndexDecision::Deny;
        }

        if resolved.is_local_all() && denied_action {
            if self.filter_mode {
                let targets = vec!["*".to_string(), format!("-{}", self.index)];
                tracing::debug!(index = %self.index, action, "Excluded protected index from all-indices request");
                request.indices = targets.clone();
                return ProtectedIndexDecision::AllowWithFilteredTargets(targets);
            }
            self.deny(action, summary);
            return ProtectedIndexDecision::Deny;
        }

        if explicit || resolved.is_local_all() {
            tracing::debug!(index = %self.index, action, "Disable request cache and realtime");
            request.disable_cache_and_realtime();
        }

        ProtectedIndexDecision::Allow
    }

    fn deny(&self, action: &str, summary: &RequestSummary) {
        self.audit.log_protected_index_attempt(summary, action);
        tracing::warn!(
            index = %self.index,
            action,
            user = summary.user.as_deref().unwrap_or("<none>"),
            "Attempt to modify the protected index"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditCategory;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl AuditSink for Recorder {
        fn log_missing_privileges(&self, action: &str, _: &RequestSummary) {
            self.0.lock().unwrap().push(format!("{}:{}", AuditCategory::MissingPrivileges, action));
        }
        fn log_ssl_exception(&self, _: &RequestSummary, _: &GuardError, action: &str) {
            self.0.lock().unwrap().push(format!("{}:{}", AuditCategory::SslException, action));
        }
        fn log_bad_headers(&self, _: &RequestSummary, action: &str) {
            self.0.lock().unwrap().push(format!("{}:{}", AuditCategory::BadHeaders, action));
        }
        fn log_protected_index_attempt(&self, _: &RequestSummary, action: &str) {
            self.0.lock().unwrap().push(format!("{}:{}", AuditCategory::ProtectedIndexAttempt, action));
        }
    }

    fn build(filter_mode: bool, restore_enabled: bool) -> (ProtectedIndexGuard, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let config = ProtectedIndexConfig {
            filter_mode,
            restore_enabled,
            ..ProtectedIndexConfig::default()
        };
        (ProtectedIndexGuard::new(&config, recorder.clone()), recorder)
    }

    #[test]
    fn test_denied_patterns_depend_on_restore() {
        let (strict, _) = build(false, false);
        let (relaxed, _) = build(false, true);

        assert!(strict.is_denied_action("indices:data/write/index"));
        assert!(strict.is_denied_action("indices:admin/aliases"));
        assert!(!strict.is_denied_action("indices:admin/aliases/get"));
        assert!(strict.is_denied_action("cluster:admin/snapshot/restore"));
        assert!(strict.is_denied_action("indices:admin/close"));

        assert!(relaxed.is_denied_action("indices:data/write/bulk[s]"));
        assert!(!relaxed.is_denied_action("cluster:admin/snapshot/restore"));
        assert!(!relaxed.is_denied_action("indices:admin/close"));
    }

    #[test]
    fn test_all_indices_filter_pattern() {
        let (guard, recorder) = build(true, false);
        let mut request = IndicesRequest::new(["_all"]);

        let decision = guard.evaluate(
            "indices:admin/settings/update",
            &mut request,
            &ResolvedIndices::all(),
            &RequestSummary::default(),
        );

        let expected = vec!["*".to_string(), "-.sg-config".to_string()];
        assert_eq!(decision, ProtectedIndexDecision::AllowWithFilteredTargets(expected.clone()));
        assert_eq!(request.indices, expected);
        assert!(recorder.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_all_indices_deny() {
        let (guard, recorder) = build(false, false);
        let mut request = IndicesRequest::new(["*"]);

        let decision = guard.evaluate(
            "indices:admin/delete",
            &mut request,
            &ResolvedIndices::all(),
            &RequestSummary::default(),
        );

        assert_eq!(decision, ProtectedIndexDecision::Deny);
        assert_eq!(*recorder.0.lock().unwrap(), vec!["SG_INDEX_ATTEMPT:indices:admin/delete"]);
    }

    #[test]
    fn test_unrelated_request_untouched() {
        let (guard, _) = build(false, false);
        let mut request = IndicesRequest::new(["logs-1"]);
        let before = request.clone();

        let decision = guard.evaluate(
            "indices:data/write/index",
            &mut request,
            &ResolvedIndices::of(["logs-1"]),
            &RequestSummary::default(),
        );

        assert_eq!(decision, ProtectedIndexDecision::Allow);
        assert_eq!(request, before);
    }

    #[test]
    fn test_enforce_maps_deny() {
        let (guard, _) = build(false, false);
        let mut request = IndicesRequest::new([".sg-config"]);
        let err = guard
            .enforce(
                "indices:data/write/index",
                &mut request,
                &ResolvedIndices::of([".sg-config"]),
                &RequestSummary::default(),
            )
            .unwrap_err();
        assert!(matches!(err, GuardError::ProtectedResourceDenied { ref index, .. } if index == ".sg-config"));
    }
}

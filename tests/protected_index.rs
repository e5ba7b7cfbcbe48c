//! Protected index decisions as seen by a caller of the guard.

use std::sync::Arc;

use cluster_guard::audit::{AuditCategory, RequestSummary};
use cluster_guard::config::ProtectedIndexConfig;
use cluster_guard::privileges::{IndicesRequest, ProtectedIndexDecision, ProtectedIndexGuard, ResolvedIndices};

mod common;

use common::RecordingAuditSink;

fn guard(filter_mode: bool) -> (ProtectedIndexGuard, Arc<RecordingAuditSink>) {
    let audit = Arc::new(RecordingAuditSink::default());
    let config = ProtectedIndexConfig {
        filter_mode,
        ..ProtectedIndexConfig::default()
    };
    (ProtectedIndexGuard::new(&config, audit.clone()), audit)
}

fn summary(action: &str) -> RequestSummary {
    RequestSummary {
        action: action.to_string(),
        request_class: "IndexRequest".to_string(),
        user: Some("kirk".to_string()),
        ..RequestSummary::default()
    }
}

#[test]
fn test_write_to_protected_index_denied() {
    let (guard, audit) = guard(false);
    let action = "indices:data/write/index";
    let mut request = IndicesRequest::new([".sg-config"]);

    let decision = guard.evaluate(action, &mut request, &ResolvedIndices::of([".sg-config"]), &summary(action));

    assert_eq!(decision, ProtectedIndexDecision::Deny);
    assert_eq!(
        audit.records(),
        vec![(AuditCategory::ProtectedIndexAttempt, action.to_string())]
    );
}

#[test]
fn test_filter_mode_removes_protected_index() {
    let (guard, audit) = guard(true);
    let action = "indices:data/write/index";
    let mut request = IndicesRequest::new([".sg-config", "logs-1"]);

    let decision = guard.evaluate(
        action,
        &mut request,
        &ResolvedIndices::of([".sg-config", "logs-1"]),
        &summary(action),
    );

    assert_eq!(
        decision,
        ProtectedIndexDecision::AllowWithFilteredTargets(vec!["logs-1".to_string()])
    );
    assert_eq!(request.indices, vec!["logs-1"]);
    assert!(audit.records().is_empty());
}

#[test]
fn test_filter_mode_with_nothing_left_denies() {
    let (guard, audit) = guard(true);
    let action = "indices:data/write/index";
    let mut request = IndicesRequest::new([".sg-config"]);

    let decision = guard.evaluate(action, &mut request, &ResolvedIndices::of([".sg-config"]), &summary(action));

    assert_eq!(decision, ProtectedIndexDecision::Deny);
    assert_eq!(request.indices, vec![".sg-config"]);
    assert_eq!(audit.categories(), vec![AuditCategory::ProtectedIndexAttempt]);
}

#[test]
fn test_read_allowed_with_cache_disabled() {
    let (guard, audit) = guard(false);
    let action = "indices:data/read/search";
    let mut request = IndicesRequest::new([".sg-config"]);
    request.request_cache = Some(true);
    request.realtime = Some(true);

    let decision = guard.evaluate(action, &mut request, &ResolvedIndices::of([".sg-config"]), &summary(action));

    assert_eq!(decision, ProtectedIndexDecision::Allow);
    assert_eq!(request.request_cache, Some(false));
    assert_eq!(request.realtime, Some(false));
    assert!(audit.records().is_empty());
}

#[test]
fn test_read_across_all_indices_disables_cache() {
    let (guard, _) = guard(false);
    let action = "indices:data/read/search";
    let mut request = IndicesRequest::new(["*"]);

    let decision = guard.evaluate(action, &mut request, &ResolvedIndices::all(), &summary(action));

    assert_eq!(decision, ProtectedIndexDecision::Allow);
    assert_eq!(request.indices, vec!["*"]);
    assert_eq!(request.request_cache, Some(false));
}

#[test]
fn test_snapshot_restore_depends_on_deployment() {
    let action = "cluster:admin/snapshot/restore";
    let resolved = ResolvedIndices::of([".sg-config"]);

    let (strict, _) = guard(false);
    let mut request = IndicesRequest::new([".sg-config"]);
    assert_eq!(
        strict.evaluate(action, &mut request, &resolved, &summary(action)),
        ProtectedIndexDecision::Deny
    );

    let audit = Arc::new(RecordingAuditSink::default());
    let restorable = ProtectedIndexGuard::new(
        &ProtectedIndexConfig {
            restore_enabled: true,
            ..ProtectedIndexConfig::default()
        },
        audit.clone(),
    );
    let mut request = IndicesRequest::new([".sg-config"]);
    assert_eq!(
        restorable.evaluate(action, &mut request, &resolved, &summary(action)),
        ProtectedIndexDecision::Allow
    );
    assert_eq!(request.request_cache, Some(false));
    assert!(audit.records().is_empty());
}

#[test]
fn test_custom_index_name() {
    let audit = Arc::new(RecordingAuditSink::default());
    let guard = ProtectedIndexGuard::new(
        &ProtectedIndexConfig {
            name: "searchguard".to_string(),
            ..ProtectedIndexConfig::default()
        },
        audit,
    );
    let action = "indices:admin/mapping/put";

    let mut request = IndicesRequest::new([".sg-config"]);
    assert!(guard
        .evaluate(action, &mut request, &ResolvedIndices::of([".sg-config"]), &summary(action))
        .is_allowed());

    let mut request = IndicesRequest::new(["searchguard"]);
    assert!(!guard
        .evaluate(action, &mut request, &ResolvedIndices::of(["searchguard"]), &summary(action))
        .is_allowed());
}

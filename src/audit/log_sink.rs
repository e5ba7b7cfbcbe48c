//! Audit sink that writes structured records to the `audit` tracing target.

use std::collections::HashSet;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::audit::{AuditCategory, AuditSink, RequestSummary};
use crate::config::schema::AuditConfig;
use crate::error::GuardError;
use crate::observability::metrics;

#[derive(Debug, Default)]
struct Settings {
    enabled: bool,
    disabled: HashSet<AuditCategory>,
}

impl From<&AuditConfig> for Settings {
    fn from(config: &AuditConfig) -> Self {
        let disabled = config
            .disabled_categories
            .iter()
            .filter_map(|c| match c.parse::<AuditCategory>() {
                Ok(category) => Some(category),
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring unknown disabled audit category");
                    None
                }
            })
            .collect();
        Self {
            enabled: config.enabled,
            disabled,
        }
    }
}

/// Default audit sink.
///
/// Settings can be swapped at runtime by the config watcher.
pub struct TracingAuditSink {
    settings: ArcSwap<Settings>,
}

impl TracingAuditSink {
    pub fn new(config: &AuditConfig) -> Self {
        Self {
            settings: ArcSwap::from_pointee(Settings::from(config)),
        }
    }

    /// Apply a reloaded audit configuration.
    pub fn update(&self, config: &AuditConfig) {
        self.settings.store(Arc::new(Settings::from(config)));
        tracing::info!(enabled = config.enabled, "Audit settings updated");
    }

    fn is_enabled(&self, category: AuditCategory) -> bool {
        let settings = self.settings.load();
        settings.enabled && !settings.disabled.contains(&category)
    }

    fn emit(&self, category: AuditCategory, action: &str, request: &RequestSummary, detail: Option<&str>) {
        if !self.is_enabled(category) {
            return;
        }
        metrics::record_audit_event(category.as_str());
        tracing::warn!(
            target: "audit",
            category = category.as_str(),
            action,
            request_class = %request.request_class,
            remote_address = ?request.remote_address,
            user = request.user.as_deref().unwrap_or("<none>"),
            origin = request.origin.as_deref().unwrap_or("<none>"),
            detail = detail.unwrap_or(""),
            "audit event"
        );
    }
}

impl AuditSink for TracingAuditSink {
    fn log_missing_privileges(&self, action: &str, request: &RequestSummary) {
        self.emit(AuditCategory::MissingPrivileges, action, request, None);
    }

    fn log_ssl_exception(&self, request: &RequestSummary, error: &GuardError, action: &str) {
        let detail = error.to_string();
        self.emit(AuditCategory::SslException, action, request, Some(&detail));
    }

    fn log_bad_headers(&self, request: &RequestSummary, action: &str) {
        self.emit(AuditCategory::BadHeaders, action, request, None);
    }

    fn log_protected_index_attempt(&self, request: &RequestSummary, action: &str) {
        self.emit(AuditCategory::ProtectedIndexAttempt, action, request, None);
    }
}

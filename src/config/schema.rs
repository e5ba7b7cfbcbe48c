//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the guard.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct GuardConfig {
    /// Local cluster identity.
    pub cluster: ClusterConfig,

    /// Node recognition for inter-cluster trust.
    pub transport: TransportConfig,

    /// Protection of the security configuration index.
    pub protected_index: ProtectedIndexConfig,

    /// Certificate principal to identity mappings.
    pub authentication: AuthenticationConfig,

    /// Audit sink settings.
    pub audit: AuditConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Local cluster identity.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ClusterConfig {
    /// Cluster name, compared with the peer's cluster-name handshake header.
    pub name: String,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            name: "cluster".to_string(),
        }
    }
}

/// Settings for recognising our own nodes.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct TransportConfig {
    /// Wildcard patterns of node certificate DNs.
    pub nodes_dn: Vec<String>,

    /// Certificate extension OID that marks a node certificate.
    pub certificate_oid: Option<String>,
}

/// Protected index settings. Read once at start-up.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ProtectedIndexConfig {
    /// Name of the security configuration index.
    pub name: String,

    /// Strip the protected index from denied requests instead of rejecting.
    pub filter_mode: bool,

    /// Deployment supports restoring the index from snapshots.
    pub restore_enabled: bool,
}

impl Default for ProtectedIndexConfig {
    fn default() -> Self {
        Self {
            name: ".sg-config".to_string(),
            filter_mode: false,
            restore_enabled: false,
        }
    }
}

/// Default authentication backend settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AuthenticationConfig {
    pub principals: Vec<PrincipalMapping>,
}

/// Maps one certificate principal to an identity.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PrincipalMapping {
    /// Certificate subject DN.
    pub dn: String,

    /// Identity name.
    pub user: String,

    #[serde(default)]
    pub backend_roles: Vec<String>,
}

/// Audit sink settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AuditConfig {
    /// Write audit records at all.
    pub enabled: bool,

    /// Categories to suppress (e.g. "BAD_HEADERS").
    pub disabled_categories: Vec<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            disabled_categories: Vec::new(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

impl GuardConfig {
    /// Names of start-up-only settings that differ between two configs.
    pub fn static_changes(&self, other: &GuardConfig) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if self.cluster.name != other.cluster.name {
            changed.push("cluster.name");
        }
        if self.protected_index.name != other.protected_index.name {
            changed.push("protected_index.name");
        }
        if self.protected_index.filter_mode != other.protected_index.filter_mode {
            changed.push("protected_index.filter_mode");
        }
        if self.protected_index.restore_enabled != other.protected_index.restore_enabled {
            changed.push("protected_index.restore_enabled");
        }
        if self.observability != other.observability {
            changed.push("observability");
        }
        changed
    }
}

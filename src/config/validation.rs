//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject index names that would turn into patterns
//! - Check uniqueness of principal mappings
//! - Check referenced audit categories exist
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GuardConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::audit::AuditCategory;
use crate::config::schema::GuardConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GuardConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.cluster.name.trim().is_empty() {
        errors.push(ValidationError::new("cluster.name", "must not be empty"));
    }

    let index = &config.protected_index.name;
    if index.trim().is_empty() {
        errors.push(ValidationError::new("protected_index.name", "must not be empty"));
    } else if index.contains(['*', '?', ',']) || index.starts_with('-') {
        errors.push(ValidationError::new(
            "protected_index.name",
            format!("'{}' must be a concrete index name", index),
        ));
    }

    for (i, dn) in config.transport.nodes_dn.iter().enumerate() {
        if dn.trim().is_empty() {
            errors.push(ValidationError::new(format!("transport.nodes_dn[{}]", i), "must not be empty"));
        }
    }

    if let Some(oid) = &config.transport.certificate_oid {
        let well_formed = !oid.is_empty() && oid.split('.').all(|arc| !arc.is_empty() && arc.bytes().all(|b| b.is_ascii_digit()));
        if !well_formed {
            errors.push(ValidationError::new(
                "transport.certificate_oid",
                format!("'{}' is not a dotted numeric OID", oid),
            ));
        }
    }

    let mut seen = HashSet::new();
    for (i, mapping) in config.authentication.principals.iter().enumerate() {
        let field = format!("authentication.principals[{}]", i);
        if mapping.dn.trim().is_empty() {
            errors.push(ValidationError::new(format!("{}.dn", field), "must not be empty"));
        } else if !seen.insert(mapping.dn.as_str()) {
            errors.push(ValidationError::new(
                format!("{}.dn", field),
                format!("duplicate principal '{}'", mapping.dn),
            ));
        }
        if mapping.user.trim().is_empty() {
            errors.push(ValidationError::new(format!("{}.user", field), "must not be empty"));
        }
    }

    for category in &config.audit.disabled_categories {
        if let Err(e) = category.parse::<AuditCategory>() {
            errors.push(ValidationError::new("audit.disabled_categories", e));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

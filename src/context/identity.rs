//! Authenticated identity carried through the pipeline.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// An authenticated caller.
///
/// Opaque to the pipeline beyond equality and [`Identity::name`]. Two
/// identities are equal only if every field is equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    name: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    backend_roles: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    attributes: BTreeMap<String, String>,
}

impl Identity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            backend_roles: BTreeSet::new(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_backend_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.backend_roles.extend(roles.into_iter().map(Into::into));
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Display name, used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backend_roles(&self) -> &BTreeSet<String> {
        &self.backend_roles
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "User [name={}, backend_roles={:?}]", self.name, self.backend_roles)
    }
}

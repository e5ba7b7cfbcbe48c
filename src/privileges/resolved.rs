//! Index targets of a request.

use std::collections::BTreeSet;

/// Concrete indices a request resolves to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedIndices {
    indices: BTreeSet<String>,
    local_all: bool,
}

impl ResolvedIndices {
    pub fn of<I, S>(indices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            indices: indices.into_iter().map(Into::into).collect(),
            local_all: false,
        }
    }

    /// The request targets every index (`_all` or `*`).
    pub fn all() -> Self {
        Self {
            indices: BTreeSet::new(),
            local_all: true,
        }
    }

    pub fn is_local_all(&self) -> bool {
        self.local_all
    }

    pub fn contains(&self, index: &str) -> bool {
        self.indices.contains(index)
    }

    pub fn indices(&self) -> &BTreeSet<String> {
        &self.indices
    }

    /// Resolved indices other than `index`.
    pub fn without(&self, index: &str) -> Vec<String> {
        self.indices.iter().filter(|i| *i != index).cloned().collect()
    }
}

/// The mutable parts of an index-level request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicesRequest {
    /// Target expressions as sent by the caller.
    pub indices: Vec<String>,
    /// Query result cache flag; `None` means the index default.
    pub request_cache: Option<bool>,
    /// Realtime get flag; `None` means the action default.
    pub realtime: Option<bool>,
}

impl IndicesRequest {
    pub fn new<I, S>(indices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            indices: indices.into_iter().map(Into::into).collect(),
            request_cache: None,
            realtime: None,
        }
    }

    pub fn disable_cache_and_realtime(&mut self) {
        self.request_cache = Some(false);
        self.realtime = Some(false);
    }
}

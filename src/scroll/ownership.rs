use std::fmt;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use crate::audit::{AuditSink, RequestSummary};
use crate::context::{Identity, SecurityContext};
use crate::error::GuardError;
use crate::observability::metrics;

/// Identifier of a scroll cursor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CursorId(String);

impl CursorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CursorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CursorId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Who may continue a cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorOwnership {
    /// Created by a trusted local or inter-cluster request.
    LocallyAuthorized,
    /// Created by this identity, or by no identity at all.
    Identity(Option<Identity>),
}

impl CursorOwnership {
    pub fn from_context(ctx: &SecurityContext) -> Self {
        if ctx.is_locally_authorized() {
            CursorOwnership::LocallyAuthorized
        } else {
            CursorOwnership::Identity(ctx.identity().cloned())
        }
    }
}

/// Binds scroll cursors to their creator.
#[derive(Clone)]
pub struct CursorOwnershipGuard {
    records: Arc<DashMap<CursorId, CursorOwnership>>,
    audit: Arc<dyn AuditSink>,
}

impl CursorOwnershipGuard {
    pub fn new(audit: Arc<dyn AuditSink>) -> Self {
        Self {
            records: Arc::new(DashMap::new()),
            audit,
        }
    }

    /// Attach the ownership record when the first page is served.
    pub fn on_cursor_created(&self, id: CursorId, ctx: &SecurityContext) {
        let ownership = CursorOwnership::from_context(ctx);
        match self.records.entry(id) {
            Entry::Occupied(entry) => {
                tracing::warn!(cursor = %entry.key(), "Cursor already has an owner, keeping the first");
            }
            Entry::Vacant(entry) => {
                tracing::debug!(
                    cursor = %entry.key(),
                    locally_authorized = matches!(ownership, CursorOwnership::LocallyAuthorized),
                    user = ctx.user_name(),
                    "Cursor owner recorded"
                );
                entry.insert(ownership);
            }
        }
        metrics::set_open_cursors(self.records.len());
    }

    /// Check a continuation request against the cursor's owner.
    pub fn validate(&self, id: &CursorId, ctx: &SecurityContext, summary: &RequestSummary) -> Result<(), GuardError> {
        let ownership = self.records.get(id).map(|record| record.value().clone());

        let result = match ownership {
            Some(CursorOwnership::LocallyAuthorized) if ctx.is_locally_authorized() => Ok(()),
            Some(CursorOwnership::LocallyAuthorized) => {
                tracing::error!(cursor = %id, user = ctx.user_name(), "Wrong user in scroll context");
                Err(GuardError::CursorOwnershipMismatch)
            }
            Some(CursorOwnership::Identity(Some(owner))) => match ctx.identity() {
                Some(current) if *current == owner => Ok(()),
                _ => {
                    tracing::error!(
                        cursor = %id,
                        expected = %owner,
                        user = ctx.user_name(),
                        "Wrong user in scroll context"
                    );
                    Err(GuardError::CursorOwnershipMismatch)
                }
            },
            Some(CursorOwnership::Identity(None)) | None => {
                tracing::error!(cursor = %id, "No user in scroll context");
                Err(GuardError::NoCursorOwner)
            }
        };

        if result.is_err() {
            self.audit.log_missing_privileges(&summary.action, summary);
        }
        result
    }

    /// Release the record once the cursor is gone.
    pub fn on_cursor_closed(&self, id: &CursorId) -> Option<CursorOwnership> {
        let removed = self.records.remove(id).map(|(_, ownership)| ownership);
        metrics::set_open_cursors(self.records.len());
        removed
    }

    pub fn open_cursors(&self) -> usize {
        self.records.len()
    }
}

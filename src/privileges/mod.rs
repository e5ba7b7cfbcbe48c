//! Protection of the security configuration index.
//!
//! # Data Flow
//! ```text
//! action + IndicesRequest + ResolvedIndices (wildcards/aliases already expanded)
//!     → protected_index.rs
//!         explicit target + denied action → filter (filter_mode) | Deny + audit
//!         all indices     + denied action → "*,-<index>"       | Deny + audit
//!         touches index / all indices     → cache and realtime forced off
//!     → ProtectedIndexDecision
//! ```
//!
//! # Design Decisions
//! - Denied-pattern lists are fixed at construction from static settings
//! - Filtering rewrites the request's targets in place
//! - The cache downgrade also applies to requests that are allowed

pub mod protected_index;
pub mod resolved;

pub use protected_index::{ProtectedIndexDecision, ProtectedIndexGuard};
pub use resolved::{IndicesRequest, ResolvedIndices};

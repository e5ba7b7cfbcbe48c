//! Small shared primitives.
//!
//! # Design Decisions
//! - Pattern matching is glob-only (`*`, `?`); no regex so matching stays
//!   linear and predictable on the hot path
//! - Matchers are pure and side-effect free, safe to share across requests

pub mod dn;
pub mod wildcard;

pub use dn::normalize_dn;
pub use wildcard::{matches_any, Pattern};

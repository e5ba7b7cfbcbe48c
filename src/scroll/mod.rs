//! Scroll cursor ownership.
//!
//! # Data Flow
//! ```text
//! first page   → on_cursor_created(id, ctx)  → record: LocallyAuthorized | Identity(..)
//! next page    → validate(id, ctx)           → Ok | CursorOwnershipMismatch | NoCursorOwner
//! clear/expire → on_cursor_closed(id)        → record dropped
//! ```
//!
//! # Design Decisions
//! - Records are keyed by cursor id in a concurrent map
//! - A record has exactly one writer, the creating request
//! - Caller-facing mismatch errors never name the expected identity

mod ownership;

pub use ownership::{CursorId, CursorOwnership, CursorOwnershipGuard};

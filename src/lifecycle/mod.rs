//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Build collaborators → Assemble guards
//!
//! Reload (startup.rs):
//!     Config watcher → swap node settings, principals, audit filters
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT → broadcast → watcher and tasks stop
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then collaborators, then guards
//! - Static settings are fixed at startup; reload only touches dynamic ones

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
pub use startup::GuardRuntime;

//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GuardConfig (validated, immutable)
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → dynamic parts swapped into running components
//!       (node DNs, principal mappings, audit settings)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Protected index settings and cluster name are start-up only
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AuditConfig, AuthenticationConfig, GuardConfig, ObservabilityConfig, PrincipalMapping,
    ProtectedIndexConfig, TransportConfig,
};

//! Security interception for a cluster's internal transport layer.
//!
//! Every inbound transport request passes [`transport::RequestInterceptor`]
//! before business logic sees it. Index-level requests are then checked by
//! [`privileges::ProtectedIndexGuard`], and scroll continuations by
//! [`scroll::CursorOwnershipGuard`].

// Request pipeline
pub mod auth;
pub mod context;
pub mod transport;

// Resource guards
pub mod privileges;
pub mod scroll;

// Cross-cutting concerns
pub mod audit;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod support;

pub use config::schema::GuardConfig;
pub use context::{Identity, SecurityContext};
pub use error::GuardError;
pub use lifecycle::{GuardRuntime, Shutdown};
pub use transport::{Outcome, RequestInterceptor, TransportChannel, TransportRequest};

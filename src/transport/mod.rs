//! Internal transport interception.
//!
//! # Data Flow
//! ```text
//! Inbound request + channel facts (from the SSL layer)
//!     → channel.rs (channel type, principal, close signal, in-flight guard)
//!     → classifier.rs (node? same cluster? → Trust)
//!     → interceptor.rs (staged pipeline → Dispatched(ctx) | Rejected(err))
//!     → wrapped handler runs with the SecurityContext
//!
//! Outbound re-dispatch:
//!     SecurityContext → outbound.rs → headers on the next request
//! ```
//!
//! # Design Decisions
//! - Stages are plain sequential functions, not wrapped handlers
//! - Fail closed: any stage error ends the request
//! - Local channels skip authentication; their headers were produced by
//!   this node after an earlier authentication

pub mod channel;
pub mod classifier;
pub mod interceptor;
pub mod outbound;
pub mod request;

pub use channel::{ChannelCloser, InFlightTracker, PeerCertificate, TransportChannel};
pub use classifier::{InterClusterRequestEvaluator, NodesDnEvaluator, TrustClassifier};
pub use interceptor::{Outcome, RequestInterceptor};
pub use outbound::OutboundHeaders;
pub use request::{RequestKind, TransportRequest};

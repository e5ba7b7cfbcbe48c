//! Per-request spans.
//!
//! Each pipeline run gets a fresh request ID so every stage transition,
//! rejection and audit record of that run can be correlated.

use tracing::Span;
use uuid::Uuid;

/// Span covering one transport request from arrival to completion.
pub fn request_span(action: &str, channel: Option<&str>) -> Span {
    tracing::info_span!(
        "transport_request",
        request_id = %Uuid::new_v4(),
        action,
        channel = channel.unwrap_or("<none>"),
    )
}

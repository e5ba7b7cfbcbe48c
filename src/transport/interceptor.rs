//! Channel arrival state machine.
//!
//! # Stages
//! ```text
//! Arrived
//!   → classify_channel        unknown type            → Rejected(ChannelUnsupported)
//!   → [Local]  local_fast_path (decode forwarded headers, no authentication)
//!   → [Network] classify trust (TrustClassifier)
//!   → check_internal_action   internal/shard, not node → Rejected(InternalActionForbidden)
//!   → require_credential      no principal             → Rejected(MissingCredential)
//!   → resolve_identity
//!        trusted:   decode forwarded identity/address
//!        untrusted: reject private headers, authenticate, allow-list
//!   → stamp                   origin + sticky first action class
//! Dispatched(SecurityContext)
//! ```
//!
//! Every rejection writes exactly one audit record, except when the channel
//! closed underneath the pipeline. The in-flight guard taken by
//! [`RequestInterceptor::intercept`] is released on every exit path.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::Instrument;

use crate::audit::{self, AuditSink};
use crate::auth::{is_unauthenticated_action, BackendAuthenticator};
use crate::context::headers::{INITIAL_ACTION_CLASS_HEADER, ORIGIN_HEADER, REMOTE_ADDRESS_HEADER, USER_HEADER};
use crate::context::{ChannelKind, IdentityCodec, Origin, SecurityContext, Trust};
use crate::error::GuardError;
use crate::observability::{metrics, tracing::request_span};
use crate::transport::channel::{InFlightTracker, TransportChannel};
use crate::transport::classifier::TrustClassifier;
use crate::transport::request::TransportRequest;

/// Result of admitting a request.
#[derive(Debug)]
pub enum Outcome {
    /// The request may reach business logic with this context.
    Dispatched(SecurityContext),
    /// The request was refused. Already audited.
    Rejected(GuardError),
}

impl Outcome {
    pub fn is_dispatched(&self) -> bool {
        matches!(self, Outcome::Dispatched(_))
    }

    pub fn context(&self) -> Option<&SecurityContext> {
        match self {
            Outcome::Dispatched(ctx) => Some(ctx),
            Outcome::Rejected(_) => None,
        }
    }

    pub fn into_result(self) -> Result<SecurityContext, GuardError> {
        match self {
            Outcome::Dispatched(ctx) => Ok(ctx),
            Outcome::Rejected(err) => Err(err),
        }
    }
}

/// Authenticates and classifies every inbound transport request.
pub struct RequestInterceptor {
    classifier: TrustClassifier,
    authenticator: Arc<dyn BackendAuthenticator>,
    audit: Arc<dyn AuditSink>,
    codec: IdentityCodec,
    inflight: InFlightTracker,
}

impl RequestInterceptor {
    pub fn new(
        classifier: TrustClassifier,
        authenticator: Arc<dyn BackendAuthenticator>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            classifier,
            authenticator,
            audit,
            codec: IdentityCodec,
            inflight: InFlightTracker::new(),
        }
    }

    /// Pipelines currently running through [`Self::intercept`].
    pub fn inflight(&self) -> &InFlightTracker {
        &self.inflight
    }

    /// Run the pipeline and, if admitted, the wrapped handler.
    ///
    /// The handler owns the request and its context. If the channel closes
    /// first, the handler future is dropped and `ChannelClosed` returned.
    pub async fn intercept<F, Fut, T>(
        &self,
        request: TransportRequest,
        channel: &TransportChannel,
        handler: F,
    ) -> Result<T, GuardError>
    where
        F: FnOnce(TransportRequest, SecurityContext) -> Fut,
        Fut: Future<Output = Result<T, GuardError>>,
    {
        let span = request_span(&request.action, channel.channel_type.as_deref());

        async move {
            let _inflight = self.inflight.track();

            let ctx = self.admit(&request, channel).await.into_result()?;

            tokio::select! {
                result = handler(request, ctx) => result,
                _ = channel.closed() => {
                    tracing::debug!("Channel closed while handler was running");
                    Err(GuardError::ChannelClosed)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Run stages up to `Dispatched` or `Rejected`.
    pub async fn admit(&self, request: &TransportRequest, channel: &TransportChannel) -> Outcome {
        let mut ctx = SecurityContext::new(&request.action, request.kind.logical_class());
        ctx.set_suggest(request.kind.is_suggest());

        let label = channel_label(channel);
        match self.run_stages(request, channel, &mut ctx).await {
            Ok(()) => {
                metrics::record_request(label, "dispatched");
                tracing::trace!(
                    user = ctx.user_name(),
                    trust = ctx.trust().map(|t| t.as_str()).unwrap_or("<none>"),
                    "Request dispatched"
                );
                Outcome::Dispatched(ctx)
            }
            Err(err) => {
                metrics::record_request(label, "rejected");
                metrics::record_rejection(err.reason());
                if matches!(err, GuardError::ChannelClosed) {
                    tracing::debug!(action = %request.action, "Pipeline abandoned, channel closed");
                } else {
                    tracing::error!(
                        action = %request.action,
                        channel = label,
                        reason = err.reason(),
                        error = %err,
                        "Transport request rejected"
                    );
                    audit::record_rejection(self.audit.as_ref(), &err, &request.action, &request.summary(Some(&ctx)));
                }
                Outcome::Rejected(err)
            }
        }
    }

    async fn run_stages(
        &self,
        request: &TransportRequest,
        channel: &TransportChannel,
        ctx: &mut SecurityContext,
    ) -> Result<(), GuardError> {
        if channel.is_closed() {
            return Err(GuardError::ChannelClosed);
        }

        let kind = ChannelKind::from_channel_type(channel.channel_type.as_deref())?;
        ctx.set_channel_kind(kind);

        if kind == ChannelKind::Local {
            self.local_fast_path(request, ctx)?;
            self.stamp(request, ctx);
            return Ok(());
        }

        let trust = self.classifier.classify(request, channel);
        ctx.set_trust(trust);

        check_internal_action(request, trust)?;

        let principal = channel.principal.as_deref().ok_or_else(|| GuardError::MissingCredential {
            channel: kind.as_str().to_string(),
        })?;
        ctx.set_principal(principal);

        if trust.is_trusted() {
            self.resolve_forwarded(request, ctx)?;
        } else {
            self.authenticate(request, channel, principal, ctx).await?;
        }

        if ctx.origin().is_none() {
            ctx.set_origin(Origin::Transport);
        }
        self.stamp(request, ctx);
        Ok(())
    }

    /// In-process re-dispatch: take forwarded values verbatim.
    fn local_fast_path(&self, request: &TransportRequest, ctx: &mut SecurityContext) -> Result<(), GuardError> {
        self.decode_forwarded_identity(request, ctx)?;
        if let Some(address) = self.decode_forwarded_address(request)? {
            ctx.set_remote_address(address);
        }
        apply_origin_header(request, ctx)
    }

    /// Trusted node: identity was authenticated upstream.
    fn resolve_forwarded(&self, request: &TransportRequest, ctx: &mut SecurityContext) -> Result<(), GuardError> {
        // No forwarded identity is a node-to-node call without an end user.
        self.decode_forwarded_identity(request, ctx)?;

        match self.decode_forwarded_address(request)? {
            Some(address) => ctx.set_remote_address(address),
            None => {
                if let Some(address) = request.remote_address {
                    ctx.set_remote_address(address);
                }
            }
        }
        apply_origin_header(request, ctx)
    }

    /// Regular caller: private headers are forged, then authenticate.
    async fn authenticate(
        &self,
        request: &TransportRequest,
        channel: &TransportChannel,
        principal: &str,
        ctx: &mut SecurityContext,
    ) -> Result<(), GuardError> {
        if let Some(header) = request.headers.first_private() {
            return Err(GuardError::ForgedIdentityHeader {
                header: header.to_string(),
            });
        }

        let result = tokio::select! {
            result = self.authenticator.authenticate(request, principal, &request.action) => result,
            _ = channel.closed() => return Err(GuardError::ChannelClosed),
        };

        match result.map_err(|e| GuardError::AuthenticatorFailure(e.to_string()))? {
            Some(identity) => {
                let address = request.remote_address.ok_or(GuardError::MissingRemoteAddress)?;
                ctx.set_identity(identity);
                ctx.set_remote_address(address);
                Ok(())
            }
            None if is_unauthenticated_action(&request.action) => {
                tracing::debug!(action = %request.action, "Unauthenticated action allowed");
                if let Some(address) = request.remote_address {
                    ctx.set_remote_address(address);
                }
                Ok(())
            }
            None => Err(GuardError::AuthenticationFailed {
                action: request.action.clone(),
            }),
        }
    }

    fn decode_forwarded_identity(&self, request: &TransportRequest, ctx: &mut SecurityContext) -> Result<(), GuardError> {
        if let Some(value) = request.headers.get(USER_HEADER) {
            let identity = self.codec.decode_identity(value).map_err(|e| malformed(USER_HEADER, e))?;
            ctx.set_identity(identity);
        }
        Ok(())
    }

    fn decode_forwarded_address(&self, request: &TransportRequest) -> Result<Option<SocketAddr>, GuardError> {
        request
            .headers
            .get(REMOTE_ADDRESS_HEADER)
            .map(|value| {
                self.codec
                    .decode_address(value)
                    .map_err(|e| malformed(REMOTE_ADDRESS_HEADER, e))
            })
            .transpose()
    }

    /// Remember the first logical action class of the chain.
    fn stamp(&self, request: &TransportRequest, ctx: &mut SecurityContext) {
        let initial = request
            .headers
            .get(INITIAL_ACTION_CLASS_HEADER)
            .map(str::to_string)
            .unwrap_or_else(|| ctx.resolved_action_class().to_string());
        ctx.set_initial_action_class(initial);

        tracing::trace!(
            channel = ctx.channel_kind().map(|k| k.as_str()).unwrap_or("<none>"),
            origin = ctx.origin().map(|o| o.as_str()).unwrap_or("<none>"),
            initial_action_class = ctx.initial_action_class().unwrap_or(""),
            "Security context stamped"
        );
    }
}

/// Internal and shard-level actions may only come from trusted nodes.
fn check_internal_action(request: &TransportRequest, trust: Trust) -> Result<(), GuardError> {
    if !trust.is_trusted() && !request.is_handshake() && (request.is_internal() || request.is_shard_level()) {
        return Err(GuardError::InternalActionForbidden {
            action: request.action.clone(),
        });
    }
    Ok(())
}

fn apply_origin_header(request: &TransportRequest, ctx: &mut SecurityContext) -> Result<(), GuardError> {
    if let Some(value) = request.headers.get(ORIGIN_HEADER) {
        let origin = value.parse::<Origin>().map_err(|reason| GuardError::MalformedHeader {
            header: ORIGIN_HEADER.to_string(),
            reason,
        })?;
        ctx.set_origin(origin);
    }
    Ok(())
}

fn malformed(header: &str, err: impl std::fmt::Display) -> GuardError {
    GuardError::MalformedHeader {
        header: header.to_string(),
        reason: err.to_string(),
    }
}

fn channel_label(channel: &TransportChannel) -> &'static str {
    match channel.channel_type.as_deref() {
        Some("direct") => "direct",
        Some("netty") => "netty",
        _ => "unknown",
    }
}

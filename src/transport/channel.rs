//! Transport channel facts and request lifecycle tracking.
//!
//! # Responsibilities
//! - Carry what the SSL layer extracted (principal, certificates)
//! - Signal when the underlying channel closes
//! - Track in-flight pipelines with a guard released on every exit path

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use crate::observability::metrics;

/// Certificate facts extracted by the SSL layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PeerCertificate {
    /// Subject DN.
    pub subject: String,
    /// OIDs of the certificate's extensions (and SAN registered IDs).
    pub extension_oids: Vec<String>,
}

impl PeerCertificate {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            extension_oids: Vec::new(),
        }
    }

    pub fn with_oid(mut self, oid: impl Into<String>) -> Self {
        self.extension_oids.push(oid.into());
        self
    }
}

/// The channel a transport request arrived on.
#[derive(Debug, Clone)]
pub struct TransportChannel {
    /// Raw channel type reported by the transport (`direct`, `netty`).
    pub channel_type: Option<String>,
    /// Verified certificate principal, set by the SSL layer.
    pub principal: Option<String>,
    pub local_certificates: Vec<PeerCertificate>,
    pub peer_certificates: Vec<PeerCertificate>,
    closed_tx: Arc<watch::Sender<bool>>,
    closed_rx: watch::Receiver<bool>,
}

impl TransportChannel {
    pub fn new(channel_type: Option<&str>) -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            channel_type: channel_type.map(str::to_string),
            principal: None,
            local_certificates: Vec::new(),
            peer_certificates: Vec::new(),
            closed_tx: Arc::new(tx),
            closed_rx: rx,
        }
    }

    /// In-process channel.
    pub fn direct() -> Self {
        Self::new(Some("direct"))
    }

    /// Network channel; `principal` is what the SSL layer verified.
    pub fn netty(principal: Option<&str>) -> Self {
        let mut channel = Self::new(Some("netty"));
        channel.principal = principal.map(str::to_string);
        channel
    }

    pub fn with_peer_certificate(mut self, cert: PeerCertificate) -> Self {
        self.peer_certificates.push(cert);
        self
    }

    pub fn with_local_certificate(mut self, cert: PeerCertificate) -> Self {
        self.local_certificates.push(cert);
        self
    }

    /// Handle the transport uses to report that the connection went away.
    pub fn closer(&self) -> ChannelCloser {
        ChannelCloser {
            tx: Arc::clone(&self.closed_tx),
        }
    }

    pub fn is_closed(&self) -> bool {
        *self.closed_rx.borrow()
    }

    /// Resolves once the channel has been closed.
    pub async fn closed(&self) {
        let mut rx = self.closed_rx.clone();
        // The sender lives as long as `self`, so this only ends on close.
        let _ = rx.wait_for(|closed| *closed).await;
    }
}

/// Closes a [`TransportChannel`].
#[derive(Debug, Clone)]
pub struct ChannelCloser {
    tx: Arc<watch::Sender<bool>>,
}

impl ChannelCloser {
    pub fn close(&self) {
        self.tx.send_replace(true);
    }
}

/// Counts pipelines that have started but not finished.
#[derive(Debug, Clone, Default)]
pub struct InFlightTracker {
    active: Arc<AtomicUsize>,
}

impl InFlightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new pipeline run. The count drops when the guard does,
    /// including on panic or when the future is cancelled.
    pub fn track(&self) -> InFlightGuard {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        metrics::set_inflight(now);
        InFlightGuard {
            active: Arc::clone(&self.active),
        }
    }

    pub fn active_count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

/// Guard returned by [`InFlightTracker::track`].
#[derive(Debug)]
pub struct InFlightGuard {
    active: Arc<AtomicUsize>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let now = self.active.fetch_sub(1, Ordering::SeqCst) - 1;
        metrics::set_inflight(now);
        tracing::trace!(inflight = now, "Request pipeline finished");
    }
}

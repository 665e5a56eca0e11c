//! The peer transport contract, recast as explicit async events.
//!
//! No callback registration: a bound [`Endpoint`] yields incoming
//! [`Channel`]s, and each channel yields [`ChannelEvent`]s. State machines
//! consume these with ordinary `recv().await` loops instead of nested
//! callbacks.
//!
//! Errors carry a classification because the host's fallback decision
//! depends on it: only *connectivity* failures (network / server) warrant
//! the one-shot retry against the fallback configuration.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

/// Classified transport failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The requested address is already claimed. Fatal: never retried.
    #[error("address unavailable: {0}")]
    AddressUnavailable(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("server error: {0}")]
    ServerError(String),
    #[error("transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Whether this failure class triggers the one-shot fallback.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Network(_) | Self::ServerError(_))
    }
}

/// Where and how to reach the transport service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub host: String,
    pub port: u16,
    pub path: String,
    pub secure: bool,
    /// STUN-style discovery server URLs, part of the contract surface;
    /// the bundled transports do their own routing and ignore them.
    pub discovery_servers: Vec<String>,
}

/// Secondary port tried after a primary connectivity failure.
pub const FALLBACK_PORT: u16 = 9091;

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9090,
            path: "/".to_string(),
            secure: false,
            discovery_servers: vec![
                "stun:stun.l.google.com:19302".to_string(),
                "stun:stun1.l.google.com:19302".to_string(),
            ],
        }
    }
}

impl TransportConfig {
    /// The alternate configuration used after a primary connectivity
    /// failure. Same host and path, well-known secondary port.
    pub fn fallback(&self) -> Self {
        Self {
            port: FALLBACK_PORT,
            ..self.clone()
        }
    }

    /// Request path that claims/reaches `address` under this config.
    pub fn route(&self, address: &str) -> String {
        format!("{}/{address}", self.path.trim_end_matches('/'))
    }

    /// Full URL a participant dials to reach `address`.
    pub fn url_for(&self, address: &str) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        format!(
            "{scheme}://{}:{}{}",
            self.host,
            self.port,
            self.route(address)
        )
    }
}

/// Events observed on a bound endpoint.
#[derive(Debug)]
pub enum EndpointEvent {
    /// A participant opened a channel to this endpoint.
    Incoming(Channel),
    /// The endpoint is gone (listener error or service shutdown).
    Closed,
}

/// Events observed on one channel.
#[derive(Debug)]
pub enum ChannelEvent {
    /// The channel is ready; always delivered before any `Data`.
    Open,
    Data(Vec<u8>),
    Closed,
    Error(TransportError),
}

/// A bound transport endpoint owning an address.
///
/// Dropping (or [`close`](Endpoint::close)-ing) the endpoint releases the
/// address; already-open channels are unaffected and must be closed by
/// their owners.
#[derive(Debug)]
pub struct Endpoint {
    address: String,
    incoming: mpsc::Receiver<EndpointEvent>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Endpoint {
    pub fn new(
        address: String,
        incoming: mpsc::Receiver<EndpointEvent>,
        shutdown: oneshot::Sender<()>,
    ) -> Self {
        Self {
            address,
            incoming,
            shutdown: Some(shutdown),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// `None` once the transport side has shut down.
    pub async fn next_event(&mut self) -> Option<EndpointEvent> {
        self.incoming.recv().await
    }

    /// Release the address. Idempotent.
    pub fn close(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for Endpoint {
    fn drop(&mut self) {
        self.close();
    }
}

/// A bidirectional channel between one participant and one host.
#[derive(Debug)]
pub struct Channel {
    id: Uuid,
    outgoing: mpsc::Sender<Vec<u8>>,
    events: mpsc::Receiver<ChannelEvent>,
}

impl Channel {
    pub fn new(
        id: Uuid,
        outgoing: mpsc::Sender<Vec<u8>>,
        events: mpsc::Receiver<ChannelEvent>,
    ) -> Self {
        Self {
            id,
            outgoing,
            events,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Split into a cloneable send handle and the event stream, so a
    /// registry can hold the sender while an event loop drains events.
    pub fn split(self) -> (ChannelHandle, mpsc::Receiver<ChannelEvent>) {
        (
            ChannelHandle {
                id: self.id,
                outgoing: self.outgoing,
            },
            self.events,
        )
    }
}

/// The send half of a channel. Dropping every handle closes the channel
/// from this side.
#[derive(Debug, Clone)]
pub struct ChannelHandle {
    id: Uuid,
    outgoing: mpsc::Sender<Vec<u8>>,
}

impl ChannelHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Whether the other side can still receive.
    pub fn is_open(&self) -> bool {
        !self.outgoing.is_closed()
    }

    pub async fn send(&self, bytes: Vec<u8>) -> Result<(), TransportError> {
        self.outgoing
            .send(bytes)
            .await
            .map_err(|_| TransportError::Other("channel closed".into()))
    }

    /// Fire-and-forget send used for broadcast fan-out.
    pub fn try_send(&self, bytes: Vec<u8>) -> Result<(), TransportError> {
        use tokio::sync::mpsc::error::TrySendError;
        self.outgoing.try_send(bytes).map_err(|e| match e {
            TrySendError::Full(_) => TransportError::Other("outgoing buffer full".into()),
            TrySendError::Closed(_) => TransportError::Network("channel closed".into()),
        })
    }
}

/// A bidirectional data-channel service.
///
/// `bind` claims an address for a host; `connect` opens one channel to a
/// previously claimed address.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn bind(
        &self,
        address: &str,
        config: &TransportConfig,
    ) -> Result<Endpoint, TransportError>;

    async fn connect(
        &self,
        address: &str,
        config: &TransportConfig,
    ) -> Result<Channel, TransportError>;
}

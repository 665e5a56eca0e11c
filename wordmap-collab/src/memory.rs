//! In-process transport: addresses live in a shared map, channels are
//! paired mpsc pipes. Used by the test suite and loopback demos, and by
//! the fallback tests via injected bind faults.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, Mutex};
use uuid::Uuid;

use crate::transport::{
    Channel, ChannelEvent, Endpoint, EndpointEvent, Transport, TransportConfig, TransportError,
};

const PIPE_CAPACITY: usize = 64;

/// Hub-routed in-memory transport. Cheap to clone; clones share the hub.
#[derive(Clone, Default)]
pub struct MemoryTransport {
    rooms: Arc<Mutex<HashMap<String, mpsc::Sender<EndpointEvent>>>>,
    bind_faults: Arc<Mutex<VecDeque<TransportError>>>,
    bind_attempts: Arc<AtomicUsize>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an error to be returned by the next `bind` call. Each queued
    /// fault is consumed by exactly one attempt.
    pub async fn fail_next_bind(&self, error: TransportError) {
        self.bind_faults.lock().await.push_back(error);
    }

    /// Number of `bind` calls observed, including failed ones.
    pub fn bind_attempts(&self) -> usize {
        self.bind_attempts.load(Ordering::SeqCst)
    }

    /// Whether `address` is currently claimed.
    pub async fn is_bound(&self, address: &str) -> bool {
        self.rooms.lock().await.contains_key(address)
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn bind(
        &self,
        address: &str,
        _config: &TransportConfig,
    ) -> Result<Endpoint, TransportError> {
        self.bind_attempts.fetch_add(1, Ordering::SeqCst);

        if let Some(fault) = self.bind_faults.lock().await.pop_front() {
            return Err(fault);
        }

        let mut rooms = self.rooms.lock().await;
        if rooms.contains_key(address) {
            return Err(TransportError::AddressUnavailable(address.to_string()));
        }

        let (incoming_tx, incoming_rx) = mpsc::channel(PIPE_CAPACITY);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        rooms.insert(address.to_string(), incoming_tx);
        drop(rooms);

        // Release the address once the endpoint closes or is dropped.
        let rooms = self.rooms.clone();
        let released = address.to_string();
        tokio::spawn(async move {
            let _ = shutdown_rx.await;
            rooms.lock().await.remove(&released);
            log::debug!("memory transport released address {released}");
        });

        Ok(Endpoint::new(address.to_string(), incoming_rx, shutdown_tx))
    }

    async fn connect(
        &self,
        address: &str,
        _config: &TransportConfig,
    ) -> Result<Channel, TransportError> {
        let room_tx = self
            .rooms
            .lock()
            .await
            .get(address)
            .cloned()
            .ok_or_else(|| TransportError::Other(format!("no endpoint bound at {address}")))?;

        let id = Uuid::new_v4();
        let (to_host_tx, mut to_host_rx) = mpsc::channel::<Vec<u8>>(PIPE_CAPACITY);
        let (to_client_tx, mut to_client_rx) = mpsc::channel::<Vec<u8>>(PIPE_CAPACITY);
        let (host_events_tx, host_events_rx) = mpsc::channel(PIPE_CAPACITY);
        let (client_events_tx, client_events_rx) = mpsc::channel(PIPE_CAPACITY);

        // Each pump delivers Open first, then data, then Closed when the
        // writing side drops its sender.
        tokio::spawn(async move {
            if host_events_tx.send(ChannelEvent::Open).await.is_err() {
                return;
            }
            while let Some(data) = to_host_rx.recv().await {
                if host_events_tx.send(ChannelEvent::Data(data)).await.is_err() {
                    return;
                }
            }
            let _ = host_events_tx.send(ChannelEvent::Closed).await;
        });
        tokio::spawn(async move {
            if client_events_tx.send(ChannelEvent::Open).await.is_err() {
                return;
            }
            while let Some(data) = to_client_rx.recv().await {
                if client_events_tx
                    .send(ChannelEvent::Data(data))
                    .await
                    .is_err()
                {
                    return;
                }
            }
            let _ = client_events_tx.send(ChannelEvent::Closed).await;
        });

        let host_channel = Channel::new(id, to_client_tx, host_events_rx);
        room_tx
            .send(EndpointEvent::Incoming(host_channel))
            .await
            .map_err(|_| TransportError::Other(format!("endpoint at {address} closed")))?;

        Ok(Channel::new(id, to_host_tx, client_events_rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bind_claims_and_close_releases() {
        let transport = MemoryTransport::new();
        let config = TransportConfig::default();

        let mut endpoint = transport.bind("ROOM42", &config).await.unwrap();
        assert!(transport.is_bound("ROOM42").await);

        endpoint.close();
        tokio::task::yield_now().await;
        assert!(!transport.is_bound("ROOM42").await);
    }

    #[tokio::test]
    async fn double_bind_is_address_unavailable() {
        let transport = MemoryTransport::new();
        let config = TransportConfig::default();

        let _endpoint = transport.bind("ROOM42", &config).await.unwrap();
        let err = transport.bind("ROOM42", &config).await.unwrap_err();
        assert!(matches!(err, TransportError::AddressUnavailable(_)));
        assert_eq!(transport.bind_attempts(), 2);
    }

    #[tokio::test]
    async fn connect_to_unknown_address_fails() {
        let transport = MemoryTransport::new();
        let err = transport
            .connect("NOBODY", &TransportConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Other(_)));
    }

    #[tokio::test]
    async fn data_flows_both_ways() {
        let transport = MemoryTransport::new();
        let config = TransportConfig::default();

        let mut endpoint = transport.bind("ROOM42", &config).await.unwrap();
        let client = transport.connect("ROOM42", &config).await.unwrap();
        let (client_handle, mut client_events) = client.split();

        let host_channel = match endpoint.next_event().await {
            Some(EndpointEvent::Incoming(channel)) => channel,
            other => panic!("expected Incoming, got {other:?}"),
        };
        let (host_handle, mut host_events) = host_channel.split();
        assert_eq!(host_handle.id(), client_handle.id());

        assert!(matches!(host_events.recv().await, Some(ChannelEvent::Open)));
        assert!(matches!(
            client_events.recv().await,
            Some(ChannelEvent::Open)
        ));

        client_handle.send(b"hi host".to_vec()).await.unwrap();
        match host_events.recv().await {
            Some(ChannelEvent::Data(bytes)) => assert_eq!(bytes, b"hi host"),
            other => panic!("expected Data, got {other:?}"),
        }

        host_handle.send(b"hi client".to_vec()).await.unwrap();
        match client_events.recv().await {
            Some(ChannelEvent::Data(bytes)) => assert_eq!(bytes, b"hi client"),
            other => panic!("expected Data, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn dropping_one_side_closes_the_other() {
        let transport = MemoryTransport::new();
        let config = TransportConfig::default();

        let mut endpoint = transport.bind("ROOM42", &config).await.unwrap();
        let client = transport.connect("ROOM42", &config).await.unwrap();
        let (client_handle, _client_events) = client.split();

        let host_channel = match endpoint.next_event().await {
            Some(EndpointEvent::Incoming(channel)) => channel,
            other => panic!("expected Incoming, got {other:?}"),
        };
        let (_host_handle, mut host_events) = host_channel.split();
        assert!(matches!(host_events.recv().await, Some(ChannelEvent::Open)));

        drop(client_handle);
        assert!(matches!(
            host_events.recv().await,
            Some(ChannelEvent::Closed)
        ));
    }

    #[tokio::test]
    async fn injected_fault_consumed_once() {
        let transport = MemoryTransport::new();
        let config = TransportConfig::default();
        transport
            .fail_next_bind(TransportError::Network("relay down".into()))
            .await;

        let err = transport.bind("ROOM42", &config).await.unwrap_err();
        assert!(err.is_connectivity());
        // Fault consumed; second attempt succeeds.
        assert!(transport.bind("ROOM42", &config).await.is_ok());
    }
}

//! The hosting state machine.
//!
//! `Initializing → Open → {Error, Closed}`, with exactly one fallback
//! attempt on a classified connectivity failure:
//!
//! ```text
//! bind(code, primary) ──ok──► Open
//!        │
//!        ├─ AddressUnavailable ──► fatal (never retried)
//!        │
//!        └─ Network / ServerError ──► bind(code, fallback) ──ok──► Open
//!                                             │
//!                                             └─ any error ──► fatal
//! ```
//!
//! `Initializing` and the fatal states live inside [`HostSession::open`]'s
//! `Result`; a constructed session is already `Open`. While open, one event
//! loop task serializes everything: channel accept, registry mutation and
//! word aggregation all happen on that task, so the `WordSet` needs no
//! locking and submissions arriving together are folded in arrival order.

use tokio::sync::{mpsc, watch};
use uuid::Uuid;
use wordmap_core::{join_url, RoomCode, WordEntry, WordSet};

use crate::protocol::PeerMessage;
use crate::registry::ConnectionRegistry;
use crate::transport::{
    ChannelEvent, Endpoint, EndpointEvent, Transport, TransportConfig, TransportError,
};

/// Observable session state after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    Open,
    Closed,
}

/// Events surfaced to the hosting UI.
#[derive(Debug, Clone)]
pub enum HostEvent {
    /// The address is claimed; the code may now be shared.
    CodeReady(RoomCode),
    /// The aggregated set changed; payload is the full snapshot.
    CloudChanged(Vec<WordEntry>),
    /// A participant joined or left; payload is the open-channel count.
    ParticipantCountChanged(usize),
    /// Teardown finished. Terminal — the code is abandoned.
    Closed,
}

enum HostCommand {
    Close,
}

/// A live hosted session.
///
/// Dropping the session closes it: the command channel hangs up, the event
/// loop tears down the endpoint and every registered channel.
#[derive(Debug)]
pub struct HostSession {
    code: RoomCode,
    events: Option<mpsc::Receiver<HostEvent>>,
    commands: mpsc::Sender<HostCommand>,
    state: watch::Receiver<HostState>,
}

impl HostSession {
    /// Generate a code and open a session for it.
    pub async fn open(
        transport: &impl Transport,
        config: &TransportConfig,
    ) -> Result<Self, TransportError> {
        Self::open_with_code(transport, config, RoomCode::generate()).await
    }

    /// Open a session for a caller-chosen code.
    ///
    /// A connectivity failure on the primary configuration is retried
    /// exactly once against [`TransportConfig::fallback`], reusing the
    /// same code. An `AddressUnavailable` failure is returned untouched.
    pub async fn open_with_code(
        transport: &impl Transport,
        config: &TransportConfig,
        code: RoomCode,
    ) -> Result<Self, TransportError> {
        let endpoint = match transport.bind(code.as_str(), config).await {
            Ok(endpoint) => endpoint,
            Err(err) if err.is_connectivity() => {
                log::warn!("primary transport failed ({err}); trying fallback configuration");
                transport.bind(code.as_str(), &config.fallback()).await?
            }
            Err(err) => return Err(err),
        };

        let (events_tx, events_rx) = mpsc::channel(256);
        let (commands_tx, commands_rx) = mpsc::channel(4);
        let (state_tx, state_rx) = watch::channel(HostState::Open);

        let loop_code = code.clone();
        tokio::spawn(run_host_loop(
            endpoint, loop_code, events_tx, commands_rx, state_tx,
        ));

        Ok(Self {
            code,
            events: Some(events_rx),
            commands: commands_tx,
            state: state_rx,
        })
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn state(&self) -> HostState {
        *self.state.borrow()
    }

    /// The URL participants follow to join this session.
    pub fn join_url(&self, origin: &str) -> String {
        join_url(origin, &self.code)
    }

    /// Take the event receiver (can only be called once).
    pub fn take_event_rx(&mut self) -> Option<mpsc::Receiver<HostEvent>> {
        self.events.take()
    }

    /// Ask the event loop to tear down. Terminal; the code is abandoned.
    pub async fn close(&self) {
        let _ = self.commands.send(HostCommand::Close).await;
    }
}

async fn run_host_loop(
    mut endpoint: Endpoint,
    code: RoomCode,
    events_tx: mpsc::Sender<HostEvent>,
    mut commands: mpsc::Receiver<HostCommand>,
    state_tx: watch::Sender<HostState>,
) {
    let mut registry = ConnectionRegistry::new();
    let mut words = WordSet::new();
    let (peer_tx, mut peer_rx) = mpsc::channel::<(Uuid, ChannelEvent)>(256);

    log::info!("room {code} open");
    let _ = events_tx.send(HostEvent::CodeReady(code.clone())).await;

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                // None: every session handle dropped.
                Some(HostCommand::Close) | None => break,
            },

            endpoint_event = endpoint.next_event() => match endpoint_event {
                Some(EndpointEvent::Incoming(channel)) => {
                    let (handle, mut channel_events) = channel.split();
                    let id = handle.id();
                    log::info!("participant {id} connected to room {code}");
                    registry.insert(handle);
                    let _ = events_tx
                        .send(HostEvent::ParticipantCountChanged(registry.len()))
                        .await;

                    // Funnel this channel's events into the single loop.
                    let forward = peer_tx.clone();
                    tokio::spawn(async move {
                        while let Some(event) = channel_events.recv().await {
                            if forward.send((id, event)).await.is_err() {
                                break;
                            }
                        }
                    });
                }
                Some(EndpointEvent::Closed) | None => {
                    log::warn!("endpoint for room {code} closed");
                    break;
                }
            },

            // peer_tx is held by this scope, so recv() never yields None.
            Some((id, event)) = peer_rx.recv() => {
                handle_peer_event(id, event, &mut registry, &mut words, &events_tx).await;
            }
        }
    }

    // Teardown: release the address and hang up every channel.
    endpoint.close();
    registry.clear();
    state_tx.send_replace(HostState::Closed);
    let _ = events_tx.send(HostEvent::Closed).await;
    log::info!("room {code} closed");
}

async fn handle_peer_event(
    id: Uuid,
    event: ChannelEvent,
    registry: &mut ConnectionRegistry,
    words: &mut WordSet,
    events_tx: &mpsc::Sender<HostEvent>,
) {
    match event {
        ChannelEvent::Open => {
            // Late joiners converge immediately: the full current set,
            // before any incremental-looking traffic.
            match PeerMessage::UpdateCloud(words.snapshot()).encode() {
                Ok(bytes) => {
                    registry.send_to(&id, bytes);
                }
                Err(err) => log::error!("snapshot encode failed: {err}"),
            }
        }

        ChannelEvent::Data(bytes) => match PeerMessage::decode(&bytes) {
            Ok(PeerMessage::SubmitWord(text)) => {
                if words.submit(&text) {
                    let snapshot = words.snapshot();
                    match PeerMessage::UpdateCloud(snapshot.clone()).encode() {
                        Ok(encoded) => {
                            let delivered = registry.broadcast(&encoded);
                            log::debug!(
                                "broadcast {} words to {delivered} participants",
                                snapshot.len()
                            );
                        }
                        Err(err) => log::error!("snapshot encode failed: {err}"),
                    }
                    let _ = events_tx.send(HostEvent::CloudChanged(snapshot)).await;
                }
            }
            Ok(PeerMessage::UpdateCloud(_)) => {
                log::debug!("ignoring UPDATE_CLOUD from participant {id}");
            }
            Err(err) => log::warn!("undecodable message from participant {id}: {err}"),
        },

        ChannelEvent::Closed => {
            if registry.remove(&id).is_some() {
                log::info!("participant {id} left");
                let _ = events_tx
                    .send(HostEvent::ParticipantCountChanged(registry.len()))
                    .await;
            }
        }

        ChannelEvent::Error(err) => {
            // Peer-side failure: affects that entry only.
            log::warn!("participant {id} channel error: {err}");
            if registry.remove(&id).is_some() {
                let _ = events_tx
                    .send(HostEvent::ParticipantCountChanged(registry.len()))
                    .await;
            }
        }
    }
}

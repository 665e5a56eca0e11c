//! # wordmap-collab — live session synchronization
//!
//! One host, N participants, one shared word cloud:
//!
//! ```text
//! Participant A ──┐
//!                  ├── Endpoint (RoomCode) ── HostSession ── WordSet
//! Participant B ──┘                               │
//!                                                 │ UPDATE_CLOUD (full snapshot)
//!                                        ┌────────┴────────┐
//!                                        ▼                 ▼
//!                                  Participant A     Participant B
//! ```
//!
//! Participants send `SUBMIT_WORD`; the host folds each submission into
//! its authoritative [`wordmap_core::WordSet`] and fans the *entire*
//! updated set back out to every open connection. Snapshots are always
//! full-state, so a late joiner converges with a single message.
//!
//! ## Modules
//!
//! - [`protocol`] — the two-message JSON wire contract
//! - [`transport`] — async endpoint/channel abstraction with classified errors
//! - [`memory`] — in-process transport for tests and loopback demos
//! - [`ws`] — WebSocket transport (tokio-tungstenite)
//! - [`registry`] — host-side bookkeeping of open participant channels
//! - [`host`] — the hosting state machine with one-shot fallback
//! - [`client`] — the participant state machine

pub mod client;
pub mod host;
pub mod memory;
pub mod protocol;
pub mod registry;
pub mod transport;
pub mod ws;

pub use client::{JoinEvent, JoinSession, JoinState};
pub use host::{HostEvent, HostSession, HostState};
pub use memory::MemoryTransport;
pub use protocol::{PeerMessage, ProtocolError};
pub use registry::ConnectionRegistry;
pub use transport::{
    Channel, ChannelEvent, ChannelHandle, Endpoint, EndpointEvent, Transport, TransportConfig,
    TransportError,
};
pub use ws::WsTransport;

//! The participant state machine.
//!
//! `Connecting → Connected → {Disconnected, Error}`. Neither terminal
//! state reconnects — retrying means building a fresh session, exactly as
//! the join flow restarts from the URL.

use std::sync::Arc;

use tokio::sync::{mpsc, watch, RwLock};
use wordmap_core::{RoomCode, WordEntry, MAX_WORD_LEN};

use crate::protocol::{PeerMessage, ProtocolError};
use crate::transport::{ChannelEvent, ChannelHandle, Transport, TransportConfig, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinState {
    Connecting,
    Connected,
    /// The host closed the channel. Terminal.
    Disconnected,
    /// The transport reported a failure. Terminal.
    Error,
}

/// Events surfaced to the participant UI.
#[derive(Debug, Clone)]
pub enum JoinEvent {
    Connected,
    /// A fresh full snapshot replaced the cached word set.
    CloudUpdated(Vec<WordEntry>),
    Disconnected,
    Error(String),
}

/// A participant's session with the host.
///
/// Dropping the session hangs up the channel.
#[derive(Debug)]
pub struct JoinSession {
    code: RoomCode,
    handle: ChannelHandle,
    events: Option<mpsc::Receiver<JoinEvent>>,
    state: watch::Receiver<JoinState>,
    words: Arc<RwLock<Vec<WordEntry>>>,
}

impl JoinSession {
    /// Open one channel to the host identified by `code`.
    ///
    /// A transport error here is client-local: surfaced to this
    /// participant only, no automatic retry.
    pub async fn connect(
        transport: &impl Transport,
        code: RoomCode,
        config: &TransportConfig,
    ) -> Result<Self, TransportError> {
        log::info!("joining room {code}");
        let channel = transport.connect(code.as_str(), config).await?;
        let (handle, mut channel_events) = channel.split();

        let (events_tx, events_rx) = mpsc::channel(256);
        let (state_tx, state_rx) = watch::channel(JoinState::Connecting);
        let words = Arc::new(RwLock::new(Vec::new()));

        let cache = words.clone();
        tokio::spawn(async move {
            while let Some(event) = channel_events.recv().await {
                match event {
                    ChannelEvent::Open => {
                        state_tx.send_replace(JoinState::Connected);
                        if events_tx.send(JoinEvent::Connected).await.is_err() {
                            return;
                        }
                    }
                    ChannelEvent::Data(bytes) => match PeerMessage::decode(&bytes) {
                        Ok(PeerMessage::UpdateCloud(entries)) => {
                            // Wholesale replacement: last write wins.
                            *cache.write().await = entries.clone();
                            if events_tx
                                .send(JoinEvent::CloudUpdated(entries))
                                .await
                                .is_err()
                            {
                                return;
                            }
                        }
                        Ok(PeerMessage::SubmitWord(_)) => {
                            log::debug!("ignoring SUBMIT_WORD from host side");
                        }
                        Err(err) => log::warn!("undecodable message from host: {err}"),
                    },
                    ChannelEvent::Closed => {
                        state_tx.send_replace(JoinState::Disconnected);
                        let _ = events_tx.send(JoinEvent::Disconnected).await;
                        return;
                    }
                    ChannelEvent::Error(err) => {
                        log::warn!("connection error: {err}");
                        state_tx.send_replace(JoinState::Error);
                        let _ = events_tx.send(JoinEvent::Error(err.to_string())).await;
                        return;
                    }
                }
            }
            // Event stream ended without a close frame.
            state_tx.send_replace(JoinState::Disconnected);
            let _ = events_tx.send(JoinEvent::Disconnected).await;
        });

        Ok(Self {
            code,
            handle,
            events: Some(events_rx),
            state: state_rx,
            words,
        })
    }

    /// Submit one word.
    ///
    /// A no-op (`Ok(false)`) when the channel is not open or the text
    /// trims to empty. Input is clipped to [`MAX_WORD_LEN`] characters
    /// before it goes on the wire.
    pub async fn submit(&self, text: &str) -> Result<bool, ProtocolError> {
        let trimmed = text.trim();
        if trimmed.is_empty() || self.state() != JoinState::Connected {
            return Ok(false);
        }
        let clipped: String = trimmed.chars().take(MAX_WORD_LEN).collect();
        let bytes = PeerMessage::SubmitWord(clipped).encode()?;
        if self.handle.send(bytes).await.is_err() {
            // Channel raced shut under us; the Closed event will follow.
            return Ok(false);
        }
        Ok(true)
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    pub fn state(&self) -> JoinState {
        *self.state.borrow()
    }

    /// The locally cached word set from the latest snapshot.
    pub async fn words(&self) -> Vec<WordEntry> {
        self.words.read().await.clone()
    }

    /// Take the event receiver (can only be called once).
    pub fn take_event_rx(&mut self) -> Option<mpsc::Receiver<JoinEvent>> {
        self.events.take()
    }

    /// Leave the session by hanging up the channel.
    pub fn leave(self) {
        log::info!("leaving room {}", self.code);
    }
}

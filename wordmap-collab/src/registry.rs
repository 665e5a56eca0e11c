//! Host-side bookkeeping of open participant channels.
//!
//! Keyed by the channel's stable id so no raw references are held across
//! async boundaries. Insert-on-accept and remove-on-close are the only
//! mutations; a handle that fails to accept a send is removed on the spot,
//! so an entry is either present-and-open or absent.

use std::collections::HashMap;

use uuid::Uuid;

use crate::transport::ChannelHandle;

#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<Uuid, ChannelHandle>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, handle: ChannelHandle) {
        self.connections.insert(handle.id(), handle);
    }

    pub fn remove(&mut self, id: &Uuid) -> Option<ChannelHandle> {
        self.connections.remove(id)
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.connections.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn clear(&mut self) {
        self.connections.clear();
    }

    /// Send to a single connection. Returns `false` (and drops the entry)
    /// if the channel is gone.
    pub fn send_to(&mut self, id: &Uuid, bytes: Vec<u8>) -> bool {
        let Some(handle) = self.connections.get(id) else {
            return false;
        };
        if handle.try_send(bytes).is_err() {
            log::debug!("dropping dead connection {id}");
            self.connections.remove(id);
            return false;
        }
        true
    }

    /// Fire-and-forget fan-out of pre-encoded bytes to every open
    /// connection. Dead channels found along the way are removed.
    /// Returns the number of deliveries.
    pub fn broadcast(&mut self, bytes: &[u8]) -> usize {
        let mut dead = Vec::new();
        let mut delivered = 0;
        for (id, handle) in &self.connections {
            if handle.try_send(bytes.to_vec()).is_ok() {
                delivered += 1;
            } else {
                dead.push(*id);
            }
        }
        for id in dead {
            log::debug!("dropping dead connection {id}");
            self.connections.remove(&id);
        }
        delivered
    }
}

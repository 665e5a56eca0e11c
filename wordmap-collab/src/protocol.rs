//! The two-message wire contract.
//!
//! JSON tagged union, matching the join-page clients byte for byte:
//!
//! ```text
//! { "type": "SUBMIT_WORD",  "payload": "banana" }
//! { "type": "UPDATE_CLOUD", "payload": [{"id": "...", "text": "...", "count": 1}, ...] }
//! ```
//!
//! `UPDATE_CLOUD` always carries the full aggregated set in
//! first-appearance order — there is no incremental form.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wordmap_core::WordEntry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum PeerMessage {
    /// Participant → host: one raw submission.
    #[serde(rename = "SUBMIT_WORD")]
    SubmitWord(String),
    /// Host → participant: the full current word set.
    #[serde(rename = "UPDATE_CLOUD")]
    UpdateCloud(Vec<WordEntry>),
}

impl PeerMessage {
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(self).map_err(|e| ProtocolError::Encode(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        serde_json::from_slice(bytes).map_err(|e| ProtocolError::Decode(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("message encoding failed: {0}")]
    Encode(String),
    #[error("malformed message: {0}")]
    Decode(String),
}

//! # wordmap-core — session identity and word aggregation
//!
//! The host-authoritative data model for a live word cloud session:
//!
//! - [`room`] — short human-typeable room codes and join URLs
//! - [`words`] — the append-only, deduplicated word set
//! - [`palette`] — stable display colors for rendered words
//!
//! Everything here is pure state: no I/O, no async. The collab layer owns
//! when these transitions happen; this crate owns what they mean.

pub mod palette;
pub mod room;
pub mod words;

pub use palette::color_for;
pub use room::{join_url, RoomCode, RoomCodeError, ROOM_CODE_ALPHABET, ROOM_CODE_LEN};
pub use words::{WordEntry, WordSet, MAX_WORD_LEN};

//! # wordmap-layout — force-directed word cloud arrangement
//!
//! Turns an aggregated word set into a collision-free 2D arrangement with
//! font size proportional to frequency:
//!
//! ```text
//! counts ──► FontScale ──► TextMeasure ──► collision radii
//!                                             │
//!                        jittered start ──► Simulation (collide + center)
//!                                             │
//!                                             ▼
//!                                     Vec<CloudNode> (x, y)
//! ```
//!
//! The computation is a full re-run on every input change — nothing is
//! incremental, and two runs with different RNG seeds give different (but
//! equally valid) packings.
//!
//! - [`scale`] — linear count → font-size mapping
//! - [`measure`] — rendered-width estimation
//! - [`simulation`] — the relaxation loop (pairwise collision + centering)
//! - [`cloud`] — the top-level pipeline

pub mod cloud;
pub mod measure;
pub mod scale;
pub mod simulation;

pub use cloud::{layout, layout_seeded, CloudNode, JITTER_SPAN, RADIUS_SHRINK};
pub use measure::{HeuristicMeasure, TextMeasure};
pub use scale::{FontScale, MAX_FONT_SIZE, MIN_FONT_SIZE};
pub use simulation::{Body, Simulation};

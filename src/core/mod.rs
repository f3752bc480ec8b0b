//! Core data types for contaminant screening.
//!
//! - [`Panel`]: the ordered, immutable list of contaminants and their reference k-mer totals
//! - [`ReadHits`]: per-read hit counts handed over by the k-mer counting stage
//! - [`Mate`], [`Thresholds`]: read slot and classification thresholds
//!
//! A contaminant is addressed by its position in the panel everywhere in the
//! crate; the panel is the only place that maps positions back to ids.

pub mod hits;
pub mod panel;
pub mod types;

pub use hits::ReadHits;
pub use panel::{Contaminant, Panel, PanelError};
pub use types::{Mate, Thresholds};

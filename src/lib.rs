//! # contam-screen
//!
//! A library for screening sequencing reads against a panel of contaminant
//! references.
//!
//! The k-mer counting stage upstream produces, for every read, the number of
//! k-mers it shares with each contaminant. `contam-screen` turns those counts
//! into decisions and statistics:
//!
//! - **Read assignment**: each read goes to the contaminant with the most
//!   hits, the earliest panel member winning ties
//! - **Pair classification**: pairs are bucketed by whether both mates meet
//!   the per-read threshold and the pair meets the combined threshold
//! - **Retention**: the pairs passing the thresholds are counted as kept,
//!   optionally on unique k-mers only
//! - **Similarity**: shared and unique k-mer counts between panel members
//!
//! ## Example
//!
//! ```rust
//! use contam_screen::{ClassificationEngine, Contaminant, Panel, ReadHits, ScreenCounters};
//! use contam_screen::{Mate, StatsCalculator};
//!
//! let panel = Panel::new(vec![
//!     Contaminant::new("phiX", 5_386),
//!     Contaminant::new("ecoli", 4_641_652),
//! ])
//! .unwrap();
//!
//! let engine = ClassificationEngine::new(&panel);
//! let counters = ScreenCounters::new(panel.len(), 1000);
//!
//! let hits = ReadHits::from_hits(vec![12, 3], vec![12, 0]);
//! let assignment = engine.classify_read(&hits, counters.mate(Mate::R1));
//! assert_eq!(assignment.assigned, Some(0));
//!
//! let stats = StatsCalculator::new(&panel).calculate(&counters.into_tally());
//! assert_eq!(stats.reads[0].number_of_reads, 1);
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Panel, per-read hit counts and shared types
//! - [`classify`]: Read and pair classification
//! - [`stats`]: Shared counters, derived percentages and similarity analysis
//! - [`store`]: Read-only traversal of the k-mer membership store
//! - [`report`]: Console report, similarity files and progress snapshots
//! - [`parsing`]: Readers for the panel, hit-count and membership tables
//! - [`pipeline`]: Multi-threaded screening of hit-count streams
//! - [`cli`]: Command-line interface implementation

pub mod classify;
pub mod cli;
pub mod core;
pub mod parsing;
pub mod pipeline;
pub mod report;
pub mod stats;
pub mod store;
pub mod utils;

// Re-export commonly used types for convenience
pub use classify::{ClassificationConfig, ClassificationEngine, PairOutcome, ReadAssignment};
pub use core::{Contaminant, Mate, Panel, PanelError, ReadHits, Thresholds};
pub use pipeline::{ScreenConfig, ScreenRun};
pub use stats::{DerivedStats, ScreenCounters, ScreenTally, SimilarityAnalyzer, SimilarityMatrix, StatsCalculator};
pub use store::{KmerItem, KmerStore, MembershipTable};

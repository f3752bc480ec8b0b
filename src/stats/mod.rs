//! Counters shared by the workers and everything derived from them.
//!
//! - [`counters`]: live per-mate and per-pair tallies, one lock per scope
//! - [`derived`]: percentages computed once counting has finished
//! - [`observed`]: reference k-mers seen in the reads, per contaminant
//! - [`similarity`]: shared and unique k-mers between panel members

pub mod counters;
pub mod derived;
pub mod observed;
pub mod similarity;

pub use counters::{
    PairBuckets, PairCounters, PairTally, ReadCounters, ReadTally, ScreenCounters, ScreenTally,
};
pub use derived::{percent, DerivedStats, PairStats, ReadStats, Share, StatsCalculator};
pub use observed::ObservedKmers;
pub use similarity::{SimilarityAnalyzer, SimilarityMatrix};

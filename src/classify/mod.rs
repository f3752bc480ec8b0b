//! Read and pair classification against the contaminant panel.
//!
//! - [`ClassificationEngine::classify_read`]: assigns one mate to its top
//!   contaminant and records k1/kN/assignment counts for that mate
//! - [`ClassificationEngine::classify_pair`]: runs a raw-hit and a
//!   unique-hit pass over both mates and decides whether the pair is retained
//!
//! ## Read assignment
//!
//! The assigned contaminant is the one with the strictly greatest raw hit
//! count. On a tie the contaminant earlier in the panel keeps the read. A read
//! with no hits at all is unclassified.
//!
//! ## Pair outcome
//!
//! Per contaminant with mate counts `a`, `b` and `t = a + b`:
//!
//! | Tier | Condition |
//! |------|-----------|
//! | threshold met | `a >= threshold_read`, `b >= threshold_read`, `t >= threshold_overall` |
//! | both nonzero | no strong match so far, `a >= 1` and `b >= 1` |
//! | either nonzero | no strong match so far, exactly one of `a`, `b` is `>= 1` |
//!
//! The highest tier reached decides the bucket. A pair is retained when the
//! raw pass meets the threshold (unless `filter_unique` is set) or the unique
//! pass meets it.

pub mod engine;
pub mod pair;

pub use engine::{ClassificationConfig, ClassificationEngine, PairClassification, ReadAssignment};
pub use pair::PairOutcome;

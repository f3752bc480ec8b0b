//! Pair classification pass.
//!
//! A pass scans every contaminant once over one kind of hit count (raw or
//! unique) and settles on a single outcome for the pair. Strong matches beat
//! "both mates hit" which beats "one mate hit"; each tier keeps its own best
//! contaminant, chosen by the largest combined count with the earliest panel
//! position winning ties.

use crate::core::types::Thresholds;
use crate::stats::counters::PairBuckets;

/// Result of one pass over a read pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairOutcome {
    /// Both mates reach `threshold_read` and the pair reaches `threshold_overall`
    ThresholdMet(usize),
    /// No strong match, but both mates hit the contaminant
    BothNonzero(usize),
    /// No strong match and no both-mate hit, but one mate hit the contaminant
    EitherNonzero(usize),
    /// Neither mate hit any contaminant
    NoHits,
}

impl PairOutcome {
    pub fn contaminant(self) -> Option<usize> {
        match self {
            Self::ThresholdMet(i) | Self::BothNonzero(i) | Self::EitherNonzero(i) => Some(i),
            Self::NoHits => None,
        }
    }

    pub fn threshold_met(self) -> bool {
        matches!(self, Self::ThresholdMet(_))
    }

    /// Increment the pair-wide and per-contaminant bucket for this outcome
    pub(crate) fn record(self, buckets: &mut PairBuckets) {
        match self {
            Self::ThresholdMet(i) => {
                buckets.threshold_passed += 1;
                buckets.threshold_passed_by_contaminant[i] += 1;
            }
            Self::BothNonzero(i) => {
                buckets.both_nonzero += 1;
                buckets.both_nonzero_by_contaminant[i] += 1;
            }
            Self::EitherNonzero(i) => {
                buckets.either_nonzero += 1;
                buckets.either_nonzero_by_contaminant[i] += 1;
            }
            Self::NoHits => {}
        }
    }
}

/// Best contaminant by combined count; only a strictly greater count replaces it
#[derive(Debug, Default, Clone, Copy)]
struct Best {
    contaminant: usize,
    kmers: u64,
}

impl Best {
    fn offer(&mut self, contaminant: usize, kmers: u64) {
        if kmers > self.kmers {
            self.kmers = kmers;
            self.contaminant = contaminant;
        }
    }
}

/// Scan `n` contaminants with per-contaminant counts from `count_a`/`count_b`.
pub(crate) fn scan_pass<A, B>(
    n: usize,
    thresholds: Thresholds,
    count_a: A,
    count_b: B,
) -> PairOutcome
where
    A: Fn(usize) -> u32,
    B: Fn(usize) -> u32,
{
    let mut threshold_met = false;
    let mut strong = Best::default();
    let mut one_in_both = 0u32;
    let mut both = Best::default();
    let mut one_in_either = 0u32;
    let mut either = Best::default();

    for i in 0..n {
        let a = count_a(i);
        let b = count_b(i);
        let t = u64::from(a) + u64::from(b);

        if a >= thresholds.read && b >= thresholds.read && t >= u64::from(thresholds.overall) {
            strong.offer(i, t);
            threshold_met = true;
        } else if !threshold_met {
            if a >= 1 && b >= 1 {
                one_in_both += 1;
                both.offer(i, t);
            } else if a >= 1 || b >= 1 {
                one_in_either += 1;
                if one_in_both == 0 {
                    either.offer(i, t);
                }
            }
        }
    }

    if threshold_met {
        PairOutcome::ThresholdMet(strong.contaminant)
    } else if one_in_both > 0 {
        PairOutcome::BothNonzero(both.contaminant)
    } else if one_in_either > 0 {
        PairOutcome::EitherNonzero(either.contaminant)
    } else {
        PairOutcome::NoHits
    }
}

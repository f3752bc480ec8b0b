//! Percentages derived from finished counters.
//!
//! [`StatsCalculator`] is a pure function of the tallies it is given: it never
//! touches the live counters and running it twice on the same tally gives the
//! same result. Read-count percentages are only defined for a scope that saw
//! at least one read (or pair); such scopes are returned as `None` instead of
//! being divided by zero.

use serde::Serialize;

use crate::core::panel::Panel;
use crate::core::types::Mate;
use crate::stats::counters::{PairBuckets, PairTally, ReadTally, ScreenTally};

/// `100 * count / total`, or `0.0` when `total` is zero
#[inline]
#[must_use]
pub fn percent(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    {
        100.0 * count as f64 / total as f64
    }
}

/// A count and its percentage of the scope's denominator
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Share {
    pub count: u64,
    pub pc: f64,
}

impl Share {
    fn of(count: u64, total: u64) -> Self {
        Self {
            count,
            pc: percent(count, total),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContaminantReadStats {
    pub id: String,
    pub reference_kmers: u64,
    /// Reference k-mers seen, as a share of the reference total
    pub kmers_observed: Share,
    pub k1_reads: Share,
    pub k1_unique_reads: Share,
    pub kn_reads: Share,
    pub kn_unique_reads: Share,
    pub assigned_reads: Share,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadStats {
    pub mate: Mate,
    pub number_of_reads: u64,
    pub k1_reads: Share,
    pub kn_reads: Share,
    pub unclassified: Share,
    pub contaminants: Vec<ContaminantReadStats>,

    /// Reads per loaded k-mer count; the last bucket holds every larger count
    pub kmers_per_read: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketShares {
    pub threshold_passed: Share,
    pub both_nonzero: Share,
    pub either_nonzero: Share,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContaminantPairStats {
    pub id: String,
    pub reference_kmers: u64,
    pub kmers_observed: Share,
    pub raw: BucketShares,
    pub unique: BucketShares,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairStats {
    pub number_of_pairs: u64,
    pub raw: BucketShares,
    pub unique: BucketShares,
    pub contaminants: Vec<ContaminantPairStats>,
}

/// Everything the reporters print
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedStats {
    /// One entry per mate that saw reads, in mate order
    pub reads: Vec<ReadStats>,
    pub pairs: Option<PairStats>,
}

pub struct StatsCalculator<'a> {
    panel: &'a Panel,
}

impl<'a> StatsCalculator<'a> {
    pub fn new(panel: &'a Panel) -> Self {
        Self { panel }
    }

    pub fn calculate(&self, tally: &ScreenTally) -> DerivedStats {
        DerivedStats {
            reads: tally
                .active_mates()
                .into_iter()
                .filter_map(|mate| self.read_stats(mate, tally.mate(mate)))
                .collect(),
            pairs: self.pair_stats(&tally.pairs),
        }
    }

    /// Percentages for one mate; `None` when the mate saw no reads
    pub fn read_stats(&self, mate: Mate, read: &ReadTally) -> Option<ReadStats> {
        let reads = read.number_of_reads;
        if reads == 0 {
            return None;
        }

        let contaminants = self
            .panel
            .iter()
            .enumerate()
            .map(|(i, c)| ContaminantReadStats {
                id: c.id.clone(),
                reference_kmers: c.reference_kmers,
                kmers_observed: Share::of(read.kmers_observed[i], c.reference_kmers),
                k1_reads: Share::of(read.k1_by_contaminant[i], reads),
                k1_unique_reads: Share::of(read.k1_unique_by_contaminant[i], reads),
                kn_reads: Share::of(read.kn_by_contaminant[i], reads),
                kn_unique_reads: Share::of(read.kn_unique_by_contaminant[i], reads),
                assigned_reads: Share::of(read.assigned_by_contaminant[i], reads),
            })
            .collect();

        Some(ReadStats {
            mate,
            number_of_reads: reads,
            k1_reads: Share::of(read.k1_reads, reads),
            kn_reads: Share::of(read.kn_reads, reads),
            unclassified: Share::of(read.unclassified, reads),
            contaminants,
            kmers_per_read: read.kmers_per_read.clone(),
        })
    }

    /// Percentages for read pairs; `None` when no pairs were classified
    pub fn pair_stats(&self, pairs: &PairTally) -> Option<PairStats> {
        let total = pairs.number_of_pairs;
        if total == 0 {
            return None;
        }

        let contaminants = self
            .panel
            .iter()
            .enumerate()
            .map(|(i, c)| ContaminantPairStats {
                id: c.id.clone(),
                reference_kmers: c.reference_kmers,
                kmers_observed: Share::of(pairs.kmers_observed[i], c.reference_kmers),
                raw: contaminant_buckets(&pairs.raw, i, total),
                unique: contaminant_buckets(&pairs.unique, i, total),
            })
            .collect();

        Some(PairStats {
            number_of_pairs: total,
            raw: overall_buckets(&pairs.raw, total),
            unique: overall_buckets(&pairs.unique, total),
            contaminants,
        })
    }
}

fn overall_buckets(buckets: &PairBuckets, total: u64) -> BucketShares {
    BucketShares {
        threshold_passed: Share::of(buckets.threshold_passed, total),
        both_nonzero: Share::of(buckets.both_nonzero, total),
        either_nonzero: Share::of(buckets.either_nonzero, total),
    }
}

fn contaminant_buckets(buckets: &PairBuckets, i: usize, total: u64) -> BucketShares {
    BucketShares {
        threshold_passed: Share::of(buckets.threshold_passed_by_contaminant[i], total),
        both_nonzero: Share::of(buckets.both_nonzero_by_contaminant[i], total),
        either_nonzero: Share::of(buckets.either_nonzero_by_contaminant[i], total),
    }
}

//! Aggregate counters shared by the worker pool.
//!
//! Each mate owns a [`ReadCounters`] and pairs share one [`PairCounters`];
//! every structure sits behind its own lock so mate 1 and mate 2 updates never
//! contend. Counters only ever increase. Plain `*Tally` values are what comes
//! out: a snapshot while work is in flight, or the final state once the worker
//! pool has been joined.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::core::types::Mate;
use crate::utils::validation::histogram_bucket;

/// Per-mate counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadTally {
    pub number_of_reads: u64,

    /// Reads with at least one contaminant k-mer
    pub k1_reads: u64,
    pub k1_by_contaminant: Vec<u64>,
    /// k1 reads where this was the only contaminant hit
    pub k1_unique_by_contaminant: Vec<u64>,

    /// Reads loading at least `threshold_read` contaminant k-mers
    pub kn_reads: u64,
    pub kn_by_contaminant: Vec<u64>,
    pub kn_unique_by_contaminant: Vec<u64>,

    /// Reads whose top match is the contaminant
    pub assigned_by_contaminant: Vec<u64>,
    pub unclassified: u64,

    /// Reference k-mers of each contaminant seen in this mate's reads
    pub kmers_observed: Vec<u64>,

    /// Reads by contaminant k-mer count; the last bucket absorbs the overflow
    pub kmers_per_read: Vec<u64>,
}

impl ReadTally {
    pub fn new(n_contaminants: usize, histogram_max: usize) -> Self {
        Self {
            number_of_reads: 0,
            k1_reads: 0,
            k1_by_contaminant: vec![0; n_contaminants],
            k1_unique_by_contaminant: vec![0; n_contaminants],
            kn_reads: 0,
            kn_by_contaminant: vec![0; n_contaminants],
            kn_unique_by_contaminant: vec![0; n_contaminants],
            assigned_by_contaminant: vec![0; n_contaminants],
            unclassified: 0,
            kmers_observed: vec![0; n_contaminants],
            kmers_per_read: vec![0; histogram_max + 1],
        }
    }

    /// Count a read in the k-mers-per-read histogram
    pub fn record_kmers_loaded(&mut self, kmers_loaded: u32) {
        let max = self.kmers_per_read.len() - 1;
        self.kmers_per_read[histogram_bucket(kmers_loaded, max)] += 1;
    }

    pub fn n_contaminants(&self) -> usize {
        self.k1_by_contaminant.len()
    }
}

/// Outcome buckets of one pair classification pass (raw or unique hits)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairBuckets {
    pub threshold_passed: u64,
    pub threshold_passed_by_contaminant: Vec<u64>,
    pub both_nonzero: u64,
    pub both_nonzero_by_contaminant: Vec<u64>,
    pub either_nonzero: u64,
    pub either_nonzero_by_contaminant: Vec<u64>,
}

impl PairBuckets {
    pub fn new(n_contaminants: usize) -> Self {
        Self {
            threshold_passed: 0,
            threshold_passed_by_contaminant: vec![0; n_contaminants],
            both_nonzero: 0,
            both_nonzero_by_contaminant: vec![0; n_contaminants],
            either_nonzero: 0,
            either_nonzero_by_contaminant: vec![0; n_contaminants],
        }
    }
}

/// Cross-mate counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairTally {
    pub number_of_pairs: u64,
    pub raw: PairBuckets,
    pub unique: PairBuckets,

    /// Reference k-mers of each contaminant seen in either mate
    pub kmers_observed: Vec<u64>,
}

impl PairTally {
    pub fn new(n_contaminants: usize) -> Self {
        Self {
            number_of_pairs: 0,
            raw: PairBuckets::new(n_contaminants),
            unique: PairBuckets::new(n_contaminants),
            kmers_observed: vec![0; n_contaminants],
        }
    }
}

/// Lock-guarded counters for one mate
#[derive(Debug)]
pub struct ReadCounters {
    tally: Mutex<ReadTally>,
}

impl ReadCounters {
    pub fn new(n_contaminants: usize, histogram_max: usize) -> Self {
        Self {
            tally: Mutex::new(ReadTally::new(n_contaminants, histogram_max)),
        }
    }

    /// Apply `f` while holding the lock; all its increments land atomically
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut ReadTally),
    {
        f(&mut lock(&self.tally));
    }

    /// Copy of the current counts
    pub fn snapshot(&self) -> ReadTally {
        lock(&self.tally).clone()
    }

    pub fn into_tally(self) -> ReadTally {
        self.tally.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Lock-guarded counters for read pairs; one lock covers every field
#[derive(Debug)]
pub struct PairCounters {
    tally: Mutex<PairTally>,
}

impl PairCounters {
    pub fn new(n_contaminants: usize) -> Self {
        Self {
            tally: Mutex::new(PairTally::new(n_contaminants)),
        }
    }

    /// Apply `f` while holding the lock; all its increments land atomically
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut PairTally),
    {
        f(&mut lock(&self.tally));
    }

    pub fn snapshot(&self) -> PairTally {
        lock(&self.tally).clone()
    }

    pub fn into_tally(self) -> PairTally {
        self.tally.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Counters are monotone and an update never leaves one half-applied, so a
/// poisoned lock still guards consistent data.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The aggregation context for one run: both mates plus pairs.
///
/// Created once, shared by reference across workers, and consumed with
/// [`ScreenCounters::into_tally`] after the workers are joined.
#[derive(Debug)]
pub struct ScreenCounters {
    reads: [ReadCounters; 2],
    pairs: PairCounters,
}

impl ScreenCounters {
    pub fn new(n_contaminants: usize, histogram_max: usize) -> Self {
        Self {
            reads: [
                ReadCounters::new(n_contaminants, histogram_max),
                ReadCounters::new(n_contaminants, histogram_max),
            ],
            pairs: PairCounters::new(n_contaminants),
        }
    }

    pub fn mate(&self, mate: Mate) -> &ReadCounters {
        &self.reads[mate.index()]
    }

    pub fn pairs(&self) -> &PairCounters {
        &self.pairs
    }

    /// Point-in-time copy for progress reporting.
    ///
    /// Each structure is copied under its own lock, so the three parts may be
    /// a few reads apart from each other.
    pub fn snapshot(&self) -> ScreenTally {
        ScreenTally {
            reads: [self.reads[0].snapshot(), self.reads[1].snapshot()],
            pairs: self.pairs.snapshot(),
        }
    }

    pub fn into_tally(self) -> ScreenTally {
        let [r1, r2] = self.reads;
        ScreenTally {
            reads: [r1.into_tally(), r2.into_tally()],
            pairs: self.pairs.into_tally(),
        }
    }
}

/// Final (or snapshot) counts of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScreenTally {
    pub reads: [ReadTally; 2],
    pub pairs: PairTally,
}

impl ScreenTally {
    pub fn mate(&self, mate: Mate) -> &ReadTally {
        &self.reads[mate.index()]
    }

    /// Mates that saw at least one read, in mate order
    pub fn active_mates(&self) -> Vec<Mate> {
        Mate::ALL
            .into_iter()
            .filter(|m| self.mate(*m).number_of_reads > 0)
            .collect()
    }
}

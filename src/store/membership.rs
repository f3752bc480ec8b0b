use crate::core::types::Mate;

use super::{KmerItem, KmerStore};

const WORD_BITS: usize = 64;

/// One k-mer with its contaminant membership bits and per-mate observation flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipEntry {
    kmer: String,
    members: Vec<u64>,
    observed: [bool; 2],
}

impl MembershipEntry {
    /// An entry sized for a panel of `n_contaminants`, with no members yet
    pub fn new(kmer: impl Into<String>, n_contaminants: usize) -> Self {
        Self {
            kmer: kmer.into(),
            members: vec![0; n_contaminants.div_ceil(WORD_BITS)],
            observed: [false; 2],
        }
    }

    #[must_use]
    pub fn with_member(mut self, contaminant: usize) -> Self {
        self.set_member(contaminant);
        self
    }

    #[must_use]
    pub fn with_observed(mut self, mate: Mate) -> Self {
        self.mark_observed(mate);
        self
    }

    /// Set the membership bit of `contaminant`; indices beyond the panel are ignored
    pub fn set_member(&mut self, contaminant: usize) {
        if let Some(word) = self.members.get_mut(contaminant / WORD_BITS) {
            *word |= 1 << (contaminant % WORD_BITS);
        }
    }

    pub fn mark_observed(&mut self, mate: Mate) {
        self.observed[mate.index()] = true;
    }

    pub fn kmer(&self) -> &str {
        &self.kmer
    }

    /// Number of contaminants this k-mer belongs to
    pub fn member_count(&self) -> u32 {
        self.members.iter().map(|w| w.count_ones()).sum()
    }
}

impl KmerItem for MembershipEntry {
    fn has_membership(&self, contaminant: usize) -> bool {
        self.members
            .get(contaminant / WORD_BITS)
            .is_some_and(|word| word & (1 << (contaminant % WORD_BITS)) != 0)
    }

    fn observed_in(&self, mate: Mate) -> bool {
        self.observed[mate.index()]
    }
}

/// In-memory k-mer store
#[derive(Debug, Clone, Default)]
pub struct MembershipTable {
    n_contaminants: usize,
    entries: Vec<MembershipEntry>,
}

impl MembershipTable {
    pub fn new(n_contaminants: usize) -> Self {
        Self {
            n_contaminants,
            entries: Vec::new(),
        }
    }

    /// Entry builder sized for this table's panel
    pub fn entry(&self, kmer: impl Into<String>) -> MembershipEntry {
        MembershipEntry::new(kmer, self.n_contaminants)
    }

    pub fn insert(&mut self, entry: MembershipEntry) {
        self.entries.push(entry);
    }

    pub fn n_contaminants(&self) -> usize {
        self.n_contaminants
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KmerStore for MembershipTable {
    type Item = MembershipEntry;

    fn visit<F>(&self, mut visit: F)
    where
        F: FnMut(&Self::Item),
    {
        for entry in &self.entries {
            visit(entry);
        }
    }
}

use crate::core::types::Mate;
use crate::stats::counters::ScreenTally;
use crate::store::{KmerItem, KmerStore};

/// Reference k-mers of each contaminant that showed up in the reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedKmers {
    pub by_mate: [Vec<u64>; 2],
    pub either_mate: Vec<u64>,
}

impl ObservedKmers {
    /// Count, per contaminant, the stored k-mers flagged as observed
    pub fn tally<S: KmerStore>(store: &S, n_contaminants: usize) -> Self {
        let mut observed = Self {
            by_mate: [vec![0; n_contaminants], vec![0; n_contaminants]],
            either_mate: vec![0; n_contaminants],
        };

        store.visit(|item| {
            let r1 = item.observed_in(Mate::R1);
            let r2 = item.observed_in(Mate::R2);
            if !(r1 || r2) {
                return;
            }
            for i in (0..n_contaminants).filter(|&i| item.has_membership(i)) {
                if r1 {
                    observed.by_mate[0][i] += 1;
                }
                if r2 {
                    observed.by_mate[1][i] += 1;
                }
                observed.either_mate[i] += 1;
            }
        });

        observed
    }

    /// Copy the counts into the `kmers_observed` fields of a finished tally
    pub fn apply_to(&self, tally: &mut ScreenTally) {
        for mate in Mate::ALL {
            tally.reads[mate.index()]
                .kmers_observed
                .clone_from(&self.by_mate[mate.index()]);
        }
        tally.pairs.kmers_observed.clone_from(&self.either_mate);
    }
}

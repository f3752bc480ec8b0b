use serde::Serialize;

use crate::classify::pair::{scan_pass, PairOutcome};
use crate::core::hits::ReadHits;
use crate::core::panel::Panel;
use crate::core::types::Thresholds;
use crate::stats::counters::{PairCounters, ReadCounters};

/// Contaminants a single read was assigned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadAssignment {
    /// Top match by raw hits, `None` when unclassified
    pub assigned: Option<usize>,

    /// Top match by unique hits, `None` when no unique hit exists
    pub unique_assigned: Option<usize>,
}

/// Both passes of a pair classification and the retention decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairClassification {
    pub raw: PairOutcome,
    pub unique: PairOutcome,
    pub retain: bool,
}

/// Configuration for the classification engine
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassificationConfig {
    pub thresholds: Thresholds,

    /// Retain a pair only on a unique-k-mer threshold match
    pub filter_unique: bool,
}

/// Per-read and per-pair decision logic.
///
/// Decisions are computed from the caller's own hit counts; only the final
/// increments take the counters lock.
pub struct ClassificationEngine<'a> {
    panel: &'a Panel,
    config: ClassificationConfig,
}

impl<'a> ClassificationEngine<'a> {
    pub fn new(panel: &'a Panel) -> Self {
        Self {
            panel,
            config: ClassificationConfig::default(),
        }
    }

    pub fn with_config(panel: &'a Panel, config: ClassificationConfig) -> Self {
        Self { panel, config }
    }

    /// Classify one mate and record it in that mate's counters
    pub fn classify_read(&self, hits: &ReadHits, counters: &ReadCounters) -> ReadAssignment {
        let n = self.panel.len();
        let threshold = self.config.thresholds.read;
        let assignment = ReadAssignment {
            assigned: strongest(n, |i| hits.hits(i)),
            unique_assigned: strongest(n, |i| hits.unique_hits(i)),
        };
        let single_contaminant = hits.contaminants_detected == 1;

        counters.update(|tally| {
            tally.number_of_reads += 1;
            tally.record_kmers_loaded(hits.kmers_loaded);

            for i in 0..n {
                if hits.hits(i) > 0 {
                    tally.k1_by_contaminant[i] += 1;
                    if single_contaminant {
                        tally.k1_unique_by_contaminant[i] += 1;
                    }
                }
            }
            // Gated on the same quantity as kN so every kN read is also a k1 read.
            if hits.kmers_loaded > 0 {
                tally.k1_reads += 1;
            }

            match assignment.assigned {
                Some(i) => tally.assigned_by_contaminant[i] += 1,
                None => tally.unclassified += 1,
            }

            // The read-level gate is inclusive, the per-contaminant test strict.
            if hits.kmers_loaded >= threshold {
                for i in 0..n {
                    if hits.hits(i) > threshold {
                        tally.kn_by_contaminant[i] += 1;
                        if single_contaminant {
                            tally.kn_unique_by_contaminant[i] += 1;
                        }
                    }
                }
                tally.kn_reads += 1;
            }
        });

        assignment
    }

    /// Classify a read pair, record both passes and return whether to retain it
    pub fn classify_pair(&self, a: &ReadHits, b: &ReadHits, counters: &PairCounters) -> bool {
        let result = self.decide_pair(a, b);

        counters.update(|tally| {
            tally.number_of_pairs += 1;
            result.raw.record(&mut tally.raw);
            result.unique.record(&mut tally.unique);
        });

        result.retain
    }

    /// Pair decision without touching any counters
    pub fn decide_pair(&self, a: &ReadHits, b: &ReadHits) -> PairClassification {
        let n = self.panel.len();
        let thresholds = self.config.thresholds;

        let raw = scan_pass(n, thresholds, |i| a.hits(i), |i| b.hits(i));
        let unique = scan_pass(n, thresholds, |i| a.unique_hits(i), |i| b.unique_hits(i));
        let retain = (raw.threshold_met() && !self.config.filter_unique) || unique.threshold_met();

        PairClassification {
            raw,
            unique,
            retain,
        }
    }
}

/// Contaminant with the strictly greatest non-zero count; the first one
/// reached keeps ownership on ties.
fn strongest<F>(n: usize, count: F) -> Option<usize>
where
    F: Fn(usize) -> u32,
{
    let mut best: Option<(usize, u32)> = None;
    for i in 0..n {
        let c = count(i);
        if c > best.map_or(0, |(_, k)| k) {
            best = Some((i, c));
        }
    }
    best.map(|(i, _)| i)
}

//! Parallel screening of hit-count streams.
//!
//! The calling thread reads hit records and sends them in batches over a
//! bounded channel to a pool of scoped worker threads. Every worker shares
//! one [`ScreenCounters`]; the scope join is the barrier after which the
//! counters are consumed into a [`ScreenTally`] for statistics and reporting.
//!
//! With progress reporting enabled, whichever worker crosses a multiple of
//! `progress_every` processed records writes a snapshot. Only one snapshot
//! is written at a time; a worker that finds another one in progress skips.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::thread;

use crossbeam_channel as channel;
use tracing::{debug, info};

use crate::classify::engine::{ClassificationConfig, ClassificationEngine};
use crate::core::hits::ReadHits;
use crate::core::panel::Panel;
use crate::core::types::{Mate, Thresholds};
use crate::parsing::ParseError;
use crate::report::progress::ProgressWriter;
use crate::stats::counters::{ScreenCounters, ScreenTally};
use crate::utils::validation::{validate_thresholds, ValidationError, DEFAULT_HISTOGRAM_MAX};

/// Records handed to a worker at once
const BATCH_SIZE: usize = 4096;

/// Reads (or pairs) between progress snapshots by default
pub const DEFAULT_PROGRESS_EVERY: u64 = 100_000;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{mate} input ended after {pairs} records but its mate has more")]
    MateCountMismatch { mate: Mate, pairs: u64 },

    #[error("a screening worker panicked")]
    WorkerPanicked,
}

/// Run configuration for a screen
#[derive(Debug, Clone)]
pub struct ScreenConfig {
    pub thresholds: Thresholds,

    /// Retain pairs only on a unique-k-mer threshold match
    pub filter_unique: bool,

    /// Prepended to every similarity output file name
    pub output_prefix: String,

    /// Directory for progress snapshots; `None` disables them
    pub progress_dir: Option<PathBuf>,

    pub progress_every: u64,
    pub threads: usize,
    pub histogram_max: usize,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            filter_unique: false,
            output_prefix: String::new(),
            progress_dir: None,
            progress_every: DEFAULT_PROGRESS_EVERY,
            threads: num_cpus::get(),
            histogram_max: DEFAULT_HISTOGRAM_MAX,
        }
    }
}

impl ScreenConfig {
    /// Check the configuration before any counters are created
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_thresholds(self.thresholds.read, self.thresholds.overall)?;
        if self.threads == 0 {
            return Err(ValidationError::NoThreads);
        }
        if self.progress_every == 0 {
            return Err(ValidationError::ZeroProgressInterval);
        }
        Ok(())
    }

    pub fn classification(&self) -> ClassificationConfig {
        ClassificationConfig {
            thresholds: self.thresholds,
            filter_unique: self.filter_unique,
        }
    }
}

/// Finished counters of a screen
#[derive(Debug, Clone)]
pub struct ScreenRun {
    pub tally: ScreenTally,

    /// Pairs the retention rule kept; always zero for single-end input
    pub retained_pairs: u64,

    /// Mates that were classified, in order
    pub mates: Vec<Mate>,
}

impl ScreenRun {
    pub fn is_paired(&self) -> bool {
        self.mates.len() == 2
    }
}

struct Batch {
    r1: Vec<ReadHits>,
    r2: Option<Vec<ReadHits>>,
}

impl Batch {
    fn new(paired: bool) -> Self {
        Self {
            r1: Vec::with_capacity(BATCH_SIZE),
            r2: paired.then(|| Vec::with_capacity(BATCH_SIZE)),
        }
    }

    fn len(&self) -> usize {
        self.r1.len()
    }
}

/// Classify every record of `r1` (and, for paired input, `r2`).
///
/// Paired inputs are consumed in lockstep; both must yield the same number
/// of records.
///
/// # Errors
///
/// Returns `PipelineError::Validation` for a bad configuration,
/// `PipelineError::Parse` for the first unreadable record,
/// `PipelineError::MateCountMismatch` when one mate runs out early and
/// `PipelineError::WorkerPanicked` if a worker thread dies.
pub fn run<I1, I2>(
    config: &ScreenConfig,
    panel: &Panel,
    r1: I1,
    r2: Option<I2>,
) -> Result<ScreenRun, PipelineError>
where
    I1: Iterator<Item = Result<ReadHits, ParseError>>,
    I2: Iterator<Item = Result<ReadHits, ParseError>>,
{
    config.validate()?;

    let paired = r2.is_some();
    let mates: Vec<Mate> = if paired {
        Mate::ALL.to_vec()
    } else {
        vec![Mate::R1]
    };

    let engine = ClassificationEngine::with_config(panel, config.classification());
    let counters = ScreenCounters::new(panel.len(), config.histogram_max);
    let progress = config
        .progress_dir
        .as_ref()
        .map(|dir| ProgressWriter::new(dir, panel, config.thresholds.read));
    let progress_lock = Mutex::new(());
    let processed = AtomicU64::new(0);
    let retained = AtomicU64::new(0);

    info!(
        "Screening {} input with {} worker threads",
        if paired { "paired-end" } else { "single-end" },
        config.threads
    );

    let (batch_tx, batch_rx) = channel::bounded::<Batch>(config.threads * 2);

    let fed = thread::scope(|s| {
        let workers: Vec<_> = (0..config.threads)
            .map(|_| {
                let rx = batch_rx.clone();
                let engine = &engine;
                let counters = &counters;
                let progress = progress.as_ref();
                let progress_lock = &progress_lock;
                let processed = &processed;
                let retained = &retained;
                let mates = mates.as_slice();
                let every = config.progress_every;

                s.spawn(move || {
                    for batch in rx.iter() {
                        let n = batch.len() as u64;
                        let kept = screen_batch(engine, counters, &batch);
                        retained.fetch_add(kept, Ordering::Relaxed);

                        let before = processed.fetch_add(n, Ordering::Relaxed);
                        if let Some(writer) = progress {
                            if (before + n) / every > before / every {
                                if let Ok(_guard) = progress_lock.try_lock() {
                                    writer.write(&counters.snapshot(), mates);
                                }
                            }
                        }
                    }
                })
            })
            .collect();
        drop(batch_rx);

        let fed = feed(r1, r2, &batch_tx);
        drop(batch_tx);

        for worker in workers {
            worker.join().map_err(|_| PipelineError::WorkerPanicked)?;
        }
        fed
    })?;

    debug!("Fed {fed} records to workers");
    let tally = counters.into_tally();
    if let Some(writer) = &progress {
        writer.write(&tally, &mates);
    }

    let retained_pairs = retained.into_inner();
    info!(
        "Screened {} records, {} pairs retained",
        processed.into_inner(),
        retained_pairs
    );

    Ok(ScreenRun {
        tally,
        retained_pairs,
        mates,
    })
}

fn screen_batch(engine: &ClassificationEngine<'_>, counters: &ScreenCounters, batch: &Batch) -> u64 {
    let mut kept = 0;
    match &batch.r2 {
        None => {
            for hits in &batch.r1 {
                engine.classify_read(hits, counters.mate(Mate::R1));
            }
        }
        Some(r2) => {
            for (a, b) in batch.r1.iter().zip(r2) {
                engine.classify_read(a, counters.mate(Mate::R1));
                engine.classify_read(b, counters.mate(Mate::R2));
                if engine.classify_pair(a, b, counters.pairs()) {
                    kept += 1;
                }
            }
        }
    }
    kept
}

/// Batch records onto the channel; returns how many records (or pairs) were sent
fn feed<I1, I2>(
    mut r1: I1,
    r2: Option<I2>,
    tx: &channel::Sender<Batch>,
) -> Result<u64, PipelineError>
where
    I1: Iterator<Item = Result<ReadHits, ParseError>>,
    I2: Iterator<Item = Result<ReadHits, ParseError>>,
{
    let paired = r2.is_some();
    let mut r2 = r2;
    let mut batch = Batch::new(paired);
    let mut sent = 0u64;

    loop {
        let a = r1.next().transpose()?;
        let b = match r2.as_mut() {
            Some(r2) => r2.next().transpose()?,
            None => None,
        };

        match (a, b) {
            (None, None) => break,
            (Some(a), None) if !paired => batch.r1.push(a),
            (Some(a), Some(b)) => {
                batch.r1.push(a);
                if let Some(r2) = batch.r2.as_mut() {
                    r2.push(b);
                }
            }
            (None, Some(_)) => {
                let pairs = sent + batch.len() as u64;
                return Err(PipelineError::MateCountMismatch {
                    mate: Mate::R1,
                    pairs,
                });
            }
            (Some(_), None) => {
                let pairs = sent + batch.len() as u64;
                return Err(PipelineError::MateCountMismatch {
                    mate: Mate::R2,
                    pairs,
                });
            }
        }

        if batch.len() == BATCH_SIZE {
            sent += BATCH_SIZE as u64;
            if tx.send(std::mem::replace(&mut batch, Batch::new(paired))).is_err() {
                return Err(PipelineError::WorkerPanicked);
            }
        }
    }

    if !batch.r1.is_empty() {
        sent += batch.len() as u64;
        if tx.send(batch).is_err() {
            return Err(PipelineError::WorkerPanicked);
        }
    }
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::panel::Contaminant;
    use std::iter;

    type Records = std::vec::IntoIter<Result<ReadHits, ParseError>>;

    fn panel() -> Panel {
        Panel::new(vec![Contaminant::new("a", 100), Contaminant::new("b", 100)]).unwrap()
    }

    fn config(threads: usize) -> ScreenConfig {
        ScreenConfig {
            thresholds: Thresholds { read: 2, overall: 5 },
            threads,
            ..ScreenConfig::default()
        }
    }

    fn records(hits: &[[u32; 2]], count: usize) -> Records {
        hits.iter()
            .cycle()
            .take(count)
            .map(|h| Ok(ReadHits::from_hits(h.to_vec(), h.to_vec())))
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn test_single_end_run() {
        let panel = panel();
        let run = run(&config(2), &panel, records(&[[3, 0], [0, 0]], 10), None::<Records>).unwrap();

        assert!(!run.is_paired());
        assert_eq!(run.mates, vec![Mate::R1]);
        let r1 = run.tally.mate(Mate::R1);
        assert_eq!(r1.number_of_reads, 10);
        assert_eq!(r1.assigned_by_contaminant, vec![5, 0]);
        assert_eq!(r1.unclassified, 5);
        assert_eq!(run.tally.mate(Mate::R2).number_of_reads, 0);
        assert_eq!(run.tally.pairs.number_of_pairs, 0);
    }

    #[test]
    fn test_paired_run_counts_pairs_and_retention() {
        let panel = panel();
        let r1 = records(&[[3, 0], [0, 1]], 3 * BATCH_SIZE + 7);
        let r2 = records(&[[3, 0], [0, 0]], 3 * BATCH_SIZE + 7);

        let run = run(&config(4), &panel, r1, Some(r2)).unwrap();

        let total = (3 * BATCH_SIZE + 7) as u64;
        let strong = total.div_ceil(2);
        assert!(run.is_paired());
        assert_eq!(run.tally.pairs.number_of_pairs, total);
        assert_eq!(run.tally.pairs.raw.threshold_passed, strong);
        assert_eq!(run.tally.pairs.raw.either_nonzero, total - strong);
        assert_eq!(run.retained_pairs, strong);
        assert_eq!(run.tally.mate(Mate::R2).number_of_reads, total);
    }

    #[test]
    fn test_thread_count_does_not_change_totals() {
        let panel = panel();
        let hits = [[3, 0], [1, 4], [0, 0], [2, 2]];
        let one = run(&config(1), &panel, records(&hits, 5000), Some(records(&hits, 5000))).unwrap();
        let many = run(&config(8), &panel, records(&hits, 5000), Some(records(&hits, 5000))).unwrap();

        assert_eq!(one.tally, many.tally);
        assert_eq!(one.retained_pairs, many.retained_pairs);
    }

    #[test]
    fn test_mate_count_mismatch() {
        let panel = panel();
        let err = run(&config(2), &panel, records(&[[1, 0]], 3), Some(records(&[[1, 0]], 2)))
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MateCountMismatch {
                mate: Mate::R2,
                pairs: 2
            }
        ));
    }

    #[test]
    fn test_parse_error_stops_run() {
        let panel = panel();
        let bad = iter::once(Ok(ReadHits::empty(2)))
            .chain(iter::once(Err(ParseError::InvalidFormat("bad".into()))));
        let err = run(&config(2), &panel, bad, None::<Records>).unwrap_err();
        assert!(matches!(err, PipelineError::Parse(_)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let panel = panel();
        let mut cfg = config(0);
        assert!(matches!(
            run(&cfg, &panel, records(&[[1, 0]], 1), None::<Records>),
            Err(PipelineError::Validation(ValidationError::NoThreads))
        ));
        cfg.threads = 1;
        cfg.thresholds.read = 0;
        assert!(matches!(
            run(&cfg, &panel, records(&[[1, 0]], 1), None::<Records>),
            Err(PipelineError::Validation(ValidationError::ReadThresholdTooLow(0)))
        ));
    }

    #[test]
    fn test_progress_snapshots_written() {
        let panel = panel();
        let dir = tempfile::tempdir().unwrap();
        let cfg = ScreenConfig {
            progress_dir: Some(dir.path().to_path_buf()),
            progress_every: 10,
            ..config(2)
        };

        run(&cfg, &panel, records(&[[3, 0]], 25), Some(records(&[[3, 0]], 25))).unwrap();

        let overall = std::fs::read_to_string(dir.path().join("data_overall_r2.txt")).unwrap();
        assert!(overall.contains("Number of reads\t25\n"));
        assert!(dir.path().join("largest_contaminant_r1.txt").exists());
    }
}

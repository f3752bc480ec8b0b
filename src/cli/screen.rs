//! Screen command - classify reads and read pairs against a contaminant panel.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::Serialize;

use crate::cli::similarity::compare_panel;
use crate::cli::{load_membership, load_panel, OutputFormat};
use crate::core::types::Thresholds;
use crate::parsing::tsv::{open_table, HitTableReader};
use crate::pipeline::{self, ScreenConfig, DEFAULT_PROGRESS_EVERY};
use crate::report::screen::write_screen_report;
use crate::report::similarity::write_console_matrix;
use crate::stats::derived::{DerivedStats, StatsCalculator};
use crate::stats::observed::ObservedKmers;
use crate::stats::similarity::SimilarityMatrix;
use crate::utils::validation::DEFAULT_HISTOGRAM_MAX;

/// Arguments for the screen command
#[derive(Args)]
pub struct ScreenArgs {
    /// Panel table (id, reference k-mer count)
    #[arg(long, required = true)]
    pub panel: PathBuf,

    /// Per-read hit counts for read 1 (or single-end reads)
    #[arg(long = "hits1", required = true)]
    pub hits1: PathBuf,

    /// Per-read hit counts for read 2; enables pair classification
    #[arg(long = "hits2")]
    pub hits2: Option<PathBuf>,

    /// K-mer membership table; adds observed k-mer columns and similarity files
    #[arg(long)]
    pub membership: Option<PathBuf>,

    /// Minimum k-mers in each read of a pair
    #[arg(long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..))]
    pub threshold_read: u32,

    /// Minimum k-mers across both reads of a pair
    #[arg(long, default_value = "20", value_parser = clap::value_parser!(u32).range(1..))]
    pub threshold_overall: u32,

    /// Retain pairs only when unique k-mers meet the thresholds
    #[arg(long)]
    pub filter_unique: bool,

    /// Prefix for the similarity output files
    #[arg(short, long, default_value = "")]
    pub output_prefix: String,

    /// Directory for progress snapshot files
    #[arg(long)]
    pub progress_dir: Option<PathBuf>,

    /// Reads (or pairs) between progress snapshots
    #[arg(long, default_value_t = DEFAULT_PROGRESS_EVERY)]
    pub progress_every: u64,

    /// Worker threads
    #[arg(short, long, default_value_t = num_cpus::get())]
    pub threads: usize,

    /// Largest per-read k-mer count with its own histogram bucket
    #[arg(long, default_value_t = DEFAULT_HISTOGRAM_MAX)]
    pub histogram_max: usize,
}

impl ScreenArgs {
    fn config(&self) -> ScreenConfig {
        ScreenConfig {
            thresholds: Thresholds {
                read: self.threshold_read,
                overall: self.threshold_overall,
            },
            filter_unique: self.filter_unique,
            output_prefix: self.output_prefix.clone(),
            progress_dir: self.progress_dir.clone(),
            progress_every: self.progress_every,
            threads: self.threads,
            histogram_max: self.histogram_max,
        }
    }
}

#[derive(Serialize)]
struct ScreenOutput<'a> {
    thresholds: Thresholds,
    filter_unique: bool,
    retained_pairs: Option<u64>,
    stats: &'a DerivedStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    similarity: Option<&'a SimilarityMatrix>,
}

/// Execute the screen command
///
/// # Errors
///
/// Returns an error if an input cannot be parsed, the configuration is
/// invalid, the mates disagree in length or a similarity file cannot be
/// written.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: ScreenArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let config = args.config();
    config.validate()?;

    let panel = load_panel(&args.panel, verbose)?;
    let n = panel.len();

    let r1 = HitTableReader::new(
        open_table(&args.hits1).with_context(|| format!("failed to open {}", args.hits1.display()))?,
        n,
    );
    let r2 = match &args.hits2 {
        Some(path) => Some(HitTableReader::new(
            open_table(path).with_context(|| format!("failed to open {}", path.display()))?,
            n,
        )),
        None => None,
    };

    let mut run = pipeline::run(&config, &panel, r1, r2)?;

    let mut similarity = None;
    if let Some(path) = &args.membership {
        let table = load_membership(path, &panel, verbose)?;
        ObservedKmers::tally(&table, n).apply_to(&mut run.tally);
        similarity = compare_panel(&panel, &table, &config.output_prefix)?;
    }

    let stats = StatsCalculator::new(&panel).calculate(&run.tally);
    let retained_pairs = run.is_paired().then_some(run.retained_pairs);

    let mut stdout = std::io::stdout().lock();
    match format {
        OutputFormat::Text => {
            if let Some(matrix) = &similarity {
                write_console_matrix(&mut stdout, &panel, matrix)?;
            }
            write_screen_report(&mut stdout, &stats, config.thresholds)?;
            if let Some(retained) = retained_pairs {
                writeln!(stdout, "\nPairs retained: {retained}")?;
            }
        }
        OutputFormat::Json => {
            let output = ScreenOutput {
                thresholds: config.thresholds,
                filter_unique: config.filter_unique,
                retained_pairs,
                stats: &stats,
                similarity: similarity.as_ref(),
            };
            writeln!(stdout, "{}", serde_json::to_string_pretty(&output)?)?;
        }
    }

    Ok(())
}

//! Command-line interface for contam-screen.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **screen**: Classify reads (or read pairs) against a contaminant panel
//! - **similarity**: Compare contaminant k-mer content within a panel
//!
//! ## Usage
//!
//! ```text
//! # Paired-end screen with progress snapshots
//! contam-screen screen --panel panel.tsv --hits1 r1_hits.tsv.gz --hits2 r2_hits.tsv.gz \
//!     --progress-dir progress/
//!
//! # Add observed k-mer columns and similarity files
//! contam-screen screen --panel panel.tsv --hits1 r1_hits.tsv --membership kmers.tsv \
//!     --output-prefix results/run1_
//!
//! # JSON output for scripting
//! contam-screen --format json screen --panel panel.tsv --hits1 r1_hits.tsv
//!
//! # Similarity only
//! contam-screen similarity --panel panel.tsv --membership kmers.tsv
//! ```

use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::core::panel::Panel;
use crate::parsing::tsv;
use crate::store::MembershipTable;

pub mod screen;
pub mod similarity;

#[derive(Parser)]
#[command(name = "contam-screen")]
#[command(version)]
#[command(about = "Screen sequencing reads against a panel of contaminant references")]
#[command(
    long_about = "contam-screen classifies reads and read pairs from precomputed per-read k-mer hit counts.\n\nFor each mate it reports how many reads carry k-mers of each contaminant and which contaminant each read is assigned to. For paired input it also reports how many pairs pass the per-read and per-pair thresholds, and it can compare how many k-mers the panel members share."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify reads against a contaminant panel
    Screen(screen::ScreenArgs),

    /// Compare k-mer content between panel members
    Similarity(similarity::SimilarityArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

fn load_panel(path: &Path, verbose: bool) -> anyhow::Result<Panel> {
    let panel = tsv::parse_panel_file(path)
        .with_context(|| format!("failed to load panel {}", path.display()))?;
    if verbose {
        eprintln!("Loaded panel with {} contaminants", panel.len());
    }
    Ok(panel)
}

fn load_membership(path: &Path, panel: &Panel, verbose: bool) -> anyhow::Result<MembershipTable> {
    let table = tsv::parse_membership_file(path, panel.len())
        .with_context(|| format!("failed to load k-mer membership {}", path.display()))?;
    if verbose {
        eprintln!("Loaded {} k-mers", table.len());
    }
    Ok(table)
}

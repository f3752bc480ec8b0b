//! Similarity command - shared and unique k-mers between panel members.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::{load_membership, load_panel, OutputFormat};
use crate::core::panel::Panel;
use crate::report::similarity::{write_console_matrix, write_similarity_files, SimilarityPaths};
use crate::stats::similarity::{SimilarityAnalyzer, SimilarityMatrix};
use crate::store::MembershipTable;

/// Arguments for the similarity command
#[derive(Args)]
pub struct SimilarityArgs {
    /// Panel table (id, reference k-mer count)
    #[arg(long, required = true)]
    pub panel: PathBuf,

    /// K-mer membership table (kmer, member indices, observed mates)
    #[arg(long, required = true)]
    pub membership: PathBuf,

    /// Prefix for the similarity output files
    #[arg(short, long, default_value = "")]
    pub output_prefix: String,
}

#[derive(Serialize)]
struct SimilarityOutput<'a> {
    contaminants: Vec<&'a str>,
    matrix: &'a SimilarityMatrix,
}

/// Execute the similarity command
///
/// # Errors
///
/// Returns an error if an input cannot be parsed or an output file cannot be
/// written.
#[allow(clippy::needless_pass_by_value)]
pub fn run(args: SimilarityArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let panel = load_panel(&args.panel, verbose)?;
    let table = load_membership(&args.membership, &panel, verbose)?;

    let Some(matrix) = compare_panel(&panel, &table, &args.output_prefix)? else {
        return Ok(());
    };

    let mut stdout = std::io::stdout().lock();
    match format {
        OutputFormat::Text => write_console_matrix(&mut stdout, &panel, &matrix)?,
        OutputFormat::Json => {
            let output = SimilarityOutput {
                contaminants: panel.ids().collect(),
                matrix: &matrix,
            };
            writeln!(stdout, "{}", serde_json::to_string_pretty(&output)?)?;
        }
    }
    Ok(())
}

/// Build the similarity matrix and write its four files.
///
/// Returns `None` without writing anything when the panel has fewer than two
/// contaminants.
pub(crate) fn compare_panel(
    panel: &Panel,
    table: &MembershipTable,
    output_prefix: &str,
) -> anyhow::Result<Option<SimilarityMatrix>> {
    if panel.len() < 2 {
        warn!("Skipping k-mer comparison: panel has fewer than two contaminants");
        return Ok(None);
    }

    info!("Comparing contaminant kmers...");
    let matrix = SimilarityAnalyzer::new(panel).analyze(table);
    write_similarity_files(&SimilarityPaths::from_prefix(output_prefix), panel, &matrix)
        .context("failed to write similarity files")?;
    Ok(Some(matrix))
}

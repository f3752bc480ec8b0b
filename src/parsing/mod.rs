//! Readers for the tab-separated input tables.
//!
//! Three tables feed a screen:
//!
//! | Table | Columns |
//! |-------|---------|
//! | panel | `id`, `reference_kmers` |
//! | hit counts | `read_id`, `kmers_loaded`, `hits`, `unique_hits` |
//! | membership | `kmer`, `members`, `observed` |
//!
//! `hits` and `unique_hits` are comma-separated lists with one value per
//! panel contaminant, in panel order. `members` lists zero-based panel
//! indices; `observed` is `-`, `1`, `2` or `1,2`. Any table may be
//! gzip-compressed (`.gz`). Blank lines and lines starting with `#` are
//! skipped, as is a header line whose first field names the column.
//!
//! ## Example
//!
//! ```rust,no_run
//! use contam_screen::parsing::tsv::{open_table, parse_panel_file, HitTableReader};
//! use std::path::Path;
//!
//! let panel = parse_panel_file(Path::new("panel.tsv")).unwrap();
//! let reader = HitTableReader::new(open_table(Path::new("r1_hits.tsv.gz")).unwrap(), panel.len());
//! for hits in reader {
//!     println!("{} k-mers loaded", hits.unwrap().kmers_loaded);
//! }
//! ```

pub mod tsv;

use crate::core::panel::PanelError;

/// Error type for table parsing
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid table format: {0}")]
    InvalidFormat(String),

    #[error("Line {line}: expected {expected} per-contaminant values, found {found}")]
    CountMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Panel(#[from] PanelError),
}

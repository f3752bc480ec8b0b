//! Text artifacts produced from a finished screen.
//!
//! - [`screen`]: per-mate and per-pair console tables with their keys
//! - [`similarity`]: the four similarity/uniqueness matrix files
//! - [`progress`]: progress snapshots, each file replaced atomically

use std::path::PathBuf;

pub mod progress;
pub mod screen;
pub mod similarity;

pub use progress::ProgressWriter;
pub use screen::write_screen_report;
pub use similarity::{write_similarity_files, SimilarityPaths};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("can't open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed writing {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

//! Progress snapshots for external monitoring.
//!
//! Each tick rewrites three small `name<TAB>value` files per mate. A file is
//! written to a temporary sibling and renamed over the old one, so a reader
//! polling the directory sees either the previous snapshot or the new one.
//! Failures are logged and skipped; a run never stops because monitoring
//! output could not be written.

use std::io::{self, Write};
use std::path::PathBuf;

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::core::panel::Panel;
use crate::core::types::Mate;
use crate::stats::counters::{ReadTally, ScreenTally};

pub struct ProgressWriter<'a> {
    dir: PathBuf,
    panel: &'a Panel,
    threshold_read: u32,
}

impl<'a> ProgressWriter<'a> {
    pub fn new(dir: impl Into<PathBuf>, panel: &'a Panel, threshold_read: u32) -> Self {
        Self {
            dir: dir.into(),
            panel,
            threshold_read,
        }
    }

    /// Replace the snapshot files of every listed mate.
    ///
    /// Returns how many files were written.
    pub fn write(&self, tally: &ScreenTally, mates: &[Mate]) -> usize {
        debug!("Updating progress files in {}", self.dir.display());
        let mut written = 0;

        for &mate in mates {
            let read = tally.mate(mate);
            let n = mate.number();
            written += usize::from(self.replace(&format!("data_overall_r{n}.txt"), |w| {
                self.render_overall(w, read)
            }));
            written += usize::from(self.replace(&format!("data_per_contaminant_r{n}.txt"), |w| {
                self.render_per_contaminant(w, read)
            }));
            written += usize::from(self.replace(&format!("largest_contaminant_r{n}.txt"), |w| {
                self.render_largest(w, read)
            }));
        }

        written
    }

    fn render_overall(&self, w: &mut dyn Write, read: &ReadTally) -> io::Result<()> {
        writeln!(w, "name\tvalue")?;
        writeln!(w, "Number of reads\t{}", read.number_of_reads)?;
        writeln!(w, "Number with k1 contaminants\t{}", read.k1_reads)?;
        writeln!(
            w,
            "Number with k{} contaminants\t{}",
            self.threshold_read, read.kn_reads
        )
    }

    fn render_per_contaminant(&self, w: &mut dyn Write, read: &ReadTally) -> io::Result<()> {
        writeln!(w, "name\tvalue")?;
        for (id, count) in self.panel.ids().zip(&read.kn_by_contaminant) {
            writeln!(w, "{id}\t{count}")?;
        }
        Ok(())
    }

    fn render_largest(&self, w: &mut dyn Write, read: &ReadTally) -> io::Result<()> {
        writeln!(w, "name\tvalue")?;
        for (id, count) in self.panel.ids().zip(&read.assigned_by_contaminant) {
            writeln!(w, "{id}\t{count}")?;
        }
        writeln!(w, "Unclassified\t{}", read.unclassified)
    }

    /// Atomically replace `name` inside the progress directory; `false` on failure
    fn replace<F>(&self, name: &str, render: F) -> bool
    where
        F: FnOnce(&mut dyn Write) -> io::Result<()>,
    {
        let path = self.dir.join(name);
        let result = NamedTempFile::new_in(&self.dir).and_then(|mut tmp| {
            render(&mut tmp)?;
            tmp.flush()?;
            tmp.persist(&path).map_err(|e| e.error)?;
            Ok(())
        });

        match result {
            Ok(()) => {
                debug!("Wrote {}", path.display());
                true
            }
            Err(e) => {
                warn!("can't write {}: {e}", path.display());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::panel::Contaminant;
    use crate::stats::counters::ScreenCounters;

    fn panel() -> Panel {
        Panel::new(vec![Contaminant::new("phiX", 10), Contaminant::new("ecoli", 10)]).unwrap()
    }

    fn tally() -> ScreenTally {
        let counters = ScreenCounters::new(2, 10);
        counters.mate(Mate::R1).update(|t| {
            t.number_of_reads = 7;
            t.k1_reads = 4;
            t.kn_reads = 2;
            t.kn_by_contaminant = vec![2, 1];
            t.assigned_by_contaminant = vec![3, 1];
            t.unclassified = 3;
        });
        counters.into_tally()
    }

    #[test]
    fn test_writes_three_files_per_mate() {
        let panel = panel();
        let dir = tempfile::tempdir().unwrap();
        let writer = ProgressWriter::new(dir.path(), &panel, 5);

        assert_eq!(writer.write(&tally(), &[Mate::R1, Mate::R2]), 6);

        let overall = std::fs::read_to_string(dir.path().join("data_overall_r1.txt")).unwrap();
        assert_eq!(
            overall,
            "name\tvalue\nNumber of reads\t7\nNumber with k1 contaminants\t4\nNumber with k5 contaminants\t2\n"
        );

        let per = std::fs::read_to_string(dir.path().join("data_per_contaminant_r1.txt")).unwrap();
        assert_eq!(per, "name\tvalue\nphiX\t2\necoli\t1\n");

        let largest = std::fs::read_to_string(dir.path().join("largest_contaminant_r1.txt")).unwrap();
        assert_eq!(largest, "name\tvalue\nphiX\t3\necoli\t1\nUnclassified\t3\n");

        assert!(dir.path().join("largest_contaminant_r2.txt").exists());
    }

    #[test]
    fn test_rewrite_replaces_content() {
        let panel = panel();
        let dir = tempfile::tempdir().unwrap();
        let writer = ProgressWriter::new(dir.path(), &panel, 5);

        writer.write(&tally(), &[Mate::R1]);
        writer.write(&ScreenCounters::new(2, 10).into_tally(), &[Mate::R1]);

        let overall = std::fs::read_to_string(dir.path().join("data_overall_r1.txt")).unwrap();
        assert!(overall.contains("Number of reads\t0\n"));
        // Only the three snapshot files remain; temporaries are renamed away.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 3);
    }

    #[test]
    fn test_missing_directory_is_not_fatal() {
        let panel = panel();
        let dir = tempfile::tempdir().unwrap();
        let writer = ProgressWriter::new(dir.path().join("gone"), &panel, 5);

        assert_eq!(writer.write(&tally(), &[Mate::R1]), 0);
    }
}

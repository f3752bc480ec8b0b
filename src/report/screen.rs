//! Console report for a finished screen.
//!
//! Layout: threshold line, one section per mate that saw reads, the per-mate
//! key, then (paired input only) the pair section and its key. Counts are
//! left-aligned in fixed-width columns so the tables line up in a terminal.

use std::io::{self, Write};

use crate::core::types::Thresholds;
use crate::stats::derived::{BucketShares, DerivedStats, PairStats, ReadStats, Share};

const NAME_WIDTH: usize = 30;
const CELL_WIDTH: usize = 10;
const LABEL_WIDTH: usize = 64;

const READ_COLUMNS: [&str; 14] = [
    "Contaminant",
    "nKmers",
    "kFound",
    "%kFound",
    "ReadsW1k",
    "%ReadsW1k",
    "UniqW1k",
    "%UniqW1k",
    "ReadsWnk",
    "%ReadsWnk",
    "UniqWnk",
    "%UniqWnk",
    "Assigned",
    "%Assigned",
];

const PAIR_COLUMNS: [&str; 16] = [
    "Contaminant",
    "nKmers",
    "kFound",
    "%kFound",
    "ReadsThr",
    "%ReadsThr",
    "BothW1k",
    "%BothW1k",
    "EithW1k",
    "%EithW1k",
    "UniqRTh",
    "%UniqRTh",
    "UniqB1k",
    "%UniqB1k",
    "UniqE1k",
    "%UniqE1k",
];

/// Write the complete console report
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_screen_report<W: Write>(
    w: &mut W,
    stats: &DerivedStats,
    thresholds: Thresholds,
) -> io::Result<()> {
    writeln!(
        w,
        "\nThreshold: at least {} kmers in each read and at least {} in pair",
        thresholds.read, thresholds.overall
    )?;

    if stats.reads.is_empty() {
        writeln!(w, "\nNo reads were screened.")?;
        return Ok(());
    }

    for read in &stats.reads {
        writeln!(
            w,
            "\n========== Statistics for {} ===========\n",
            read.mate
        )?;
        write_read_section(w, read, thresholds.read)?;
    }
    write_read_key(w, thresholds.read)?;

    if let Some(pairs) = &stats.pairs {
        writeln!(w, "\n========== Statistics for both reads ===========\n")?;
        write_pair_section(w, pairs)?;
        write_pair_key(w)?;
    }

    Ok(())
}

/// Overall and per-contaminant statistics for one mate
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_read_section<W: Write>(
    w: &mut W,
    read: &ReadStats,
    threshold_read: u32,
) -> io::Result<()> {
    writeln!(w, "Overall statistics\n")?;
    writeln!(
        w,
        "{:>LABEL_WIDTH$}: {}",
        "Number of reads", read.number_of_reads
    )?;
    overall_line(w, "Number of reads with 1+ kmer contamination", read.k1_reads)?;
    if threshold_read != 1 {
        let label = format!("Number of reads with {threshold_read}+ kmer contamination");
        overall_line(w, &label, read.kn_reads)?;
    }

    writeln!(w, "\nPer-contaminant statistics\n")?;
    header_row(w, &READ_COLUMNS)?;

    for c in &read.contaminants {
        let mut cells = vec![c.reference_kmers.to_string()];
        for share in [
            c.kmers_observed,
            c.k1_reads,
            c.k1_unique_reads,
            c.kn_reads,
            c.kn_unique_reads,
            c.assigned_reads,
        ] {
            push_share(&mut cells, share);
        }
        table_row(w, &c.id, &cells)?;
    }

    let mut cells = vec![String::new(); READ_COLUMNS.len() - 3];
    push_share(&mut cells, read.unclassified);
    table_row(w, "Unclassified", &cells)
}

/// Overall and per-contaminant statistics for read pairs
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_pair_section<W: Write>(w: &mut W, pairs: &PairStats) -> io::Result<()> {
    writeln!(w, "Overall statistics\n")?;
    writeln!(
        w,
        "{:>LABEL_WIDTH$}: {}\n",
        "Number of pairs", pairs.number_of_pairs
    )?;

    overall_line(w, "Reads meeting threshold (all kmers)", pairs.raw.threshold_passed)?;
    overall_line(
        w,
        "Remaining reads with at least 1 kmer in each",
        pairs.raw.both_nonzero,
    )?;
    overall_line(
        w,
        "Remaining reads with at least 1 kmer in either",
        pairs.raw.either_nonzero,
    )?;
    writeln!(w)?;
    overall_line(
        w,
        "Reads meeting threshold (unique kmers only)",
        pairs.unique.threshold_passed,
    )?;
    overall_line(
        w,
        "Remaining reads with at least 1 unique kmer in each",
        pairs.unique.both_nonzero,
    )?;
    overall_line(
        w,
        "Remaining reads with at least 1 unique kmer in either",
        pairs.unique.either_nonzero,
    )?;

    writeln!(w, "\nPer-contaminant statistics\n")?;
    header_row(w, &PAIR_COLUMNS)?;

    for c in &pairs.contaminants {
        let mut cells = vec![c.reference_kmers.to_string()];
        push_share(&mut cells, c.kmers_observed);
        push_buckets(&mut cells, &c.raw);
        push_buckets(&mut cells, &c.unique);
        table_row(w, &c.id, &cells)?;
    }

    Ok(())
}

fn write_read_key<W: Write>(w: &mut W, n: u32) -> io::Result<()> {
    writeln!(w, "\n========== Key ==========\n")?;
    write_observed_key(w)?;
    writeln!(w, "ReadsW1k  - Reads containing 1 or more kmer from the contaminant")?;
    writeln!(w, "%ReadsW1k - Percentage of reads containing 1 or more kmer from the contaminant")?;
    writeln!(w, "UniqW1k   - Reads containing 1 or more kmer from the contaminant and not any other")?;
    writeln!(w, "%UniqW1k  - Percentage of reads containing 1 or more kmer from the contaminant and not any other")?;
    writeln!(w, "ReadsWnk  - Reads containing n or more kmer from the contaminant (n={n})")?;
    writeln!(w, "%ReadsWnk - Percentage of reads containing n or more kmer from the contaminant (n={n})")?;
    writeln!(w, "UniqWnk   - Reads containing n or more kmer from the contaminant and not any other (n={n})")?;
    writeln!(w, "%UniqWnk  - Percentage of reads containing n or more kmer from the contaminant and not any other (n={n})")?;
    writeln!(w, "Assigned  - Reads assigned to this species")?;
    writeln!(w, "%Assigned - Percentage of reads assigned to this species")
}

fn write_pair_key<W: Write>(w: &mut W) -> io::Result<()> {
    writeln!(w, "\n========== Key ==========\n")?;
    write_observed_key(w)?;
    writeln!(w, "ReadsThr  - Reads passing threshold")?;
    writeln!(w, "%ReadsThr - Percentage of reads passing threshold")?;
    writeln!(w, "BothW1k   - Reads not passing threshold, but containing 1 or more kmer in both reads")?;
    writeln!(w, "%BothW1k  - Percentage of reads not passing threshold, but containing 1 or more kmer in both reads")?;
    writeln!(w, "EithW1k   - Reads not passing threshold, but containing 1 or more kmer in either read")?;
    writeln!(w, "%EithW1k  - Percentage of reads not passing threshold, but containing 1 or more kmer in either read")?;
    writeln!(w, "UniqRTh   - As ReadsThr, counting unique kmers only")?;
    writeln!(w, "UniqB1k   - As BothW1k, counting unique kmers only")?;
    writeln!(w, "UniqE1k   - As EithW1k, counting unique kmers only")
}

fn write_observed_key<W: Write>(w: &mut W) -> io::Result<()> {
    writeln!(w, "nKmers    - Number of kmers in contaminant reference")?;
    writeln!(w, "kFound    - Number of unique contaminant kmers found in reads")?;
    writeln!(w, "%kFound   - Percentage of contaminant kmers found in reads")
}

fn overall_line<W: Write>(w: &mut W, label: &str, share: Share) -> io::Result<()> {
    writeln!(
        w,
        "{:>LABEL_WIDTH$}: {}\t{:.2} %",
        label, share.count, share.pc
    )
}

fn push_share(cells: &mut Vec<String>, share: Share) {
    cells.push(share.count.to_string());
    cells.push(format!("{:.2}", share.pc));
}

fn push_buckets(cells: &mut Vec<String>, buckets: &BucketShares) {
    push_share(cells, buckets.threshold_passed);
    push_share(cells, buckets.both_nonzero);
    push_share(cells, buckets.either_nonzero);
}

fn header_row<W: Write>(w: &mut W, columns: &[&str]) -> io::Result<()> {
    let cells: Vec<String> = columns[1..].iter().map(|c| (*c).to_string()).collect();
    table_row(w, columns[0], &cells)
}

fn table_row<W: Write>(w: &mut W, name: &str, cells: &[String]) -> io::Result<()> {
    write!(w, "{name:<NAME_WIDTH$}")?;
    for cell in cells {
        write!(w, " {cell:<CELL_WIDTH$}")?;
    }
    writeln!(w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::engine::{ClassificationConfig, ClassificationEngine};
    use crate::core::hits::ReadHits;
    use crate::core::panel::{Contaminant, Panel};
    use crate::core::types::Mate;
    use crate::stats::counters::ScreenCounters;
    use crate::stats::derived::StatsCalculator;

    fn render(paired: bool, thresholds: Thresholds) -> String {
        let panel = Panel::new(vec![
            Contaminant::new("phiX", 100),
            Contaminant::new("ecoli", 400),
        ])
        .unwrap();
        let engine = ClassificationEngine::with_config(
            &panel,
            ClassificationConfig {
                thresholds,
                filter_unique: false,
            },
        );
        let counters = ScreenCounters::new(2, 100);
        let a = ReadHits::from_hits(vec![4, 0], vec![4, 0]);
        let b = ReadHits::from_hits(vec![3, 1], vec![2, 0]);
        engine.classify_read(&a, counters.mate(Mate::R1));
        engine.classify_read(&ReadHits::empty(2), counters.mate(Mate::R1));
        if paired {
            engine.classify_read(&b, counters.mate(Mate::R2));
            engine.classify_read(&ReadHits::empty(2), counters.mate(Mate::R2));
            engine.classify_pair(&a, &b, counters.pairs());
            engine.classify_pair(&ReadHits::empty(2), &ReadHits::empty(2), counters.pairs());
        }

        let stats = StatsCalculator::new(&panel).calculate(&counters.into_tally());
        let mut out = Vec::new();
        write_screen_report(&mut out, &stats, thresholds).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_paired_report_sections() {
        let text = render(true, Thresholds { read: 2, overall: 4 });

        assert!(text.contains("Threshold: at least 2 kmers in each read and at least 4 in pair"));
        assert!(text.contains("========== Statistics for Read 1 ==========="));
        assert!(text.contains("========== Statistics for Read 2 ==========="));
        assert!(text.contains("========== Statistics for both reads ==========="));
        assert_eq!(text.matches("========== Key ==========").count(), 2);
        assert!(text.contains("Number of reads with 2+ kmer contamination"));
    }

    #[test]
    fn test_overall_line_alignment() {
        let text = render(false, Thresholds { read: 2, overall: 4 });

        let line = text
            .lines()
            .find(|l| l.ends_with("Number of reads: 2"))
            .unwrap();
        assert_eq!(line.len(), LABEL_WIDTH + ": 2".len());
        assert!(text.contains("Number of reads with 1+ kmer contamination: 1\t50.00 %"));
    }

    #[test]
    fn test_single_end_omits_pair_section() {
        let text = render(false, Thresholds { read: 2, overall: 4 });

        assert!(!text.contains("Statistics for both reads"));
        assert!(!text.contains("Statistics for Read 2"));
        assert_eq!(text.matches("========== Key ==========").count(), 1);
        assert!(!text.contains("ReadsThr"));
        assert!(!text.contains("BothW1k"));
    }

    #[test]
    fn test_kn_line_hidden_for_threshold_one() {
        let text = render(false, Thresholds { read: 1, overall: 4 });
        assert_eq!(text.matches("+ kmer contamination").count(), 1);
    }

    #[test]
    fn test_contaminant_rows() {
        let text = render(true, Thresholds { read: 2, overall: 4 });

        let phix = text.lines().find(|l| l.starts_with("phiX")).unwrap();
        let cells: Vec<&str> = phix.split_whitespace().collect();
        assert_eq!(cells[1], "100");
        assert_eq!(cells[4], "1");
        assert_eq!(cells[5], "50.00");

        let unclassified = text
            .lines()
            .find(|l| l.starts_with("Unclassified"))
            .unwrap();
        let cells: Vec<&str> = unclassified.split_whitespace().collect();
        assert_eq!(cells, vec!["Unclassified", "1", "50.00"]);
        assert!(text.contains("Reads meeting threshold (all kmers): 1\t50.00 %"));
    }

    #[test]
    fn test_empty_run() {
        let stats = DerivedStats {
            reads: Vec::new(),
            pairs: None,
        };
        let mut out = Vec::new();
        write_screen_report(&mut out, &stats, Thresholds::default()).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("No reads were screened."));
    }
}

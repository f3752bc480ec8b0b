use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::core::panel::Panel;
use crate::report::ReportError;
use crate::stats::similarity::SimilarityMatrix;

const CONSOLE_WIDTH: usize = 15;

/// Output locations of the similarity and uniqueness files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimilarityPaths {
    pub shared_absolute: PathBuf,
    pub shared_pc: PathBuf,
    pub unique_absolute: PathBuf,
    pub unique_pc: PathBuf,
}

impl SimilarityPaths {
    /// The prefix is prepended verbatim, so `out/run1_` gives
    /// `out/run1_kmer_similarity_absolute.txt`.
    pub fn from_prefix(prefix: &str) -> Self {
        let path = |name: &str| PathBuf::from(format!("{prefix}{name}"));
        Self {
            shared_absolute: path("kmer_similarity_absolute.txt"),
            shared_pc: path("kmer_similarity_pc.txt"),
            unique_absolute: path("kmer_unique_absolute.txt"),
            unique_pc: path("kmer_unique_pc.txt"),
        }
    }

    fn all(&self) -> [&Path; 4] {
        [
            self.shared_absolute.as_path(),
            self.shared_pc.as_path(),
            self.unique_absolute.as_path(),
            self.unique_pc.as_path(),
        ]
    }
}

struct Output {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl Output {
    fn create(path: &Path) -> Result<Self, ReportError> {
        let file = File::create(path).map_err(|source| ReportError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Opened {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    fn finish<F>(mut self, render: F) -> Result<(), ReportError>
    where
        F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
    {
        render(&mut self.writer)
            .and_then(|()| self.writer.flush())
            .map_err(|source| ReportError::Write {
                path: self.path,
                source,
            })
    }
}

/// Write the four similarity/uniqueness files.
///
/// All four files are opened before any content is written.
///
/// # Errors
///
/// Returns `ReportError::Open` if any file cannot be created and
/// `ReportError::Write` if writing one of them fails.
pub fn write_similarity_files(
    paths: &SimilarityPaths,
    panel: &Panel,
    matrix: &SimilarityMatrix,
) -> Result<(), ReportError> {
    let [shared_abs, shared_pc, unique_abs, unique_pc] = paths.all().map(Output::create);
    let (shared_abs, shared_pc, unique_abs, unique_pc) =
        (shared_abs?, shared_pc?, unique_abs?, unique_pc?);

    shared_abs.finish(|w| {
        write_matrix(w, panel, |i, j| matrix.shared(i, j).to_string())
    })?;
    shared_pc.finish(|w| {
        write_matrix(w, panel, |i, j| format!("{:.2}", matrix.shared_pc(panel, i, j)))
    })?;
    unique_abs.finish(|w| write_unique(w, panel, |i| matrix.unique(i).to_string()))?;
    unique_pc.finish(|w| {
        write_unique(w, panel, |i| format!("{:.2}", matrix.unique_pc(panel, i)))
    })?;

    Ok(())
}

/// Print the absolute shared-k-mer matrix in fixed-width columns
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_console_matrix<W: Write>(
    w: &mut W,
    panel: &Panel,
    matrix: &SimilarityMatrix,
) -> io::Result<()> {
    write!(w, "\n{:CONSOLE_WIDTH$} ", "")?;
    for id in panel.ids() {
        write!(w, " {id:>CONSOLE_WIDTH$}")?;
    }
    writeln!(w)?;

    for (i, id) in panel.ids().enumerate() {
        write!(w, "{id:>CONSOLE_WIDTH$}")?;
        for j in 0..matrix.len() {
            write!(w, " {:>CONSOLE_WIDTH$}", matrix.shared(i, j))?;
        }
        writeln!(w)?;
    }
    Ok(())
}

fn write_matrix<W, F>(w: &mut W, panel: &Panel, cell: F) -> io::Result<()>
where
    W: Write,
    F: Fn(usize, usize) -> String,
{
    write!(w, "Contaminant")?;
    for id in panel.ids() {
        write!(w, "\t{id}")?;
    }
    writeln!(w)?;

    for (i, id) in panel.ids().enumerate() {
        write!(w, "{id}")?;
        for j in 0..panel.len() {
            write!(w, "\t{}", cell(i, j))?;
        }
        writeln!(w)?;
    }
    Ok(())
}

fn write_unique<W, F>(w: &mut W, panel: &Panel, cell: F) -> io::Result<()>
where
    W: Write,
    F: Fn(usize) -> String,
{
    let ids: Vec<&str> = panel.ids().collect();
    writeln!(w, "{}", ids.join("\t"))?;
    let values: Vec<String> = (0..panel.len()).map(cell).collect();
    writeln!(w, "{}", values.join("\t"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::panel::Contaminant;
    use crate::stats::similarity::SimilarityAnalyzer;
    use crate::store::MembershipTable;

    fn fixture() -> (Panel, SimilarityMatrix) {
        let panel = Panel::new(vec![Contaminant::new("a", 3), Contaminant::new("b", 2)]).unwrap();
        let mut table = MembershipTable::new(2);
        table.insert(table.entry("k1").with_member(0));
        table.insert(table.entry("k2").with_member(0));
        table.insert(table.entry("k3").with_member(0).with_member(1));
        table.insert(table.entry("k4").with_member(1));
        let matrix = SimilarityAnalyzer::new(&panel).analyze(&table);
        (panel, matrix)
    }

    #[test]
    fn test_paths_from_prefix() {
        let paths = SimilarityPaths::from_prefix("out/run1_");
        assert_eq!(
            paths.shared_absolute,
            PathBuf::from("out/run1_kmer_similarity_absolute.txt")
        );
        assert_eq!(paths.unique_pc, PathBuf::from("out/run1_kmer_unique_pc.txt"));
    }

    #[test]
    fn test_writes_all_files() {
        let (panel, matrix) = fixture();
        let dir = tempfile::tempdir().unwrap();
        let prefix = format!("{}/", dir.path().display());
        let paths = SimilarityPaths::from_prefix(&prefix);

        write_similarity_files(&paths, &panel, &matrix).unwrap();

        let abs = std::fs::read_to_string(&paths.shared_absolute).unwrap();
        assert_eq!(abs, "Contaminant\ta\tb\na\t3\t1\nb\t1\t2\n");

        let pc = std::fs::read_to_string(&paths.shared_pc).unwrap();
        assert_eq!(pc, "Contaminant\ta\tb\na\t100.00\t33.33\nb\t50.00\t100.00\n");

        let unique = std::fs::read_to_string(&paths.unique_absolute).unwrap();
        assert_eq!(unique, "a\tb\n2\t1\n");

        let unique_pc = std::fs::read_to_string(&paths.unique_pc).unwrap();
        assert_eq!(unique_pc, "a\tb\n66.67\t50.00\n");
    }

    #[test]
    fn test_unwritable_prefix_is_an_error() {
        let (panel, matrix) = fixture();
        let dir = tempfile::tempdir().unwrap();
        let prefix = format!("{}/missing/dir/", dir.path().display());

        let err = write_similarity_files(&SimilarityPaths::from_prefix(&prefix), &panel, &matrix)
            .unwrap_err();
        assert!(matches!(err, ReportError::Open { .. }));
    }

    #[test]
    fn test_console_matrix() {
        let (panel, matrix) = fixture();
        let mut out = Vec::new();
        write_console_matrix(&mut out, &panel, &matrix).unwrap();

        let text = String::from_utf8(out).unwrap();
        let rows: Vec<&str> = text.lines().skip(1).collect();
        assert_eq!(rows[0].split_whitespace().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(
            rows[1].split_whitespace().collect::<Vec<_>>(),
            vec!["a", "3", "1"]
        );
    }
}

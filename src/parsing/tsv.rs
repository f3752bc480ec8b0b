use std::fs::File;
use std::io::{BufRead, BufReader, Lines, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::core::hits::ReadHits;
use crate::core::panel::{Contaminant, Panel};
use crate::core::types::Mate;
use crate::parsing::ParseError;
use crate::store::MembershipTable;

/// Check if the path names a gzip-compressed table
pub fn is_gzipped(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gz"))
}

/// Open a table for line-oriented reading, decompressing `.gz` files
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be opened.
pub fn open_table(path: &Path) -> Result<Box<dyn BufRead + Send>, ParseError> {
    let file = File::open(path)?;
    if is_gzipped(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Parse a panel table file with columns: id, `reference_kmers`
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_panel_file(path: &Path) -> Result<Panel, ParseError> {
    let mut text = String::new();
    open_table(path)?.read_to_string(&mut text)?;
    parse_panel_text(&text)
}

/// Parse panel table text with columns: id, `reference_kmers`
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` for short lines or bad counts and
/// `ParseError::Panel` for an empty, oversized or duplicated panel.
pub fn parse_panel_text(text: &str) -> Result<Panel, ParseError> {
    let mut contaminants = Vec::new();

    for (line_num, fields) in data_lines(text.lines(), &["id", "contaminant"]) {
        if fields.len() < 2 {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num} has fewer than 2 fields"
            )));
        }

        let reference_kmers: u64 = fields[1].trim().parse().map_err(|_| {
            ParseError::InvalidFormat(format!(
                "Invalid k-mer count on line {}: '{}'",
                line_num, fields[1]
            ))
        })?;

        contaminants.push(Contaminant::new(fields[0].trim(), reference_kmers));
    }

    Ok(Panel::new(contaminants)?)
}

/// Streaming reader over a hit-count table, one [`ReadHits`] per line
pub struct HitTableReader<R: BufRead> {
    lines: Lines<R>,
    n_contaminants: usize,
    line_num: usize,
    header_checked: bool,
}

impl<R: BufRead> HitTableReader<R> {
    pub fn new(reader: R, n_contaminants: usize) -> Self {
        Self {
            lines: reader.lines(),
            n_contaminants,
            line_num: 0,
            header_checked: false,
        }
    }

    fn parse_line(&self, fields: &[&str]) -> Result<ReadHits, ParseError> {
        let line = self.line_num;
        if fields.len() < 4 {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line} has fewer than 4 fields"
            )));
        }

        let kmers_loaded: u32 = fields[1].trim().parse().map_err(|_| {
            ParseError::InvalidFormat(format!(
                "Invalid kmers_loaded on line {}: '{}'",
                line, fields[1]
            ))
        })?;
        let hits = self.parse_counts(fields[2])?;
        let unique_hits = self.parse_counts(fields[3])?;

        Ok(ReadHits::new(kmers_loaded, hits, unique_hits))
    }

    fn parse_counts(&self, field: &str) -> Result<Vec<u32>, ParseError> {
        let line = self.line_num;
        let counts = field
            .trim()
            .split(',')
            .map(|v| {
                v.trim().parse::<u32>().map_err(|_| {
                    ParseError::InvalidFormat(format!("Invalid hit count on line {line}: '{v}'"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if counts.len() != self.n_contaminants {
            return Err(ParseError::CountMismatch {
                line,
                expected: self.n_contaminants,
                found: counts.len(),
            });
        }
        Ok(counts)
    }
}

impl<R: BufRead> Iterator for HitTableReader<R> {
    type Item = Result<ReadHits, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_num += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = trimmed.split('\t').collect();
            if !self.header_checked {
                self.header_checked = true;
                if is_header(&fields, &["read_id", "read"]) {
                    continue;
                }
            }

            return Some(self.parse_line(&fields));
        }
    }
}

/// Parse a membership table file for a panel of `n_contaminants`
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_membership_file(path: &Path, n_contaminants: usize) -> Result<MembershipTable, ParseError> {
    let mut text = String::new();
    open_table(path)?.read_to_string(&mut text)?;
    parse_membership_text(&text, n_contaminants)
}

/// Parse membership table text with columns: kmer, members, observed
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` for short lines, unparseable
/// indices, indices outside the panel or an unknown observation flag.
pub fn parse_membership_text(text: &str, n_contaminants: usize) -> Result<MembershipTable, ParseError> {
    let mut table = MembershipTable::new(n_contaminants);

    for (line_num, fields) in data_lines(text.lines(), &["kmer"]) {
        if fields.len() < 2 {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num} has fewer than 2 fields"
            )));
        }

        let mut entry = table.entry(fields[0].trim());
        for member in fields[1].split(',').map(str::trim).filter(|m| !m.is_empty() && *m != "-") {
            let index: usize = member.parse().map_err(|_| {
                ParseError::InvalidFormat(format!(
                    "Invalid contaminant index on line {line_num}: '{member}'"
                ))
            })?;
            if index >= n_contaminants {
                return Err(ParseError::InvalidFormat(format!(
                    "Contaminant index {index} on line {line_num} is outside a panel of {n_contaminants}"
                )));
            }
            entry.set_member(index);
        }

        if let Some(observed) = fields.get(2) {
            for flag in observed.split(',').map(str::trim) {
                match flag {
                    "" | "-" => {}
                    "1" => entry.mark_observed(Mate::R1),
                    "2" => entry.mark_observed(Mate::R2),
                    other => {
                        return Err(ParseError::InvalidFormat(format!(
                            "Invalid observed flag on line {line_num}: '{other}'"
                        )))
                    }
                }
            }
        }

        table.insert(entry);
    }

    Ok(table)
}

/// Non-blank, non-comment lines as (1-based line number, tab-split fields),
/// dropping a leading header line
fn data_lines<'a, I>(lines: I, header_names: &'a [&'a str]) -> impl Iterator<Item = (usize, Vec<&'a str>)> + 'a
where
    I: Iterator<Item = &'a str> + 'a,
{
    let mut first_data_line = true;
    lines
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(n, line)| (n, line.split('\t').collect::<Vec<_>>()))
        .filter(move |(_, fields)| {
            let header = first_data_line && is_header(fields, header_names);
            first_data_line = false;
            !header
        })
}

fn is_header(fields: &[&str], names: &[&str]) -> bool {
    let first = fields.first().map(|s| s.trim().to_lowercase()).unwrap_or_default();
    names.contains(&first.as_str())
}

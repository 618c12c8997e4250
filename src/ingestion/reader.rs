//! Line-oriented source reader.
//!
//! [`SourceReader`] turns a buffered text source into a lazy sequence of
//! [`StructuredRecord`]s. The first non-blank line is the header; blank lines and lines whose
//! field count differs from the header's are skipped and counted in [`ReaderStats`].

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use crate::error::IngestionResult;
use crate::types::StructuredRecord;

use super::record::RecordBuilder;
use super::tokenizer::tokenize;

// Byte order mark some editors write at the start of UTF-8 files.
const BOM: char = '\u{feff}';

/// Counters collected while reading a source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderStats {
    /// Records yielded.
    pub records: usize,
    /// Empty or whitespace-only lines skipped (header position included).
    pub blank_lines: usize,
    /// Data lines dropped because their field count differs from the header's.
    pub shape_mismatches: usize,
}

/// Lazy record iterator over a text source.
///
/// Yields `Err` once if the underlying source fails mid-stream, then ends. The source is owned
/// by the reader and closed when the reader is dropped.
pub struct SourceReader<R> {
    lines: Lines<R>,
    line_no: usize,
    builder: Option<RecordBuilder>,
    stats: ReaderStats,
    failed: bool,
}

impl SourceReader<BufReader<File>> {
    /// Open `path` for reading.
    pub fn open(path: impl AsRef<Path>) -> IngestionResult<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> SourceReader<R> {
    /// Wrap an already-open buffered source.
    pub fn new(source: R) -> Self {
        Self {
            lines: source.lines(),
            line_no: 0,
            builder: None,
            stats: ReaderStats::default(),
            failed: false,
        }
    }

    /// Counters so far. Final once the iterator is exhausted.
    pub fn stats(&self) -> ReaderStats {
        self.stats
    }

    /// Parsed header paths, once the header line has been read.
    pub fn header(&self) -> Option<&RecordBuilder> {
        self.builder.as_ref()
    }
}

impl<R: BufRead> Iterator for SourceReader<R> {
    type Item = IngestionResult<StructuredRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let mut line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e.into()));
                }
            };
            self.line_no += 1;
            if self.line_no == 1 && line.starts_with(BOM) {
                line.replace_range(..BOM.len_utf8(), "");
            }

            if line.trim().is_empty() {
                self.stats.blank_lines += 1;
                continue;
            }

            let fields = tokenize(&line);
            if self.builder.is_none() {
                self.builder = Some(RecordBuilder::new(&fields));
                continue;
            }
            let Some(builder) = self.builder.as_ref() else {
                continue;
            };

            if fields.len() != builder.width() {
                self.stats.shape_mismatches += 1;
                tracing::debug!(
                    line = self.line_no,
                    expected = builder.width(),
                    found = fields.len(),
                    "dropping line with mismatched field count"
                );
                continue;
            }

            self.stats.records += 1;
            return Some(Ok(builder.build(&fields)));
        }
    }
}

/// Read every record from `path`.
///
/// Fails without returning a partial sequence if the file cannot be opened or read.
pub fn read_records_from_path(
    path: impl AsRef<Path>,
) -> IngestionResult<(Vec<StructuredRecord>, ReaderStats)> {
    let reader = SourceReader::open(path)?;
    collect_records(reader)
}

/// Read every record from an in-memory string.
pub fn read_records_from_str(input: &str) -> IngestionResult<(Vec<StructuredRecord>, ReaderStats)> {
    collect_records(SourceReader::new(input.as_bytes()))
}

fn collect_records<R: BufRead>(
    mut reader: SourceReader<R>,
) -> IngestionResult<(Vec<StructuredRecord>, ReaderStats)> {
    let records = reader.by_ref().collect::<IngestionResult<Vec<_>>>()?;
    Ok((records, reader.stats()))
}

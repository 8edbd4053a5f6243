//! The CSV sink: append-only, header-on-creation, flush-per-batch.
//!
//! A [`CsvSink`] owns its output artifact for the duration of one pipeline
//! run and is the sole writer. The state machine is small and explicit:
//!
//! ```text
//! HeaderPending ──first append──▶ Ready ──finish──▶ Closed
//! ```
//!
//! A sink opened over an existing non-empty artifact starts in `Ready`
//! (the header was written by whichever run created the file); a fresh
//! artifact starts in `HeaderPending`. No transition re-reads or rewrites
//! prior rows; the artifact only ever grows.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::{Result, TgrabError};
use crate::extract::ExportRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SinkState {
    HeaderPending,
    Ready,
    Closed,
}

/// Append-only CSV writer with quoted escaping.
///
/// Escaping of embedded delimiters, quotes, and line breaks is delegated
/// to the `csv` crate (wrap in quotes when needed, double embedded
/// quotes); text fields additionally arrive newline-escaped from the
/// extractor, so one row is always one physical line.
pub struct CsvSink {
    writer: csv::Writer<File>,
    state: SinkState,
    header: &'static [&'static str],
    path: PathBuf,
    rows_written: u64,
}

impl CsvSink {
    /// Opens (or creates) the artifact at `path` for appending.
    ///
    /// Parent directories are created as needed. The header is written on
    /// the first append iff the file is new or empty.
    pub fn open(path: &Path, header: &'static [&'static str]) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let fresh = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: csv::Writer::from_writer(file),
            state: if fresh {
                SinkState::HeaderPending
            } else {
                SinkState::Ready
            },
            header,
            path: path.to_path_buf(),
            rows_written: 0,
        })
    }

    /// Appends one row, writing the header first when pending.
    ///
    /// # Errors
    ///
    /// Returns [`TgrabError::RowShape`] when the row's field count doesn't
    /// match the header.
    pub fn append(&mut self, row: &ExportRow) -> Result<()> {
        if row.len() != self.header.len() {
            return Err(TgrabError::RowShape {
                expected: self.header.len(),
                actual: row.len(),
            });
        }

        if self.state == SinkState::HeaderPending {
            self.writer.write_record(self.header)?;
            self.state = SinkState::Ready;
        }

        self.writer.write_record(row.fields())?;
        self.rows_written += 1;
        Ok(())
    }

    /// Flushes buffered rows to disk.
    ///
    /// Called at page boundaries by the pipeline; after a flush the
    /// artifact is structurally valid even if the process dies.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Rows appended during this run.
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// The artifact path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final flush and close.
    ///
    /// A fresh artifact that received no rows still gets its header, so
    /// the output is a readable (empty) table rather than a zero-byte
    /// file.
    pub fn finish(mut self) -> Result<()> {
        if self.state == SinkState::HeaderPending {
            self.writer.write_record(self.header)?;
        }
        self.state = SinkState::Closed;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Extractor;
    use crate::record::RawRecord;
    use chrono::{TimeZone, Utc};

    fn sample_row(id: u64, text: &str) -> ExportRow {
        let rec = RawRecord::new(id, text)
            .with_date(Utc.with_ymd_and_hms(2025, 11, 5, 10, 0, 0).unwrap());
        Extractor::posts().row(&rec)
    }

    const HEADER: &[&str] = &[
        "message_id",
        "date",
        "text",
        "views",
        "forwards",
        "reply_to_id",
        "edited",
        "pinned",
    ];

    #[test]
    fn test_header_written_once_with_first_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut sink = CsvSink::open(&path, HEADER).unwrap();
        sink.append(&sample_row(1, "first")).unwrap();
        sink.append(&sample_row(2, "second")).unwrap();
        sink.finish().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("message_id,date,text"));
    }

    #[test]
    fn test_append_to_existing_writes_no_second_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut sink = CsvSink::open(&path, HEADER).unwrap();
        sink.append(&sample_row(1, "first")).unwrap();
        sink.finish().unwrap();

        let mut sink = CsvSink::open(&path, HEADER).unwrap();
        sink.append(&sample_row(2, "second")).unwrap();
        sink.finish().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("message_id").count(), 1);
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn test_empty_export_still_gets_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let sink = CsvSink::open(&path, HEADER).unwrap();
        sink.finish().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("message_id,"));
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_trailing_newline_terminates_last_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut sink = CsvSink::open(&path, HEADER).unwrap();
        sink.append(&sample_row(1, "only")).unwrap();
        sink.finish().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_row_shape_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut sink = CsvSink::open(&path, HEADER).unwrap();
        let rec = RawRecord::new(1, "x");
        let narrow = Extractor::messages().row(&rec); // 7 fields vs 8
        let err = sink.append(&narrow).unwrap_err();
        assert!(matches!(err, TgrabError::RowShape { expected: 8, actual: 7 }));
    }

    #[test]
    fn test_flush_leaves_valid_partial_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut sink = CsvSink::open(&path, HEADER).unwrap();
        sink.append(&sample_row(1, "flushed")).unwrap();
        sink.flush().unwrap();

        // Read while the sink is still open: the flushed prefix parses.
        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<_> = reader.records().collect::<std::result::Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 1);
        drop(sink);
    }

    #[test]
    fn test_quoting_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut sink = CsvSink::open(&path, HEADER).unwrap();
        sink.append(&sample_row(1, "comma, quote \" and more")).unwrap();
        sink.finish().unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(record.len(), HEADER.len());
        assert_eq!(&record[2], "comma, quote \" and more");
    }

    #[test]
    fn test_rows_written_counter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut sink = CsvSink::open(&path, HEADER).unwrap();
        assert_eq!(sink.rows_written(), 0);
        sink.append(&sample_row(1, "a")).unwrap();
        sink.append(&sample_row(2, "b")).unwrap();
        assert_eq!(sink.rows_written(), 2);
        sink.finish().unwrap();
    }
}

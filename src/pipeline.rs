//! The export pipeline: stream → filter → extract → sink.
//!
//! One [`run_export`] call is one sequential pass over one target: resolve
//! the target, open the artifact, pull records page by page, bound them to
//! the date range, flatten them to rows, append and flush. No stage
//! overlaps another; the only suspension points are the client's page
//! fetches.

use std::path::PathBuf;

use crate::client::HistoryClient;
use crate::error::Result;
use crate::extract::Extractor;
use crate::filter::RangeFilter;
use crate::range::DateRange;
use crate::record::RawRecord;
use crate::sink::CsvSink;
use crate::source::{DEFAULT_PAGE_SIZE, RecordStream, RetryPolicy};
use crate::target::Target;

/// Configuration of one export run.
///
/// Everything the pipeline needs, passed explicitly; no globals.
///
/// # Examples
///
/// ```
/// use tgrab::pipeline::ExportConfig;
/// use tgrab::range::DateRange;
/// use tgrab::target::Target;
///
/// # fn main() -> tgrab::Result<()> {
/// let config = ExportConfig::new(Target::Channel { peer: -1001271343429 })
///     .with_range(DateRange::parse("2025-11-01", "2025-12-01")?);
/// assert_eq!(
///     config.output_path().to_str().unwrap(),
///     "posts/-1001271343429_posts.csv"
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// What to export.
    pub target: Target,
    /// Optional date bounds; `None` exports the full history.
    pub range: Option<DateRange>,
    /// Output artifact path; `None` uses the target's default layout.
    pub output: Option<PathBuf>,
    /// History page size.
    pub page_size: usize,
    /// Retry policy for transient failures.
    pub retry: RetryPolicy,
}

impl ExportConfig {
    /// Creates a configuration with defaults for everything but the target.
    pub fn new(target: Target) -> Self {
        Self {
            target,
            range: None,
            output: None,
            page_size: DEFAULT_PAGE_SIZE,
            retry: RetryPolicy::default(),
        }
    }

    /// Bounds the export to a date range.
    #[must_use]
    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Overrides the output artifact path.
    #[must_use]
    pub fn with_output(mut self, output: PathBuf) -> Self {
        self.output = Some(output);
        self
    }

    /// Overrides the history page size.
    #[must_use]
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = size.max(1);
        self
    }

    /// Overrides the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The effective output path.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.target.default_output())
    }
}

/// Counters of one completed export run.
#[derive(Debug, Clone)]
pub struct ExportStats {
    /// Rows appended to the artifact.
    pub written: u64,
    /// History pages fetched.
    pub pages: u64,
    /// Resolved title of the peer.
    pub title: String,
    /// The artifact the rows went to.
    pub output: PathBuf,
}

/// Runs one export pass.
///
/// Resolution happens before the artifact is touched, so a missing target
/// never creates or modifies output. A fatal mid-run error still flushes
/// every complete row appended so far; the artifact stays valid.
pub fn run_export<C: HistoryClient>(client: &mut C, config: &ExportConfig) -> Result<ExportStats> {
    let info = client.resolve_target(&config.target)?;

    let extractor = match config.target {
        Target::Channel { .. } => Extractor::posts(),
        Target::Chat { .. } => Extractor::messages(),
        Target::Post { peer, post_id } => {
            // Comments live in the linked discussion group; resolving the
            // thread is what ties them back to the channel post.
            client.resolve_discussion(peer, post_id)?;
            Extractor::comments(post_id)
        }
    };

    let output = config.output_path();
    let mut sink = CsvSink::open(&output, extractor.header())?;

    let mut stream = RecordStream::open(client, config.target)
        .with_page_size(config.page_size)
        .with_retry(config.retry);

    let drained = match config.range {
        Some(range) => drain(
            RangeFilter::new(&mut stream, range, info.order),
            &extractor,
            &mut sink,
            config.page_size,
        ),
        None => drain(&mut stream, &extractor, &mut sink, config.page_size),
    };

    let pages = stream.pages_fetched();
    let written = match drained {
        Ok(written) => written,
        Err(e) => {
            // Keep the artifact valid: header present, complete rows
            // flushed. The error still terminates the run.
            let _ = sink.finish();
            return Err(e);
        }
    };

    sink.finish()?;

    Ok(ExportStats {
        written,
        pages,
        title: info.title,
        output,
    })
}

/// Pulls the record sequence into the sink, flushing at batch boundaries.
fn drain<I>(records: I, extractor: &Extractor, sink: &mut CsvSink, batch: usize) -> Result<u64>
where
    I: Iterator<Item = Result<RawRecord>>,
{
    let batch = batch.max(1) as u64;
    let mut written: u64 = 0;
    for result in records {
        let record = result?;
        sink.append(&extractor.row(&record))?;
        written += 1;
        if written % batch == 0 {
            sink.flush()?;
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Cursor, DiscussionThread, Page, TargetInfo};
    use crate::error::TgrabError;
    use crate::range::SortOrder;
    use chrono::{DateTime, TimeZone, Utc};

    struct FixedClient {
        records: Vec<RawRecord>,
        order: SortOrder,
    }

    impl HistoryClient for FixedClient {
        fn resolve_target(&mut self, _target: &Target) -> Result<TargetInfo> {
            Ok(TargetInfo {
                title: "Test Peer".into(),
                order: self.order,
            })
        }

        fn history_page(
            &mut self,
            _target: &Target,
            cursor: Option<&Cursor>,
            limit: usize,
        ) -> Result<Page> {
            let remaining: Vec<RawRecord> = self
                .records
                .iter()
                .filter(|r| cursor.is_none_or(|c| r.id < c.offset_id))
                .cloned()
                .collect();
            let records: Vec<RawRecord> = remaining.iter().take(limit).cloned().collect();
            let next = if remaining.len() > records.len() {
                records.last().map(|r| Cursor { offset_id: r.id })
            } else {
                None
            };
            Ok(Page { records, next })
        }

        fn resolve_discussion(
            &mut self,
            _channel_peer: i64,
            post_id: u64,
        ) -> Result<DiscussionThread> {
            Ok(DiscussionThread {
                discussion_peer: -100999,
                root_id: post_id,
            })
        }
    }

    fn ts(month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, month, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_channel_export_bounded_by_range() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("posts.csv");

        let mut client = FixedClient {
            records: vec![
                RawRecord::new(3, "december post").with_date(ts(12, 2)),
                RawRecord::new(2, "late november").with_date(ts(11, 20)),
                RawRecord::new(1, "early november").with_date(ts(11, 5)),
            ],
            order: SortOrder::NewestFirst,
        };

        let config = ExportConfig::new(Target::Channel { peer: -1001 })
            .with_range(DateRange::parse("2025-11-01", "2025-12-01").unwrap())
            .with_output(out.clone());

        let stats = run_export(&mut client, &config).unwrap();
        assert_eq!(stats.written, 2);
        assert_eq!(stats.title, "Test Peer");

        let content = std::fs::read_to_string(&out).unwrap();
        assert!(content.contains("late november"));
        assert!(content.contains("early november"));
        assert!(!content.contains("december post"));
    }

    #[test]
    fn test_full_history_without_range() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("chat.csv");

        let mut client = FixedClient {
            records: vec![
                RawRecord::new(2, "two").with_date(ts(11, 2)),
                RawRecord::new(1, "one").with_date(ts(11, 1)),
            ],
            order: SortOrder::NewestFirst,
        };

        let config =
            ExportConfig::new(Target::Chat { peer: -200 }).with_output(out.clone());
        let stats = run_export(&mut client, &config).unwrap();
        assert_eq!(stats.written, 2);
    }

    #[test]
    fn test_not_found_creates_no_artifact() {
        struct Missing;
        impl HistoryClient for Missing {
            fn resolve_target(&mut self, target: &Target) -> Result<TargetInfo> {
                Err(TgrabError::not_found(target.to_string()))
            }
            fn history_page(&mut self, _: &Target, _: Option<&Cursor>, _: usize) -> Result<Page> {
                unreachable!("resolution failed first")
            }
            fn resolve_discussion(&mut self, _: i64, _: u64) -> Result<DiscussionThread> {
                unreachable!("resolution failed first")
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("never.csv");
        let config = ExportConfig::new(Target::Channel { peer: -1 }).with_output(out.clone());

        let err = run_export(&mut Missing, &config).unwrap_err();
        assert!(err.is_not_found());
        assert!(!out.exists());
    }

    #[test]
    fn test_comment_rows_carry_configured_post() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("comments.csv");

        let mut client = FixedClient {
            records: vec![
                RawRecord::new(12, "second comment")
                    .with_date(ts(11, 6))
                    .with_sender(2, "Bob"),
                RawRecord::new(11, "first comment")
                    .with_date(ts(11, 5))
                    .with_sender(1, "Alice"),
            ],
            order: SortOrder::NewestFirst,
        };

        let config = ExportConfig::new(Target::Post {
            peer: -1001271343429,
            post_id: 158404,
        })
        .with_output(out.clone());

        let stats = run_export(&mut client, &config).unwrap();
        assert_eq!(stats.written, 2);

        let mut reader = csv::Reader::from_path(&out).unwrap();
        for record in reader.records() {
            let record = record.unwrap();
            assert_eq!(&record[5], "158404");
        }
    }

    #[test]
    fn test_default_output_path() {
        let config = ExportConfig::new(Target::Chat { peer: -42 });
        assert_eq!(
            config.output_path(),
            PathBuf::from("chats/-42_chat_messages.csv")
        );
    }
}

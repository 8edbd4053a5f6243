//! # tgrab
//!
//! A Rust library and CLI for exporting structured Telegram records
//! (channel posts, chat messages, and comments on posts) to CSV files
//! over a date range.
//!
//! ## Overview
//!
//! The core of tgrab is a paginated, date-bounded export loop with
//! resumable cursor semantics and deterministic flat-file serialization:
//!
//! ```text
//! RecordStream ──▶ RangeFilter ──▶ Extractor ──▶ CsvSink
//! ```
//!
//! The platform client is a port ([`client::HistoryClient`]): the pipeline
//! asks it to resolve a target, fetch one page of history, and resolve a
//! post's discussion thread, and nothing else. The shipped
//! [`archive::ArchiveClient`] adapter serves a Telegram Desktop JSON
//! export through that port; a live protocol client plugs into the same
//! seam behind an authenticated session.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tgrab::archive::ArchiveClient;
//! use tgrab::pipeline::{ExportConfig, run_export};
//! use tgrab::range::DateRange;
//! use tgrab::target::Target;
//!
//! fn main() -> tgrab::Result<()> {
//!     let mut client = ArchiveClient::open("channel_export.json".as_ref())?;
//!
//!     let config = ExportConfig::new(Target::Channel { peer: -1001271343429 })
//!         .with_range(DateRange::parse("2025-11-01", "2025-12-01")?);
//!
//!     let stats = run_export(&mut client, &config)?;
//!     println!("{} rows -> {}", stats.written, stats.output.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Resuming an interrupted export
//!
//! A [`source::RecordStream`] is not restartable after partial
//! consumption; it is *resumable*. Persist
//! [`source::RecordStream::resume_cursor`] and re-enter with
//! [`source::RecordStream::resume`] to continue from the last-seen record
//! instead of re-downloading the history.
//!
//! ## Module Structure
//!
//! - [`pipeline`] — [`ExportConfig`](pipeline::ExportConfig),
//!   [`run_export`](pipeline::run_export): one sequential export pass
//! - [`client`] — the [`HistoryClient`](client::HistoryClient) port,
//!   [`Page`](client::Page), [`Cursor`](client::Cursor)
//! - [`source`] — [`RecordStream`](source::RecordStream): lazy,
//!   cursor-resumable paging with rate-limit and retry handling
//! - [`filter`] — [`RangeFilter`](filter::RangeFilter): date bounds with
//!   direction-aware early termination
//! - [`extract`] — [`ExportKind`](extract::ExportKind),
//!   [`Extractor`](extract::Extractor): record-to-row projection
//! - [`sink`] — [`CsvSink`](sink::CsvSink): append-only CSV output
//! - [`archive`] — [`ArchiveClient`](archive::ArchiveClient): the
//!   archive-backed client adapter
//! - [`record`] — [`RawRecord`](record::RawRecord) and parsing helpers
//! - [`range`] — [`DateRange`](range::DateRange),
//!   [`SortOrder`](range::SortOrder)
//! - [`target`] — [`Target`](target::Target): what to export
//! - [`session`] — [`Credentials`](session::Credentials) and the session
//!   bootstrap artifact
//! - [`error`] — [`TgrabError`], [`Result`]
//! - [`cli`] — CLI argument types

pub mod archive;
pub mod cli;
pub mod client;
pub mod error;
pub mod extract;
pub mod filter;
pub mod pipeline;
pub mod range;
pub mod record;
pub mod session;
pub mod sink;
pub mod source;
pub mod target;

// Re-export the main types at the crate root for convenience
pub use error::{Result, TgrabError};
pub use record::RawRecord;

/// Convenient re-exports for common usage.
///
/// ```rust
/// use tgrab::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{Result, TgrabError};

    pub use crate::client::{Cursor, DiscussionThread, HistoryClient, Page, TargetInfo};
    pub use crate::extract::{ExportKind, ExportRow, Extractor};
    pub use crate::filter::RangeFilter;
    pub use crate::pipeline::{ExportConfig, ExportStats, run_export};
    pub use crate::range::{DateRange, SortOrder};
    pub use crate::record::RawRecord;
    pub use crate::sink::CsvSink;
    pub use crate::source::{RecordStream, RetryPolicy};
    pub use crate::target::Target;

    pub use crate::archive::ArchiveClient;
    pub use crate::session::{Credentials, SessionFile};
}

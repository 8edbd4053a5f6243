//! The platform client port.
//!
//! [`HistoryClient`] is the seam between the export pipeline and whatever
//! actually talks to the messaging platform. The pipeline only ever asks
//! for three things: resolve a target, fetch one page of history, resolve
//! a post's discussion thread. A live protocol client implements this
//! trait behind an authenticated session; [`crate::archive::ArchiveClient`]
//! implements it over a local history archive.
//!
//! The paging contract follows the platform's history API: pages are
//! served in the source's natural order, bounded by an offset-id cursor,
//! and a page without a `next` cursor ends the sequence.

use crate::error::Result;
use crate::range::SortOrder;
use crate::record::RawRecord;
use crate::target::Target;

/// An opaque resume position within a paginated history.
///
/// Wraps the identifier of the last record the caller has seen. Passing it
/// back to [`HistoryClient::history_page`] continues the fetch from that
/// point instead of restarting from the beginning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Identifier of the last-seen record.
    pub offset_id: u64,
}

/// One page of history.
#[derive(Debug, Clone)]
pub struct Page {
    /// Records in the source's natural order. May be empty.
    pub records: Vec<RawRecord>,
    /// Cursor for the following page, or `None` when the history is
    /// exhausted.
    pub next: Option<Cursor>,
}

impl Page {
    /// An empty terminal page.
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            next: None,
        }
    }
}

/// Resolved metadata about an export target.
#[derive(Debug, Clone)]
pub struct TargetInfo {
    /// Human-readable title of the peer.
    pub title: String,
    /// The order [`HistoryClient::history_page`] serves records in.
    pub order: SortOrder,
}

/// A channel post's comment thread, hosted in the linked discussion group.
///
/// The platform models comments as ordinary messages in a discussion
/// group, replying (directly or transitively) to the group's copy of the
/// post. Resolving this linkage is a lookup, not a field read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscussionThread {
    /// Peer identifier of the discussion group.
    pub discussion_peer: i64,
    /// Identifier of the thread root inside the discussion group.
    pub root_id: u64,
}

/// Paginated access to a peer's history.
///
/// Implementations surface [`TgrabError::RateLimited`] when the platform
/// asks the caller to wait and [`TgrabError::NotFound`] when the target is
/// missing or inaccessible; neither is swallowed here; the record stream
/// decides how to react.
///
/// [`TgrabError::RateLimited`]: crate::error::TgrabError::RateLimited
/// [`TgrabError::NotFound`]: crate::error::TgrabError::NotFound
pub trait HistoryClient {
    /// Resolves a target to its metadata, verifying it exists and is
    /// accessible.
    fn resolve_target(&mut self, target: &Target) -> Result<TargetInfo>;

    /// Fetches one page of history.
    ///
    /// With `cursor == None` the page starts at the head of the history;
    /// otherwise it continues past the cursor's record. `limit` caps the
    /// page size. For a [`Target::Post`], the page contains the post's
    /// comments.
    fn history_page(
        &mut self,
        target: &Target,
        cursor: Option<&Cursor>,
        limit: usize,
    ) -> Result<Page>;

    /// Resolves the discussion thread hosting a channel post's comments.
    fn resolve_discussion(&mut self, channel_peer: i64, post_id: u64) -> Result<DiscussionThread>;
}

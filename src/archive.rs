//! History client backed by a Telegram Desktop JSON export.
//!
//! [`ArchiveClient`] is the reference [`HistoryClient`] adapter: it serves
//! a local archive through the same paginated, cursor-bounded contract a
//! live platform client provides. Pages come newest-first, bounded by an
//! offset-id cursor; a mismatched peer is `NotFound`; comment threads are
//! resolved by following reply chains to their root post.
//!
//! Archive structure:
//!
//! ```json
//! {
//!   "name": "Chat Name",
//!   "type": "public_channel",
//!   "id": 1271343429,
//!   "messages": [
//!     {"id": 1, "type": "message", "date_unixtime": "…", "text": "…"}
//!   ]
//! }
//! ```

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::client::{Cursor, DiscussionThread, HistoryClient, Page, TargetInfo};
use crate::error::{Result, TgrabError};
use crate::range::SortOrder;
use crate::record::{ArchiveRawMessage, RawRecord, parse_archive_message};
use crate::target::Target;

/// Offset between a channel's bare export id and its `-100…` peer id.
const CHANNEL_PEER_BASE: i64 = 1_000_000_000_000;

#[derive(Debug, Deserialize)]
struct ArchiveFile {
    name: Option<String>,
    id: Option<i64>,
    messages: Vec<ArchiveRawMessage>,
}

/// A [`HistoryClient`] over one exported peer history.
#[derive(Debug)]
pub struct ArchiveClient {
    title: String,
    archive_id: Option<i64>,
    /// Records sorted newest-first (descending id).
    records: Vec<RawRecord>,
    /// Reply linkage for thread-root resolution.
    reply_to: HashMap<u64, u64>,
}

impl ArchiveClient {
    /// Loads an archive file.
    ///
    /// # Errors
    ///
    /// Returns [`TgrabError::Io`] if the file cannot be read,
    /// [`TgrabError::Json`] if it is not valid JSON, and
    /// [`TgrabError::InvalidArchive`] if the structure is wrong.
    pub fn open(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        let archive: ArchiveFile = serde_json::from_str(&data).map_err(|e| {
            TgrabError::invalid_archive(e.to_string(), Some(path.to_path_buf()))
        })?;

        let mut records: Vec<RawRecord> = archive
            .messages
            .iter()
            .filter_map(parse_archive_message)
            .collect();
        records.sort_by(|a, b| b.id.cmp(&a.id));

        let reply_to = records
            .iter()
            .filter_map(|r| r.reply_to.map(|parent| (r.id, parent)))
            .collect();

        Ok(Self {
            title: archive.name.unwrap_or_else(|| "archive".to_string()),
            archive_id: archive.id,
            records,
            reply_to,
        })
    }

    /// Number of records in the archive.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the archive holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Checks a target peer against the archive's own id.
    ///
    /// Accepts the bare export id, the `-100…` channel form, and the
    /// negated basic-group form. Archives without an id accept any peer.
    fn peer_matches(&self, peer: i64) -> bool {
        match self.archive_id {
            None => true,
            Some(id) => peer == id || peer == -id || peer == -(CHANNEL_PEER_BASE + id),
        }
    }

    fn contains_id(&self, id: u64) -> bool {
        self.records.iter().any(|r| r.id == id)
    }

    /// Follows the reply chain from `id` to its root message.
    fn thread_root(&self, id: u64) -> u64 {
        let mut current = id;
        // The chain is finite; the step cap guards against a malformed
        // archive with a reply cycle.
        for _ in 0..self.reply_to.len() + 1 {
            match self.reply_to.get(&current) {
                Some(parent) => current = *parent,
                None => break,
            }
        }
        current
    }

    /// Serves one newest-first page out of `ids`-filtered records.
    fn page_of<F>(&self, keep: F, cursor: Option<&Cursor>, limit: usize) -> Page
    where
        F: Fn(&RawRecord) -> bool,
    {
        let remaining: Vec<&RawRecord> = self
            .records
            .iter()
            .filter(|r| keep(r))
            .filter(|r| cursor.is_none_or(|c| r.id < c.offset_id))
            .collect();

        let records: Vec<RawRecord> = remaining
            .iter()
            .take(limit.max(1))
            .map(|r| (*r).clone())
            .collect();

        let next = if remaining.len() > records.len() {
            records.last().map(|r| Cursor { offset_id: r.id })
        } else {
            None
        };

        Page { records, next }
    }
}

impl HistoryClient for ArchiveClient {
    fn resolve_target(&mut self, target: &Target) -> Result<TargetInfo> {
        if !self.peer_matches(target.peer()) {
            return Err(TgrabError::not_found(format!(
                "{target}: archive holds peer {:?}",
                self.archive_id
            )));
        }
        if let Target::Post { post_id, .. } = target {
            if !self.contains_id(*post_id) {
                return Err(TgrabError::not_found(target.to_string()));
            }
        }
        Ok(TargetInfo {
            title: self.title.clone(),
            order: SortOrder::NewestFirst,
        })
    }

    fn history_page(
        &mut self,
        target: &Target,
        cursor: Option<&Cursor>,
        limit: usize,
    ) -> Result<Page> {
        if !self.peer_matches(target.peer()) {
            return Err(TgrabError::not_found(target.to_string()));
        }

        match *target {
            Target::Channel { .. } | Target::Chat { .. } => {
                Ok(self.page_of(|_| true, cursor, limit))
            }
            Target::Post { post_id, .. } => {
                // A comment is any record whose reply chain roots at the
                // post; the post itself is not a comment.
                let thread: HashSet<u64> = self
                    .records
                    .iter()
                    .map(|r| r.id)
                    .filter(|id| *id != post_id && self.thread_root(*id) == post_id)
                    .collect();
                Ok(self.page_of(|r| thread.contains(&r.id), cursor, limit))
            }
        }
    }

    fn resolve_discussion(&mut self, channel_peer: i64, post_id: u64) -> Result<DiscussionThread> {
        if !self.peer_matches(channel_peer) {
            return Err(TgrabError::not_found(format!("channel {channel_peer}")));
        }
        if !self.contains_id(post_id) {
            return Err(TgrabError::not_found(format!(
                "post {post_id} in channel {channel_peer}"
            )));
        }
        Ok(DiscussionThread {
            discussion_peer: channel_peer,
            root_id: post_id,
        })
    }
}

//! Flattening platform records into output rows.
//!
//! An [`Extractor`] is a pure projection `RawRecord -> ExportRow` for one
//! [`ExportKind`]. Missing optional attributes become empty fields, never
//! errors, and text is newline-escaped so one record always serializes to
//! one physical CSV row.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::record::RawRecord;

/// The three export kinds, each with a fixed column set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// Broadcast channel posts.
    ChannelPosts,
    /// Chat / megagroup messages.
    ChatMessages,
    /// Comments under one channel post.
    Comments,
}

impl ExportKind {
    /// The output header for this kind. Field order is stable across runs.
    pub fn header(&self) -> &'static [&'static str] {
        match self {
            ExportKind::ChannelPosts => &[
                "message_id",
                "date",
                "text",
                "views",
                "forwards",
                "reply_to_id",
                "edited",
                "pinned",
            ],
            ExportKind::ChatMessages => &[
                "message_id",
                "date",
                "sender_id",
                "sender_name",
                "text",
                "reply_to_id",
                "edited",
            ],
            ExportKind::Comments => &[
                "comment_id",
                "date",
                "sender_id",
                "sender_name",
                "text",
                "parent_post_id",
                "reply_to_id",
            ],
        }
    }
}

impl std::fmt::Display for ExportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportKind::ChannelPosts => write!(f, "channel posts"),
            ExportKind::ChatMessages => write!(f, "chat messages"),
            ExportKind::Comments => write!(f, "comments"),
        }
    }
}

/// One serialized output row; field order matches the kind's header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    fields: Vec<String>,
}

impl ExportRow {
    /// The row's fields in header order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Projects records of one export kind into rows.
#[derive(Debug, Clone)]
pub struct Extractor {
    kind: ExportKind,
    parent_post: Option<u64>,
}

impl Extractor {
    /// Extractor for channel posts.
    pub fn posts() -> Self {
        Self {
            kind: ExportKind::ChannelPosts,
            parent_post: None,
        }
    }

    /// Extractor for chat messages.
    pub fn messages() -> Self {
        Self {
            kind: ExportKind::ChatMessages,
            parent_post: None,
        }
    }

    /// Extractor for comments of the given channel post.
    ///
    /// `parent_post` is the originating post's identifier in the channel,
    /// resolved through the discussion-thread lookup, not read off the
    /// comment record.
    pub fn comments(parent_post: u64) -> Self {
        Self {
            kind: ExportKind::Comments,
            parent_post: Some(parent_post),
        }
    }

    /// The export kind this extractor produces.
    pub fn kind(&self) -> ExportKind {
        self.kind
    }

    /// The header matching this extractor's rows.
    pub fn header(&self) -> &'static [&'static str] {
        self.kind.header()
    }

    /// Projects one record into a row. Never fails: absent attributes
    /// become empty fields.
    pub fn row(&self, rec: &RawRecord) -> ExportRow {
        let text = escape_breaks(&rec.text);
        let fields = match self.kind {
            ExportKind::ChannelPosts => vec![
                rec.id.to_string(),
                fmt_date(rec.date),
                text,
                fmt_opt(rec.views),
                fmt_opt(rec.forwards),
                fmt_opt(rec.reply_to),
                fmt_date(rec.edited),
                rec.pinned.to_string(),
            ],
            ExportKind::ChatMessages => vec![
                rec.id.to_string(),
                fmt_date(rec.date),
                fmt_opt(rec.sender_id),
                rec.sender_name.clone().map(|s| escape_breaks(&s)).unwrap_or_default(),
                text,
                fmt_opt(rec.reply_to),
                fmt_date(rec.edited),
            ],
            ExportKind::Comments => vec![
                rec.id.to_string(),
                fmt_date(rec.date),
                fmt_opt(rec.sender_id),
                rec.sender_name.clone().map(|s| escape_breaks(&s)).unwrap_or_default(),
                text,
                fmt_opt(self.parent_post),
                fmt_opt(rec.reply_to),
            ],
        };
        ExportRow { fields }
    }
}

/// Escapes line breaks so a text field stays on one physical line.
fn escape_breaks(text: &str) -> String {
    if !text.contains(['\r', '\n']) {
        return text.to_string();
    }
    text.replace('\r', "\\r").replace('\n', "\\n")
}

/// RFC 3339 UTC seconds, or the empty sentinel.
fn fmt_date(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

fn fmt_opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

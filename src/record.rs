//! The platform record view and shared Telegram parsing helpers.
//!
//! [`RawRecord`] is the read-only projection of one platform message, post,
//! or comment for the duration of a pipeline pass. The record source
//! produces it, the date-range filter inspects its timestamp, and the field
//! extractor flattens it into an output row.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// One platform record: a channel post, chat message, or discussion reply.
///
/// Optional attributes stay `None` when the platform omits them (a post has
/// no sender, a plain message has no view counter); downstream extraction
/// substitutes empty sentinels instead of failing.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// Message identifier within its peer.
    pub id: u64,

    /// When the record was sent. Service records may lack a timestamp.
    pub date: Option<DateTime<Utc>>,

    /// Numeric sender identifier, absent for anonymous channel posts.
    pub sender_id: Option<i64>,

    /// Sender display name, absent for anonymous channel posts.
    pub sender_name: Option<String>,

    /// Text content. Empty for pure-media records.
    pub text: String,

    /// Identifier of the message this one replies to.
    pub reply_to: Option<u64>,

    /// View counter (channel posts only).
    pub views: Option<u64>,

    /// Forward counter (channel posts only).
    pub forwards: Option<u64>,

    /// When the record was last edited.
    pub edited: Option<DateTime<Utc>>,

    /// Whether the record is pinned in its peer.
    pub pinned: bool,
}

impl RawRecord {
    /// Creates a minimal record with an id and text; everything else unset.
    pub fn new(id: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            date: None,
            sender_id: None,
            sender_name: None,
            text: text.into(),
            reply_to: None,
            views: None,
            forwards: None,
            edited: None,
            pinned: false,
        }
    }

    /// Builder method to set the timestamp.
    #[must_use]
    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Builder method to set the sender.
    #[must_use]
    pub fn with_sender(mut self, id: i64, name: impl Into<String>) -> Self {
        self.sender_id = Some(id);
        self.sender_name = Some(name.into());
        self
    }

    /// Builder method to set the reply linkage.
    #[must_use]
    pub fn with_reply_to(mut self, reply_id: u64) -> Self {
        self.reply_to = Some(reply_id);
        self
    }

    /// Builder method to set post counters.
    #[must_use]
    pub fn with_counters(mut self, views: u64, forwards: u64) -> Self {
        self.views = Some(views);
        self.forwards = Some(forwards);
        self
    }
}

// ============================================================================
// Telegram JSON helpers (shared by the archive client)
// ============================================================================

/// Raw message structure of a Telegram Desktop JSON export.
#[derive(Debug, Deserialize)]
pub struct ArchiveRawMessage {
    /// Message ID
    pub id: Option<u64>,
    /// Message type; only "message" entries carry exportable content
    #[serde(rename = "type")]
    pub msg_type: String,
    /// Unix timestamp as string
    pub date_unixtime: Option<String>,
    /// Sender display name
    pub from: Option<String>,
    /// Sender identifier, e.g. "user123456" or "channel123456"
    pub from_id: Option<String>,
    /// Message text (string or entity array)
    pub text: Option<Value>,
    /// Reply reference
    pub reply_to_message_id: Option<u64>,
    /// Edit timestamp as string
    pub edited_unixtime: Option<String>,
    /// View counter, present on channel posts
    pub views: Option<u64>,
    /// Forward counter, present on channel posts
    pub forwards: Option<u64>,
}

/// Extracts plain text from Telegram's `text` field.
///
/// The field is either a simple string or an array mixing strings with
/// entity objects (`{"type": "link", "text": "url"}`); both collapse to a
/// single string.
pub fn flatten_text(text_value: &Value) -> String {
    match text_value {
        Value::String(s) => s.clone(),
        Value::Array(arr) => arr
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Object(obj) => obj
                    .get("text")
                    .and_then(|v| v.as_str())
                    .map(ToString::to_string),
                _ => None,
            })
            .collect::<String>(),
        _ => String::new(),
    }
}

/// Parses a Unix timestamp string ("1234567890") to a UTC datetime.
pub fn parse_unix_timestamp(ts_str: &str) -> Option<DateTime<Utc>> {
    ts_str
        .parse::<i64>()
        .ok()
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
}

/// Parses a `from_id` handle ("user123456", "channel987") to its numeric part.
pub fn parse_peer_handle(handle: &str) -> Option<i64> {
    let digits = handle.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    digits.parse::<i64>().ok()
}

/// Converts an archive message into a [`RawRecord`].
///
/// Returns `None` for non-message entries (service actions) and for
/// entries without an id. Empty text is kept: a media-only post is still
/// a record.
pub fn parse_archive_message(msg: &ArchiveRawMessage) -> Option<RawRecord> {
    if msg.msg_type != "message" {
        return None;
    }

    let id = msg.id?;
    let text = msg.text.as_ref().map(flatten_text).unwrap_or_default();

    Some(RawRecord {
        id,
        date: msg
            .date_unixtime
            .as_ref()
            .and_then(|ts| parse_unix_timestamp(ts)),
        sender_id: msg.from_id.as_ref().and_then(|h| parse_peer_handle(h)),
        sender_name: msg.from.clone(),
        text,
        reply_to: msg.reply_to_message_id,
        views: msg.views,
        forwards: msg.forwards,
        edited: msg
            .edited_unixtime
            .as_ref()
            .and_then(|ts| parse_unix_timestamp(ts)),
        pinned: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_text_string() {
        let value = json!("Hello world");
        assert_eq!(flatten_text(&value), "Hello world");
    }

    #[test]
    fn test_flatten_text_entity_array() {
        let value = json!([
            "Check this: ",
            {"type": "link", "text": "https://example.com"},
            " cool!"
        ]);
        assert_eq!(flatten_text(&value), "Check this: https://example.com cool!");
    }

    #[test]
    fn test_flatten_text_null() {
        let value = json!(null);
        assert_eq!(flatten_text(&value), "");
    }

    #[test]
    fn test_parse_unix_timestamp() {
        let ts = parse_unix_timestamp("1700000000").unwrap();
        assert_eq!(ts.timestamp(), 1_700_000_000);
        assert!(parse_unix_timestamp("not-a-number").is_none());
    }

    #[test]
    fn test_parse_peer_handle() {
        assert_eq!(parse_peer_handle("user123456"), Some(123456));
        assert_eq!(parse_peer_handle("channel987"), Some(987));
        assert_eq!(parse_peer_handle("42"), Some(42));
        assert_eq!(parse_peer_handle("user"), None);
    }

    #[test]
    fn test_parse_archive_message() {
        let raw: ArchiveRawMessage = serde_json::from_value(json!({
            "id": 7,
            "type": "message",
            "date_unixtime": "1700000000",
            "from": "Alice",
            "from_id": "user123",
            "text": "hi",
            "reply_to_message_id": 5
        }))
        .unwrap();

        let rec = parse_archive_message(&raw).unwrap();
        assert_eq!(rec.id, 7);
        assert_eq!(rec.sender_id, Some(123));
        assert_eq!(rec.sender_name.as_deref(), Some("Alice"));
        assert_eq!(rec.text, "hi");
        assert_eq!(rec.reply_to, Some(5));
        assert!(rec.date.is_some());
    }

    #[test]
    fn test_parse_archive_message_skips_service() {
        let raw: ArchiveRawMessage = serde_json::from_value(json!({
            "id": 8,
            "type": "service",
            "text": ""
        }))
        .unwrap();
        assert!(parse_archive_message(&raw).is_none());
    }

    #[test]
    fn test_parse_archive_message_keeps_empty_text() {
        let raw: ArchiveRawMessage = serde_json::from_value(json!({
            "id": 9,
            "type": "message",
            "date_unixtime": "1700000001",
            "text": ""
        }))
        .unwrap();
        let rec = parse_archive_message(&raw).unwrap();
        assert_eq!(rec.text, "");
    }

    #[test]
    fn test_record_builder() {
        let ts = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let rec = RawRecord::new(1, "post")
            .with_date(ts)
            .with_sender(10, "Bob")
            .with_reply_to(0)
            .with_counters(100, 5);

        assert_eq!(rec.date, Some(ts));
        assert_eq!(rec.sender_id, Some(10));
        assert_eq!(rec.views, Some(100));
        assert_eq!(rec.forwards, Some(5));
    }
}

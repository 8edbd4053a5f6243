//! Export targets: the channel, chat, or post being exported from.
//!
//! A [`Target`] pairs the platform's signed numeric peer identifier with
//! the kind of export it drives. Supplied by configuration; immutable for
//! the duration of a run.

use std::path::PathBuf;

use crate::error::TgrabError;

/// What to export.
///
/// Peer identifiers follow the platform convention: positive for users,
/// negative for basic groups, `-100…`-prefixed for channels and
/// supergroups (e.g. `-1001271343429`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// All posts of a broadcast channel.
    Channel {
        /// Channel peer identifier
        peer: i64,
    },
    /// All messages of a chat or megagroup.
    Chat {
        /// Chat peer identifier
        peer: i64,
    },
    /// Comments under one channel post (hosted in the linked discussion
    /// group).
    Post {
        /// Channel peer identifier
        peer: i64,
        /// Post identifier within the channel
        post_id: u64,
    },
}

impl Target {
    /// The peer identifier this target lives in.
    pub fn peer(&self) -> i64 {
        match self {
            Target::Channel { peer } | Target::Chat { peer } | Target::Post { peer, .. } => *peer,
        }
    }

    /// The default output artifact path for this target.
    ///
    /// Mirrors the layout of the original export tooling:
    /// `posts/<peer>_posts.csv`, `chats/<peer>_chat_messages.csv`,
    /// `comments/<peer>_<post>_comments.csv`.
    pub fn default_output(&self) -> PathBuf {
        match self {
            Target::Channel { peer } => PathBuf::from(format!("posts/{peer}_posts.csv")),
            Target::Chat { peer } => PathBuf::from(format!("chats/{peer}_chat_messages.csv")),
            Target::Post { peer, post_id } => {
                PathBuf::from(format!("comments/{peer}_{post_id}_comments.csv"))
            }
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Channel { peer } => write!(f, "channel {peer}"),
            Target::Chat { peer } => write!(f, "chat {peer}"),
            Target::Post { peer, post_id } => write!(f, "post {post_id} in channel {peer}"),
        }
    }
}

/// Parses a peer identifier from its decimal string form.
pub fn parse_peer(input: &str) -> Result<i64, TgrabError> {
    input
        .trim()
        .parse::<i64>()
        .map_err(|_| TgrabError::InvalidPeer(input.to_string()))
}

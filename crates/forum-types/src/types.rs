//! Core Discord domain types

use chrono::{DateTime, Utc};

/// Milliseconds between the Unix epoch and the Discord epoch (2015-01-01).
pub const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;

/// Creation time encoded in a Discord snowflake id.
pub fn snowflake_time(id: u64) -> DateTime<Utc> {
    let ms = (id >> 22).saturating_add(DISCORD_EPOCH_MS);
    DateTime::from_timestamp_millis(ms as i64).unwrap_or_default()
}

/// Smallest snowflake id created at `at`. Times before the Discord epoch map to 0.
pub fn snowflake_at(at: DateTime<Utc>) -> u64 {
    let ms = at.timestamp_millis().max(0) as u64;
    ms.saturating_sub(DISCORD_EPOCH_MS) << 22
}

/// Discord guild (server)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscordGuild {
    pub id: u64,
    pub name: String,
}

/// The channel kinds the janitor distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Text,
    Forum,
    /// Public, private or announcement thread.
    Thread,
    Other,
}

/// A tag from a forum's tag catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForumTag {
    pub id: u64,
    pub name: String,
}

/// A guild channel: either a forum (with `available_tags`) or a thread
/// inside one (with `applied_tags`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscordChannel {
    pub id: u64,
    pub kind: ChannelKind,
    pub name: String,
    pub parent_id: Option<u64>,
    pub owner_id: Option<u64>,
    pub last_message_id: Option<u64>,
    pub pinned: bool,
    pub archived: bool,
    pub applied_tags: Vec<u64>,
    pub available_tags: Vec<ForumTag>,
}

impl DiscordChannel {
    /// Time of the most recent message, or the thread's own creation time
    /// when no message id is recorded.
    pub fn last_activity(&self) -> DateTime<Utc> {
        snowflake_time(self.last_message_id.unwrap_or(self.id))
    }

    pub fn has_tag(&self, tag_id: u64) -> bool {
        self.applied_tags.contains(&tag_id)
    }

    pub fn is_forum(&self) -> bool {
        self.kind == ChannelKind::Forum
    }

    /// First catalog tag with exactly this name.
    pub fn find_tag(&self, name: &str) -> Option<&ForumTag> {
        self.available_tags.iter().find(|t| t.name == name)
    }

    /// Applied tags with `tag_id` appended, unless it is already present.
    pub fn tags_with(&self, tag_id: u64) -> Vec<u64> {
        let mut tags = self.applied_tags.clone();
        if !tags.contains(&tag_id) {
            tags.push(tag_id);
        }
        tags
    }

    /// Applied tags with every occurrence of `tag_id` removed, order preserved.
    pub fn tags_without(&self, tag_id: u64) -> Vec<u64> {
        self.applied_tags
            .iter()
            .copied()
            .filter(|t| *t != tag_id)
            .collect()
    }
}

/// Message kinds relevant to the pinned-thread sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Regular,
    InlineReply,
    Other,
}

/// Discord message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscordMessage {
    pub id: u64,
    pub channel_id: u64,
    pub author_id: u64,
    pub kind: MessageKind,
}

impl DiscordMessage {
    /// True for user-authored comments (plain messages and replies).
    pub fn is_comment(&self) -> bool {
        matches!(self.kind, MessageKind::Regular | MessageKind::InlineReply)
    }
}

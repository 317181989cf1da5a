//! In-memory forum API for unit testing without a Discord connection.
//!
//! Records every call in order and applies mutations to its own state, so a
//! second sweep sees the effects of the first one.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use forum_types::{
    snowflake_at, ChannelKind, DiscordChannel, DiscordErrorCode, DiscordGuild, DiscordMessage,
    ForumTag, MessageKind,
};

use crate::api::ForumApi;
use crate::errors::{Error, Result};

/// One recorded API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Guilds,
    ActiveThreads(u64),
    Channel(u64),
    Archive(u64),
    SetTags(u64, Vec<u64>),
    Messages(u64),
    DeleteMessage(u64, u64),
}

impl ApiCall {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Archive(_) | Self::SetTags(..) | Self::DeleteMessage(..)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Failure {
    Guilds,
    ActiveThreads(u64),
    Channel(u64),
    Archive(u64),
    SetTags(u64),
    Messages(u64),
    DeleteMessage(u64),
}

#[derive(Default)]
struct MockState {
    guilds: Vec<DiscordGuild>,
    guild_threads: HashMap<u64, Vec<u64>>,
    channels: HashMap<u64, DiscordChannel>,
    messages: HashMap<u64, Vec<DiscordMessage>>,
    failures: HashSet<Failure>,
    calls: Vec<ApiCall>,
    list_archived: bool,
}

/// Call-recording [`ForumApi`] with failure injection.
#[derive(Clone, Default)]
pub struct MockForumApi {
    state: Arc<Mutex<MockState>>,
}

impl MockForumApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_guild(&self, id: u64, name: &str) {
        self.state.lock().unwrap().guilds.push(DiscordGuild {
            id,
            name: name.to_string(),
        });
    }

    pub fn add_forum(&self, forum: DiscordChannel) {
        self.state.lock().unwrap().channels.insert(forum.id, forum);
    }

    pub fn add_thread(&self, guild_id: u64, thread: DiscordChannel) {
        let mut state = self.state.lock().unwrap();
        state.guild_threads.entry(guild_id).or_default().push(thread.id);
        state.channels.insert(thread.id, thread);
    }

    /// Add a message; listings return messages newest first.
    pub fn add_message(&self, message: DiscordMessage) {
        let mut state = self.state.lock().unwrap();
        let list = state.messages.entry(message.channel_id).or_default();
        list.push(message);
        list.sort_by(|a, b| b.id.cmp(&a.id));
    }

    /// Keep archived threads in `active_threads` listings, like a listing
    /// taken just before another client archived them.
    pub fn list_archived_threads(&self) {
        self.state.lock().unwrap().list_archived = true;
    }

    /// Current state of a channel, including mutations made through the API.
    pub fn channel_state(&self, id: u64) -> Option<DiscordChannel> {
        self.state.lock().unwrap().channels.get(&id).cloned()
    }

    pub fn message_ids(&self, channel_id: u64) -> Vec<u64> {
        self.state
            .lock()
            .unwrap()
            .messages
            .get(&channel_id)
            .map(|list| list.iter().map(|m| m.id).collect())
            .unwrap_or_default()
    }

    /// Snapshot of all calls in the order they were made.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn mutations(&self) -> Vec<ApiCall> {
        self.calls().into_iter().filter(ApiCall::is_mutation).collect()
    }

    pub fn count(&self, pred: impl Fn(&ApiCall) -> bool) -> usize {
        self.state.lock().unwrap().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn fail_guilds(&self) {
        self.fail(Failure::Guilds);
    }

    pub fn fail_active_threads(&self, guild_id: u64) {
        self.fail(Failure::ActiveThreads(guild_id));
    }

    pub fn fail_channel(&self, channel_id: u64) {
        self.fail(Failure::Channel(channel_id));
    }

    pub fn fail_archive(&self, thread_id: u64) {
        self.fail(Failure::Archive(thread_id));
    }

    pub fn fail_set_tags(&self, thread_id: u64) {
        self.fail(Failure::SetTags(thread_id));
    }

    pub fn fail_messages(&self, channel_id: u64) {
        self.fail(Failure::Messages(channel_id));
    }

    pub fn fail_delete(&self, message_id: u64) {
        self.fail(Failure::DeleteMessage(message_id));
    }

    fn fail(&self, failure: Failure) {
        self.state.lock().unwrap().failures.insert(failure);
    }

    /// Record the call, then report whether it was set up to fail.
    fn record(&self, call: ApiCall, failure: Failure) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.failures.contains(&failure) {
            return Err(Error::Api {
                code: DiscordErrorCode::MissingPermissions,
                status: 403,
                message: "Missing Permissions".to_string(),
            });
        }
        Ok(())
    }
}

impl ForumApi for MockForumApi {
    async fn guilds(&self) -> Result<Vec<DiscordGuild>> {
        self.record(ApiCall::Guilds, Failure::Guilds)?;
        Ok(self.state.lock().unwrap().guilds.clone())
    }

    async fn active_threads(&self, guild_id: u64) -> Result<Vec<DiscordChannel>> {
        self.record(ApiCall::ActiveThreads(guild_id), Failure::ActiveThreads(guild_id))?;
        let state = self.state.lock().unwrap();
        let ids = state.guild_threads.get(&guild_id).cloned().unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|id| state.channels.get(id))
            .filter(|t| state.list_archived || !t.archived)
            .cloned()
            .collect())
    }

    async fn channel(&self, channel_id: u64) -> Result<DiscordChannel> {
        self.record(ApiCall::Channel(channel_id), Failure::Channel(channel_id))?;
        self.state
            .lock()
            .unwrap()
            .channels
            .get(&channel_id)
            .cloned()
            .ok_or(Error::Api {
                code: DiscordErrorCode::UnknownChannel,
                status: 404,
                message: "Unknown Channel".to_string(),
            })
    }

    async fn archive_thread(&self, thread_id: u64) -> Result<()> {
        self.record(ApiCall::Archive(thread_id), Failure::Archive(thread_id))?;
        if let Some(thread) = self.state.lock().unwrap().channels.get_mut(&thread_id) {
            thread.archived = true;
        }
        Ok(())
    }

    async fn set_applied_tags(&self, thread_id: u64, tags: Vec<u64>) -> Result<()> {
        self.record(
            ApiCall::SetTags(thread_id, tags.clone()),
            Failure::SetTags(thread_id),
        )?;
        if let Some(thread) = self.state.lock().unwrap().channels.get_mut(&thread_id) {
            thread.applied_tags = tags;
        }
        Ok(())
    }

    async fn messages(&self, channel_id: u64) -> Result<Vec<DiscordMessage>> {
        self.record(ApiCall::Messages(channel_id), Failure::Messages(channel_id))?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .messages
            .get(&channel_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<()> {
        self.record(
            ApiCall::DeleteMessage(channel_id, message_id),
            Failure::DeleteMessage(message_id),
        )?;
        if let Some(list) = self.state.lock().unwrap().messages.get_mut(&channel_id) {
            list.retain(|m| m.id != message_id);
        }
        Ok(())
    }
}

// ── Fixtures ──────────────────────────────────────────────────────────────────

/// A forum channel with the given `(id, name)` tag catalog.
pub fn forum_channel(id: u64, tags: &[(u64, &str)]) -> DiscordChannel {
    DiscordChannel {
        id,
        kind: ChannelKind::Forum,
        name: format!("forum-{id}"),
        parent_id: None,
        owner_id: None,
        last_message_id: None,
        pinned: false,
        archived: false,
        applied_tags: vec![],
        available_tags: tags
            .iter()
            .map(|(id, name)| ForumTag {
                id: *id,
                name: name.to_string(),
            })
            .collect(),
    }
}

/// A thread in `parent_id` whose last message was posted at `last_activity`.
pub fn thread_channel(id: u64, parent_id: u64, last_activity: DateTime<Utc>) -> DiscordChannel {
    DiscordChannel {
        id,
        kind: ChannelKind::Thread,
        name: format!("thread-{id}"),
        parent_id: Some(parent_id),
        owner_id: Some(4242),
        last_message_id: Some(snowflake_at(last_activity)),
        pinned: false,
        archived: false,
        applied_tags: vec![],
        available_tags: vec![],
    }
}

pub fn message(id: u64, channel_id: u64, author_id: u64, kind: MessageKind) -> DiscordMessage {
    DiscordMessage {
        id,
        channel_id,
        author_id,
        kind,
    }
}

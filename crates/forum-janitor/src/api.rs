//! Forum API boundary: the calls the janitor makes against Discord.
//!
//! [`ForumApi`] is the seam between the rule engine and the platform.
//! [`DiscordApi`] implements it on top of serenity's HTTP client and is the
//! only place serenity channel and message models are converted into
//! `forum-types` values.

#[path = "api_tests.rs"]
mod api_tests;

use std::future::Future;
use std::sync::Arc;

use forum_types::{ChannelKind, DiscordChannel, DiscordGuild, DiscordMessage, ForumTag, MessageKind};
use serenity::builder::{EditThread, GetMessages};
use serenity::http::{GuildPagination, Http};
use serenity::model::channel::{Channel, ChannelFlags, ChannelType, GuildChannel, Message, MessageType};
use serenity::model::id::{ChannelId, ForumTagId, GuildId, MessageId};
use tracing::debug;

use crate::errors::{Error, Result};

const GUILD_PAGE_SIZE: u64 = 200;
const MESSAGE_PAGE_SIZE: u8 = 100;

/// Read and mutate forum state on the messaging platform.
///
/// Every call is one request (or one paginated listing) with no retries;
/// the periodic sweep is the retry mechanism.
pub trait ForumApi: Send + Sync + 'static {
    /// All guilds the bot is a member of.
    fn guilds(&self) -> impl Future<Output = Result<Vec<DiscordGuild>>> + Send;

    /// Threads of a guild that are not archived.
    fn active_threads(
        &self,
        guild_id: u64,
    ) -> impl Future<Output = Result<Vec<DiscordChannel>>> + Send;

    /// Fetch one channel fresh, bypassing list-endpoint staleness.
    fn channel(&self, channel_id: u64) -> impl Future<Output = Result<DiscordChannel>> + Send;

    /// Set the archived flag on a thread.
    fn archive_thread(&self, thread_id: u64) -> impl Future<Output = Result<()>> + Send;

    /// Replace a thread's applied-tag list.
    fn set_applied_tags(
        &self,
        thread_id: u64,
        tags: Vec<u64>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Every message in a channel, newest first.
    fn messages(&self, channel_id: u64) -> impl Future<Output = Result<Vec<DiscordMessage>>> + Send;

    fn delete_message(
        &self,
        channel_id: u64,
        message_id: u64,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// [`ForumApi`] backed by serenity's REST client.
#[derive(Clone)]
pub struct DiscordApi {
    http: Arc<Http>,
}

impl DiscordApi {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

impl ForumApi for DiscordApi {
    async fn guilds(&self) -> Result<Vec<DiscordGuild>> {
        let mut guilds = Vec::new();
        let mut after: Option<GuildId> = None;

        loop {
            let page = self
                .http
                .get_guilds(after.map(GuildPagination::After), Some(GUILD_PAGE_SIZE))
                .await?;
            let full_page = page.len() as u64 == GUILD_PAGE_SIZE;
            after = page.last().map(|g| g.id);

            guilds.extend(page.into_iter().map(|g| DiscordGuild {
                id: g.id.get(),
                name: g.name,
            }));

            if !full_page {
                break;
            }
        }

        Ok(guilds)
    }

    async fn active_threads(&self, guild_id: u64) -> Result<Vec<DiscordChannel>> {
        let data = self
            .http
            .get_guild_active_threads(GuildId::new(guild_id))
            .await?;
        Ok(data.threads.iter().map(convert_channel).collect())
    }

    async fn channel(&self, channel_id: u64) -> Result<DiscordChannel> {
        match self.http.get_channel(ChannelId::new(channel_id)).await? {
            Channel::Guild(channel) => Ok(convert_channel(&channel)),
            _ => Err(Error::NotGuildChannel(channel_id)),
        }
    }

    async fn archive_thread(&self, thread_id: u64) -> Result<()> {
        ChannelId::new(thread_id)
            .edit_thread(&*self.http, EditThread::new().archived(true))
            .await?;
        Ok(())
    }

    async fn set_applied_tags(&self, thread_id: u64, tags: Vec<u64>) -> Result<()> {
        let builder = EditThread::new().applied_tags(tags.into_iter().map(ForumTagId::new));
        ChannelId::new(thread_id)
            .edit_thread(&*self.http, builder)
            .await?;
        Ok(())
    }

    async fn messages(&self, channel_id: u64) -> Result<Vec<DiscordMessage>> {
        let channel = ChannelId::new(channel_id);
        let mut messages = Vec::new();
        let mut before: Option<MessageId> = None;

        loop {
            let mut request = GetMessages::new().limit(MESSAGE_PAGE_SIZE);
            if let Some(id) = before {
                request = request.before(id);
            }

            let page = channel.messages(&*self.http, request).await?;
            let full_page = page.len() == MESSAGE_PAGE_SIZE as usize;
            // Pages come newest first, so the last entry is the oldest.
            before = page.last().map(|m| m.id);
            messages.extend(page.iter().map(convert_message));

            if !full_page {
                break;
            }
        }

        debug!(channel_id, count = messages.len(), "listed messages");
        Ok(messages)
    }

    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<()> {
        ChannelId::new(channel_id)
            .delete_message(&*self.http, MessageId::new(message_id))
            .await?;
        Ok(())
    }
}

// ── Conversion helpers ─────────────────────────────────────────────────────

pub(crate) fn convert_channel_kind(kind: ChannelType) -> ChannelKind {
    match kind {
        ChannelType::Text => ChannelKind::Text,
        ChannelType::Forum => ChannelKind::Forum,
        ChannelType::PublicThread | ChannelType::PrivateThread | ChannelType::NewsThread => {
            ChannelKind::Thread
        }
        _ => ChannelKind::Other,
    }
}

pub(crate) fn convert_channel(channel: &GuildChannel) -> DiscordChannel {
    DiscordChannel {
        id: channel.id.get(),
        kind: convert_channel_kind(channel.kind),
        name: channel.name.clone(),
        parent_id: channel.parent_id.map(|id| id.get()),
        owner_id: channel.owner_id.map(|id| id.get()),
        last_message_id: channel.last_message_id.map(|id| id.get()),
        pinned: channel.flags.contains(ChannelFlags::PINNED),
        archived: channel
            .thread_metadata
            .as_ref()
            .is_some_and(|meta| meta.archived),
        applied_tags: channel.applied_tags.iter().map(|id| id.get()).collect(),
        available_tags: channel
            .available_tags
            .iter()
            .map(|tag| ForumTag {
                id: tag.id.get(),
                name: tag.name.clone(),
            })
            .collect(),
    }
}

pub(crate) fn convert_message_kind(kind: MessageType) -> MessageKind {
    match kind {
        MessageType::Regular => MessageKind::Regular,
        MessageType::InlineReply => MessageKind::InlineReply,
        _ => MessageKind::Other,
    }
}

pub(crate) fn convert_message(msg: &Message) -> DiscordMessage {
    DiscordMessage {
        id: msg.id.get(),
        channel_id: msg.channel_id.get(),
        author_id: msg.author.id.get(),
        kind: convert_message_kind(msg.kind),
    }
}

//! Interaction dispatcher for user-invoked actions.
//!
//! Slash commands and button clicks arrive as an [`InteractionRequest`],
//! are routed on `(kind, name)` to an action, and always produce exactly one
//! [`Reply`]. Validation failures become ephemeral replies visible only to
//! the invoker.

#[path = "interactions_tests.rs"]
mod interactions_tests;

use forum_types::{DiscordChannel, ForumTag, ModeratorPolicy};
use thiserror::Error;
use tracing::{debug, info};

use crate::api::ForumApi;
use crate::errors::{log_error, Error};
use crate::tags::TagNames;

pub const SOLVED_COMMAND: &str = "solved";
pub const DONE_COMMAND: &str = "done";
/// Custom id of the button attached to the `/done` prompt.
pub const SOLVED_BUTTON: &str = "solved";

const SOLVED_CONFIRMATION: &str = "Thread marked as solved";
const DONE_PROMPT: &str = "Looks like this one is wrapped up! \
If your question has been answered, press the button below to mark the post as solved.";
const SOLVED_BUTTON_LABEL: &str = "Mark as solved";

/// What the user invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionKind {
    /// Slash command, by name.
    Command(String),
    /// Button click, by custom id.
    Button(String),
    /// Autocomplete, modal submit and friends.
    Other,
}

/// Platform-neutral view of one incoming interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionRequest {
    pub kind: InteractionKind,
    pub guild_id: Option<u64>,
    pub channel_id: u64,
    pub user_id: u64,
    pub role_ids: Vec<u64>,
}

/// A clickable button attached to a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyButton {
    pub custom_id: String,
    pub label: String,
}

/// The single response to an interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    /// Visible only to the invoker.
    pub ephemeral: bool,
    pub button: Option<ReplyButton>,
}

impl Reply {
    pub fn public(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: false,
            button: None,
        }
    }

    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: true,
            button: None,
        }
    }

    pub fn with_button(mut self, custom_id: &str, label: &str) -> Self {
        self.button = Some(ReplyButton {
            custom_id: custom_id.to_string(),
            label: label.to_string(),
        });
        self
    }
}

/// Reasons an action was refused. The display text is shown to the user.
#[derive(Debug, Error)]
enum Rejection {
    #[error("can't read channel: {0}")]
    ChannelFetch(Error),
    #[error("can't read parent channel: {0}")]
    ParentFetch(Error),
    #[error("this command only works in forum posts")]
    NotForumPost,
    #[error("permission denied")]
    PermissionDenied,
    #[error("no solved tag found to apply")]
    NoSolvedTag,
    #[error("post already marked as solved")]
    AlreadySolved,
    #[error("error applying tag: {0}")]
    ApplyTag(Error),
    #[error("unknown command {0:?}")]
    UnknownCommand(String),
    #[error("unknown interaction")]
    UnknownInteraction,
}

impl Rejection {
    fn api_error(&self) -> Option<&Error> {
        match self {
            Self::ChannelFetch(e) | Self::ParentFetch(e) | Self::ApplyTag(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    MarkSolved,
    PromptDone,
}

fn route(kind: &InteractionKind) -> Result<Action, Rejection> {
    match kind {
        InteractionKind::Command(name) => match name.as_str() {
            SOLVED_COMMAND => Ok(Action::MarkSolved),
            DONE_COMMAND => Ok(Action::PromptDone),
            _ => Err(Rejection::UnknownCommand(name.clone())),
        },
        InteractionKind::Button(id) if id == SOLVED_BUTTON => Ok(Action::MarkSolved),
        InteractionKind::Button(_) | InteractionKind::Other => Err(Rejection::UnknownInteraction),
    }
}

/// A forum post together with the forum it lives in.
struct ForumPost {
    thread: DiscordChannel,
    forum: DiscordChannel,
}

pub struct InteractionDispatcher {
    policy: ModeratorPolicy,
    tag_names: TagNames,
}

impl InteractionDispatcher {
    pub fn new(policy: ModeratorPolicy, tag_names: TagNames) -> Self {
        Self { policy, tag_names }
    }

    /// Handle one interaction. Never fails: every outcome is a reply.
    pub async fn dispatch<A: ForumApi>(&self, api: &A, req: &InteractionRequest) -> Reply {
        let result = match route(&req.kind) {
            Ok(Action::MarkSolved) => self.mark_solved(api, req).await,
            Ok(Action::PromptDone) => self.prompt_done(api, req).await,
            Err(rejection) => Err(rejection),
        };

        result.unwrap_or_else(|rejection| {
            match rejection.api_error() {
                Some(e) => log_error(
                    &format!("interaction in channel {} failed", req.channel_id),
                    e,
                ),
                None => debug!(
                    channel_id = req.channel_id,
                    user_id = req.user_id,
                    reason = %rejection,
                    "interaction rejected"
                ),
            }
            Reply::ephemeral(rejection.to_string())
        })
    }

    async fn mark_solved<A: ForumApi>(
        &self,
        api: &A,
        req: &InteractionRequest,
    ) -> Result<Reply, Rejection> {
        let post = self.forum_post(api, req).await?;

        if !self
            .policy
            .can_close(req.user_id, post.thread.owner_id, &req.role_ids)
        {
            return Err(Rejection::PermissionDenied);
        }

        let tag = self.unapplied_solved_tag(&post)?;
        api.set_applied_tags(post.thread.id, post.thread.tags_with(tag.id))
            .await
            .map_err(Rejection::ApplyTag)?;

        info!(
            thread_id = post.thread.id,
            user_id = req.user_id,
            "thread marked as solved"
        );
        Ok(Reply::public(SOLVED_CONFIRMATION))
    }

    /// Ask the poster to close the thread. Makes no changes itself.
    async fn prompt_done<A: ForumApi>(
        &self,
        api: &A,
        req: &InteractionRequest,
    ) -> Result<Reply, Rejection> {
        let post = self.forum_post(api, req).await?;
        self.unapplied_solved_tag(&post)?;
        Ok(Reply::public(DONE_PROMPT).with_button(SOLVED_BUTTON, SOLVED_BUTTON_LABEL))
    }

    /// Fetch the invoking channel and check it is a post in a forum.
    async fn forum_post<A: ForumApi>(
        &self,
        api: &A,
        req: &InteractionRequest,
    ) -> Result<ForumPost, Rejection> {
        if req.guild_id.is_none() {
            return Err(Rejection::NotForumPost);
        }

        let thread = api
            .channel(req.channel_id)
            .await
            .map_err(Rejection::ChannelFetch)?;
        let parent_id = thread.parent_id.ok_or(Rejection::NotForumPost)?;
        let forum = api
            .channel(parent_id)
            .await
            .map_err(Rejection::ParentFetch)?;

        if !forum.is_forum() {
            return Err(Rejection::NotForumPost);
        }
        Ok(ForumPost { thread, forum })
    }

    fn unapplied_solved_tag<'p>(&self, post: &'p ForumPost) -> Result<&'p ForumTag, Rejection> {
        let tag = post
            .forum
            .find_tag(&self.tag_names.solved)
            .ok_or(Rejection::NoSolvedTag)?;
        if post.thread.has_tag(tag.id) {
            return Err(Rejection::AlreadySolved);
        }
        Ok(tag)
    }
}

//! Pinned-thread sweeper.
//!
//! Pinned threads are read-only announcements: every plain message or reply
//! other than the starter post is deleted.

use forum_types::DiscordChannel;
use tracing::info;

use crate::api::ForumApi;
use crate::errors::log_error;

/// Counts from sweeping one pinned thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PinnedSweep {
    pub deleted: usize,
    pub failed: usize,
}

pub async fn sweep_pinned<A: ForumApi>(api: &A, thread: &DiscordChannel) -> PinnedSweep {
    let mut result = PinnedSweep::default();

    let messages = match api.messages(thread.id).await {
        Ok(messages) => messages,
        Err(e) => {
            log_error(&format!("unable to list messages in pinned thread {}", thread.id), &e);
            result.failed += 1;
            return result;
        }
    };

    // The starter message shares the thread's id.
    for message in messages.iter().filter(|m| m.id != thread.id && m.is_comment()) {
        match api.delete_message(thread.id, message.id).await {
            Ok(()) => {
                info!(
                    thread_id = thread.id,
                    message_id = message.id,
                    author_id = message.author_id,
                    "deleted comment in pinned thread"
                );
                result.deleted += 1;
            }
            Err(e) => {
                log_error(
                    &format!("unable to delete message {} in thread {}", message.id, thread.id),
                    &e,
                );
                result.failed += 1;
            }
        }
    }

    result
}

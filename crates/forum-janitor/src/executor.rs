//! Lifecycle executor: turns a [`Decision`] into exactly one mutating call.
//!
//! Failures are logged with the thread id and reported as
//! [`Outcome::Failed`]; nothing is retried. The next sweep will classify the
//! thread again.

use forum_types::DiscordChannel;
use tracing::{debug, info};

use crate::api::ForumApi;
use crate::classifier::Decision;
use crate::errors::{log_error, Result};

/// Result of applying one decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to do, or the desired state already holds.
    Skipped,
    Archived,
    TagApplied,
    TagRemoved,
    Failed,
}

pub struct LifecycleExecutor<'a, A: ForumApi> {
    api: &'a A,
}

impl<'a, A: ForumApi> LifecycleExecutor<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    pub async fn apply(&self, thread: &DiscordChannel, decision: Decision) -> Outcome {
        let result = match decision {
            Decision::Leave(reason) => {
                debug!(thread_id = thread.id, ?reason, "leaving thread");
                return Outcome::Skipped;
            }
            Decision::ArchiveSolved | Decision::ArchiveStale => self.archive(thread, decision).await,
            Decision::ApplyStale(tag_id) => self.retag(thread, tag_id, true).await,
            Decision::RemoveStale(tag_id) => self.retag(thread, tag_id, false).await,
        };

        result.unwrap_or_else(|e| {
            let context = format!("unable to update thread {} ({:?})", thread.id, decision);
            log_error(&context, &e);
            Outcome::Failed
        })
    }

    async fn archive(&self, thread: &DiscordChannel, decision: Decision) -> Result<Outcome> {
        self.api.archive_thread(thread.id).await?;
        let reason = if decision == Decision::ArchiveSolved {
            "solved"
        } else {
            "stale"
        };
        info!(thread_id = thread.id, name = %thread.name, reason, "archived thread");
        Ok(Outcome::Archived)
    }

    /// Add or remove one tag, starting from a fresh copy of the thread so a
    /// stale listing cannot drop tags applied since.
    async fn retag(&self, thread: &DiscordChannel, tag_id: u64, add: bool) -> Result<Outcome> {
        let fresh = self.api.channel(thread.id).await?;
        if fresh.has_tag(tag_id) == add {
            debug!(thread_id = thread.id, tag_id, "tag already in desired state");
            return Ok(Outcome::Skipped);
        }

        let tags = if add {
            fresh.tags_with(tag_id)
        } else {
            fresh.tags_without(tag_id)
        };
        self.api.set_applied_tags(thread.id, tags).await?;

        if add {
            info!(thread_id = thread.id, name = %thread.name, "marked thread as stale");
            Ok(Outcome::TagApplied)
        } else {
            info!(thread_id = thread.id, name = %thread.name, "removed stale tag");
            Ok(Outcome::TagRemoved)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::SkipReason;
    use crate::mock::{thread_channel, ApiCall, MockForumApi};
    use chrono::Utc;

    const STALE: u64 = 2;

    fn setup(applied: &[u64]) -> (MockForumApi, DiscordChannel) {
        let api = MockForumApi::new();
        let mut thread = thread_channel(100, 10, Utc::now());
        thread.applied_tags = applied.to_vec();
        api.add_thread(1, thread.clone());
        (api, thread)
    }

    #[tokio::test]
    async fn test_leave_makes_no_calls() {
        let (api, thread) = setup(&[]);
        let outcome = LifecycleExecutor::new(&api)
            .apply(&thread, Decision::Leave(SkipReason::RecentActivity))
            .await;
        assert_eq!(outcome, Outcome::Skipped);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_archive_issues_single_call() {
        let (api, thread) = setup(&[]);
        let outcome = LifecycleExecutor::new(&api)
            .apply(&thread, Decision::ArchiveSolved)
            .await;
        assert_eq!(outcome, Outcome::Archived);
        assert_eq!(api.calls(), vec![ApiCall::Archive(100)]);
    }

    #[tokio::test]
    async fn test_apply_stale_appends_to_fresh_tags() {
        let (api, thread) = setup(&[7]);
        // Someone added tag 8 after the listing was taken.
        let mut fresh = thread.clone();
        fresh.applied_tags = vec![7, 8];
        api.add_thread(1, fresh);

        let outcome = LifecycleExecutor::new(&api)
            .apply(&thread, Decision::ApplyStale(STALE))
            .await;

        assert_eq!(outcome, Outcome::TagApplied);
        assert_eq!(api.mutations(), vec![ApiCall::SetTags(100, vec![7, 8, STALE])]);
    }

    #[tokio::test]
    async fn test_apply_stale_is_idempotent() {
        let (api, thread) = setup(&[STALE]);
        let outcome = LifecycleExecutor::new(&api)
            .apply(&thread, Decision::ApplyStale(STALE))
            .await;
        assert_eq!(outcome, Outcome::Skipped);
        assert!(api.mutations().is_empty());
    }

    #[tokio::test]
    async fn test_remove_stale_preserves_order() {
        let (api, thread) = setup(&[5, STALE, 6]);
        let outcome = LifecycleExecutor::new(&api)
            .apply(&thread, Decision::RemoveStale(STALE))
            .await;
        assert_eq!(outcome, Outcome::TagRemoved);
        assert_eq!(api.mutations(), vec![ApiCall::SetTags(100, vec![5, 6])]);
        assert_eq!(api.channel_state(100).unwrap().applied_tags, vec![5, 6]);
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let (api, thread) = setup(&[]);
        api.fail_archive(100);
        api.fail_channel(100);
        let executor = LifecycleExecutor::new(&api);

        assert_eq!(executor.apply(&thread, Decision::ArchiveStale).await, Outcome::Failed);
        assert_eq!(
            executor.apply(&thread, Decision::ApplyStale(STALE)).await,
            Outcome::Failed
        );
        assert_eq!(api.count(|c| matches!(c, ApiCall::SetTags(..))), 0);
    }

    #[tokio::test]
    async fn test_set_tags_failure_is_reported() {
        let (api, thread) = setup(&[]);
        api.fail_set_tags(100);
        let outcome = LifecycleExecutor::new(&api)
            .apply(&thread, Decision::ApplyStale(STALE))
            .await;
        assert_eq!(outcome, Outcome::Failed);
        assert!(api.channel_state(100).unwrap().applied_tags.is_empty());
    }
}

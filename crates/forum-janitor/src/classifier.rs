//! Thread classification.
//!
//! A pure function of a thread, its forum's lifecycle tags and the current
//! time. Each sweep runs three passes over the same thread list (solved,
//! stale-mark, stale-archive) and every pass asks the classifier for one
//! [`Decision`] per thread.

#[path = "classifier_tests.rs"]
mod classifier_tests;

use chrono::{DateTime, Duration, Utc};
use forum_types::DiscordChannel;

use crate::tags::LifecycleTags;

/// Inactivity thresholds that drive the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Inactivity after which a solved thread is archived.
    pub solved_timeout: Duration,
    /// Inactivity after which a thread is tagged stale.
    pub stale_timeout: Duration,
    /// Extra inactivity after `stale_timeout` before a stale thread is archived.
    pub stale_grace_period: Duration,
}

impl Thresholds {
    pub fn stale_archive_after(&self) -> Duration {
        self.stale_timeout + self.stale_grace_period
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            solved_timeout: Duration::hours(1),
            stale_timeout: Duration::days(3),
            stale_grace_period: Duration::days(4),
        }
    }
}

/// What a pass wants done to a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Leave(SkipReason),
    /// Append the stale tag (by id).
    ApplyStale(u64),
    /// Remove the stale tag (by id).
    RemoveStale(u64),
    ArchiveSolved,
    ArchiveStale,
}

/// Why a pass left a thread alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The forum has no solved tag.
    NoSolvedTag,
    NotSolved,
    /// The forum has no stale tag.
    NoStaleTag,
    Pinned,
    RecentActivity,
    AlreadyStale,
    /// Stale but still inside the grace period.
    InGracePeriod,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier {
    thresholds: Thresholds,
}

impl Classifier {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Archive threads that carry the solved tag and have been quiet for
    /// `solved_timeout`. Pinned threads are not exempt.
    pub fn solved_pass(
        &self,
        thread: &DiscordChannel,
        tags: &LifecycleTags,
        now: DateTime<Utc>,
    ) -> Decision {
        let Some(solved) = tags.solved else {
            return Decision::Leave(SkipReason::NoSolvedTag);
        };
        if !thread.has_tag(solved) {
            return Decision::Leave(SkipReason::NotSolved);
        }
        if inactivity(thread, now) < self.thresholds.solved_timeout {
            return Decision::Leave(SkipReason::RecentActivity);
        }
        Decision::ArchiveSolved
    }

    /// Tag threads quiet for `stale_timeout` as stale, and untag stale
    /// threads that have seen activity since.
    pub fn stale_mark_pass(
        &self,
        thread: &DiscordChannel,
        tags: &LifecycleTags,
        now: DateTime<Utc>,
    ) -> Decision {
        if thread.pinned {
            return Decision::Leave(SkipReason::Pinned);
        }
        let Some(stale) = tags.stale else {
            return Decision::Leave(SkipReason::NoStaleTag);
        };

        let is_stale = thread.has_tag(stale);
        if inactivity(thread, now) < self.thresholds.stale_timeout {
            if is_stale {
                Decision::RemoveStale(stale)
            } else {
                Decision::Leave(SkipReason::RecentActivity)
            }
        } else if is_stale {
            Decision::Leave(SkipReason::AlreadyStale)
        } else {
            Decision::ApplyStale(stale)
        }
    }

    /// Archive threads quiet for `stale_timeout + stale_grace_period`,
    /// whether or not the stale tag made it onto them.
    pub fn stale_archive_pass(
        &self,
        thread: &DiscordChannel,
        tags: &LifecycleTags,
        now: DateTime<Utc>,
    ) -> Decision {
        if thread.pinned {
            return Decision::Leave(SkipReason::Pinned);
        }
        if tags.stale.is_none() {
            return Decision::Leave(SkipReason::NoStaleTag);
        }

        let idle = inactivity(thread, now);
        if idle < self.thresholds.stale_timeout {
            Decision::Leave(SkipReason::RecentActivity)
        } else if idle < self.thresholds.stale_archive_after() {
            Decision::Leave(SkipReason::InGracePeriod)
        } else {
            Decision::ArchiveStale
        }
    }
}

/// Time since the thread's last activity. Clock skew that puts the last
/// message in the future counts as zero.
pub fn inactivity(thread: &DiscordChannel, now: DateTime<Utc>) -> Duration {
    (now - thread.last_activity()).max(Duration::zero())
}

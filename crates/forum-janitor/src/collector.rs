//! One full sweep over every guild the bot belongs to.
//!
//! Guilds are cleaned one after another and, within a guild, the passes run
//! in a fixed order: tag-cache fill, solved, stale-mark, stale-archive,
//! pinned sweep. Nothing runs concurrently.

#[path = "collector_tests.rs"]
mod collector_tests;

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use forum_types::{DiscordChannel, DiscordGuild};
use tracing::{debug, info, warn};

use crate::api::ForumApi;
use crate::classifier::{Classifier, Decision};
use crate::clock::Clock;
use crate::errors::log_error;
use crate::executor::{LifecycleExecutor, Outcome};
use crate::sweeper::sweep_pinned;
use crate::tags::{LifecycleTags, TagCache, TagNames};

/// What happened to one guild during a sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub guild_id: u64,
    pub threads: usize,
    pub archived: usize,
    pub stale_marked: usize,
    pub stale_cleared: usize,
    pub messages_deleted: usize,
    pub failures: usize,
}

impl SweepReport {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Skipped => {}
            Outcome::Archived => self.archived += 1,
            Outcome::TagApplied => self.stale_marked += 1,
            Outcome::TagRemoved => self.stale_cleared += 1,
            Outcome::Failed => self.failures += 1,
        }
    }
}

/// Signature shared by the three classifier passes.
type Pass = fn(&Classifier, &DiscordChannel, &LifecycleTags, DateTime<Utc>) -> Decision;

pub struct Collector<A: ForumApi, C: Clock> {
    api: A,
    clock: C,
    classifier: Classifier,
    tag_names: TagNames,
}

impl<A: ForumApi, C: Clock> Collector<A, C> {
    pub fn new(api: A, clock: C, classifier: Classifier, tag_names: TagNames) -> Self {
        Self {
            api,
            clock,
            classifier,
            tag_names,
        }
    }

    /// Run one sweep. A failure to list guilds aborts this sweep only.
    pub async fn collect(&self) -> Vec<SweepReport> {
        let guilds = match self.api.guilds().await {
            Ok(guilds) => guilds,
            Err(e) => {
                log_error("unable to list guilds, skipping sweep", &e);
                return Vec::new();
            }
        };

        debug!(guilds = guilds.len(), "starting sweep");
        let mut reports = Vec::with_capacity(guilds.len());
        for guild in &guilds {
            let report = self.clean_guild(guild).await;
            info!(
                guild_id = guild.id,
                guild = %guild.name,
                threads = report.threads,
                archived = report.archived,
                stale_marked = report.stale_marked,
                stale_cleared = report.stale_cleared,
                messages_deleted = report.messages_deleted,
                failures = report.failures,
                "cleaned guild"
            );
            reports.push(report);
        }
        reports
    }

    pub async fn clean_guild(&self, guild: &DiscordGuild) -> SweepReport {
        let mut report = SweepReport {
            guild_id: guild.id,
            ..SweepReport::default()
        };

        let threads = match self.api.active_threads(guild.id).await {
            Ok(threads) => threads,
            Err(e) => {
                log_error(&format!("unable to list threads for guild {}", guild.id), &e);
                report.failures += 1;
                return report;
            }
        };
        report.threads = threads.len();

        let mut cache = TagCache::new();
        cache.fill(&self.api, &threads).await;
        debug!(guild_id = guild.id, forums = cache.len(), "filled tag cache");

        let tagged: Vec<(&DiscordChannel, LifecycleTags)> = threads
            .iter()
            .filter(|thread| {
                if thread.archived {
                    debug!(guild_id = guild.id, thread_id = thread.id, "thread already archived");
                }
                !thread.archived
            })
            .filter_map(|thread| match thread.parent_id.and_then(|p| cache.get(p)) {
                Some(tags) => Some((thread, tags.lifecycle(&self.tag_names))),
                None => {
                    warn!(
                        guild_id = guild.id,
                        thread_id = thread.id,
                        "no tag mapping for thread, skipping"
                    );
                    None
                }
            })
            .collect();

        // Now is fixed per guild so every pass sees the same thresholds.
        let now = self.clock.now();
        let mut archived = HashSet::new();

        let passes: [(&str, Pass); 3] = [
            ("solved", Classifier::solved_pass),
            ("stale-mark", Classifier::stale_mark_pass),
            ("stale-archive", Classifier::stale_archive_pass),
        ];
        for (name, pass) in passes {
            debug!(guild_id = guild.id, pass = name, "running pass");
            self.run_pass(pass, &tagged, now, &mut archived, &mut report)
                .await;
        }

        for (thread, _) in tagged.iter().filter(|(t, _)| t.pinned) {
            if archived.contains(&thread.id) {
                continue;
            }
            let swept = sweep_pinned(&self.api, thread).await;
            report.messages_deleted += swept.deleted;
            report.failures += swept.failed;
        }

        report
    }

    async fn run_pass(
        &self,
        pass: Pass,
        threads: &[(&DiscordChannel, LifecycleTags)],
        now: DateTime<Utc>,
        archived: &mut HashSet<u64>,
        report: &mut SweepReport,
    ) {
        let executor = LifecycleExecutor::new(&self.api);
        for (thread, tags) in threads {
            if archived.contains(&thread.id) {
                continue;
            }
            let decision = pass(&self.classifier, thread, tags, now);
            let outcome = executor.apply(thread, decision).await;
            if outcome == Outcome::Archived {
                archived.insert(thread.id);
            }
            report.record(outcome);
        }
    }
}

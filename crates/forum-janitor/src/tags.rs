//! Tag resolution.
//!
//! Tags are matched by name ("solved", "stale"), never by a hardcoded id.
//! A forum's catalog is fetched at most once per sweep and kept in a
//! [`TagCache`] that lives only as long as that sweep.

use std::collections::HashMap;

use forum_types::{DiscordChannel, ForumTag};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::ForumApi;
use crate::errors::log_error;

/// Names of the tags that carry lifecycle meaning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagNames {
    #[serde(default = "default_solved")]
    pub solved: String,
    #[serde(default = "default_stale")]
    pub stale: String,
}

fn default_solved() -> String {
    "solved".to_string()
}

fn default_stale() -> String {
    "stale".to_string()
}

impl Default for TagNames {
    fn default() -> Self {
        Self {
            solved: default_solved(),
            stale: default_stale(),
        }
    }
}

/// Name → id mapping of one forum's tag catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForumTags(HashMap<String, u64>);

impl ForumTags {
    /// Build the mapping; when two tags share a name the first one wins.
    pub fn from_tags(tags: &[ForumTag]) -> Self {
        let mut map = HashMap::with_capacity(tags.len());
        for tag in tags {
            map.entry(tag.name.clone()).or_insert(tag.id);
        }
        Self(map)
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.0.get(name).copied()
    }

    /// Pick out the solved and stale tag ids.
    pub fn lifecycle(&self, names: &TagNames) -> LifecycleTags {
        LifecycleTags {
            solved: self.get(&names.solved),
            stale: self.get(&names.stale),
        }
    }
}

/// The lifecycle tags available in one forum; `None` when the forum has no
/// tag of that name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecycleTags {
    pub solved: Option<u64>,
    pub stale: Option<u64>,
}

/// Fetch a forum's tag catalog.
///
/// A failed fetch is logged and yields an empty mapping so the sweep can
/// carry on with the remaining forums.
pub async fn resolve<A: ForumApi>(api: &A, forum_id: u64) -> ForumTags {
    match api.channel(forum_id).await {
        Ok(forum) => {
            let tags = ForumTags::from_tags(&forum.available_tags);
            debug!(forum_id, tags = forum.available_tags.len(), "resolved forum tags");
            tags
        }
        Err(e) => {
            log_error(&format!("unable to get tags for forum {}", forum_id), &e);
            ForumTags::default()
        }
    }
}

/// Sweep-scoped cache: forum channel id → tag mapping.
#[derive(Debug, Default)]
pub struct TagCache {
    forums: HashMap<u64, ForumTags>,
}

impl TagCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the tag catalog of every distinct parent of `threads`.
    pub async fn fill<A: ForumApi>(&mut self, api: &A, threads: &[DiscordChannel]) {
        for parent_id in threads.iter().filter_map(|t| t.parent_id) {
            if self.forums.contains_key(&parent_id) {
                continue;
            }
            let tags = resolve(api, parent_id).await;
            self.forums.insert(parent_id, tags);
        }
    }

    pub fn get(&self, forum_id: u64) -> Option<&ForumTags> {
        self.forums.get(&forum_id)
    }

    pub fn len(&self) -> usize {
        self.forums.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{forum_channel, thread_channel, ApiCall, MockForumApi};
    use chrono::Utc;

    fn tag(id: u64, name: &str) -> ForumTag {
        ForumTag {
            id,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_forum_tags_first_name_wins() {
        let tags = ForumTags::from_tags(&[tag(1, "solved"), tag(2, "solved"), tag(3, "stale")]);
        assert_eq!(tags.get("solved"), Some(1));
        assert_eq!(tags.get("stale"), Some(3));
        assert_eq!(tags.get("bug"), None);
    }

    #[test]
    fn test_lifecycle_uses_configured_names() {
        let tags = ForumTags::from_tags(&[tag(1, "Resolved"), tag(2, "Idle")]);
        let names = TagNames {
            solved: "Resolved".to_string(),
            stale: "Idle".to_string(),
        };
        assert_eq!(
            tags.lifecycle(&names),
            LifecycleTags {
                solved: Some(1),
                stale: Some(2)
            }
        );
        assert_eq!(tags.lifecycle(&TagNames::default()), LifecycleTags::default());
    }

    #[tokio::test]
    async fn test_resolve_failure_yields_empty_mapping() {
        let api = MockForumApi::new();
        api.add_forum(forum_channel(10, &[(1, "solved")]));
        api.fail_channel(10);

        let tags = resolve(&api, 10).await;
        assert_eq!(tags, ForumTags::default());
    }

    #[tokio::test]
    async fn test_cache_fetches_each_forum_once() {
        let api = MockForumApi::new();
        api.add_forum(forum_channel(10, &[(1, "solved")]));
        api.add_forum(forum_channel(20, &[(2, "stale")]));
        let now = Utc::now();
        let threads = vec![
            thread_channel(100, 10, now),
            thread_channel(101, 10, now),
            thread_channel(102, 20, now),
            thread_channel(103, 10, now),
        ];

        let mut cache = TagCache::new();
        cache.fill(&api, &threads).await;

        assert_eq!(cache.len(), 2);
        assert_eq!(api.count(|c| *c == ApiCall::Channel(10)), 1);
        assert_eq!(api.count(|c| *c == ApiCall::Channel(20)), 1);
        assert_eq!(cache.get(10).and_then(|t| t.get("solved")), Some(1));
        assert_eq!(cache.get(20).and_then(|t| t.get("stale")), Some(2));
    }

    #[tokio::test]
    async fn test_cache_keeps_failed_forum_as_empty() {
        let api = MockForumApi::new();
        api.fail_channel(10);
        let threads = vec![thread_channel(100, 10, Utc::now()), thread_channel(101, 10, Utc::now())];

        let mut cache = TagCache::new();
        cache.fill(&api, &threads).await;

        assert_eq!(cache.get(10), Some(&ForumTags::default()));
        assert_eq!(api.count(|c| *c == ApiCall::Channel(10)), 1);
    }
}

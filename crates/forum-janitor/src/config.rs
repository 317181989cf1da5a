//! Configuration management for forum-janitor

#[path = "config_tests.rs"]
mod config_tests;

use std::fs;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use forum_types::ModeratorPolicy;
use serde::{Deserialize, Serialize};

use crate::classifier::Thresholds;
use crate::errors::Error;
use crate::tags::TagNames;

/// Upper bound for any lifecycle timeout (ten years).
const MAX_TIMEOUT_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Source of environment variables.
pub trait ReadEnv {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the process environment.
pub struct SystemEnv;

impl ReadEnv for SystemEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Complete janitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
    #[serde(default)]
    pub tags: TagNames,
    #[serde(default)]
    pub moderation: ModeratorPolicy,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Bot token from the Discord developer portal
    #[serde(default)]
    pub bot_token: String,
}

/// Sweep timing, all in seconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LifecycleConfig {
    #[serde(default = "default_gc_interval")]
    pub gc_interval_secs: u64,
    #[serde(default = "default_solved_timeout")]
    pub solved_timeout_secs: u64,
    #[serde(default = "default_stale_timeout")]
    pub stale_timeout_secs: u64,
    #[serde(default = "default_stale_grace_period")]
    pub stale_grace_period_secs: u64,
}

fn default_gc_interval() -> u64 {
    60
}

fn default_solved_timeout() -> u64 {
    60 * 60
}

fn default_stale_timeout() -> u64 {
    3 * 24 * 60 * 60
}

fn default_stale_grace_period() -> u64 {
    4 * 24 * 60 * 60
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            gc_interval_secs: default_gc_interval(),
            solved_timeout_secs: default_solved_timeout(),
            stale_timeout_secs: default_stale_timeout(),
            stale_grace_period_secs: default_stale_grace_period(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        Ok(config)
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(&SystemEnv)
    }

    /// Load configuration from environment variables
    pub fn from_env_with<E: ReadEnv>(env: &E) -> Result<Self> {
        let bot_token = env.var("BOT_TOKEN").unwrap_or_default();

        let defaults = LifecycleConfig::default();
        let lifecycle = LifecycleConfig {
            gc_interval_secs: parse_var(env, "JANITOR_GC_INTERVAL_SECS", defaults.gc_interval_secs)?,
            solved_timeout_secs: parse_var(
                env,
                "JANITOR_SOLVED_TIMEOUT_SECS",
                defaults.solved_timeout_secs,
            )?,
            stale_timeout_secs: parse_var(
                env,
                "JANITOR_STALE_TIMEOUT_SECS",
                defaults.stale_timeout_secs,
            )?,
            stale_grace_period_secs: parse_var(
                env,
                "JANITOR_STALE_GRACE_SECS",
                defaults.stale_grace_period_secs,
            )?,
        };

        let default_tags = TagNames::default();
        let tags = TagNames {
            solved: env.var("JANITOR_SOLVED_TAG").unwrap_or(default_tags.solved),
            stale: env.var("JANITOR_STALE_TAG").unwrap_or(default_tags.stale),
        };

        let default_policy = ModeratorPolicy::default();
        let moderation = ModeratorPolicy {
            bypass_users: env
                .var("JANITOR_BYPASS_USERS")
                .map(|s| parse_id_list(&s))
                .unwrap_or(default_policy.bypass_users),
            moderator_roles: env
                .var("JANITOR_MODERATOR_ROLES")
                .map(|s| parse_id_list(&s))
                .unwrap_or(default_policy.moderator_roles),
        };

        Ok(Config {
            discord: DiscordConfig { bot_token },
            lifecycle,
            tags,
            moderation,
        })
    }

    /// Reject configurations the janitor cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.discord.bot_token.trim().is_empty() {
            return Err(Error::Config("bot token is required (set BOT_TOKEN)".into()).into());
        }
        if self.lifecycle.gc_interval_secs == 0 {
            return Err(Error::Config("lifecycle.gc_interval_secs must be >= 1".into()).into());
        }
        let lc = &self.lifecycle;
        for (key, value) in [
            ("solved_timeout_secs", lc.solved_timeout_secs),
            ("stale_timeout_secs", lc.stale_timeout_secs),
            ("stale_grace_period_secs", lc.stale_grace_period_secs),
        ] {
            if value > MAX_TIMEOUT_SECS {
                return Err(Error::Config(format!(
                    "lifecycle.{} must be at most {} seconds",
                    key, MAX_TIMEOUT_SECS
                ))
                .into());
            }
        }
        if self.tags.solved.is_empty() || self.tags.stale.is_empty() {
            return Err(Error::Config("tag names must not be empty".into()).into());
        }
        Ok(())
    }

    pub fn thresholds(&self) -> Thresholds {
        let secs = |s: u64| {
            i64::try_from(s)
                .ok()
                .and_then(chrono::Duration::try_seconds)
                .unwrap_or(chrono::Duration::MAX)
        };
        Thresholds {
            solved_timeout: secs(self.lifecycle.solved_timeout_secs),
            stale_timeout: secs(self.lifecycle.stale_timeout_secs),
            stale_grace_period: secs(self.lifecycle.stale_grace_period_secs),
        }
    }

    pub fn gc_interval(&self) -> Duration {
        Duration::from_secs(self.lifecycle.gc_interval_secs)
    }
}

fn parse_var<E: ReadEnv, T: FromStr>(env: &E, key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env.var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}

fn parse_id_list(s: &str) -> Vec<u64> {
    s.split(',')
        .map(|x| x.trim())
        .filter(|x| !x.is_empty())
        .filter_map(|x| x.parse::<u64>().ok())
        .collect()
}

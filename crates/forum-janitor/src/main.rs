//! Forum janitor for Discord
//!
//! Periodically tags inactive forum posts as stale, archives solved and
//! long-stale posts, keeps pinned posts free of replies, and answers the
//! `/solved` and `/done` commands.

mod api;
mod classifier;
mod clock;
mod collector;
mod commands;
mod config;
mod errors;
mod executor;
mod handlers;
mod interactions;
#[cfg(test)]
mod mock;
mod scheduler;
mod sweeper;
mod tags;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serenity::model::gateway::GatewayIntents;
use serenity::prelude::*;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::DiscordApi;
use crate::classifier::Classifier;
use crate::clock::SystemClock;
use crate::collector::Collector;
use crate::config::Config;
use crate::handlers::Handler;
use crate::interactions::InteractionDispatcher;
use crate::scheduler::Scheduler;

/// Discord forum janitor CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/forum-janitor.toml")]
    config: String,

    /// Discord bot token (overrides config file)
    #[arg(long, env = "BOT_TOKEN")]
    bot_token: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "forum_janitor=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting forum janitor");

    let args = Args::parse();

    // Load configuration
    let mut config = if std::path::Path::new(&args.config).exists() {
        info!("Loading config from file: {}", args.config);
        Config::from_file(&args.config)?
    } else {
        info!("Config file not found, loading from environment");
        Config::from_env()?
    };
    if let Some(bot_token) = args.bot_token {
        config.discord.bot_token = bot_token;
    }
    config.validate()?;

    info!(
        gc_interval_secs = config.lifecycle.gc_interval_secs,
        solved_timeout_secs = config.lifecycle.solved_timeout_secs,
        stale_timeout_secs = config.lifecycle.stale_timeout_secs,
        stale_grace_period_secs = config.lifecycle.stale_grace_period_secs,
        solved_tag = %config.tags.solved,
        stale_tag = %config.tags.stale,
        "lifecycle configuration"
    );

    let dispatcher = Arc::new(InteractionDispatcher::new(
        config.moderation.clone(),
        config.tags.clone(),
    ));

    let mut client = Client::builder(&config.discord.bot_token, GatewayIntents::GUILDS)
        .event_handler(Handler::new(dispatcher))
        .await
        .context("Failed to create Discord client")?;

    // Commands are registered against the application, which the HTTP
    // client only learns from the gateway unless told up front.
    let app = client
        .http
        .get_current_application_info()
        .await
        .context("Failed to fetch application info")?;
    client.http.set_application_id(app.id);
    commands::register(&client.http)
        .await
        .context("Failed to register commands")?;

    // Start the garbage collector
    let collector = Collector::new(
        DiscordApi::new(client.http.clone()),
        SystemClock,
        Classifier::new(config.thresholds()),
        config.tags.clone(),
    );
    tokio::spawn(Scheduler::new(collector, config.gc_interval()).run());

    // Graceful shutdown: close all shards on SIGTERM or Ctrl+C.
    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        wait_for_shutdown().await;
        info!("Shutdown signal received, stopping Discord client...");
        shard_manager.shutdown_all().await;
    });

    info!("Starting Discord gateway connection...");

    // Start the Discord client (blocks until all shards are stopped)
    client.start().await.context("Discord client error")?;

    info!("Forum janitor stopped");
    Ok(())
}

async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.ok();
    }
}

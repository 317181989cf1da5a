//! Slash command definitions and registration.

use serenity::builder::CreateCommand;
use serenity::http::Http;
use serenity::model::application::Command;
use tracing::info;

use crate::errors::Result;
use crate::interactions::{DONE_COMMAND, SOLVED_COMMAND};

/// The commands the janitor answers. Neither takes arguments.
pub fn definitions() -> Vec<CreateCommand> {
    vec![
        CreateCommand::new(SOLVED_COMMAND)
            .description("marks the current forum post as resolved"),
        CreateCommand::new(DONE_COMMAND)
            .description("asks the poster to mark the current forum post as resolved"),
    ]
}

/// Bulk-overwrite the global command set with [`definitions`].
pub async fn register(http: &Http) -> Result<()> {
    let commands = Command::set_global_commands(http, definitions()).await?;
    info!(count = commands.len(), "registered application commands");
    Ok(())
}

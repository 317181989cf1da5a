//! Serenity event handler implementation

use std::sync::Arc;

use serenity::async_trait;
use serenity::builder::{
    CreateActionRow, CreateAllowedMentions, CreateButton, CreateInteractionResponse,
    CreateInteractionResponseMessage,
};
use serenity::model::application::{ButtonStyle, Interaction};
use serenity::model::gateway::Ready;
use serenity::model::guild::Member;
use serenity::model::id::{ChannelId, GuildId, UserId};
use serenity::prelude::*;
use tracing::{debug, error, info};

use crate::api::DiscordApi;
use crate::interactions::{InteractionDispatcher, InteractionKind, InteractionRequest, Reply};

pub struct Handler {
    dispatcher: Arc<InteractionDispatcher>,
}

impl Handler {
    pub fn new(dispatcher: Arc<InteractionDispatcher>) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            "Discord bot connected as {}#{:04}",
            ready.user.name,
            ready.user.discriminator.map_or(0, |d| d.get())
        );
        info!(guilds = ready.guilds.len(), "janitor ready");
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let api = DiscordApi::new(ctx.http.clone());

        let result = match &interaction {
            Interaction::Command(cmd) => {
                let req = request(
                    InteractionKind::Command(cmd.data.name.clone()),
                    cmd.guild_id,
                    cmd.channel_id,
                    cmd.user.id,
                    cmd.member.as_deref(),
                );
                let reply = self.dispatcher.dispatch(&api, &req).await;
                cmd.create_response(&ctx.http, build_response(&reply)).await
            }
            Interaction::Component(comp) => {
                let req = request(
                    InteractionKind::Button(comp.data.custom_id.clone()),
                    comp.guild_id,
                    comp.channel_id,
                    comp.user.id,
                    comp.member.as_ref(),
                );
                let reply = self.dispatcher.dispatch(&api, &req).await;
                comp.create_response(&ctx.http, build_response(&reply)).await
            }
            Interaction::Modal(modal) => {
                let req = request(
                    InteractionKind::Other,
                    modal.guild_id,
                    modal.channel_id,
                    modal.user.id,
                    modal.member.as_ref(),
                );
                let reply = self.dispatcher.dispatch(&api, &req).await;
                modal.create_response(&ctx.http, build_response(&reply)).await
            }
            _ => {
                // Autocomplete and ping cannot carry a message response
                debug!(kind = ?interaction.kind(), "ignoring interaction");
                return;
            }
        };

        if let Err(e) = result {
            error!("Failed to respond to interaction {}: {}", interaction.id(), e);
        }
    }
}

fn request(
    kind: InteractionKind,
    guild_id: Option<GuildId>,
    channel_id: ChannelId,
    user_id: UserId,
    member: Option<&Member>,
) -> InteractionRequest {
    InteractionRequest {
        kind,
        guild_id: guild_id.map(|id| id.get()),
        channel_id: channel_id.get(),
        user_id: user_id.get(),
        role_ids: member
            .map(|m| m.roles.iter().map(|r| r.get()).collect())
            .unwrap_or_default(),
    }
}

/// Turn a [`Reply`] into an interaction response that pings nobody.
pub fn build_response(reply: &Reply) -> CreateInteractionResponse {
    let mut msg = CreateInteractionResponseMessage::new()
        .content(reply.content.clone())
        .ephemeral(reply.ephemeral)
        .allowed_mentions(CreateAllowedMentions::new());

    if let Some(button) = &reply.button {
        msg = msg.components(vec![CreateActionRow::Buttons(vec![CreateButton::new(
            button.custom_id.clone(),
        )
        .label(button.label.clone())
        .style(ButtonStyle::Success)])]);
    }

    CreateInteractionResponse::Message(msg)
}

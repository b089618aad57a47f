//! Gateway event handling.

use std::sync::Arc;

use poise::serenity_prelude as serenity;
use serenity::{
    ComponentInteraction, CreateInteractionResponse, CreateInteractionResponseMessage, Message,
};
use tracing::{debug, error, info, warn};

use warnbot_core::platform::Actor;
use warnbot_core::ticket::ControlAction;
use warnbot_core::warn::{NoticeField, WarningNotice};

use super::{render, Data, Error};

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message } => {
            handle_message(data, new_message).await;
        }
        serenity::FullEvent::InteractionCreate { interaction } => {
            if let Some(component) = interaction.as_message_component() {
                handle_component(ctx, data, component).await?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Converts the embeds of a message into warning notices.
pub fn notices_from(message: &Message) -> Vec<WarningNotice> {
    message
        .embeds
        .iter()
        .map(|embed| WarningNotice {
            author_name: embed.author.as_ref().map(|a| a.name.clone()),
            fields: embed
                .fields
                .iter()
                .map(|f| NoticeField {
                    name: f.name.clone(),
                    value: f.value.clone(),
                })
                .collect(),
        })
        .collect()
}

async fn handle_message(data: &Data, message: &Message) {
    if !message.author.bot || message.embeds.is_empty() {
        return;
    }
    let Some(guild_id) = message.guild_id else {
        return;
    };
    let guild_id = guild_id.to_string();

    for notice in notices_from(message) {
        match data
            .warnings
            .handle_notice(data.platform.as_ref(), &guild_id, &notice)
            .await
        {
            Ok(Some(outcome)) => info!(
                guild_id = %outcome.guild_id,
                user_id = %outcome.user_id,
                count = outcome.count,
                granted = ?outcome.report.granted,
                revoked = ?outcome.report.revoked,
                "Warning processed"
            ),
            Ok(None) => debug!(message_id = %message.id, "Embed is not a warning notice"),
            Err(e) => error!(guild_id = %guild_id, error = %e, "Failed to process warning notice"),
        }
    }
}

fn actor_from(component: &ComponentInteraction) -> Actor {
    let user = &component.user;
    let mut actor = Actor::new(user.id.to_string(), user.name.clone());
    if let Some(member) = &component.member {
        actor.role_ids = member.roles.iter().map(|r| r.to_string()).collect();
    }
    actor
}

async fn handle_component(
    ctx: &serenity::Context,
    data: &Data,
    component: &ComponentInteraction,
) -> Result<(), Error> {
    if ControlAction::parse(&component.data.custom_id).is_none() {
        return Ok(());
    }

    let actor = actor_from(component);
    let outcome = match data
        .lifecycle
        .activate(&component.data.custom_id, &actor)
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            if e.is_refusal() {
                warn!(custom_id = %component.data.custom_id, actor = %actor.name, error = %e, "Control refused");
            } else {
                error!(custom_id = %component.data.custom_id, error = %e, "Ticket transition failed");
            }
            let reply = CreateInteractionResponseMessage::new()
                .content(render::failure_message(&e))
                .ephemeral(true);
            component
                .create_response(&ctx.http, CreateInteractionResponse::Message(reply))
                .await?;
            return Ok(());
        }
    };

    let mut content = render::transition_message(&outcome);
    if let Some(removal) = &outcome.removal {
        content.push('\n');
        content.push_str(&render::removal_message(removal));
    }
    let update = CreateInteractionResponseMessage::new()
        .content(content)
        .components(match outcome.controls {
            Some(set) => render::control_rows(set, outcome.ticket.ticket_number),
            None => Vec::new(),
        });
    component
        .create_response(&ctx.http, CreateInteractionResponse::UpdateMessage(update))
        .await?;

    if let Some(removal) = outcome.removal {
        let lifecycle = Arc::clone(&data.lifecycle);
        tokio::spawn(async move {
            // failures are logged by the lifecycle
            let _ = lifecycle.remove_channel(removal).await;
        });
    }
    Ok(())
}

//! Slash commands.

use chrono::{DateTime, Utc};
use poise::serenity_prelude as serenity;
use serenity::{CreateMessage, Mentionable};
use tracing::{error, info};

use warnbot_core::ticket::Requester;

use super::{render, Context, Error};

fn to_utc(timestamp: serenity::Timestamp) -> DateTime<Utc> {
    DateTime::from_timestamp(timestamp.unix_timestamp(), 0).unwrap_or_default()
}

/// Request whitelisting under the given nickname
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn nick(
    ctx: Context<'_>,
    #[description = "Nickname to whitelist"] nickname: String,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(());
    };
    let author = ctx.author();

    let (joined_at, role_ids) = match ctx.author_member().await {
        Some(member) => (
            member.joined_at.map(to_utc),
            member.roles.iter().map(|r| r.to_string()).collect(),
        ),
        None => (None, Vec::new()),
    };
    let requester = Requester {
        user_id: author.id.to_string(),
        name: author.name.clone(),
        account_created_at: to_utc(author.id.created_at()),
        joined_at,
        role_ids,
    };

    let data = ctx.data();
    let opened = match data
        .lifecycle
        .open_ticket(&guild_id.to_string(), &requester, &nickname)
        .await
    {
        Ok(opened) => opened,
        Err(e) => {
            error!(guild_id = %guild_id, user_id = %author.id, error = %e, "Failed to open ticket");
            ctx.say(format!("Could not create your ticket: {}", e)).await?;
            return Ok(());
        }
    };

    let n = opened.ticket.ticket_number;
    let channel_id = serenity::ChannelId::new(opened.ticket.channel_id.parse()?);
    let staff = &data.lifecycle.settings().staff;
    let announced = channel_id
        .send_message(
            ctx.http(),
            CreateMessage::new()
                .content(render::opening_content(&requester.user_id, staff))
                .allowed_mentions(render::opening_mentions(author.id, staff))
                .embed(render::summary_embed(&opened.summary))
                .components(render::control_rows(opened.controls, n)),
        )
        .await;
    if let Err(e) = announced {
        error!(ticket_number = n, channel_id = %channel_id, error = %e, "Failed to post ticket controls");
        ctx.say(render::unannounced_message(n, &channel_id.mention().to_string()))
            .await?;
        return Ok(());
    }

    info!(
        ticket_number = n,
        user_id = %author.id,
        "Ticket announced"
    );
    ctx.say(format!(
        "Ticket #{} created: {}",
        n,
        channel_id.mention()
    ))
    .await?;
    Ok(())
}

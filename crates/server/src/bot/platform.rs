//! [`Platform`] backed by the Discord HTTP API.

use std::sync::Arc;

use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use serenity::{
    ChannelId, ChannelType, CreateChannel, CreateMessage, GuildId, Http, PermissionOverwrite,
    PermissionOverwriteType, Permissions, RoleId, UserId,
};
use tracing::{debug, warn};

use warnbot_core::platform::{
    DecisionNotice, PermissionTarget, Platform, PlatformError, TicketChannelRequest,
};

use super::render;

const AUDIT_REASON: &str = "Warning escalation";

pub struct SerenityPlatform {
    http: Arc<Http>,
    bot_id: UserId,
}

impl SerenityPlatform {
    pub fn new(http: Arc<Http>, bot_id: UserId) -> Self {
        Self { http, bot_id }
    }

    async fn guild_channel(&self, channel_id: &str) -> Result<serenity::GuildChannel, PlatformError> {
        let id = ChannelId::new(parse_id(channel_id)?);
        id.to_channel(&self.http)
            .await
            .map_err(|e| channel_error(channel_id, e))?
            .guild()
            .ok_or_else(|| PlatformError::ChannelNotFound(channel_id.to_string()))
    }
}

fn parse_id(raw: &str) -> Result<u64, PlatformError> {
    raw.parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .ok_or_else(|| PlatformError::InvalidId(raw.to_string()))
}

fn guild(raw: &str) -> Result<GuildId, PlatformError> {
    parse_id(raw).map(GuildId::new)
}

fn status_of(error: &serenity::Error) -> Option<u16> {
    match error {
        serenity::Error::Http(e) => e.status_code().map(|s| s.as_u16()),
        _ => None,
    }
}

fn api_error(error: serenity::Error) -> PlatformError {
    match status_of(&error) {
        Some(403) => PlatformError::Forbidden(error.to_string()),
        _ => PlatformError::Api(error.to_string()),
    }
}

fn channel_error(channel_id: &str, error: serenity::Error) -> PlatformError {
    match status_of(&error) {
        Some(404) => PlatformError::ChannelNotFound(channel_id.to_string()),
        _ => api_error(error),
    }
}

fn overwrite_kind(target: &PermissionTarget) -> Result<PermissionOverwriteType, PlatformError> {
    Ok(match target {
        PermissionTarget::Role(id) => PermissionOverwriteType::Role(RoleId::new(parse_id(id)?)),
        PermissionTarget::Member(id) => PermissionOverwriteType::Member(UserId::new(parse_id(id)?)),
    })
}

fn participant_permissions() -> Permissions {
    Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES | Permissions::READ_MESSAGE_HISTORY
}

#[async_trait]
impl Platform for SerenityPlatform {
    async fn role_exists(&self, guild_id: &str, role_id: &str) -> Result<bool, PlatformError> {
        let role = RoleId::new(parse_id(role_id)?);
        let roles = guild(guild_id)?
            .roles(&self.http)
            .await
            .map_err(api_error)?;
        Ok(roles.contains_key(&role))
    }

    async fn find_role_by_name(
        &self,
        guild_id: &str,
        name: &str,
    ) -> Result<Option<String>, PlatformError> {
        let roles = guild(guild_id)?
            .roles(&self.http)
            .await
            .map_err(api_error)?;
        Ok(roles
            .values()
            .find(|role| role.name == name)
            .map(|role| role.id.to_string()))
    }

    async fn member_roles(
        &self,
        guild_id: &str,
        user_id: &str,
    ) -> Result<Option<Vec<String>>, PlatformError> {
        let user = UserId::new(parse_id(user_id)?);
        match guild(guild_id)?.member(&self.http, user).await {
            Ok(member) => Ok(Some(member.roles.iter().map(|r| r.to_string()).collect())),
            Err(e) if status_of(&e) == Some(404) => Ok(None),
            Err(e) => Err(api_error(e)),
        }
    }

    async fn add_role(
        &self,
        guild_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), PlatformError> {
        self.http
            .add_member_role(
                guild(guild_id)?,
                UserId::new(parse_id(user_id)?),
                RoleId::new(parse_id(role_id)?),
                Some(AUDIT_REASON),
            )
            .await
            .map_err(api_error)
    }

    async fn remove_role(
        &self,
        guild_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), PlatformError> {
        self.http
            .remove_member_role(
                guild(guild_id)?,
                UserId::new(parse_id(user_id)?),
                RoleId::new(parse_id(role_id)?),
                Some(AUDIT_REASON),
            )
            .await
            .map_err(api_error)
    }

    async fn create_ticket_channel(
        &self,
        request: &TicketChannelRequest,
    ) -> Result<String, PlatformError> {
        let guild_id = guild(&request.guild_id)?;

        let mut overwrites = vec![
            PermissionOverwrite {
                allow: Permissions::empty(),
                deny: Permissions::VIEW_CHANNEL,
                kind: PermissionOverwriteType::Role(RoleId::new(guild_id.get())),
            },
            PermissionOverwrite {
                allow: participant_permissions(),
                deny: Permissions::empty(),
                kind: PermissionOverwriteType::Member(self.bot_id),
            },
        ];
        for target in &request.participants {
            overwrites.push(PermissionOverwrite {
                allow: participant_permissions(),
                deny: Permissions::empty(),
                kind: overwrite_kind(target)?,
            });
        }

        let mut builder = CreateChannel::new(&request.name)
            .kind(ChannelType::Text)
            .topic(&request.topic)
            .permissions(overwrites);

        if let Some(category) = &request.category {
            let channels = guild_id.channels(&self.http).await.map_err(api_error)?;
            match channels
                .values()
                .find(|c| c.kind == ChannelType::Category && &c.name == category)
            {
                Some(parent) => builder = builder.category(parent.id),
                None => warn!(guild_id = %guild_id, category = %category, "Ticket category not found"),
            }
        }

        let channel = guild_id
            .create_channel(&self.http, builder)
            .await
            .map_err(api_error)?;
        debug!(channel_id = %channel.id, name = %channel.name, "Ticket channel created");
        Ok(channel.id.to_string())
    }

    async fn restrict_sending(
        &self,
        channel_id: &str,
        exempt: &[PermissionTarget],
    ) -> Result<usize, PlatformError> {
        let channel = self.guild_channel(channel_id).await?;
        let exempt = exempt
            .iter()
            .map(overwrite_kind)
            .collect::<Result<Vec<_>, _>>()?;
        let bot = PermissionOverwriteType::Member(self.bot_id);

        let mut changed = 0;
        for overwrite in &channel.permission_overwrites {
            if overwrite.kind == bot || exempt.contains(&overwrite.kind) {
                continue;
            }
            let mut updated = overwrite.clone();
            updated.allow.remove(Permissions::SEND_MESSAGES);
            updated.deny.insert(Permissions::SEND_MESSAGES);
            channel
                .id
                .create_permission(&self.http, updated)
                .await
                .map_err(|e| channel_error(channel_id, e))?;
            changed += 1;
        }
        Ok(changed)
    }

    async fn grant_access(
        &self,
        channel_id: &str,
        target: &PermissionTarget,
    ) -> Result<(), PlatformError> {
        let overwrite = PermissionOverwrite {
            allow: participant_permissions(),
            deny: Permissions::empty(),
            kind: overwrite_kind(target)?,
        };
        ChannelId::new(parse_id(channel_id)?)
            .create_permission(&self.http, overwrite)
            .await
            .map_err(|e| channel_error(channel_id, e))
    }

    async fn delete_channel(&self, channel_id: &str) -> Result<(), PlatformError> {
        ChannelId::new(parse_id(channel_id)?)
            .delete(&self.http)
            .await
            .map(|_| ())
            .map_err(|e| channel_error(channel_id, e))
    }

    async fn post_decision(&self, notice: &DecisionNotice) -> Result<(), PlatformError> {
        ChannelId::new(parse_id(&notice.channel_id)?)
            .send_message(&self.http, CreateMessage::new().embed(render::decision_embed(notice)))
            .await
            .map(|_| ())
            .map_err(|e| channel_error(&notice.channel_id, e))
    }
}

//! Mock chat platform for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::platform::{
    DecisionNotice, PermissionTarget, Platform, PlatformError, TicketChannelRequest,
};

/// Id the mock uses for the bot's own member.
pub const MOCK_BOT_ID: &str = "bot";

/// A mutating platform call, recorded for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    AddRole {
        guild_id: String,
        user_id: String,
        role_id: String,
    },
    RemoveRole {
        guild_id: String,
        user_id: String,
        role_id: String,
    },
    CreateChannel(TicketChannelRequest),
    RestrictSending {
        channel_id: String,
        exempt: Vec<PermissionTarget>,
    },
    GrantAccess {
        channel_id: String,
        target: PermissionTarget,
    },
    DeleteChannel {
        channel_id: String,
    },
    PostDecision(DecisionNotice),
}

/// Permission overwrite state on a mock channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockOverwrite {
    pub read: bool,
    pub send: bool,
}

#[derive(Debug, Default)]
struct MockChannel {
    overwrites: HashMap<PermissionTarget, MockOverwrite>,
    deleted: bool,
}

#[derive(Debug, Default)]
struct MockState {
    /// guild -> role id -> role name
    roles: HashMap<String, HashMap<String, String>>,
    /// guild -> user -> role ids
    members: HashMap<String, HashMap<String, HashSet<String>>>,
    channels: HashMap<String, MockChannel>,
    calls: Vec<PlatformCall>,
    next_error: Option<PlatformError>,
    next_channel_id: u64,
}

/// Mock implementation of the Platform trait.
///
/// Keeps guild roles, members and channel overwrites in memory so tests can
/// assert on the resulting state as well as on the recorded calls.
/// Read-only calls are not recorded.
#[derive(Debug, Clone, Default)]
pub struct MockPlatform {
    state: Arc<RwLock<MockState>>,
}

impl MockPlatform {
    /// Create a new mock platform with no guilds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a role in a guild.
    pub async fn add_guild_role(&self, guild_id: &str, role_id: &str, name: &str) {
        self.state
            .write()
            .await
            .roles
            .entry(guild_id.to_string())
            .or_default()
            .insert(role_id.to_string(), name.to_string());
    }

    /// Add a member holding the given role ids.
    pub async fn add_member(&self, guild_id: &str, user_id: &str, role_ids: Vec<&str>) {
        self.state
            .write()
            .await
            .members
            .entry(guild_id.to_string())
            .or_default()
            .insert(
                user_id.to_string(),
                role_ids.into_iter().map(String::from).collect(),
            );
    }

    pub async fn member_has_role(&self, guild_id: &str, user_id: &str, role_id: &str) -> bool {
        self.state
            .read()
            .await
            .members
            .get(guild_id)
            .and_then(|m| m.get(user_id))
            .is_some_and(|roles| roles.contains(role_id))
    }

    /// Get all recorded calls.
    pub async fn calls(&self) -> Vec<PlatformCall> {
        self.state.read().await.calls.clone()
    }

    /// Number of role grants and revocations performed.
    pub async fn role_change_count(&self) -> usize {
        self.state
            .read()
            .await
            .calls
            .iter()
            .filter(|c| matches!(c, PlatformCall::AddRole { .. } | PlatformCall::RemoveRole { .. }))
            .count()
    }

    /// Decision notices posted so far.
    pub async fn decisions(&self) -> Vec<DecisionNotice> {
        self.state
            .read()
            .await
            .calls
            .iter()
            .filter_map(|c| match c {
                PlatformCall::PostDecision(notice) => Some(notice.clone()),
                _ => None,
            })
            .collect()
    }

    /// Overwrite state for a target on a channel.
    pub async fn overwrite(
        &self,
        channel_id: &str,
        target: &PermissionTarget,
    ) -> Option<MockOverwrite> {
        self.state
            .read()
            .await
            .channels
            .get(channel_id)
            .and_then(|c| c.overwrites.get(target))
            .copied()
    }

    pub async fn channel_exists(&self, channel_id: &str) -> bool {
        self.state
            .read()
            .await
            .channels
            .get(channel_id)
            .is_some_and(|c| !c.deleted)
    }

    /// Register a channel that was not created through the mock.
    pub async fn add_channel(&self, channel_id: &str, participants: Vec<PermissionTarget>) {
        let mut state = self.state.write().await;
        let channel = state.channels.entry(channel_id.to_string()).or_default();
        for target in participants {
            channel.overwrites.insert(
                target,
                MockOverwrite {
                    read: true,
                    send: true,
                },
            );
        }
    }

    /// Configure the next call (of any kind) to fail with the given error.
    pub async fn set_next_error(&self, error: PlatformError) {
        self.state.write().await.next_error = Some(error);
    }

    /// Clear any pending error.
    pub async fn clear_next_error(&self) {
        self.state.write().await.next_error = None;
    }

    fn take_error(state: &mut MockState) -> Result<(), PlatformError> {
        match state.next_error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Platform for MockPlatform {
    async fn role_exists(&self, guild_id: &str, role_id: &str) -> Result<bool, PlatformError> {
        let mut state = self.state.write().await;
        Self::take_error(&mut state)?;
        Ok(state
            .roles
            .get(guild_id)
            .is_some_and(|roles| roles.contains_key(role_id)))
    }

    async fn find_role_by_name(
        &self,
        guild_id: &str,
        name: &str,
    ) -> Result<Option<String>, PlatformError> {
        let mut state = self.state.write().await;
        Self::take_error(&mut state)?;
        Ok(state.roles.get(guild_id).and_then(|roles| {
            roles
                .iter()
                .find(|(_, role_name)| role_name.as_str() == name)
                .map(|(id, _)| id.clone())
        }))
    }

    async fn member_roles(
        &self,
        guild_id: &str,
        user_id: &str,
    ) -> Result<Option<Vec<String>>, PlatformError> {
        let mut state = self.state.write().await;
        Self::take_error(&mut state)?;
        Ok(state
            .members
            .get(guild_id)
            .and_then(|m| m.get(user_id))
            .map(|roles| roles.iter().cloned().collect()))
    }

    async fn add_role(
        &self,
        guild_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), PlatformError> {
        let mut state = self.state.write().await;
        Self::take_error(&mut state)?;
        state
            .members
            .entry(guild_id.to_string())
            .or_default()
            .entry(user_id.to_string())
            .or_default()
            .insert(role_id.to_string());
        state.calls.push(PlatformCall::AddRole {
            guild_id: guild_id.to_string(),
            user_id: user_id.to_string(),
            role_id: role_id.to_string(),
        });
        Ok(())
    }

    async fn remove_role(
        &self,
        guild_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), PlatformError> {
        let mut state = self.state.write().await;
        Self::take_error(&mut state)?;
        if let Some(roles) = state
            .members
            .get_mut(guild_id)
            .and_then(|m| m.get_mut(user_id))
        {
            roles.remove(role_id);
        }
        state.calls.push(PlatformCall::RemoveRole {
            guild_id: guild_id.to_string(),
            user_id: user_id.to_string(),
            role_id: role_id.to_string(),
        });
        Ok(())
    }

    async fn create_ticket_channel(
        &self,
        request: &TicketChannelRequest,
    ) -> Result<String, PlatformError> {
        let mut state = self.state.write().await;
        Self::take_error(&mut state)?;

        state.next_channel_id += 1;
        let channel_id = format!("{}", 700_000 + state.next_channel_id);

        let mut channel = MockChannel::default();
        channel.overwrites.insert(
            PermissionTarget::Role(request.guild_id.clone()),
            MockOverwrite {
                read: false,
                send: false,
            },
        );
        let visible = request
            .participants
            .iter()
            .cloned()
            .chain(std::iter::once(PermissionTarget::Member(MOCK_BOT_ID.to_string())));
        for target in visible {
            channel.overwrites.insert(
                target,
                MockOverwrite {
                    read: true,
                    send: true,
                },
            );
        }

        state.channels.insert(channel_id.clone(), channel);
        state.calls.push(PlatformCall::CreateChannel(request.clone()));
        Ok(channel_id)
    }

    async fn restrict_sending(
        &self,
        channel_id: &str,
        exempt: &[PermissionTarget],
    ) -> Result<usize, PlatformError> {
        let mut state = self.state.write().await;
        Self::take_error(&mut state)?;

        let channel = state
            .channels
            .get_mut(channel_id)
            .filter(|c| !c.deleted)
            .ok_or_else(|| PlatformError::ChannelNotFound(channel_id.to_string()))?;

        let bot = PermissionTarget::Member(MOCK_BOT_ID.to_string());
        let mut changed = 0;
        for (target, overwrite) in channel.overwrites.iter_mut() {
            if *target == bot || exempt.contains(target) {
                continue;
            }
            overwrite.send = false;
            changed += 1;
        }

        state.calls.push(PlatformCall::RestrictSending {
            channel_id: channel_id.to_string(),
            exempt: exempt.to_vec(),
        });
        Ok(changed)
    }

    async fn grant_access(
        &self,
        channel_id: &str,
        target: &PermissionTarget,
    ) -> Result<(), PlatformError> {
        let mut state = self.state.write().await;
        Self::take_error(&mut state)?;

        let channel = state
            .channels
            .get_mut(channel_id)
            .filter(|c| !c.deleted)
            .ok_or_else(|| PlatformError::ChannelNotFound(channel_id.to_string()))?;
        channel.overwrites.insert(
            target.clone(),
            MockOverwrite {
                read: true,
                send: true,
            },
        );

        state.calls.push(PlatformCall::GrantAccess {
            channel_id: channel_id.to_string(),
            target: target.clone(),
        });
        Ok(())
    }

    async fn delete_channel(&self, channel_id: &str) -> Result<(), PlatformError> {
        let mut state = self.state.write().await;
        Self::take_error(&mut state)?;

        let channel = state
            .channels
            .get_mut(channel_id)
            .filter(|c| !c.deleted)
            .ok_or_else(|| PlatformError::ChannelNotFound(channel_id.to_string()))?;
        channel.deleted = true;

        state.calls.push(PlatformCall::DeleteChannel {
            channel_id: channel_id.to_string(),
        });
        Ok(())
    }

    async fn post_decision(&self, notice: &DecisionNotice) -> Result<(), PlatformError> {
        let mut state = self.state.write().await;
        Self::take_error(&mut state)?;
        state.calls.push(PlatformCall::PostDecision(notice.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_restrict_sending_spares_bot_and_exempt() {
        let platform = MockPlatform::new();
        let requester = PermissionTarget::Member("42".to_string());
        let owner = PermissionTarget::Role("33".to_string());
        platform
            .add_channel("c1", vec![requester.clone(), owner.clone()])
            .await;
        platform
            .add_channel("c1", vec![PermissionTarget::Member(MOCK_BOT_ID.to_string())])
            .await;

        let changed = platform
            .restrict_sending("c1", std::slice::from_ref(&owner))
            .await
            .unwrap();

        assert_eq!(changed, 1);
        assert!(!platform.overwrite("c1", &requester).await.unwrap().send);
        assert!(platform.overwrite("c1", &owner).await.unwrap().send);
    }

    #[tokio::test]
    async fn test_next_error_is_consumed_once() {
        let platform = MockPlatform::new();
        platform
            .set_next_error(PlatformError::Api("boom".to_string()))
            .await;

        assert!(platform.role_exists("g", "1").await.is_err());
        assert!(!platform.role_exists("g", "1").await.unwrap());
    }

    #[tokio::test]
    async fn test_deleted_channel_rejects_changes() {
        let platform = MockPlatform::new();
        platform.add_channel("c1", vec![]).await;
        platform.delete_channel("c1").await.unwrap();

        assert!(!platform.channel_exists("c1").await);
        let err = platform.delete_channel("c1").await.unwrap_err();
        assert_eq!(err, PlatformError::ChannelNotFound("c1".to_string()));
    }
}

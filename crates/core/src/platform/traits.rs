//! Trait definitions for the platform boundary.

use async_trait::async_trait;

use super::error::PlatformError;
use super::types::{DecisionNotice, PermissionTarget, TicketChannelRequest};

/// Operations the bot performs against the chat platform.
///
/// Ids are the platform's opaque identifiers rendered as strings.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Returns true if the role exists in the guild.
    async fn role_exists(&self, guild_id: &str, role_id: &str) -> Result<bool, PlatformError>;

    /// Looks up a guild role by its display name.
    async fn find_role_by_name(
        &self,
        guild_id: &str,
        name: &str,
    ) -> Result<Option<String>, PlatformError>;

    /// Role ids held by a member, or `None` if the user is not in the guild.
    async fn member_roles(
        &self,
        guild_id: &str,
        user_id: &str,
    ) -> Result<Option<Vec<String>>, PlatformError>;

    async fn add_role(
        &self,
        guild_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), PlatformError>;

    async fn remove_role(
        &self,
        guild_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), PlatformError>;

    /// Creates a private text channel and returns its id.
    async fn create_ticket_channel(
        &self,
        request: &TicketChannelRequest,
    ) -> Result<String, PlatformError>;

    /// Denies sending messages to every overwrite on the channel except the
    /// bot's own identity and the `exempt` targets.
    ///
    /// Returns the number of overwrites changed.
    async fn restrict_sending(
        &self,
        channel_id: &str,
        exempt: &[PermissionTarget],
    ) -> Result<usize, PlatformError>;

    /// Allows the target to read and send in the channel.
    async fn grant_access(
        &self,
        channel_id: &str,
        target: &PermissionTarget,
    ) -> Result<(), PlatformError>;

    async fn delete_channel(&self, channel_id: &str) -> Result<(), PlatformError>;

    async fn post_decision(&self, notice: &DecisionNotice) -> Result<(), PlatformError>;
}

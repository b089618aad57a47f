//! Error types for platform calls.

use thiserror::Error;

/// Failure reported by the chat platform.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PlatformError {
    /// The guild is not visible to the bot.
    #[error("Guild not found: {0}")]
    GuildNotFound(String),

    /// The channel does not exist or is not a guild channel.
    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    /// An identifier could not be interpreted by the platform.
    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    /// The bot lacks the platform permission needed for the call.
    #[error("Missing platform permission: {0}")]
    Forbidden(String),

    /// Any other API failure.
    #[error("Platform request failed: {0}")]
    Api(String),
}

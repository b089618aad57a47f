//! Discord gateway adapter.
//!
//! Translates gateway events and slash commands into calls on the core
//! warning counter and ticket lifecycle.

pub mod commands;
pub mod events;
pub mod platform;
pub mod render;

use std::sync::Arc;

use warnbot_core::{TicketLifecycle, WarningCounter};

pub use platform::SerenityPlatform;

/// State shared with every command and event handler.
pub struct Data {
    pub lifecycle: Arc<TicketLifecycle>,
    pub warnings: Arc<WarningCounter>,
    pub platform: Arc<SerenityPlatform>,
}

pub type Error = anyhow::Error;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Prefix for the text form of the commands.
pub const COMMAND_PREFIX: &str = "!";

pub fn framework_options() -> poise::FrameworkOptions<Data, Error> {
    poise::FrameworkOptions {
        commands: vec![commands::nick()],
        prefix_options: poise::PrefixFrameworkOptions {
            prefix: Some(COMMAND_PREFIX.into()),
            ..Default::default()
        },
        event_handler: |ctx, event, framework, data| {
            Box::pin(events::event_handler(ctx, event, framework, data))
        },
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nick_is_reachable_by_prefix() {
        let options = framework_options();
        assert_eq!(options.prefix_options.prefix.as_deref(), Some("!"));

        let nick = options
            .commands
            .iter()
            .find(|c| c.name == "nick")
            .unwrap();
        assert!(nick.prefix_action.is_some());
        assert!(nick.slash_action.is_some());
    }
}

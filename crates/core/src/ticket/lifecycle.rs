//! Whitelist ticket lifecycle.
//!
//! Opening a ticket creates the private channel and binds the decision
//! controls. Every control activation is resolved through the dispatcher,
//! re-reads the ticket from the registry, applies the channel side effect
//! and writes the new status.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, warn};

use super::{
    ControlAction, ControlBinding, ControlDispatcher, ControlSet, CreateTicketRequest,
    DispatchError, RehydrationReport, Requester, Ticket, TicketError, TicketRegistry,
    TicketSummary,
};
use crate::config::Config;
use crate::platform::{
    Actor, DecisionNotice, PermissionTarget, Platform, PlatformError, TicketChannelRequest,
};

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("{actor} is not allowed to {action} tickets")]
    PermissionDenied { action: ControlAction, actor: String },

    #[error("Staff roles are not configured on guild {guild_id}")]
    MissingStaffRoles { guild_id: String },

    #[error(transparent)]
    Ticket(#[from] TicketError),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

impl LifecycleError {
    /// Errors the invoking actor caused, as opposed to failures of the bot.
    pub fn is_refusal(&self) -> bool {
        matches!(
            self,
            LifecycleError::Dispatch(_)
                | LifecycleError::PermissionDenied { .. }
                | LifecycleError::Ticket(TicketError::InvalidTransition { .. })
        )
    }
}

/// Guild roles involved in ticket handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffRoles {
    pub admin: String,
    pub moderator: String,
    pub owner: String,
    pub perma_ban: Option<String>,
}

impl StaffRoles {
    pub fn from_config(config: &Config) -> Self {
        Self {
            admin: config.roles.admin.to_string(),
            moderator: config.roles.moderator.to_string(),
            owner: config.roles.owner.to_string(),
            perma_ban: config.roles.perma_ban.map(|id| id.to_string()),
        }
    }

    /// Whether `actor` may trigger `action`.
    pub fn authorizes(&self, actor: &Actor, action: ControlAction) -> bool {
        if action.is_decision() {
            actor.has_any_role(&[&self.admin, &self.moderator])
        } else {
            actor.has_role(&self.owner)
        }
    }
}

#[derive(Debug, Clone)]
pub struct LifecycleSettings {
    pub staff: StaffRoles,
    /// Channel receiving decision notices.
    pub log_channel: Option<String>,
    pub ticket_category: String,
    pub delete_delay: Duration,
    pub min_account_age_days: i64,
}

impl LifecycleSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            staff: StaffRoles::from_config(config),
            log_channel: config.channels.log.map(|id| id.to_string()),
            ticket_category: config.channels.ticket_category.clone(),
            delete_delay: config.tickets.delete_delay(),
            min_account_age_days: config.tickets.min_account_age_days,
        }
    }
}

/// A freshly opened ticket.
#[derive(Debug, Clone)]
pub struct OpenedTicket {
    pub ticket: Ticket,
    pub summary: TicketSummary,
    pub controls: ControlSet,
}

/// Channel removal pending after a delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledRemoval {
    pub ticket_number: u64,
    pub channel_id: String,
    pub delay: Duration,
}

/// Result of a successful control activation.
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub ticket: Ticket,
    pub action: ControlAction,
    pub actor_name: String,
    /// Controls to show next; `None` once the ticket is deleted.
    pub controls: Option<ControlSet>,
    pub removal: Option<ScheduledRemoval>,
}

pub struct TicketLifecycle {
    registry: Arc<TicketRegistry>,
    dispatcher: Arc<ControlDispatcher>,
    platform: Arc<dyn Platform>,
    settings: LifecycleSettings,
}

impl TicketLifecycle {
    pub fn new(
        registry: Arc<TicketRegistry>,
        dispatcher: Arc<ControlDispatcher>,
        platform: Arc<dyn Platform>,
        settings: LifecycleSettings,
    ) -> Self {
        Self {
            registry,
            dispatcher,
            platform,
            settings,
        }
    }

    pub fn registry(&self) -> &TicketRegistry {
        &self.registry
    }

    pub fn dispatcher(&self) -> &ControlDispatcher {
        &self.dispatcher
    }

    pub fn settings(&self) -> &LifecycleSettings {
        &self.settings
    }

    /// Rebinds controls for every persisted ticket.
    pub fn rehydrate(&self) -> Result<RehydrationReport, TicketError> {
        let tickets = self.registry.all_tickets()?;
        Ok(self.dispatcher.rehydrate(&tickets))
    }

    /// Opens a whitelist ticket for `requester`.
    pub async fn open_ticket(
        &self,
        guild_id: &str,
        requester: &Requester,
        nickname: &str,
    ) -> Result<OpenedTicket, LifecycleError> {
        let staff = &self.settings.staff;
        let admin_exists = self.platform.role_exists(guild_id, &staff.admin).await?;
        let moderator_exists = self.platform.role_exists(guild_id, &staff.moderator).await?;
        if !admin_exists || !moderator_exists {
            error!(guild_id, "Admin or moderator role missing, cannot open ticket");
            return Err(LifecycleError::MissingStaffRoles {
                guild_id: guild_id.to_string(),
            });
        }

        let ticket_number = self.registry.next_ticket_number()?;

        let request = TicketChannelRequest {
            guild_id: guild_id.to_string(),
            ticket_number,
            name: format!("whitelist-request-{}", ticket_number),
            topic: format!("Whitelist request #{} for {}", ticket_number, nickname),
            category: Some(self.settings.ticket_category.clone()),
            participants: vec![
                PermissionTarget::Member(requester.user_id.clone()),
                PermissionTarget::Role(staff.admin.clone()),
                PermissionTarget::Role(staff.moderator.clone()),
            ],
        };
        let channel_id = self.platform.create_ticket_channel(&request).await?;

        let ticket = self.registry.create_ticket(
            CreateTicketRequest::new(guild_id, &requester.user_id, &channel_id, nickname)
                .with_number(ticket_number),
        )?;

        let history = self.registry.user_tickets(guild_id, &requester.user_id)?;
        let summary = TicketSummary::build(
            &ticket,
            requester,
            &history,
            staff.perma_ban.as_deref(),
            self.settings.min_account_age_days,
            Utc::now(),
        );

        let controls = self
            .dispatcher
            .bind(&ticket)
            .unwrap_or(ControlSet::Decision);

        info!(
            ticket_number,
            guild_id,
            user_id = %requester.user_id,
            channel_id = %channel_id,
            flags = summary.flags.len(),
            "Whitelist ticket opened"
        );

        Ok(OpenedTicket {
            ticket,
            summary,
            controls,
        })
    }

    /// Handles a control activation by `actor`.
    pub async fn activate(
        &self,
        custom_id: &str,
        actor: &Actor,
    ) -> Result<TransitionOutcome, LifecycleError> {
        let (action, binding) = self.dispatcher.resolve(custom_id).inspect_err(|e| {
            warn!(custom_id, actor = %actor.name, error = %e, "Control refused");
        })?;

        if !self.settings.staff.authorizes(actor, action) {
            warn!(
                ticket_number = binding.ticket_number,
                action = %action,
                actor = %actor.name,
                "Permission denied"
            );
            return Err(LifecycleError::PermissionDenied {
                action,
                actor: actor.name.clone(),
            });
        }

        let key = binding.key();
        let current = self
            .registry
            .get(&key)?
            .ok_or_else(|| TicketError::NotFound(key.to_string()))?;

        let target = action.target_status();
        if !current.status.can_transition_to(target) {
            // Binding drifted from the stored status; realign it.
            self.dispatcher.bind(&current);
            return Err(TicketError::InvalidTransition {
                key: key.to_string(),
                from: current.status,
                to: target,
            }
            .into());
        }

        let channel_id = binding
            .channel_id
            .clone()
            .unwrap_or_else(|| current.channel_id.clone());

        let ticket = match action {
            ControlAction::Approve | ControlAction::Deny => {
                let ticket = self.registry.update_status(&key, target)?;
                self.notify_decision(&ticket, action == ControlAction::Approve)
                    .await;
                ticket
            }
            ControlAction::Close => {
                let owner = PermissionTarget::Role(self.settings.staff.owner.clone());
                let changed = self
                    .platform
                    .restrict_sending(&channel_id, &[owner])
                    .await?;
                info!(ticket_number = key.ticket_number, changed, "Ticket channel locked");
                self.registry.update_status(&key, target)?
            }
            ControlAction::Reopen => {
                self.restore_access(&channel_id, &binding).await?;
                self.registry.update_status(&key, target)?
            }
            ControlAction::Delete => self.registry.update_status(&key, target)?,
        };

        let controls = self.dispatcher.bind(&ticket);
        let removal = ticket.status.is_terminal().then(|| ScheduledRemoval {
            ticket_number: ticket.ticket_number,
            channel_id: channel_id.clone(),
            delay: self.settings.delete_delay,
        });

        info!(
            ticket_number = ticket.ticket_number,
            action = %action,
            actor = %actor.name,
            status = %ticket.status,
            "Ticket transition applied"
        );

        Ok(TransitionOutcome {
            ticket,
            action,
            actor_name: actor.name.clone(),
            controls,
            removal,
        })
    }

    /// Waits out the removal delay, then deletes the channel.
    ///
    /// The ticket stays `deleted` if the channel removal fails.
    pub async fn remove_channel(&self, removal: ScheduledRemoval) -> Result<(), PlatformError> {
        tokio::time::sleep(removal.delay).await;
        match self.platform.delete_channel(&removal.channel_id).await {
            Ok(()) => {
                info!(
                    ticket_number = removal.ticket_number,
                    channel_id = %removal.channel_id,
                    "Ticket channel removed"
                );
                Ok(())
            }
            Err(e) => {
                error!(
                    ticket_number = removal.ticket_number,
                    channel_id = %removal.channel_id,
                    error = %e,
                    "Ticket channel removal failed, ticket is marked deleted"
                );
                Err(e)
            }
        }
    }

    async fn restore_access(
        &self,
        channel_id: &str,
        binding: &ControlBinding,
    ) -> Result<(), PlatformError> {
        let staff = &self.settings.staff;
        let targets = [
            PermissionTarget::Role(staff.admin.clone()),
            PermissionTarget::Role(staff.moderator.clone()),
            PermissionTarget::Member(binding.user_id.clone()),
        ];
        for target in &targets {
            self.platform.grant_access(channel_id, target).await?;
        }
        Ok(())
    }

    async fn notify_decision(&self, ticket: &Ticket, approved: bool) {
        let Some(channel_id) = &self.settings.log_channel else {
            warn!(ticket_number = ticket.ticket_number, "No log channel configured, decision not posted");
            return;
        };

        let notice = DecisionNotice {
            channel_id: channel_id.clone(),
            ticket_number: ticket.ticket_number,
            approved,
            requester_name: ticket.nickname.clone(),
        };
        if let Err(e) = self.platform.post_decision(&notice).await {
            error!(
                ticket_number = ticket.ticket_number,
                error = %e,
                "Failed to post decision notice"
            );
        }
    }
}

//! Live control bindings, rebuilt from persisted tickets on startup.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, info};

use super::{ControlAction, ControlSet, Ticket, TicketKey};

/// Identity a bound control resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlBinding {
    pub set: ControlSet,
    pub ticket_number: u64,
    pub guild_id: String,
    pub user_id: String,
    /// Only carried by the manage set, which acts on the channel.
    pub channel_id: Option<String>,
}

impl ControlBinding {
    fn for_ticket(ticket: &Ticket) -> Option<Self> {
        let set = ControlSet::for_status(ticket.status)?;
        Some(Self {
            set,
            ticket_number: ticket.ticket_number,
            guild_id: ticket.guild_id.clone(),
            user_id: ticket.user_id.clone(),
            channel_id: match set {
                ControlSet::Manage => Some(ticket.channel_id.clone()),
                _ => None,
            },
        })
    }

    pub fn key(&self) -> TicketKey {
        TicketKey::new(&self.guild_id, &self.user_id, self.ticket_number)
    }
}

/// Counts of control sets bound during rehydration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RehydrationReport {
    pub decision: usize,
    pub close: usize,
    pub manage: usize,
    /// Tickets with no live controls (deleted).
    pub inactive: usize,
}

impl RehydrationReport {
    pub fn bound(&self) -> usize {
        self.decision + self.close + self.manage
    }
}

/// Errors resolving a control activation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// Not a ticket control id.
    #[error("Unknown control: {0}")]
    Unknown(String),

    /// A ticket control that is not bound in the current state.
    #[error("Control {action} is no longer active for ticket #{ticket_number}")]
    Inactive {
        action: ControlAction,
        ticket_number: u64,
    },
}

/// Maps ticket numbers to the control set currently live for them.
#[derive(Debug, Default)]
pub struct ControlDispatcher {
    bindings: RwLock<HashMap<u64, ControlBinding>>,
}

impl ControlDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<u64, ControlBinding>> {
        self.bindings.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<u64, ControlBinding>> {
        self.bindings.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Replaces all bindings with the sets matching each ticket's status.
    pub fn rehydrate(&self, tickets: &[Ticket]) -> RehydrationReport {
        let mut report = RehydrationReport::default();
        let mut bindings = self.write();
        bindings.clear();

        for ticket in tickets {
            match ControlBinding::for_ticket(ticket) {
                Some(binding) => {
                    match binding.set {
                        ControlSet::Decision => report.decision += 1,
                        ControlSet::Close => report.close += 1,
                        ControlSet::Manage => report.manage += 1,
                    }
                    bindings.insert(ticket.ticket_number, binding);
                }
                None => report.inactive += 1,
            }
        }

        info!(
            decision = report.decision,
            close = report.close,
            manage = report.manage,
            inactive = report.inactive,
            "Ticket controls rehydrated"
        );
        report
    }

    /// Binds the control set for the ticket's current status, replacing any
    /// previous binding. Deleted tickets are unbound.
    pub fn bind(&self, ticket: &Ticket) -> Option<ControlSet> {
        let mut bindings = self.write();
        match ControlBinding::for_ticket(ticket) {
            Some(binding) => {
                let set = binding.set;
                debug!(ticket_number = ticket.ticket_number, set = ?set, "Controls bound");
                bindings.insert(ticket.ticket_number, binding);
                Some(set)
            }
            None => {
                bindings.remove(&ticket.ticket_number);
                debug!(ticket_number = ticket.ticket_number, "Controls unbound");
                None
            }
        }
    }

    /// Resolves a platform custom id to a bound control.
    pub fn resolve(&self, custom_id: &str) -> Result<(ControlAction, ControlBinding), DispatchError> {
        let (action, ticket_number) = ControlAction::parse(custom_id)
            .ok_or_else(|| DispatchError::Unknown(custom_id.to_string()))?;

        self.read()
            .get(&ticket_number)
            .filter(|binding| binding.set.contains(action))
            .map(|binding| (action, binding.clone()))
            .ok_or(DispatchError::Inactive {
                action,
                ticket_number,
            })
    }

    pub fn bound_set(&self, ticket_number: u64) -> Option<ControlSet> {
        self.read().get(&ticket_number).map(|b| b.set)
    }

    pub fn binding(&self, ticket_number: u64) -> Option<ControlBinding> {
        self.read().get(&ticket_number).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

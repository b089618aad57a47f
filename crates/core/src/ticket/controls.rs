//! Stateless control descriptors.
//!
//! A control carries only the action and the ticket number. Everything else
//! is resolved from the registry when the control is activated.

use std::fmt;

use super::TicketStatus;

const CUSTOM_ID_PREFIX: &str = "whitelist";

/// An interactive action on a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlAction {
    Approve,
    Deny,
    Close,
    Delete,
    Reopen,
}

impl ControlAction {
    pub const ALL: [ControlAction; 5] = [
        ControlAction::Approve,
        ControlAction::Deny,
        ControlAction::Close,
        ControlAction::Delete,
        ControlAction::Reopen,
    ];

    /// Status the ticket moves to when this action succeeds.
    pub fn target_status(&self) -> TicketStatus {
        match self {
            ControlAction::Approve => TicketStatus::Approved,
            ControlAction::Deny => TicketStatus::Denied,
            ControlAction::Close => TicketStatus::Closed,
            ControlAction::Delete => TicketStatus::Deleted,
            ControlAction::Reopen => TicketStatus::Reopened,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlAction::Approve => "approve",
            ControlAction::Deny => "deny",
            ControlAction::Close => "close",
            ControlAction::Delete => "delete",
            ControlAction::Reopen => "reopen",
        }
    }

    /// Button label.
    pub fn label(&self) -> &'static str {
        match self {
            ControlAction::Approve => "Approve",
            ControlAction::Deny => "Deny",
            ControlAction::Close => "Close",
            ControlAction::Delete => "Delete",
            ControlAction::Reopen => "Reopen",
        }
    }

    /// Approve and deny are staff decisions; the rest belong to the owner.
    pub fn is_decision(&self) -> bool {
        matches!(self, ControlAction::Approve | ControlAction::Deny)
    }

    /// Platform custom id for this action on a ticket.
    pub fn custom_id(&self, ticket_number: u64) -> String {
        format!("{}_{}_{}", CUSTOM_ID_PREFIX, self.as_str(), ticket_number)
    }

    /// Parses a custom id produced by [`ControlAction::custom_id`].
    pub fn parse(custom_id: &str) -> Option<(ControlAction, u64)> {
        let rest = custom_id.strip_prefix(CUSTOM_ID_PREFIX)?.strip_prefix('_')?;
        let (action, number) = rest.split_once('_')?;
        let action = Self::ALL.into_iter().find(|a| a.as_str() == action)?;
        let number = number.parse().ok()?;
        Some((action, number))
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The group of controls shown for a ticket status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlSet {
    /// Approve and Deny.
    Decision,
    /// Close only.
    Close,
    /// Delete and Reopen.
    Manage,
}

impl ControlSet {
    /// Control set bound to a ticket in the given status, if any.
    pub fn for_status(status: TicketStatus) -> Option<ControlSet> {
        match status {
            TicketStatus::Pending => Some(ControlSet::Decision),
            TicketStatus::Approved | TicketStatus::Denied | TicketStatus::Reopened => {
                Some(ControlSet::Close)
            }
            TicketStatus::Closed => Some(ControlSet::Manage),
            TicketStatus::Deleted => None,
        }
    }

    pub fn actions(&self) -> &'static [ControlAction] {
        match self {
            ControlSet::Decision => &[ControlAction::Approve, ControlAction::Deny],
            ControlSet::Close => &[ControlAction::Close],
            ControlSet::Manage => &[ControlAction::Delete, ControlAction::Reopen],
        }
    }

    pub fn contains(&self, action: ControlAction) -> bool {
        self.actions().contains(&action)
    }
}

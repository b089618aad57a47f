//! Intake summary posted when a ticket is opened.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Ticket;

/// The member filing a whitelist request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    pub user_id: String,
    /// Display name used in notices.
    pub name: String,
    pub account_created_at: DateTime<Utc>,
    /// When the member joined the guild, if known.
    pub joined_at: Option<DateTime<Utc>>,
    pub role_ids: Vec<String>,
}

impl Requester {
    pub fn account_age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.account_created_at).num_days()
    }

    pub fn has_role(&self, role_id: &str) -> bool {
        self.role_ids.iter().any(|r| r == role_id)
    }
}

/// Something staff should look at before deciding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SummaryFlag {
    NewAccount { age_days: i64 },
    PermaBanned,
    RepeatApplicant { prior_tickets: usize },
}

impl SummaryFlag {
    pub fn describe(&self) -> String {
        match self {
            SummaryFlag::NewAccount { age_days } => {
                format!("Account is only {} days old", age_days)
            }
            SummaryFlag::PermaBanned => "User holds the perma-ban role".to_string(),
            SummaryFlag::RepeatApplicant { prior_tickets } => {
                format!("User has {} earlier ticket(s)", prior_tickets)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketSummary {
    pub ticket_number: u64,
    pub nickname: String,
    pub requester_id: String,
    pub requester_name: String,
    /// Tickets filed before this one in the same guild.
    pub prior_tickets: usize,
    pub account_created_at: DateTime<Utc>,
    pub account_age_days: i64,
    pub joined_at: Option<DateTime<Utc>>,
    pub has_perma_ban: bool,
    pub flags: Vec<SummaryFlag>,
}

impl TicketSummary {
    /// Builds the summary for `ticket` from the requester's full history,
    /// which includes the ticket itself.
    pub fn build(
        ticket: &Ticket,
        requester: &Requester,
        history: &[Ticket],
        perma_ban_role: Option<&str>,
        min_account_age_days: i64,
        now: DateTime<Utc>,
    ) -> Self {
        let prior_tickets = history
            .iter()
            .filter(|t| t.ticket_number != ticket.ticket_number)
            .count();
        let account_age_days = requester.account_age_days(now);
        let has_perma_ban = perma_ban_role.is_some_and(|role| requester.has_role(role));

        let mut flags = Vec::new();
        if account_age_days < min_account_age_days {
            flags.push(SummaryFlag::NewAccount {
                age_days: account_age_days,
            });
        }
        if has_perma_ban {
            flags.push(SummaryFlag::PermaBanned);
        }
        if prior_tickets > 0 {
            flags.push(SummaryFlag::RepeatApplicant { prior_tickets });
        }

        Self {
            ticket_number: ticket.ticket_number,
            nickname: ticket.nickname.clone(),
            requester_id: requester.user_id.clone(),
            requester_name: requester.name.clone(),
            prior_tickets,
            account_created_at: requester.account_created_at,
            account_age_days,
            joined_at: requester.joined_at,
            has_perma_ban,
            flags,
        }
    }

    /// True if nothing was flagged.
    pub fn is_clean(&self) -> bool {
        self.flags.is_empty()
    }
}

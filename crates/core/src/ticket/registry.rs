//! File-backed ticket registry.

use std::path::PathBuf;

use chrono::Utc;
use tracing::{info, warn};

use super::{CreateTicketRequest, Ticket, TicketDocument, TicketError, TicketKey, TicketStatus};
use crate::store::JsonDocument;

/// Issues ticket numbers and records ticket status.
///
/// Holds no cached state: every call reloads the document, so a status read
/// here is the status on disk at the time of the call.
pub struct TicketRegistry {
    document: JsonDocument<TicketDocument>,
}

impl TicketRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            document: JsonDocument::new(path),
        }
    }

    /// Current persisted document.
    pub fn snapshot(&self) -> Result<TicketDocument, TicketError> {
        Ok(self.document.load()?)
    }

    /// Advances and persists the global ticket counter, returning the new number.
    pub fn next_ticket_number(&self) -> Result<u64, TicketError> {
        let number = self.document.update(|doc| {
            doc.last_ticket_number += 1;
            Ok::<_, TicketError>(doc.last_ticket_number)
        })?;
        info!(ticket_number = number, "Ticket number issued");
        Ok(number)
    }

    /// Records a new pending ticket.
    pub fn create_ticket(&self, request: CreateTicketRequest) -> Result<Ticket, TicketError> {
        let ticket = self.document.update(|doc| {
            let ticket_number = match request.ticket_number {
                Some(number) if number == 0 || number > doc.last_ticket_number => {
                    return Err(TicketError::NumberNotIssued {
                        number,
                        last: doc.last_ticket_number,
                    })
                }
                Some(number) => number,
                None if doc.last_ticket_number == 0 => return Err(TicketError::NoNumberIssued),
                None => doc.last_ticket_number,
            };

            let now = Utc::now();
            let ticket = Ticket {
                ticket_number,
                guild_id: request.guild_id,
                user_id: request.user_id,
                channel_id: request.channel_id,
                nickname: request.nickname,
                status: TicketStatus::Pending,
                created_at: now,
                updated_at: now,
            };

            let key = ticket.key().to_string();
            if doc.tickets.contains_key(&key) {
                return Err(TicketError::Duplicate(key));
            }
            doc.tickets.insert(key, ticket.clone());
            Ok(ticket)
        })?;

        info!(
            ticket_number = ticket.ticket_number,
            guild_id = %ticket.guild_id,
            user_id = %ticket.user_id,
            "Ticket created"
        );
        Ok(ticket)
    }

    pub fn get(&self, key: &TicketKey) -> Result<Option<Ticket>, TicketError> {
        Ok(self.document.load()?.get(key).cloned())
    }

    /// All tickets a user has filed in a guild, newest first.
    pub fn user_tickets(&self, guild_id: &str, user_id: &str) -> Result<Vec<Ticket>, TicketError> {
        let doc = self.document.load()?;
        let mut tickets: Vec<Ticket> = doc
            .tickets
            .into_values()
            .filter(|t| t.guild_id == guild_id && t.user_id == user_id)
            .collect();
        tickets.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.ticket_number.cmp(&a.ticket_number))
        });
        Ok(tickets)
    }

    /// Every stored ticket ordered by number.
    pub fn all_tickets(&self) -> Result<Vec<Ticket>, TicketError> {
        let doc = self.document.load()?;
        for issue in doc.inconsistencies() {
            warn!(issue = %issue, "Ticket document inconsistency");
        }
        let mut tickets: Vec<Ticket> = doc.tickets.into_values().collect();
        tickets.sort_by_key(|t| t.ticket_number);
        Ok(tickets)
    }

    /// Moves a ticket to a new status.
    ///
    /// Fails without touching the document if the key is unknown or the
    /// transition is not allowed from the current status.
    pub fn update_status(
        &self,
        key: &TicketKey,
        status: TicketStatus,
    ) -> Result<Ticket, TicketError> {
        let composite = key.to_string();
        let result = self.document.update(|doc| {
            let ticket = doc
                .tickets
                .get_mut(&composite)
                .ok_or_else(|| TicketError::NotFound(composite.clone()))?;

            if !ticket.status.can_transition_to(status) {
                return Err(TicketError::InvalidTransition {
                    key: composite.clone(),
                    from: ticket.status,
                    to: status,
                });
            }

            ticket.status = status;
            ticket.updated_at = Utc::now();
            Ok(ticket.clone())
        });

        match &result {
            Ok(ticket) => info!(
                ticket_number = ticket.ticket_number,
                status = %ticket.status,
                "Ticket status updated"
            ),
            Err(e) => warn!(key = %composite, to = %status, error = %e, "Ticket status update refused"),
        }
        result
    }
}

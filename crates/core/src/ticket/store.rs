//! Ticket errors and request types.

use thiserror::Error;

use crate::store::StoreError;
use crate::ticket::TicketStatus;

/// Error type for ticket operations.
#[derive(Debug, Error)]
pub enum TicketError {
    /// No ticket is stored under the composite key.
    #[error("Ticket not found: {0}")]
    NotFound(String),

    /// The requested status is not reachable from the current one.
    #[error("Cannot move ticket {key} from {from} to {to}")]
    InvalidTransition {
        key: String,
        from: TicketStatus,
        to: TicketStatus,
    },

    /// A ticket was created before any number was issued.
    #[error("No ticket number has been issued yet")]
    NoNumberIssued,

    /// The requested number is above the last issued number.
    #[error("Ticket number {number} was never issued (last issued: {last})")]
    NumberNotIssued { number: u64, last: u64 },

    /// A ticket already exists under the composite key.
    #[error("Ticket already exists: {0}")]
    Duplicate(String),

    /// The ticket document could not be loaded or saved.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Request to create a new ticket.
#[derive(Debug, Clone)]
pub struct CreateTicketRequest {
    pub guild_id: String,
    /// Requesting user.
    pub user_id: String,
    /// Private channel created for the request.
    pub channel_id: String,
    /// Nickname the user asked for.
    pub nickname: String,
    /// Number previously returned by `next_ticket_number`. `None` uses the
    /// last issued number.
    pub ticket_number: Option<u64>,
}

impl CreateTicketRequest {
    pub fn new(
        guild_id: impl Into<String>,
        user_id: impl Into<String>,
        channel_id: impl Into<String>,
        nickname: impl Into<String>,
    ) -> Self {
        Self {
            guild_id: guild_id.into(),
            user_id: user_id.into(),
            channel_id: channel_id.into(),
            nickname: nickname.into(),
            ticket_number: None,
        }
    }

    /// Pin the ticket to a specific issued number.
    pub fn with_number(mut self, ticket_number: u64) -> Self {
        self.ticket_number = Some(ticket_number);
        self
    }
}

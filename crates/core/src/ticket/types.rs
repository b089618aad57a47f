//! Core ticket data types.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a whitelist ticket.
///
/// ```text
/// Pending -> Approved | Denied
/// Approved | Denied | Reopened -> Closed
/// Closed -> Reopened | Deleted
/// ```
///
/// Deleted is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Waiting for an admin or moderator decision.
    Pending,
    Approved,
    Denied,
    /// Conversation locked; only the owner can still write.
    Closed,
    /// Closed ticket opened again by the owner.
    Reopened,
    /// Channel scheduled for removal. The record is kept as history.
    Deleted,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 6] = [
        TicketStatus::Pending,
        TicketStatus::Approved,
        TicketStatus::Denied,
        TicketStatus::Closed,
        TicketStatus::Reopened,
        TicketStatus::Deleted,
    ];

    /// Statuses reachable from this one.
    pub fn next_statuses(&self) -> &'static [TicketStatus] {
        match self {
            TicketStatus::Pending => &[TicketStatus::Approved, TicketStatus::Denied],
            TicketStatus::Approved | TicketStatus::Denied | TicketStatus::Reopened => {
                &[TicketStatus::Closed]
            }
            TicketStatus::Closed => &[TicketStatus::Deleted, TicketStatus::Reopened],
            TicketStatus::Deleted => &[],
        }
    }

    pub fn can_transition_to(&self, next: TicketStatus) -> bool {
        self.next_statuses().contains(&next)
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        self.next_statuses().is_empty()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "pending",
            TicketStatus::Approved => "approved",
            TicketStatus::Denied => "denied",
            TicketStatus::Closed => "closed",
            TicketStatus::Reopened => "reopened",
            TicketStatus::Deleted => "deleted",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a ticket: guild, requester and number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TicketKey {
    pub guild_id: String,
    pub user_id: String,
    pub ticket_number: u64,
}

impl TicketKey {
    pub fn new(guild_id: impl Into<String>, user_id: impl Into<String>, ticket_number: u64) -> Self {
        Self {
            guild_id: guild_id.into(),
            user_id: user_id.into(),
            ticket_number,
        }
    }
}

impl fmt::Display for TicketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.guild_id, self.user_id, self.ticket_number)
    }
}

/// A whitelist admission request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ticket {
    /// Globally monotonic number, never reused.
    pub ticket_number: u64,
    pub guild_id: String,
    pub user_id: String,
    /// Private channel the request is discussed in.
    pub channel_id: String,
    /// Nickname the user asked to be whitelisted under.
    pub nickname: String,
    pub status: TicketStatus,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    /// Refreshed on every status change.
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    pub fn key(&self) -> TicketKey {
        TicketKey::new(&self.guild_id, &self.user_id, self.ticket_number)
    }
}

/// Persisted ticket state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TicketDocument {
    /// Highest ticket number ever issued. Never decreases.
    pub last_ticket_number: u64,
    /// Tickets keyed by their composite [`TicketKey`].
    #[serde(default)]
    pub tickets: BTreeMap<String, Ticket>,
}

impl TicketDocument {
    pub fn get(&self, key: &TicketKey) -> Option<&Ticket> {
        self.tickets.get(&key.to_string())
    }

    /// Describes entries that break the document's invariants: keys that do
    /// not match their ticket, and tickets numbered above the counter.
    pub fn inconsistencies(&self) -> Vec<String> {
        let mut issues = Vec::new();
        for (key, ticket) in &self.tickets {
            let expected = ticket.key().to_string();
            if *key != expected {
                issues.push(format!("key {} does not match ticket {}", key, expected));
            }
            if ticket.ticket_number > self.last_ticket_number {
                issues.push(format!(
                    "ticket {} is above last_ticket_number {}",
                    expected, self.last_ticket_number
                ));
            }
        }
        issues
    }
}

/// ISO-8601 timestamps. Offset-less values written by older versions of the
/// bot are read as UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|e| D::Error::custom(format!("invalid timestamp {:?}: {}", raw, e)))
    }
}

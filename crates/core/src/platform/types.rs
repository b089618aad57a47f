use serde::{Deserialize, Serialize};

/// The member activating a control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: String,
    pub name: String,
    /// Role ids held in the guild the control lives in.
    pub role_ids: Vec<String>,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            role_ids: Vec::new(),
        }
    }

    pub fn with_role(mut self, role_id: impl Into<String>) -> Self {
        self.role_ids.push(role_id.into());
        self
    }

    pub fn has_role(&self, role_id: &str) -> bool {
        self.role_ids.iter().any(|r| r == role_id)
    }

    pub fn has_any_role(&self, role_ids: &[&str]) -> bool {
        role_ids.iter().any(|r| self.has_role(r))
    }
}

/// Something a channel permission overwrite can target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum PermissionTarget {
    Role(String),
    Member(String),
}

/// Parameters for creating a private ticket channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketChannelRequest {
    pub guild_id: String,
    pub ticket_number: u64,
    pub name: String,
    pub topic: String,
    /// Category to place the channel under, if one with this name exists.
    pub category: Option<String>,
    /// Members and roles that may read and write; everyone else is hidden.
    pub participants: Vec<PermissionTarget>,
}

/// Approve/deny notice posted to the log channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecisionNotice {
    pub channel_id: String,
    pub ticket_number: u64,
    pub approved: bool,
    pub requester_name: String,
}

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub roles: RolesConfig,
    #[serde(default)]
    pub channels: ChannelsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub tickets: TicketsConfig,
    #[serde(default)]
    pub warnings: WarningsConfig,
    #[serde(default)]
    pub liveness: LivenessConfig,
}

/// Guild role ids that gate ticket controls.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RolesConfig {
    pub admin: u64,
    pub moderator: u64,
    pub owner: u64,
    /// Role marking a member as permanently banned from the game server.
    #[serde(default)]
    pub perma_ban: Option<u64>,
}

/// Channel configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChannelsConfig {
    /// Channel receiving approve/deny notices. Notices are skipped when unset.
    #[serde(default)]
    pub log: Option<u64>,
    /// Category new ticket channels are created under, if it exists.
    #[serde(default = "default_ticket_category")]
    pub ticket_category: String,
}

impl Default for ChannelsConfig {
    fn default() -> Self {
        Self {
            log: None,
            ticket_category: default_ticket_category(),
        }
    }
}

fn default_ticket_category() -> String {
    "Checks".to_string()
}

/// Locations of the persisted JSON documents
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_warns_path")]
    pub warns_path: PathBuf,
    #[serde(default = "default_tickets_path")]
    pub tickets_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            warns_path: default_warns_path(),
            tickets_path: default_tickets_path(),
        }
    }
}

fn default_warns_path() -> PathBuf {
    PathBuf::from("warns.json")
}

fn default_tickets_path() -> PathBuf {
    PathBuf::from("whitelist_tickets.json")
}

/// Ticket lifecycle tuning
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TicketsConfig {
    /// Delay between marking a ticket deleted and removing its channel.
    #[serde(default = "default_delete_delay_secs")]
    pub delete_delay_secs: u64,
    /// Accounts younger than this are flagged in the intake summary.
    #[serde(default = "default_min_account_age_days")]
    pub min_account_age_days: i64,
}

impl TicketsConfig {
    pub fn delete_delay(&self) -> Duration {
        Duration::from_secs(self.delete_delay_secs)
    }
}

impl Default for TicketsConfig {
    fn default() -> Self {
        Self {
            delete_delay_secs: default_delete_delay_secs(),
            min_account_age_days: default_min_account_age_days(),
        }
    }
}

fn default_delete_delay_secs() -> u64 {
    5
}

fn default_min_account_age_days() -> i64 {
    30
}

/// Inbound warning notice recognition and escalation role names
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WarningsConfig {
    /// Substring that identifies a warning notice in the embed author name.
    #[serde(default = "default_author_marker")]
    pub author_marker: String,
    /// Embed field holding the warned user's mention.
    #[serde(default = "default_user_field")]
    pub user_field: String,
    #[serde(default = "default_level_one_role")]
    pub level_one_role: String,
    #[serde(default = "default_level_two_role")]
    pub level_two_role: String,
}

impl Default for WarningsConfig {
    fn default() -> Self {
        Self {
            author_marker: default_author_marker(),
            user_field: default_user_field(),
            level_one_role: default_level_one_role(),
            level_two_role: default_level_two_role(),
        }
    }
}

fn default_author_marker() -> String {
    "[WARN]".to_string()
}

fn default_user_field() -> String {
    "User".to_string()
}

fn default_level_one_role() -> String {
    "Warn1lvl".to_string()
}

fn default_level_two_role() -> String {
    "Warn2lvl".to_string()
}

/// Liveness endpoint configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LivenessConfig {
    #[serde(default = "default_liveness_enabled")]
    pub enabled: bool,
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            enabled: default_liveness_enabled(),
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_liveness_enabled() -> bool {
    true
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    5000
}

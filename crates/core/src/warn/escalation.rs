//! Role escalation for warning counts.

use crate::config::WarningsConfig;

/// Role change triggered when a counter reaches a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escalation {
    /// First warning: grant the level one role.
    GrantLevelOne,
    /// Second warning: drop the level one role (if held), grant level two.
    PromoteToLevelTwo,
    /// No tier is defined for this count.
    None,
}

impl Escalation {
    /// Escalation for a freshly incremented count.
    ///
    /// Evaluated on the new value only, so each tier fires once when the
    /// counter crosses it. Counts above two have no tier.
    pub fn for_count(count: u64) -> Self {
        match count {
            1 => Escalation::GrantLevelOne,
            2 => Escalation::PromoteToLevelTwo,
            _ => Escalation::None,
        }
    }
}

/// Names of the tier roles, resolved against the guild at escalation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscalationPolicy {
    pub level_one_role: String,
    pub level_two_role: String,
}

impl EscalationPolicy {
    pub fn new(level_one_role: impl Into<String>, level_two_role: impl Into<String>) -> Self {
        Self {
            level_one_role: level_one_role.into(),
            level_two_role: level_two_role.into(),
        }
    }

    pub fn from_config(config: &WarningsConfig) -> Self {
        Self::new(&config.level_one_role, &config.level_two_role)
    }
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self::from_config(&WarningsConfig::default())
    }
}

/// What an escalation actually changed on the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EscalationReport {
    /// Role names granted.
    pub granted: Vec<String>,
    /// Role names revoked.
    pub revoked: Vec<String>,
    /// Tier role names that do not exist in the guild.
    pub missing_roles: Vec<String>,
}

impl EscalationReport {
    pub fn is_noop(&self) -> bool {
        self.granted.is_empty() && self.revoked.is_empty()
    }
}

//! Testing utilities and mock implementations.
//!
//! # Example
//!
//! ```rust,ignore
//! use warnbot_core::testing::MockPlatform;
//!
//! let platform = MockPlatform::new();
//! platform.add_guild_role("guild", "501", "Warn1lvl").await;
//! platform.add_member("guild", "42", vec![]).await;
//!
//! // Exercise the counter or lifecycle against it...
//!
//! assert!(platform.member_has_role("guild", "42", "501").await);
//! ```

mod mock_platform;

pub use mock_platform::{MockOverwrite, MockPlatform, PlatformCall, MOCK_BOT_ID};

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{Duration, Utc};

    use crate::platform::Actor;
    use crate::ticket::{Requester, StaffRoles};

    pub const GUILD_ID: &str = "1000";
    pub const ADMIN_ROLE: &str = "11";
    pub const MODERATOR_ROLE: &str = "22";
    pub const OWNER_ROLE: &str = "33";
    pub const PERMA_BAN_ROLE: &str = "44";

    /// Staff roles matching the role constants above.
    pub fn staff_roles() -> StaffRoles {
        StaffRoles {
            admin: ADMIN_ROLE.to_string(),
            moderator: MODERATOR_ROLE.to_string(),
            owner: OWNER_ROLE.to_string(),
            perma_ban: Some(PERMA_BAN_ROLE.to_string()),
        }
    }

    pub fn admin(user_id: &str) -> Actor {
        Actor::new(user_id, format!("admin-{}", user_id)).with_role(ADMIN_ROLE)
    }

    pub fn moderator(user_id: &str) -> Actor {
        Actor::new(user_id, format!("mod-{}", user_id)).with_role(MODERATOR_ROLE)
    }

    pub fn owner(user_id: &str) -> Actor {
        Actor::new(user_id, format!("owner-{}", user_id)).with_role(OWNER_ROLE)
    }

    pub fn member(user_id: &str) -> Actor {
        Actor::new(user_id, format!("member-{}", user_id))
    }

    /// A requester whose account is `account_age_days` old.
    pub fn requester(user_id: &str, account_age_days: i64) -> Requester {
        let now = Utc::now();
        Requester {
            user_id: user_id.to_string(),
            name: format!("player-{}", user_id),
            account_created_at: now - Duration::days(account_age_days),
            joined_at: Some(now - Duration::days(1)),
            role_ids: Vec::new(),
        }
    }
}

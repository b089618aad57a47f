//! Persistent warning counter with role escalation.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{error, info, warn};

use super::{Escalation, EscalationPolicy, EscalationReport, NoticeParser, WarnLedger, WarningNotice};
use crate::platform::{Platform, PlatformError};
use crate::store::{JsonDocument, StoreError};

#[derive(Debug, Error)]
pub enum WarnError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Result of processing one warning notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarningOutcome {
    pub guild_id: String,
    pub user_id: String,
    /// Counter value after this warning.
    pub count: u64,
    /// False if the warned user is no longer a member; roles were not touched.
    pub member_present: bool,
    pub report: EscalationReport,
}

/// Counts warnings per guild and user and assigns tier roles.
///
/// Not idempotent: every recorded warning increments the counter. Callers
/// must not feed the same notice twice.
pub struct WarningCounter {
    ledger: JsonDocument<WarnLedger>,
    policy: EscalationPolicy,
    parser: NoticeParser,
}

impl WarningCounter {
    pub fn new(path: impl Into<PathBuf>, policy: EscalationPolicy, parser: NoticeParser) -> Self {
        Self {
            ledger: JsonDocument::new(path),
            policy,
            parser,
        }
    }

    /// Current count for a user.
    pub fn count(&self, guild_id: &str, user_id: &str) -> Result<u64, StoreError> {
        Ok(self.ledger.load()?.count(guild_id, user_id))
    }

    /// Increments the user's counter and persists it, returning the new count.
    pub fn record_warning(&self, guild_id: &str, user_id: &str) -> Result<u64, StoreError> {
        let count = self
            .ledger
            .update(|ledger| Ok::<_, StoreError>(ledger.increment(guild_id, user_id)))?;
        info!(guild_id, user_id, count, "Warning recorded");
        Ok(count)
    }

    /// Applies the tier change for a freshly incremented count.
    ///
    /// Tier roles missing from the guild are logged and skipped.
    pub async fn escalate(
        &self,
        platform: &dyn Platform,
        guild_id: &str,
        user_id: &str,
        member_roles: &[String],
        count: u64,
    ) -> Result<EscalationReport, PlatformError> {
        let mut report = EscalationReport::default();

        match Escalation::for_count(count) {
            Escalation::GrantLevelOne => {
                let name = &self.policy.level_one_role;
                match platform.find_role_by_name(guild_id, name).await? {
                    Some(role_id) => {
                        platform.add_role(guild_id, user_id, &role_id).await?;
                        info!(guild_id, user_id, role = %name, "Warning role granted");
                        report.granted.push(name.clone());
                    }
                    None => {
                        error!(guild_id, role = %name, "Warning role not found");
                        report.missing_roles.push(name.clone());
                    }
                }
            }
            Escalation::PromoteToLevelTwo => {
                let first = &self.policy.level_one_role;
                match platform.find_role_by_name(guild_id, first).await? {
                    Some(role_id) if member_roles.contains(&role_id) => {
                        platform.remove_role(guild_id, user_id, &role_id).await?;
                        info!(guild_id, user_id, role = %first, "Warning role revoked");
                        report.revoked.push(first.clone());
                    }
                    Some(_) => {}
                    None => {
                        error!(guild_id, role = %first, "Warning role not found");
                        report.missing_roles.push(first.clone());
                    }
                }

                let second = &self.policy.level_two_role;
                match platform.find_role_by_name(guild_id, second).await? {
                    Some(role_id) => {
                        platform.add_role(guild_id, user_id, &role_id).await?;
                        info!(guild_id, user_id, role = %second, "Warning role granted");
                        report.granted.push(second.clone());
                    }
                    None => {
                        error!(guild_id, role = %second, "Warning role not found");
                        report.missing_roles.push(second.clone());
                    }
                }
            }
            Escalation::None => {
                info!(guild_id, user_id, count, "No warning tier beyond level two");
            }
        }

        Ok(report)
    }

    /// Processes a notice posted in a guild.
    ///
    /// Returns `Ok(None)` when the notice is not a warning or names no user.
    pub async fn handle_notice(
        &self,
        platform: &dyn Platform,
        guild_id: &str,
        notice: &WarningNotice,
    ) -> Result<Option<WarningOutcome>, WarnError> {
        if !self.parser.is_warning(notice) {
            return Ok(None);
        }

        let Some(user_id) = self.parser.warned_user(notice) else {
            warn!(guild_id, "Warning notice without a user mention");
            return Ok(None);
        };

        let count = self.record_warning(guild_id, &user_id)?;

        let Some(member_roles) = platform.member_roles(guild_id, &user_id).await? else {
            warn!(guild_id, user_id = %user_id, count, "Warned user is not a guild member");
            return Ok(Some(WarningOutcome {
                guild_id: guild_id.to_string(),
                user_id,
                count,
                member_present: false,
                report: EscalationReport::default(),
            }));
        };

        let report = self
            .escalate(platform, guild_id, &user_id, &member_roles, count)
            .await?;

        Ok(Some(WarningOutcome {
            guild_id: guild_id.to_string(),
            user_id,
            count,
            member_present: true,
            report,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockPlatform, PlatformCall};
    use tempfile::TempDir;

    const GUILD: &str = "900";

    fn counter(dir: &TempDir) -> WarningCounter {
        WarningCounter::new(
            dir.path().join("warns.json"),
            EscalationPolicy::default(),
            NoticeParser::new("[WARN]", "User"),
        )
    }

    fn notice(user: &str) -> WarningNotice {
        WarningNotice::new("[WARN] Case #1").with_field("User", format!("<@{}>", user))
    }

    async fn platform_with_tiers() -> MockPlatform {
        let platform = MockPlatform::new();
        platform.add_guild_role(GUILD, "501", "Warn1lvl").await;
        platform.add_guild_role(GUILD, "502", "Warn2lvl").await;
        platform.add_member(GUILD, "42", vec![]).await;
        platform
    }

    #[test]
    fn test_record_warning_increments_and_persists() {
        let dir = TempDir::new().unwrap();
        let counter = counter(&dir);

        assert_eq!(counter.record_warning(GUILD, "42").unwrap(), 1);
        assert_eq!(counter.record_warning(GUILD, "42").unwrap(), 2);
        assert_eq!(counter.record_warning("other", "42").unwrap(), 1);

        let reopened = WarningCounter::new(
            dir.path().join("warns.json"),
            EscalationPolicy::default(),
            NoticeParser::new("[WARN]", "User"),
        );
        assert_eq!(reopened.count(GUILD, "42").unwrap(), 2);
        assert_eq!(reopened.count(GUILD, "43").unwrap(), 0);
    }

    #[tokio::test]
    async fn test_first_warning_grants_level_one() {
        let dir = TempDir::new().unwrap();
        let counter = counter(&dir);
        let platform = platform_with_tiers().await;

        let outcome = counter
            .handle_notice(&platform, GUILD, &notice("42"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(outcome.count, 1);
        assert!(outcome.member_present);
        assert_eq!(outcome.report.granted, vec!["Warn1lvl".to_string()]);
        assert!(outcome.report.revoked.is_empty());
        assert!(platform.member_has_role(GUILD, "42", "501").await);
    }

    #[tokio::test]
    async fn test_second_warning_swaps_tiers_once() {
        let dir = TempDir::new().unwrap();
        let counter = counter(&dir);
        let platform = platform_with_tiers().await;

        counter.handle_notice(&platform, GUILD, &notice("42")).await.unwrap();
        let second = counter
            .handle_notice(&platform, GUILD, &notice("42"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(second.count, 2);
        assert_eq!(second.report.revoked, vec!["Warn1lvl".to_string()]);
        assert_eq!(second.report.granted, vec!["Warn2lvl".to_string()]);
        assert!(!platform.member_has_role(GUILD, "42", "501").await);
        assert!(platform.member_has_role(GUILD, "42", "502").await);

        let role_changes_before = platform.role_change_count().await;
        for expected in 3..=5 {
            let later = counter
                .handle_notice(&platform, GUILD, &notice("42"))
                .await
                .unwrap()
                .unwrap();
            assert_eq!(later.count, expected);
            assert!(later.report.is_noop());
        }
        assert_eq!(platform.role_change_count().await, role_changes_before);
    }

    #[tokio::test]
    async fn test_second_warning_without_level_one_held() {
        let dir = TempDir::new().unwrap();
        let counter = counter(&dir);
        let platform = platform_with_tiers().await;
        counter.record_warning(GUILD, "42").unwrap();

        let outcome = counter
            .handle_notice(&platform, GUILD, &notice("42"))
            .await
            .unwrap()
            .unwrap();

        assert!(outcome.report.revoked.is_empty());
        assert_eq!(outcome.report.granted, vec!["Warn2lvl".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_role_is_not_fatal() {
        let dir = TempDir::new().unwrap();
        let counter = counter(&dir);
        let platform = MockPlatform::new();
        platform.add_member(GUILD, "42", vec![]).await;

        let outcome = counter
            .handle_notice(&platform, GUILD, &notice("42"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(outcome.count, 1);
        assert!(outcome.report.is_noop());
        assert_eq!(outcome.report.missing_roles, vec!["Warn1lvl".to_string()]);
    }

    #[tokio::test]
    async fn test_second_warning_reports_missing_level_one() {
        let dir = TempDir::new().unwrap();
        let counter = counter(&dir);
        let platform = MockPlatform::new();
        platform.add_guild_role(GUILD, "502", "Warn2lvl").await;
        platform.add_member(GUILD, "42", vec![]).await;
        counter.record_warning(GUILD, "42").unwrap();

        let outcome = counter
            .handle_notice(&platform, GUILD, &notice("42"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(outcome.count, 2);
        assert_eq!(outcome.report.missing_roles, vec!["Warn1lvl".to_string()]);
        assert!(outcome.report.revoked.is_empty());
        assert_eq!(outcome.report.granted, vec!["Warn2lvl".to_string()]);
        assert!(platform.member_has_role(GUILD, "42", "502").await);
    }

    #[tokio::test]
    async fn test_absent_member_still_counted() {
        let dir = TempDir::new().unwrap();
        let counter = counter(&dir);
        let platform = platform_with_tiers().await;

        let outcome = counter
            .handle_notice(&platform, GUILD, &notice("77"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(outcome.count, 1);
        assert!(!outcome.member_present);
        assert_eq!(platform.role_change_count().await, 0);
        assert_eq!(counter.count(GUILD, "77").unwrap(), 1);
    }

    #[tokio::test]
    async fn test_non_warning_notice_is_ignored() {
        let dir = TempDir::new().unwrap();
        let counter = counter(&dir);
        let platform = platform_with_tiers().await;

        let other = WarningNotice::new("[MUTE]").with_field("User", "<@42>");
        assert!(counter
            .handle_notice(&platform, GUILD, &other)
            .await
            .unwrap()
            .is_none());

        let no_user = WarningNotice::new("[WARN]").with_field("User", "unknown");
        assert!(counter
            .handle_notice(&platform, GUILD, &no_user)
            .await
            .unwrap()
            .is_none());

        assert_eq!(counter.count(GUILD, "42").unwrap(), 0);
        assert!(platform.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_platform_failure_surfaces_after_count_saved() {
        let dir = TempDir::new().unwrap();
        let counter = counter(&dir);
        let platform = platform_with_tiers().await;
        platform
            .set_next_error(PlatformError::Forbidden("manage roles".to_string()))
            .await;

        let result = counter.handle_notice(&platform, GUILD, &notice("42")).await;

        assert!(matches!(result, Err(WarnError::Platform(_))));
        assert_eq!(counter.count(GUILD, "42").unwrap(), 1);
        assert!(!platform
            .calls()
            .await
            .iter()
            .any(|c| matches!(c, PlatformCall::AddRole { .. })));
    }
}

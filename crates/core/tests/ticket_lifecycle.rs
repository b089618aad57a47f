//! Whitelist ticket lifecycle integration tests.
//!
//! Drives a ticket through pending -> approved -> closed -> deleted against
//! the mock platform and a file-backed registry.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use warnbot_core::{
    platform::PermissionTarget,
    testing::{fixtures, MockPlatform, PlatformCall},
    ticket::{
        ControlAction, ControlDispatcher, ControlSet, CreateTicketRequest, LifecycleSettings,
        TicketDocument, TicketKey, TicketLifecycle, TicketRegistry, TicketStatus,
    },
    JsonDocument, TicketError,
};

struct TestHarness {
    platform: MockPlatform,
    lifecycle: Arc<TicketLifecycle>,
    tickets_path: std::path::PathBuf,
    _temp_dir: TempDir,
}

impl TestHarness {
    async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let tickets_path = temp_dir.path().join("whitelist_tickets.json");

        let platform = MockPlatform::new();
        platform
            .add_guild_role(fixtures::GUILD_ID, fixtures::ADMIN_ROLE, "Admin")
            .await;
        platform
            .add_guild_role(fixtures::GUILD_ID, fixtures::MODERATOR_ROLE, "Moderator")
            .await;
        platform
            .add_guild_role(fixtures::GUILD_ID, fixtures::OWNER_ROLE, "Owner")
            .await;

        let lifecycle = Arc::new(TicketLifecycle::new(
            Arc::new(TicketRegistry::new(&tickets_path)),
            Arc::new(ControlDispatcher::new()),
            Arc::new(platform.clone()),
            LifecycleSettings {
                staff: fixtures::staff_roles(),
                log_channel: Some("900".to_string()),
                ticket_category: "Checks".to_string(),
                delete_delay: Duration::from_secs(5),
                min_account_age_days: 30,
            },
        ));

        Self {
            platform,
            lifecycle,
            tickets_path,
            _temp_dir: temp_dir,
        }
    }

    fn stored_status(&self, key: &TicketKey) -> TicketStatus {
        self.lifecycle
            .registry()
            .get(key)
            .expect("Failed to read registry")
            .expect("Ticket missing")
            .status
    }
}

#[tokio::test(start_paused = true)]
async fn test_full_lifecycle_pending_to_deleted() {
    let h = TestHarness::new().await;
    let registry = h.lifecycle.registry();

    // Fresh store, first number is 1
    assert_eq!(registry.snapshot().unwrap().last_ticket_number, 0);
    assert_eq!(registry.next_ticket_number().unwrap(), 1);

    let channel_id = "610";
    h.platform
        .add_channel(
            channel_id,
            vec![
                PermissionTarget::Member("42".to_string()),
                PermissionTarget::Role(fixtures::ADMIN_ROLE.to_string()),
                PermissionTarget::Role(fixtures::MODERATOR_ROLE.to_string()),
                PermissionTarget::Role(fixtures::OWNER_ROLE.to_string()),
                PermissionTarget::Member(warnbot_core::testing::MOCK_BOT_ID.to_string()),
            ],
        )
        .await;
    let ticket = registry
        .create_ticket(CreateTicketRequest::new(
            fixtures::GUILD_ID,
            "42",
            channel_id,
            "Steve",
        ))
        .unwrap();
    assert_eq!(ticket.ticket_number, 1);
    assert_eq!(ticket.status, TicketStatus::Pending);
    let key = ticket.key();
    assert_eq!(h.lifecycle.dispatcher().bind(&ticket), Some(ControlSet::Decision));

    // Admin approves, one notice goes out
    let approved = h
        .lifecycle
        .activate(&ControlAction::Approve.custom_id(1), &fixtures::admin("7"))
        .await
        .unwrap();
    assert_eq!(approved.ticket.status, TicketStatus::Approved);
    assert_eq!(approved.controls, Some(ControlSet::Close));
    assert_eq!(h.stored_status(&key), TicketStatus::Approved);
    let decisions = h.platform.decisions().await;
    assert_eq!(decisions.len(), 1);
    assert!(decisions[0].approved);
    assert_eq!(decisions[0].ticket_number, 1);

    // Owner closes, everyone but the owner role and the bot loses send
    let owner = fixtures::owner("1");
    let closed = h
        .lifecycle
        .activate(&ControlAction::Close.custom_id(1), &owner)
        .await
        .unwrap();
    assert_eq!(closed.ticket.status, TicketStatus::Closed);
    assert_eq!(closed.controls, Some(ControlSet::Manage));
    for target in [
        PermissionTarget::Member("42".to_string()),
        PermissionTarget::Role(fixtures::ADMIN_ROLE.to_string()),
        PermissionTarget::Role(fixtures::MODERATOR_ROLE.to_string()),
    ] {
        let overwrite = h.platform.overwrite(channel_id, &target).await.unwrap();
        assert!(!overwrite.send, "{:?} can still send", target);
    }
    let owner_role = PermissionTarget::Role(fixtures::OWNER_ROLE.to_string());
    assert!(h.platform.overwrite(channel_id, &owner_role).await.unwrap().send);
    let bot = PermissionTarget::Member(warnbot_core::testing::MOCK_BOT_ID.to_string());
    assert!(h.platform.overwrite(channel_id, &bot).await.unwrap().send);

    // Owner deletes: status is written now, the channel goes after the delay
    let deleted = h
        .lifecycle
        .activate(&ControlAction::Delete.custom_id(1), &owner)
        .await
        .unwrap();
    assert_eq!(deleted.ticket.status, TicketStatus::Deleted);
    assert_eq!(deleted.controls, None);
    assert_eq!(h.stored_status(&key), TicketStatus::Deleted);

    let removal = deleted.removal.expect("Delete should schedule removal");
    assert_eq!(removal.channel_id, channel_id);
    assert_eq!(removal.delay, Duration::from_secs(5));

    let lifecycle = Arc::clone(&h.lifecycle);
    let handle = tokio::spawn(async move { lifecycle.remove_channel(removal).await });

    assert!(h.platform.channel_exists(channel_id).await);
    tokio::time::sleep(Duration::from_secs(4)).await;
    assert!(h.platform.channel_exists(channel_id).await);

    handle.await.unwrap().unwrap();
    assert!(!h.platform.channel_exists(channel_id).await);
    assert_eq!(h.stored_status(&key), TicketStatus::Deleted);
    assert_eq!(h.platform.decisions().await.len(), 1);
}

#[tokio::test]
async fn test_open_ticket_through_lifecycle() {
    let h = TestHarness::new().await;
    let requester = fixtures::requester("42", 2);

    let opened = h
        .lifecycle
        .open_ticket(fixtures::GUILD_ID, &requester, "Steve")
        .await
        .unwrap();

    assert_eq!(opened.ticket.ticket_number, 1);
    assert_eq!(opened.controls, ControlSet::Decision);
    assert_eq!(opened.summary.nickname, "Steve");
    assert!(!opened.summary.is_clean());

    let requester_target = PermissionTarget::Member("42".to_string());
    let overwrite = h
        .platform
        .overwrite(&opened.ticket.channel_id, &requester_target)
        .await
        .unwrap();
    assert!(overwrite.read && overwrite.send);

    let tickets = h
        .lifecycle
        .registry()
        .user_tickets(fixtures::GUILD_ID, "42")
        .unwrap();
    assert_eq!(tickets, vec![opened.ticket]);
}

#[tokio::test]
async fn test_delete_removal_failure_keeps_deleted_status() {
    let h = TestHarness::new().await;
    let opened = h
        .lifecycle
        .open_ticket(fixtures::GUILD_ID, &fixtures::requester("42", 365), "Steve")
        .await
        .unwrap();
    let n = opened.ticket.ticket_number;
    let owner = fixtures::owner("1");

    h.lifecycle
        .activate(&ControlAction::Deny.custom_id(n), &fixtures::moderator("8"))
        .await
        .unwrap();
    h.lifecycle
        .activate(&ControlAction::Close.custom_id(n), &owner)
        .await
        .unwrap();
    let deleted = h
        .lifecycle
        .activate(&ControlAction::Delete.custom_id(n), &owner)
        .await
        .unwrap();

    let mut removal = deleted.removal.unwrap();
    removal.delay = Duration::ZERO;
    h.platform
        .set_next_error(warnbot_core::PlatformError::Forbidden("no access".to_string()))
        .await;
    assert!(h.lifecycle.remove_channel(removal).await.is_err());

    assert_eq!(h.stored_status(&opened.ticket.key()), TicketStatus::Deleted);
    assert!(h.platform.channel_exists(&opened.ticket.channel_id).await);
    assert!(!h
        .platform
        .calls()
        .await
        .iter()
        .any(|c| matches!(c, PlatformCall::DeleteChannel { .. })));
}

#[test]
fn test_numbering_has_no_gaps_or_repeats() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tickets.json");

    let mut issued = Vec::new();
    for _ in 0..10 {
        // a fresh registry per call, as after a restart
        issued.push(TicketRegistry::new(&path).next_ticket_number().unwrap());
    }
    assert_eq!(issued, (1..=10).collect::<Vec<u64>>());
}

#[test]
fn test_update_missing_ticket_is_byte_identical() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tickets.json");
    let registry = TicketRegistry::new(&path);
    registry.next_ticket_number().unwrap();
    registry
        .create_ticket(CreateTicketRequest::new("g", "u", "c", "Steve"))
        .unwrap();
    let before = fs::read(&path).unwrap();

    let result = registry.update_status(&TicketKey::new("g", "someone-else", 1), TicketStatus::Approved);

    assert!(matches!(result, Err(TicketError::NotFound(_))));
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[tokio::test]
async fn test_ticket_document_round_trip() {
    let h = TestHarness::new().await;
    for user in ["1", "2", "3"] {
        h.lifecycle
            .open_ticket(fixtures::GUILD_ID, &fixtures::requester(user, 365), "Стив")
            .await
            .unwrap();
    }
    h.lifecycle
        .activate(&ControlAction::Approve.custom_id(2), &fixtures::admin("7"))
        .await
        .unwrap();

    let in_memory = h.lifecycle.registry().snapshot().unwrap();
    let copy_path = h.tickets_path.with_file_name("copy.json");
    let copy = JsonDocument::<TicketDocument>::new(&copy_path);
    copy.save(&in_memory).unwrap();

    assert_eq!(copy.load().unwrap(), in_memory);
    assert!(fs::read_to_string(&copy_path).unwrap().contains("Стив"));
}

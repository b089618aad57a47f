//! Message and component builders.

use std::num::NonZeroU64;

use poise::serenity_prelude as serenity;
use serenity::{
    ButtonStyle, Colour, CreateActionRow, CreateAllowedMentions, CreateButton, CreateEmbed,
    CreateEmbedFooter, RoleId, Timestamp, UserId,
};

use warnbot_core::platform::DecisionNotice;
use warnbot_core::ticket::{
    ControlAction, ControlSet, LifecycleError, ScheduledRemoval, StaffRoles, TicketSummary,
    TransitionOutcome,
};

const APPROVED: Colour = Colour::DARK_GREEN;
const DENIED: Colour = Colour::RED;
const CHECK_PASSED: Colour = Colour::BLUE;
const CHECK_FLAGGED: Colour = Colour::ORANGE;

pub fn button_style(action: ControlAction) -> ButtonStyle {
    match action {
        ControlAction::Approve => ButtonStyle::Success,
        ControlAction::Reopen => ButtonStyle::Primary,
        ControlAction::Deny | ControlAction::Close | ControlAction::Delete => ButtonStyle::Danger,
    }
}

/// One action row holding every control of the set.
pub fn control_rows(set: ControlSet, ticket_number: u64) -> Vec<CreateActionRow> {
    let buttons = set
        .actions()
        .iter()
        .map(|action| {
            CreateButton::new(action.custom_id(ticket_number))
                .label(action.label())
                .style(button_style(*action))
        })
        .collect();
    vec![CreateActionRow::Buttons(buttons)]
}

/// First line of a new ticket channel, pinging the deciding staff.
pub fn opening_content(requester_id: &str, staff: &StaffRoles) -> String {
    format!(
        "New whitelist request from <@{}> for <@&{}> <@&{}>",
        requester_id, staff.admin, staff.moderator
    )
}

/// Restricts pings on the opening message to the requester and the deciding staff roles.
pub fn opening_mentions(requester_id: UserId, staff: &StaffRoles) -> CreateAllowedMentions {
    let roles = [&staff.admin, &staff.moderator]
        .into_iter()
        .filter_map(|id| id.parse::<NonZeroU64>().ok())
        .map(RoleId::from);
    CreateAllowedMentions::new().users([requester_id]).roles(roles)
}

pub fn summary_description(summary: &TicketSummary) -> String {
    let mut lines = vec![
        format!("**Nickname:** {}", summary.nickname),
        format!("**Requester:** <@{}>", summary.requester_id),
        format!(
            "**Account created:** <t:{}:D> ({} days ago)",
            summary.account_created_at.timestamp(),
            summary.account_age_days
        ),
    ];
    if let Some(joined) = summary.joined_at {
        lines.push(format!("**Joined server:** <t:{}:D>", joined.timestamp()));
    }
    lines.push(format!("**Earlier tickets:** {}", summary.prior_tickets));
    lines.push(String::new());

    if summary.is_clean() {
        lines.push("Check passed".to_string());
    } else {
        lines.extend(summary.flags.iter().map(|f| format!("- {}", f.describe())));
    }
    lines.join("\n")
}

pub fn summary_embed(summary: &TicketSummary) -> CreateEmbed {
    CreateEmbed::new()
        .title(format!("Whitelist request #{}", summary.ticket_number))
        .description(summary_description(summary))
        .colour(if summary.is_clean() {
            CHECK_PASSED
        } else {
            CHECK_FLAGGED
        })
        .footer(CreateEmbedFooter::new(format!("Member ID: {}", summary.requester_id)))
        .timestamp(Timestamp::now())
}

pub fn decision_embed(notice: &DecisionNotice) -> CreateEmbed {
    let (status, colour) = if notice.approved {
        ("Approved", APPROVED)
    } else {
        ("Denied", DENIED)
    };
    CreateEmbed::new()
        .title(format!("Whitelist request #{}", notice.ticket_number))
        .description(format!(
            "**Status:** {}\n**Nickname:** {}",
            status, notice.requester_name
        ))
        .colour(colour)
        .timestamp(Timestamp::now())
}

/// Message content replacing the controls after a transition.
pub fn transition_message(outcome: &TransitionOutcome) -> String {
    let n = outcome.ticket.ticket_number;
    let actor = &outcome.actor_name;
    match outcome.action {
        ControlAction::Approve => format!("Ticket #{} approved by {}", n, actor),
        ControlAction::Deny => format!("Ticket #{} denied by {}", n, actor),
        ControlAction::Close => format!("Ticket #{} closed by {}", n, actor),
        ControlAction::Reopen => format!("Ticket #{} reopened by {}", n, actor),
        ControlAction::Delete => format!("Ticket #{} deleted by {}", n, actor),
    }
}

pub fn removal_message(removal: &ScheduledRemoval) -> String {
    format!(
        "This channel will be deleted in {} seconds.",
        removal.delay.as_secs()
    )
}

/// Reply when the ticket was stored but its opening message never reached the channel.
pub fn unannounced_message(ticket_number: u64, channel: &str) -> String {
    format!(
        "Ticket #{} was created in {} but its controls could not be posted. Please contact staff.",
        ticket_number, channel
    )
}

/// Private reply for a failed activation.
pub fn failure_message(error: &LifecycleError) -> String {
    match error {
        LifecycleError::PermissionDenied { .. } => {
            "You do not have permission to do that.".to_string()
        }
        e if e.is_refusal() => "This control is no longer active.".to_string(),
        _ => "Something went wrong while handling this ticket.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use warnbot_core::ticket::{DispatchError, SummaryFlag, Ticket, TicketStatus};

    fn staff() -> StaffRoles {
        StaffRoles {
            admin: "11".to_string(),
            moderator: "22".to_string(),
            owner: "33".to_string(),
            perma_ban: None,
        }
    }

    fn summary(flags: Vec<SummaryFlag>) -> TicketSummary {
        TicketSummary {
            ticket_number: 12,
            nickname: "Steve".to_string(),
            requester_id: "42".to_string(),
            requester_name: "steve".to_string(),
            prior_tickets: 0,
            account_created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            account_age_days: 500,
            joined_at: None,
            has_perma_ban: false,
            flags,
        }
    }

    #[test]
    fn test_button_styles() {
        assert_eq!(button_style(ControlAction::Approve), ButtonStyle::Success);
        assert_eq!(button_style(ControlAction::Deny), ButtonStyle::Danger);
        assert_eq!(button_style(ControlAction::Reopen), ButtonStyle::Primary);
    }

    #[test]
    fn test_clean_summary_reports_check_passed() {
        let text = summary_description(&summary(vec![]));
        assert!(text.contains("**Nickname:** Steve"));
        assert!(text.contains("<@42>"));
        assert!(text.contains("<t:1704067200:D>"));
        assert!(text.ends_with("Check passed"));
    }

    #[test]
    fn test_flagged_summary_lists_flags() {
        let text = summary_description(&summary(vec![
            SummaryFlag::PermaBanned,
            SummaryFlag::NewAccount { age_days: 1 },
        ]));
        assert!(!text.contains("Check passed"));
        assert!(text.contains("- User holds the perma-ban role"));
        assert!(text.contains("- Account is only 1 days old"));
    }

    #[test]
    fn test_summary_embed_footer_carries_member_id() {
        let embed = serde_json::to_value(summary_embed(&summary(vec![]))).unwrap();
        assert_eq!(embed["footer"]["text"], "Member ID: 42");
        assert_eq!(embed["title"], "Whitelist request #12");
    }

    #[test]
    fn test_opening_pings_deciding_staff() {
        let content = opening_content("42", &staff());
        assert_eq!(content, "New whitelist request from <@42> for <@&11> <@&22>");
        assert!(!content.contains("<@&33>"));

        let mentions = serde_json::to_value(opening_mentions(UserId::new(42), &staff())).unwrap();
        let expected = serde_json::to_value(
            CreateAllowedMentions::new()
                .users([UserId::new(42)])
                .roles([RoleId::new(11), RoleId::new(22)]),
        )
        .unwrap();
        assert_eq!(mentions, expected);
    }

    #[test]
    fn test_unannounced_message_names_ticket() {
        let text = unannounced_message(7, "<#555>");
        assert!(text.starts_with("Ticket #7 was created in <#555>"));
        assert!(text.contains("could not be posted"));
    }

    #[test]
    fn test_transition_message() {
        let now = Utc::now();
        let outcome = TransitionOutcome {
            ticket: Ticket {
                ticket_number: 3,
                guild_id: "g".to_string(),
                user_id: "u".to_string(),
                channel_id: "c".to_string(),
                nickname: "Steve".to_string(),
                status: TicketStatus::Closed,
                created_at: now - Duration::hours(1),
                updated_at: now,
            },
            action: ControlAction::Close,
            actor_name: "owner".to_string(),
            controls: Some(ControlSet::Manage),
            removal: None,
        };
        assert_eq!(transition_message(&outcome), "Ticket #3 closed by owner");
    }

    #[test]
    fn test_failure_messages() {
        let denied = LifecycleError::PermissionDenied {
            action: ControlAction::Close,
            actor: "bob".to_string(),
        };
        assert_eq!(failure_message(&denied), "You do not have permission to do that.");

        let stale = LifecycleError::Dispatch(DispatchError::Inactive {
            action: ControlAction::Approve,
            ticket_number: 1,
        });
        assert_eq!(failure_message(&stale), "This control is no longer active.");
    }
}

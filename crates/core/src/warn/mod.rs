//! Warning counter driven by an external moderation bot.
//!
//! The moderation bot posts an embed for every warning it issues. Each
//! recognised notice increments a per-guild, per-user counter and may move
//! the member between warning tier roles.

mod counter;
mod escalation;
mod signal;
mod types;

pub use counter::{WarnError, WarningCounter, WarningOutcome};
pub use escalation::{Escalation, EscalationPolicy, EscalationReport};
pub use signal::NoticeParser;
pub use types::{NoticeField, WarnLedger, WarningNotice};

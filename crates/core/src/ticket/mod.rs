//! Whitelist ticket registry and lifecycle.

mod controls;
mod dispatcher;
mod lifecycle;
mod registry;
mod store;
mod summary;
mod types;

pub use controls::{ControlAction, ControlSet};
pub use dispatcher::{ControlBinding, ControlDispatcher, DispatchError, RehydrationReport};
pub use lifecycle::{
    LifecycleError, LifecycleSettings, OpenedTicket, ScheduledRemoval, StaffRoles,
    TicketLifecycle, TransitionOutcome,
};
pub use registry::TicketRegistry;
pub use store::{CreateTicketRequest, TicketError};
pub use summary::{Requester, SummaryFlag, TicketSummary};
pub use types::{Ticket, TicketDocument, TicketKey, TicketStatus};

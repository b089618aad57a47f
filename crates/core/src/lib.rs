pub mod config;
pub mod platform;
pub mod store;
pub mod testing;
pub mod ticket;
pub mod warn;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError,
};
pub use platform::{Actor, Platform, PlatformError};
pub use store::{JsonDocument, StoreError};
pub use ticket::{
    ControlAction, ControlDispatcher, ControlSet, LifecycleError, LifecycleSettings, Requester,
    Ticket, TicketError, TicketLifecycle, TicketRegistry, TicketStatus,
};
pub use warn::{EscalationPolicy, NoticeParser, WarnError, WarningCounter, WarningNotice};

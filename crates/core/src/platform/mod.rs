//! Boundary to the chat platform.
//!
//! Everything that talks to the platform API (roles, channels, permission
//! overwrites, messages) goes through [`Platform`]. Core logic never depends
//! on a concrete SDK.

mod error;
mod traits;
mod types;

pub use error::PlatformError;
pub use traits::Platform;
pub use types::{Actor, DecisionNotice, PermissionTarget, TicketChannelRequest};

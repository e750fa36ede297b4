//! # Session
//!
//! [`SessionRouter`] turns one [`bridge_core::ChatEvent`] into one [`bridge_core::Outbound`]:
//! slash commands, link summaries through the content readers, and plain chat through the
//! dispatcher.

mod command;
mod router;

pub use command::{
    Command, CLEARED, HELP_TEXT, IMAGE_USAGE, REGISTERED, REGISTER_USAGE, SYSTEM_UPDATED,
    SYSTEM_USAGE, UNSUPPORTED_EVENT,
};
pub use router::SessionRouter;

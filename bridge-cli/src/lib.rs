//! # bridge-cli
//!
//! Argument parsing and application wiring for the `bridge` binary. The stdin chat loop stands in
//! for a messaging webhook: each input line becomes one text event for the session router.

pub mod app;
pub mod cli;

pub use app::App;
pub use cli::{Cli, Commands};

//! CLI parser.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "bridge")]
#[command(about = "Chat bridge CLI: chat, register, users", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Chat as one user from stdin; every line is one text event (slash commands included).
    Chat {
        #[arg(short, long)]
        user: String,
    },
    /// Validate and store an API key for a user.
    Register {
        #[arg(short, long)]
        user: String,
        #[arg(short, long)]
        key: String,
    },
    /// List registered users with masked keys.
    Users,
}

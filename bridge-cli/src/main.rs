//! bridge CLI: chat with the assistant from a terminal, register keys, list users. Config from env.

use anyhow::Result;
use bridge_cli::{App, Cli, Commands};
use bridge_core::{init_tracing, BridgeConfig, ChatEvent, Outbound};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = BridgeConfig::load()?;
    init_tracing(&config.log_file)?;

    let app = App::build(&config).await?;
    match cli.command {
        Commands::Chat { user } => run_chat(&app, &user).await?,
        Commands::Register { user, key } => {
            let registry = app.router.dispatcher().registry();
            match registry.register(&user, &key).await {
                Ok(()) => println!("Registered {} ({})", user, openai_client::mask_token(&key)),
                Err(e) => {
                    warn!(user_id = %user, error = %e, "Registration failed");
                    anyhow::bail!("{}", e.user_message());
                }
            }
        }
        Commands::Users => {
            let users = app.masked_users().await?;
            if users.is_empty() {
                println!("No registered users.");
            }
            for (user_id, key) in users {
                println!("{}\t{}", user_id, key);
            }
        }
    }

    app.store.persist().await?;
    Ok(())
}

async fn run_chat(app: &App, user: &str) -> Result<()> {
    info!(user_id = %user, "Interactive chat started");
    println!("Chatting as {}. Type /help for commands, Ctrl-D to quit.", user);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match app.router.handle(ChatEvent::text(user, line)).await {
            Outbound::Text(text) => println!("{}\n", text),
            Outbound::Image(url) => println!("[image] {}\n", url),
        }
    }
    Ok(())
}

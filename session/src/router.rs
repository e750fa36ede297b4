use crate::command::{
    Command, CLEARED, HELP_TEXT, IMAGE_USAGE, REGISTERED, REGISTER_USAGE, SYSTEM_UPDATED,
    SYSTEM_USAGE, UNSUPPORTED_EVENT,
};
use bridge_core::{BridgeError, ChatEvent, EventKind, KeyedLocks, Outbound};
use dispatcher::Dispatcher;
use readers::{find_url, is_video_url, ContentReader};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Entry point for chat events.
///
/// Events of one user are handled one at a time in arrival order; different users proceed in
/// parallel. Every outcome, failures included, becomes exactly one [`Outbound`].
pub struct SessionRouter {
    dispatcher: Dispatcher,
    video_reader: Arc<dyn ContentReader>,
    web_reader: Arc<dyn ContentReader>,
    locks: KeyedLocks,
}

impl SessionRouter {
    pub fn new(
        dispatcher: Dispatcher,
        video_reader: Arc<dyn ContentReader>,
        web_reader: Arc<dyn ContentReader>,
    ) -> Self {
        Self {
            dispatcher,
            video_reader,
            web_reader,
            locks: KeyedLocks::new(),
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    #[instrument(skip(self, event), fields(user_id = %event.user_id, kind = ?event.kind))]
    pub async fn handle(&self, event: ChatEvent) -> Outbound {
        let _guard = self.locks.lock(&event.user_id).await;
        debug!("step: session lock acquired");

        match self.route(&event).await {
            Ok(outbound) => outbound,
            Err(e) => {
                warn!(
                    user_id = %event.user_id,
                    error = %e,
                    actionable = e.is_actionable(),
                    "Event failed"
                );
                Outbound::Text(e.user_message().to_string())
            }
        }
    }

    async fn route(&self, event: &ChatEvent) -> Result<Outbound, BridgeError> {
        if event.kind != EventKind::Text {
            return Ok(Outbound::Text(UNSUPPORTED_EVENT.to_string()));
        }
        let user_id = event.user_id.as_str();
        let text = event.text.trim();
        if text.is_empty() {
            return Ok(Outbound::Text(HELP_TEXT.to_string()));
        }

        if let Some(command) = Command::parse(text) {
            return self.run_command(user_id, command).await;
        }

        let reply = match find_url(text) {
            Some(url) => self.summarize_link(user_id, text, url).await?,
            None => self.dispatcher.reply(user_id, text).await?,
        };
        Ok(Outbound::Text(reply))
    }

    async fn run_command(&self, user_id: &str, command: Command) -> Result<Outbound, BridgeError> {
        info!(user_id = %user_id, command = command_name(&command), "step: command");
        let text = match command {
            Command::Register(key) if key.is_empty() => REGISTER_USAGE,
            Command::Register(key) => {
                self.dispatcher.registry().register(user_id, &key).await?;
                REGISTERED
            }
            Command::System(text) if text.is_empty() => SYSTEM_USAGE,
            Command::System(text) => {
                self.dispatcher
                    .memory()
                    .set_user_system_message(user_id, &text)
                    .await;
                SYSTEM_UPDATED
            }
            Command::Clear => {
                self.dispatcher.memory().reset(user_id).await;
                CLEARED
            }
            Command::Image(prompt) if prompt.is_empty() => IMAGE_USAGE,
            Command::Image(prompt) => {
                let url = self.dispatcher.generate_image(user_id, &prompt).await?;
                return Ok(Outbound::Image(url));
            }
            Command::Help => HELP_TEXT,
        };
        Ok(Outbound::Text(text.to_string()))
    }

    /// Reads the linked content and asks the model to summarize it.
    ///
    /// The credential is checked before any fetch. A failed read leaves memory untouched; the
    /// user only gets the error message.
    async fn summarize_link(
        &self,
        user_id: &str,
        text: &str,
        url: &str,
    ) -> Result<String, BridgeError> {
        self.dispatcher.registry().resolve(user_id).await?;
        let note = text.replacen(url, "", 1);
        let request = if is_video_url(url) {
            debug!(user_id = %user_id, url = %url, "step: reading video transcript");
            let transcript = self.video_reader.extract(url).await?;
            prompt::video_summary_request(url, &note, &transcript)
        } else {
            debug!(user_id = %user_id, url = %url, "step: reading web page");
            let page = self.web_reader.extract(url).await?;
            prompt::website_summary_request(url, &note, &page)
        };
        self.dispatcher.reply(user_id, &request).await
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Register(_) => "register",
        Command::System(_) => "system",
        Command::Clear => "clear",
        Command::Image(_) => "image",
        Command::Help => "help",
    }
}

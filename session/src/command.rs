//! Slash commands understood by the router.

/// A parsed command. Arguments are trimmed and may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Register(String),
    System(String),
    Clear,
    Image(String),
    Help,
}

impl Command {
    /// Parses `text` as a command. Anything that is not a known command yields `None` and is
    /// treated as chat text.
    pub fn parse(text: &str) -> Option<Command> {
        let text = text.trim();
        if !text.starts_with('/') {
            return None;
        }
        let (name, arg) = match text.find(char::is_whitespace) {
            Some(idx) => (&text[..idx], text[idx..].trim()),
            None => (text, ""),
        };
        let arg = arg.to_string();
        match name.to_lowercase().as_str() {
            "/register" | "/註冊" => Some(Command::Register(arg)),
            "/system" | "/系統訊息" => Some(Command::System(arg)),
            "/clear" | "/清除" => Some(Command::Clear),
            "/image" | "/圖像" => Some(Command::Image(arg)),
            "/help" | "/指令說明" => Some(Command::Help),
            _ => None,
        }
    }
}

pub const HELP_TEXT: &str = "Commands:\n\
/register <api key> (/註冊): register your OpenAI API key\n\
/system <text> (/系統訊息): set the assistant's system message and start over\n\
/clear (/清除): forget the conversation so far\n\
/image <prompt> (/圖像): generate an image\n\
/help (/指令說明): show this message\n\
\n\
Send a YouTube or web page link to get a summary; add a question next to the link to steer it.";

pub const REGISTER_USAGE: &str = "Usage: /register sk-xxxxx";
pub const REGISTERED: &str = "Your API key has been registered.";
pub const SYSTEM_USAGE: &str = "Usage: /system <text>";
pub const SYSTEM_UPDATED: &str = "System message updated. The conversation has been reset.";
pub const CLEARED: &str = "Conversation cleared.";
pub const IMAGE_USAGE: &str = "Usage: /image <prompt>";
pub const UNSUPPORTED_EVENT: &str = "Sorry, only text messages are supported.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_english_and_aliases() {
        assert_eq!(
            Command::parse("/register  sk-abc "),
            Some(Command::Register("sk-abc".into()))
        );
        assert_eq!(
            Command::parse("/註冊 sk-abc"),
            Some(Command::Register("sk-abc".into()))
        );
        assert_eq!(
            Command::parse("/系統訊息 你是一位老師"),
            Some(Command::System("你是一位老師".into()))
        );
        assert_eq!(Command::parse("/CLEAR"), Some(Command::Clear));
        assert_eq!(Command::parse("/清除"), Some(Command::Clear));
        assert_eq!(
            Command::parse("/圖像 a cat\nin space"),
            Some(Command::Image("a cat\nin space".into()))
        );
        assert_eq!(Command::parse(" /help"), Some(Command::Help));
        assert_eq!(Command::parse("/指令說明"), Some(Command::Help));
    }

    #[test]
    fn test_missing_argument_is_empty() {
        assert_eq!(Command::parse("/register"), Some(Command::Register(String::new())));
        assert_eq!(Command::parse("/image   "), Some(Command::Image(String::new())));
    }

    #[test]
    fn test_non_commands() {
        assert_eq!(Command::parse("hello"), None);
        assert_eq!(Command::parse("/unknown thing"), None);
        assert_eq!(Command::parse("a/register b"), None);
    }
}

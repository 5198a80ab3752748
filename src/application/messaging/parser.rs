//! Message parser - Turns raw chat lines into structured messages

use crate::domain::entities::Message;

/// Keep-alive request sent by the server
pub const KEEP_ALIVE: &str = "PING";

/// Default command trigger
pub const TRIGGER: char = '!';

/// If `line` is a keep-alive request, return the argument to echo back
pub fn keep_alive_token(line: &str) -> Option<&str> {
    let mut tokens = line.split_whitespace();
    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(KEEP_ALIVE), Some(token), None) => Some(token),
        _ => None,
    }
}

/// Parses incoming lines of the form `:nick!user@host VERB #target :text`
pub struct MessageParser {
    trigger: char,
}

impl MessageParser {
    pub fn new(trigger: char) -> Self {
        Self { trigger }
    }

    /// Parse one line.
    ///
    /// Returns `None` when the line has no content payload. A returned
    /// message only has a `command` if its text started with the trigger.
    pub fn parse(&self, line: &str) -> Option<Message> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() <= 3 {
            return None;
        }

        let prefix = tokens[0].split('!').next().unwrap_or_default();
        let sender = prefix.strip_prefix(':').unwrap_or(prefix);

        let text = tokens[3..].join(" ");
        let text = text.strip_prefix(':').unwrap_or(&text);

        let message = Message::new(sender, line);
        let Some(body) = text.strip_prefix(self.trigger) else {
            return Some(message);
        };

        let mut parts = body.split_whitespace();
        let command = match parts.next() {
            Some(name) if !body.starts_with(char::is_whitespace) => name.to_lowercase(),
            _ => return Some(message),
        };
        let argument = parts.collect::<Vec<_>>().join(" ");

        Some(message.with_command(command, argument))
    }
}

impl Default for MessageParser {
    fn default() -> Self {
        Self::new(TRIGGER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        let parser = MessageParser::default();
        let msg = parser.parse(":u!u@h PRIVMSG #chan :!cmd a b").unwrap();

        assert_eq!(msg.sender, "u");
        assert_eq!(msg.command.as_deref(), Some("cmd"));
        assert_eq!(msg.argument, "a b");
        assert_eq!(msg.raw, ":u!u@h PRIVMSG #chan :!cmd a b");
    }

    #[test]
    fn test_short_lines_are_not_messages() {
        let parser = MessageParser::default();
        for line in ["", "PING", ":tmi.twitch.tv 001 bot", ":u!u@h JOIN #chan"] {
            assert!(parser.parse(line).is_none(), "{line:?}");
        }
    }

    #[test]
    fn test_plain_chat_is_not_a_command() {
        let parser = MessageParser::default();
        let msg = parser.parse(":bob!bob@h PRIVMSG #chan :hello everyone").unwrap();
        assert_eq!(msg.sender, "bob");
        assert!(!msg.is_command());
    }

    #[test]
    fn test_command_lowercased_and_whitespace_collapsed() {
        let parser = MessageParser::default();
        let msg = parser.parse(":Alice!alice@h PRIVMSG #chan :!ECHO   hello    world ").unwrap();
        assert_eq!(msg.sender, "Alice");
        assert_eq!(msg.command.as_deref(), Some("echo"));
        assert_eq!(msg.argument, "hello world");
    }

    #[test]
    fn test_empty_argument() {
        let parser = MessageParser::default();
        let msg = parser.parse(":u!u@h PRIVMSG #chan :!test").unwrap();
        assert_eq!(msg.command.as_deref(), Some("test"));
        assert_eq!(msg.argument, "");
    }

    #[test]
    fn test_bare_trigger_is_not_a_command() {
        let parser = MessageParser::default();
        assert!(!parser.parse(":u!u@h PRIVMSG #chan :!").unwrap().is_command());
        assert!(!parser.parse(":u!u@h PRIVMSG #chan :! echo").unwrap().is_command());
    }

    #[test]
    fn test_sender_without_host() {
        let parser = MessageParser::default();
        let msg = parser.parse(":server NOTICE #chan :!cmd").unwrap();
        assert_eq!(msg.sender, "server");
        assert_eq!(msg.command.as_deref(), Some("cmd"));
    }

    #[test]
    fn test_custom_trigger() {
        let parser = MessageParser::new('?');
        let msg = parser.parse(":u!u@h PRIVMSG #chan :?help me").unwrap();
        assert_eq!(msg.command.as_deref(), Some("help"));
        assert!(!parser.parse(":u!u@h PRIVMSG #chan :!help").unwrap().is_command());
    }

    #[test]
    fn test_keep_alive_token() {
        assert_eq!(keep_alive_token("PING :tmi.twitch.tv"), Some(":tmi.twitch.tv"));
        assert_eq!(keep_alive_token("PING xyz"), Some("xyz"));
        assert_eq!(keep_alive_token("PING"), None);
        assert_eq!(keep_alive_token("PING a b"), None);
        assert_eq!(keep_alive_token(":u!u@h PRIVMSG #chan :PING x"), None);
    }
}

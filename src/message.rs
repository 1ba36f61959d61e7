//! Message and notice definitions
//!
//! Lines travel as plain UTF-8 text, one per `\n`. Everything here is a
//! line *without* its terminator; the session write pump appends it.

use chrono::{DateTime, Local};

use crate::types::ClientId;

/// Display name given to every client on connect
pub const DEFAULT_NAME: &str = "Anonymous";

/// One line read from a client, stamped on arrival
///
/// Produced once by a session read pump and consumed once by the lobby.
#[derive(Debug, Clone)]
pub struct Message {
    /// Arrival time
    pub timestamp: DateTime<Local>,
    /// Sending client
    pub sender: ClientId,
    /// Line content, terminator stripped
    pub text: String,
}

impl Message {
    pub fn new(timestamp: DateTime<Local>, sender: ClientId, text: String) -> Self {
        Self {
            timestamp,
            sender,
            text,
        }
    }

    /// Render as a chat line: `3:04PM - name: text`
    ///
    /// The name is resolved by the lobby at broadcast time, so a rename
    /// applies to every later line.
    pub fn chat_line(&self, sender_name: &str) -> String {
        format!(
            "{} - {}: {}",
            self.timestamp.format("%-I:%M%p"),
            sender_name,
            self.text
        )
    }
}

/// Fixed-format server notices
pub mod notice {
    pub const WELCOME: &str = "Welcome to the server! Type \"/help\" to get a list of commands.";
    pub const ROOM_DELETED: &str = "Notice: Chat room is inactive and being deleted.";

    pub fn room_join(name: &str) -> String {
        format!("Notice: \"{}\" joined the chat room.", name)
    }

    pub fn room_leave(name: &str) -> String {
        format!("Notice: \"{}\" left the chat room.", name)
    }

    pub fn room_rename(old: &str, new: &str) -> String {
        format!("Notice: \"{}\" changed their name to \"{}\".", old, new)
    }

    pub fn created(room: &str) -> String {
        format!("Notice: Created chat room \"{}\".", room)
    }

    pub fn renamed(name: &str) -> String {
        format!("Notice: Changed name to \"{}\".", name)
    }

    /// `/list` body, framed by blank lines
    pub fn room_list<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let mut lines = vec![String::new(), "Chat Rooms:".to_string()];
        lines.extend(names.into_iter().map(str::to_string));
        lines.push(String::new());
        lines
    }

    /// `/help` body, framed by blank lines
    pub fn help() -> Vec<String> {
        [
            "",
            "Commands:",
            "/help - lists all commands",
            "/list - lists all chatrooms",
            "/create foo - creates a chatroom named foo",
            "/join foo - joins a chatroom named foo",
            "/leave - leaves the current chatroom",
            "/name foo - changes your name to foo",
            "/quit - quits the program",
            "",
        ]
        .into_iter()
        .map(str::to_string)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_chat_line_format() {
        let ts = Local.with_ymd_and_hms(2024, 3, 1, 15, 4, 0).unwrap();
        let msg = Message::new(ts, ClientId::new(), "hi".to_string());
        assert_eq!(msg.chat_line("Anonymous"), "3:04PM - Anonymous: hi");
    }

    #[test]
    fn test_chat_line_morning() {
        let ts = Local.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let msg = Message::new(ts, ClientId::new(), "morning".to_string());
        assert_eq!(msg.chat_line("Bob"), "9:30AM - Bob: morning");
    }

    #[test]
    fn test_notice_text() {
        assert_eq!(
            notice::room_rename("Anonymous", "Bob"),
            "Notice: \"Anonymous\" changed their name to \"Bob\"."
        );
        assert_eq!(notice::created("general"), "Notice: Created chat room \"general\".");
    }

    #[test]
    fn test_room_list_framing() {
        let lines = notice::room_list(["a", "b"]);
        assert_eq!(lines, vec!["", "Chat Rooms:", "a", "b", ""]);
    }

    #[test]
    fn test_help_lists_every_command() {
        let body = notice::help().join("\n");
        for cmd in ["/help", "/list", "/create", "/join", "/leave", "/name", "/quit"] {
            assert!(body.contains(cmd), "missing {}", cmd);
        }
    }
}

//! Command parsing
//!
//! A line is a command when it starts with one of the known `/` commands
//! (case-sensitive), checked in a fixed order. Everything else, including
//! unknown `/words`, is chat content.

/// A parsed client line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Help,
    List,
    Create(&'a str),
    Join(&'a str),
    Leave,
    Name(&'a str),
    Quit,
    /// Plain chat content for the current room
    Chat(&'a str),
}

impl<'a> Command<'a> {
    /// Parse one line.
    ///
    /// The argument of `/create`, `/join` and `/name` is whatever follows
    /// the command word and one separating space, with surrounding
    /// whitespace removed; it may be empty.
    pub fn parse(line: &'a str) -> Self {
        if let Some(rest) = line.strip_prefix("/create") {
            Command::Create(argument(rest))
        } else if line.starts_with("/list") {
            Command::List
        } else if let Some(rest) = line.strip_prefix("/join") {
            Command::Join(argument(rest))
        } else if line.starts_with("/leave") {
            Command::Leave
        } else if let Some(rest) = line.strip_prefix("/name") {
            Command::Name(argument(rest))
        } else if line.starts_with("/help") {
            Command::Help
        } else if line.starts_with("/quit") {
            Command::Quit
        } else {
            Command::Chat(line)
        }
    }
}

fn argument(rest: &str) -> &str {
    rest.strip_prefix(' ').unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands_with_argument() {
        assert_eq!(Command::parse("/create general"), Command::Create("general"));
        assert_eq!(Command::parse("/join  lounge "), Command::Join("lounge"));
        assert_eq!(Command::parse("/name Bob Smith"), Command::Name("Bob Smith"));
    }

    #[test]
    fn test_parse_bare_commands() {
        assert_eq!(Command::parse("/help"), Command::Help);
        assert_eq!(Command::parse("/list"), Command::List);
        assert_eq!(Command::parse("/leave"), Command::Leave);
        assert_eq!(Command::parse("/quit"), Command::Quit);
        assert_eq!(Command::parse("/create"), Command::Create(""));
        assert_eq!(Command::parse("/name "), Command::Name(""));
    }

    #[test]
    fn test_parse_matches_on_prefix() {
        assert_eq!(Command::parse("/listing"), Command::List);
        assert_eq!(Command::parse("/help?"), Command::Help);
        assert_eq!(Command::parse("/quit!"), Command::Quit);
        assert_eq!(Command::parse("/leave now"), Command::Leave);
        assert_eq!(Command::parse("/joinlounge"), Command::Join("lounge"));
    }

    #[test]
    fn test_parse_chat_content() {
        assert_eq!(Command::parse("hi there"), Command::Chat("hi there"));
        assert_eq!(Command::parse("/shrug"), Command::Chat("/shrug"));
        assert_eq!(Command::parse("/HELP"), Command::Chat("/HELP"));
        assert_eq!(Command::parse(" /list"), Command::Chat(" /list"));
        assert_eq!(Command::parse(""), Command::Chat(""));
    }
}

use std::fmt;

pub mod input;

pub const USERNAME_PREFIX: &str = "[USERNAME]";
pub const EXIT_SENTINEL: &str = "[EXITING NOW]";
pub const WIN_MESSAGE: &str = "You won!";
pub const LOSS_MESSAGE: &str = "You lost!";
pub const REMAINING_TRIES_PREFIX: &str = "Remaining tries: ";

pub const DEFAULT_MAX_GUESSES: u32 = 10;
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 2000;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 2000;
pub const DEFAULT_MAX_LINE_LEN: usize = 1024;
pub const DEFAULT_SHUTDOWN_GRACE_MS: u64 = 5000;
pub const DEFAULT_PLAYER_NAME: &str = "anonymous";
pub const OBSCURED_CHAR: char = '_';

/// Lines the server sends to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerLine {
    Obscured(String),
    RemainingTries(i32),
    Won,
    Lost,
    Exiting,
}

impl ServerLine {
    /// Classifies a received line. Anything unrecognised is taken to be the
    /// obscured answer, which has no fixed shape.
    pub fn parse(line: &str) -> Self {
        match line {
            WIN_MESSAGE => ServerLine::Won,
            LOSS_MESSAGE => ServerLine::Lost,
            EXIT_SENTINEL => ServerLine::Exiting,
            _ => match line
                .strip_prefix(REMAINING_TRIES_PREFIX)
                .and_then(|n| n.parse::<i32>().ok())
            {
                Some(tries) => ServerLine::RemainingTries(tries),
                None => ServerLine::Obscured(line.to_string()),
            },
        }
    }
}

impl fmt::Display for ServerLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerLine::Obscured(word) => f.write_str(word),
            ServerLine::RemainingTries(tries) => write!(f, "{}{}", REMAINING_TRIES_PREFIX, tries),
            ServerLine::Won => f.write_str(WIN_MESSAGE),
            ServerLine::Lost => f.write_str(LOSS_MESSAGE),
            ServerLine::Exiting => f.write_str(EXIT_SENTINEL),
        }
    }
}

/// A guess line sent by a client once the username has been announced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientLine {
    Empty,
    Letter(char),
    Word(String),
}

impl ClientLine {
    /// Classifies by character count, not byte length.
    pub fn parse(line: &str) -> Self {
        let mut chars = line.chars();
        match (chars.next(), chars.next()) {
            (None, _) => ClientLine::Empty,
            (Some(c), None) => ClientLine::Letter(c),
            _ => ClientLine::Word(line.to_string()),
        }
    }
}

/// Builds the announcement a client sends as its first line.
pub fn username_line(name: &str) -> String {
    format!("{}{}", USERNAME_PREFIX, name)
}

/// Extracts the display name from a username announcement.
///
/// Returns `None` when the prefix is missing or the remaining name is blank
/// after leading whitespace is removed; the leaderboard file splits on the
/// first space, so a stored name can never start with one.
pub fn parse_username(line: &str) -> Option<&str> {
    let name = line.strip_prefix(USERNAME_PREFIX)?.trim_start();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

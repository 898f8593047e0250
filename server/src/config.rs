use shared::{
    DEFAULT_LOCK_TIMEOUT_MS, DEFAULT_MAX_GUESSES, DEFAULT_MAX_LINE_LEN, DEFAULT_SHUTDOWN_GRACE_MS,
};
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on, `host:port`.
    pub bind_addr: String,
    /// Word list, one candidate per line.
    pub words_path: PathBuf,
    /// Leaderboard file, one `<score> <name>` per line.
    pub leaderboard_path: PathBuf,
    /// Distinct wrong guesses allowed per game.
    pub max_guesses: u32,
    /// Number of entries the leaderboard keeps.
    pub leaderboard_capacity: usize,
    /// Bounded wait for the leaderboard lock.
    pub lock_timeout: Duration,
    /// Closes sessions that send nothing for this long.
    pub idle_timeout: Option<Duration>,
    /// Maximum concurrent sessions.
    pub max_sessions: usize,
    /// Longest inbound line in bytes; longer lines end the session.
    pub max_line_len: usize,
    /// How long shutdown waits for sessions before aborting them.
    pub shutdown_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5050".to_string(),
            words_path: PathBuf::from("words.txt"),
            leaderboard_path: PathBuf::from("toplist.txt"),
            max_guesses: DEFAULT_MAX_GUESSES,
            leaderboard_capacity: 10,
            lock_timeout: Duration::from_millis(DEFAULT_LOCK_TIMEOUT_MS),
            idle_timeout: None,
            max_sessions: 256,
            max_line_len: DEFAULT_MAX_LINE_LEN,
            shutdown_grace: Duration::from_millis(DEFAULT_SHUTDOWN_GRACE_MS),
        }
    }
}

//! Error types for the game server.
//!
//! Startup failures are fatal to the process. Leaderboard and session
//! failures stay local to the session that hit them.

use std::path::PathBuf;
use std::time::Duration;

/// Failures that prevent the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The word list could not be read.
    #[error("Failed to read word list {path}: {source}")]
    WordList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The word list contained no playable words.
    #[error("Word list {0} contains no playable words")]
    EmptyWordList(PathBuf),

    /// The listening socket could not be bound.
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failures while recording a win.
#[derive(Debug, thiserror::Error)]
pub enum LeaderboardError {
    /// Another session held the lock for longer than the timeout.
    #[error("Leaderboard lock not acquired within {0:?}")]
    LockTimeout(Duration),

    /// Reading or rewriting the leaderboard file failed.
    #[error("Leaderboard storage error: {0}")]
    Storage(#[from] std::io::Error),
}

/// Failures on a single client connection.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// The client sent a line longer than the configured limit.
    #[error("Inbound line exceeds {0} bytes")]
    LineTooLong(usize),

    /// Shutdown was requested while a write was pending.
    #[error("Interrupted by shutdown")]
    Interrupted,
}

//! File-backed top list shared by every session.
//!
//! The file is the source of truth. Each win reloads it, decides, and
//! rewrites it while holding a single async mutex, so the read-modify-write
//! cycle of one session never interleaves with another's. Acquisition is
//! bounded; a session that cannot get the lock in time skips its update.

use crate::error::LeaderboardError;
use crate::storage::{load_lines_or_empty, save_lines};
use log::{info, warn};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Mutex;

/// A single `<score> <name>` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: i32,
}

impl LeaderboardEntry {
    pub fn new(name: impl Into<String>, score: i32) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }

    /// Parses `"<score> <name>"`, splitting on the first space.
    pub fn parse(line: &str) -> Option<Self> {
        let (score, name) = line.split_once(' ')?;
        let score = score.parse::<i32>().ok()?;
        Some(Self::new(name, score))
    }
}

impl fmt::Display for LeaderboardEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.score, self.name)
    }
}

/// Parses leaderboard lines, skipping blank lines silently and reporting
/// malformed ones.
pub fn parse_entries(lines: &[String]) -> Vec<LeaderboardEntry> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(index, line)| {
            let entry = LeaderboardEntry::parse(line);
            if entry.is_none() {
                warn!("Skipping malformed leaderboard line {}: {:?}", index + 1, line);
            }
            entry
        })
        .collect()
}

/// Renders entries in persisted order: ascending by the formatted line
/// itself, so `"10 a"` sorts before `"2 b"`.
pub fn serialize_entries(entries: &[LeaderboardEntry]) -> Vec<String> {
    let mut lines: Vec<String> = entries.iter().map(ToString::to_string).collect();
    lines.sort();
    lines
}

/// Applies the top-N rule to an in-memory list and reports whether it changed.
///
/// Below capacity the candidate always goes in. At capacity it replaces the
/// first entry holding the minimum score, and only if it beats that score
/// strictly.
pub fn insert_ranked(
    entries: &mut Vec<LeaderboardEntry>,
    candidate: LeaderboardEntry,
    capacity: usize,
) -> bool {
    let worst = entries
        .iter()
        .enumerate()
        .min_by_key(|(_, entry)| entry.score)
        .map(|(index, entry)| (index, entry.score));

    if entries.len() < capacity {
        entries.push(candidate);
        return true;
    }

    match worst {
        Some((index, worst_score)) if candidate.score > worst_score => {
            entries.remove(index);
            entries.push(candidate);
            true
        }
        _ => false,
    }
}

/// Shared handle to the leaderboard file.
#[derive(Debug)]
pub struct Leaderboard {
    path: PathBuf,
    capacity: usize,
    lock_timeout: Duration,
    lock: Mutex<()>,
}

impl Leaderboard {
    pub fn new(path: impl Into<PathBuf>, capacity: usize, lock_timeout: Duration) -> Self {
        Self {
            path: path.into(),
            capacity,
            lock_timeout,
            lock: Mutex::new(()),
        }
    }

    /// Tries to place a winner on the list. Returns `Ok(true)` when the file
    /// was rewritten.
    ///
    /// A lock timeout abandons the attempt; it is never retried.
    pub async fn try_record_win(&self, name: &str, score: i32) -> Result<bool, LeaderboardError> {
        let _guard = tokio::time::timeout(self.lock_timeout, self.lock.lock())
            .await
            .map_err(|_| LeaderboardError::LockTimeout(self.lock_timeout))?;

        let mut entries = parse_entries(&load_lines_or_empty(&self.path).await?);
        let changed = insert_ranked(&mut entries, LeaderboardEntry::new(name, score), self.capacity);

        if changed {
            save_lines(&self.path, &serialize_entries(&entries)).await?;
            info!("The toplist changed: {} entered with {}", name, score);
        }

        Ok(changed)
    }

    /// Reads the current entries under the same lock writers use.
    pub async fn entries(&self) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let _guard = tokio::time::timeout(self.lock_timeout, self.lock.lock())
            .await
            .map_err(|_| LeaderboardError::LockTimeout(self.lock_timeout))?;

        Ok(parse_entries(&load_lines_or_empty(&self.path).await?))
    }
}

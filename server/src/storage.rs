//! Line-oriented file access shared by the word list and the leaderboard.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Reads every line of `path`, without line terminators.
pub async fn load_lines(path: &Path) -> io::Result<Vec<String>> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(content.lines().map(str::to_string).collect())
}

/// Like [`load_lines`], but a missing file reads as empty.
pub async fn load_lines_or_empty(path: &Path) -> io::Result<Vec<String>> {
    match load_lines(path).await {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        other => other,
    }
}

/// Replaces the content of `path` with `lines`, one per line.
///
/// The lines go to a sibling staging file that is then renamed over `path`,
/// so readers and crashes only ever see the old or the new content.
pub async fn save_lines(path: &Path, lines: &[String]) -> io::Result<()> {
    let mut content = String::new();
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }

    let staging = staging_path(path);
    let written = async {
        let mut file = tokio::fs::File::create(&staging).await?;
        file.write_all(content.as_bytes()).await?;
        file.sync_all().await?;
        tokio::fs::rename(&staging, path).await
    }
    .await;

    if written.is_err() {
        let _ = tokio::fs::remove_file(&staging).await;
    }
    written
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
pub(crate) fn temp_path(tag: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("hangman-{}-{}.txt", tag, rand::random::<u64>()))
}

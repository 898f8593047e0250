use crate::error::StartupError;
use crate::storage::load_lines;
use log::info;
use rand::seq::SliceRandom;
use std::path::Path;

/// Candidate secret words, fixed after loading.
#[derive(Debug, Clone)]
pub struct WordSource {
    words: Vec<String>,
}

impl WordSource {
    /// Loads one candidate per line, trimming surrounding whitespace and
    /// skipping blank lines. An empty result is a startup error.
    pub async fn load(path: &Path) -> Result<Self, StartupError> {
        let lines = load_lines(path)
            .await
            .map_err(|source| StartupError::WordList {
                path: path.to_path_buf(),
                source,
            })?;

        let source = Self::from_words(lines)
            .ok_or_else(|| StartupError::EmptyWordList(path.to_path_buf()))?;
        info!("Loaded {} words from {}", source.len(), path.display());
        Ok(source)
    }

    /// Builds a source from in-memory words. Returns `None` if no playable
    /// word remains after trimming.
    pub fn from_words<I, S>(words: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();

        if words.is_empty() {
            None
        } else {
            Some(Self { words })
        }
    }

    pub fn random_word(&self) -> &str {
        self.words
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

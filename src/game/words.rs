//! Dictionary for the word game.

use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::path::Path;

const BUILTIN_WORDS: &str = include_str!("../../data/words.txt");

/// Known words: candidates for the target and the set of accepted guesses.
#[derive(Debug, Clone)]
pub struct WordList {
    words: Vec<String>,
    lookup: HashSet<String>,
}

impl WordList {
    /// The list shipped with the binary.
    pub fn builtin() -> Self {
        Self::parse(BUILTIN_WORDS)
    }

    /// Load one word per line from `path`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let list = Self::parse(&text);
        if list.is_empty() {
            bail!("{} contains no usable words", path.display());
        }
        tracing::info!("Loaded {} words from {}", list.len(), path.display());
        Ok(list)
    }

    /// Parse one word per line. Words are lowercased; lines with anything
    /// but ASCII letters are skipped, as are duplicates.
    pub fn parse(text: &str) -> Self {
        let mut words = Vec::new();
        let mut lookup = HashSet::new();
        for line in text.lines() {
            let word = line.trim().to_ascii_lowercase();
            if word.is_empty() || !word.chars().all(|c| c.is_ascii_alphabetic()) {
                continue;
            }
            if lookup.insert(word.clone()) {
                words.push(word);
            }
        }
        Self { words, lookup }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.lookup.contains(word)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

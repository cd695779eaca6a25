//! # Term Dictionary
//!
//! Flagged-term patterns and their suggested replacements. The bundled list
//! is compiled into the binary; an external JSON file of the same shape is
//! merged over it at startup.
//!
//! Order is the insertion order of the merged dictionary: bundled entries in
//! file order, then new keys from the external file. An external entry with
//! an existing key replaces the suggestions but keeps the original position.

use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::Path;

/// Default dictionary shipped with the bot
const BUNDLED_WORD_LIST: &str = include_str!("../../../word_list.json");

/// One flagged-term pattern with its replacement suggestions
#[derive(Debug, Clone)]
pub struct TermEntry {
    pub pattern: String,
    pub suggestions: Vec<String>,
    regex: Regex,
}

impl TermEntry {
    pub fn new(pattern: &str, suggestions: Vec<String>) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| anyhow!("Invalid term pattern '{}': {}", pattern, e))?;
        if suggestions.is_empty() {
            return Err(anyhow!("Term '{}' has no suggestions", pattern));
        }
        Ok(Self {
            pattern: pattern.to_string(),
            suggestions,
            regex,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for TermEntry {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.suggestions == other.suggestions
    }
}

/// Immutable after load; shared read-only by the matcher
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermDictionary {
    entries: Vec<TermEntry>,
}

impl TermDictionary {
    /// Parse a JSON object of `pattern -> [suggestion, ...]`
    pub fn from_json(json: &str) -> Result<Self> {
        let object: Map<String, Value> =
            serde_json::from_str(json).context("word list must be a JSON object")?;

        let mut entries = Vec::with_capacity(object.len());
        for (pattern, value) in object {
            let suggestions = match value {
                Value::Array(items) => items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(s) => Ok(s),
                        other => Err(anyhow!(
                            "Suggestion for '{}' is not a string: {}",
                            pattern,
                            other
                        )),
                    })
                    .collect::<Result<Vec<_>>>()?,
                other => {
                    return Err(anyhow!(
                        "Suggestions for '{}' must be an array, got {}",
                        pattern,
                        other
                    ))
                }
            };
            entries.push(TermEntry::new(&pattern, suggestions)?);
        }

        Ok(Self { entries })
    }

    /// The dictionary compiled into the binary
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_WORD_LIST).context("bundled word list is invalid")
    }

    /// Read an external word list file
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read word list {path}"))?;
        Self::from_json(&contents).with_context(|| format!("invalid word list {path}"))
    }

    /// Bundled dictionary merged with the external file at `path`.
    ///
    /// A missing external file is tolerated; an unreadable or malformed one is not.
    pub fn load(path: &str) -> Result<Self> {
        let mut dictionary = Self::bundled()?;

        if Path::new(path).exists() {
            let external = Self::from_file(path)?;
            info!(
                "📄 Merging {} terms from {} over {} bundled terms",
                external.len(),
                path,
                dictionary.len()
            );
            dictionary.merge(external);
        } else {
            warn!("No word list found at {path} - using bundled terms only");
        }

        Ok(dictionary)
    }

    /// Merge `other` into `self`; same-keyed entries from `other` win
    pub fn merge(&mut self, other: TermDictionary) {
        let positions: HashMap<String, usize> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.pattern.clone(), i))
            .collect();

        for entry in other.entries {
            match positions.get(&entry.pattern) {
                Some(&i) => self.entries[i] = entry,
                None => self.entries.push(entry),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in scan order
    pub fn entries(&self) -> &[TermEntry] {
        &self.entries
    }

    pub fn suggestions_for(&self, pattern: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|e| e.pattern == pattern)
            .map(|e| e.suggestions.as_slice())
    }
}

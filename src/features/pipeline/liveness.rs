//! Recognizes "are you running?" style direct messages.

use regex::Regex;

/// Whole-word, case-insensitive match for any of the liveness tokens
const LIVENESS_PATTERN: &str = r"(?i)(?:^|\W)(?:alive|up|running|hello)(?:$|\W)";

#[derive(Debug, Clone)]
pub struct LivenessMatcher {
    pattern: Regex,
}

impl LivenessMatcher {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(LIVENESS_PATTERN)?,
        })
    }

    pub fn is_liveness_query(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

//! Single-pass message scan against the term dictionary.

use super::dictionary::TermDictionary;

/// A flagged term found in a message and the replacements to offer
#[derive(Debug, Clone, PartialEq)]
pub struct TermMatch {
    pub term: String,
    pub suggestions: Vec<String>,
}

/// Return the first entry, in dictionary order, whose pattern matches
/// anywhere in `text`. Matching is substring-based, not whole-word.
pub fn check_message(dictionary: &TermDictionary, text: &str) -> Option<TermMatch> {
    dictionary
        .entries()
        .iter()
        .find(|entry| entry.is_match(text))
        .map(|entry| TermMatch {
            term: entry.pattern.clone(),
            suggestions: entry.suggestions.clone(),
        })
}

//! # Feature: Flagged Terms
//!
//! Dictionary of flagged-term patterns and the matcher that scans messages
//! against it.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Deterministic scan order (insertion order of the merged dictionary)
//! - 1.1.0: External word list merged over the bundled one
//! - 1.0.0: Initial bundled word list

pub mod dictionary;
pub mod matcher;

pub use dictionary::{TermDictionary, TermEntry};
pub use matcher::{check_message, TermMatch};

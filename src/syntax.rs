//! Vocabularies used when taking a line apart.
//!
//! Operators, delimiters and newlines are fixed. Comment markers and
//! definition prefixes live in a [`Syntax`] value that callers own and pass
//! along, so every run (and every test) starts from a known set.

use tracing::debug;

/// Assignment operators, most specific first. When two operators start at
/// the same index the one listed first wins.
pub const ASSIGNMENTS: &[&str] = &["==", "=>", ":=", "=", "::", ":"];

pub const DEFINE_PREFIXES: &[&str] = &["#define"];

/// Lines that are not commented out rarely start with `*`, so it is treated
/// as a comment marker too.
pub const COMMENT_MARKERS: &[&str] = &["//", "/*", "#", "--", "\" ", "rem ", "*"];

pub const MULTILINE_COMMENT_START: &[&str] = &["/*", "(*"];
pub const MULTILINE_COMMENT_END: &[&str] = &["*/", "*)"];

/// Bracket pairs in the order they are checked for balance
pub const MATCHING_PAIRS: &[(char, char)] = &[('{', '}'), ('(', ')'), ('[', ']')];

pub const NEWLINES: &[&str] = &["\n", "\r", "\r\n"];

/// Comment markers and definition prefixes known to the current run.
///
/// Markers are only ever added, never removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syntax {
    comment_markers: Vec<String>,
    define_prefixes: Vec<String>,
}

impl Default for Syntax {
    fn default() -> Self {
        Self {
            comment_markers: COMMENT_MARKERS.iter().map(|m| m.to_string()).collect(),
            define_prefixes: DEFINE_PREFIXES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl Syntax {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn comment_markers(&self) -> &[String] {
        &self.comment_markers
    }

    pub fn define_prefixes(&self) -> &[String] {
        &self.define_prefixes
    }

    pub fn is_comment_marker(&self, marker: &str) -> bool {
        self.comment_markers.iter().any(|m| m == marker)
    }

    /// Add a comment marker. Returns false if it was already known.
    pub fn register_comment_marker(&mut self, marker: &str) -> bool {
        if marker.is_empty() || self.is_comment_marker(marker) {
            return false;
        }
        debug!(marker, "registering comment marker");
        self.comment_markers.push(marker.to_string());
        true
    }

    /// Add a definition prefix such as `%define`. Returns false if already known.
    pub fn register_define_prefix(&mut self, prefix: &str) -> bool {
        if prefix.is_empty() || self.define_prefixes.iter().any(|p| p == prefix) {
            return false;
        }
        self.define_prefixes.push(prefix.to_string());
        true
    }
}

//! Placeholder boilerplate detection.
//!
//! Best-effort keyword containment: a region whose text mentions any of the
//! configured phrases is treated as unfilled template text.

use crate::config::MergeConfig;
use regex::{Regex, RegexBuilder};
use unicode_normalization::UnicodeNormalization;

/// Decides whether a piece of text is placeholder boilerplate.
#[derive(Debug, Clone)]
pub struct PlaceholderClassifier {
    /// `None` when no keywords are configured; nothing is a placeholder then.
    matcher: Option<Regex>,

    /// Text this long (in characters) or longer is never a placeholder.
    max_len: Option<usize>,
}

impl PlaceholderClassifier {
    /// Build a classifier matching any of `keywords`, case-insensitively.
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Self {
        let alternatives: Vec<String> = keywords
            .iter()
            .map(|k| normalize(k.as_ref()))
            .filter(|k| !k.is_empty())
            .map(|k| regex::escape(&k))
            .collect();

        let matcher = if alternatives.is_empty() {
            None
        } else {
            // Escaped literals joined by `|` always form a valid pattern.
            RegexBuilder::new(&alternatives.join("|"))
                .case_insensitive(true)
                .build()
                .ok()
        };

        Self {
            matcher,
            max_len: None,
        }
    }

    /// Classifier for template regions in styled mode.
    pub fn styled(config: &MergeConfig) -> Self {
        Self::new(&config.placeholder_keywords)
    }

    /// Classifier for the source-deck cleanup in lightweight mode.
    pub fn lightweight(config: &MergeConfig) -> Self {
        Self::new(&config.lightweight_keywords).with_max_len(config.placeholder_max_len)
    }

    /// Only text shorter than `max_len` characters can be a placeholder.
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    /// Whether `text` looks like placeholder boilerplate.
    pub fn is_placeholder(&self, text: &str) -> bool {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return false;
        }

        if let Some(max_len) = self.max_len {
            if normalized.chars().count() >= max_len {
                return false;
            }
        }

        self.matcher
            .as_ref()
            .is_some_and(|m| m.is_match(&normalized))
    }
}

impl Default for PlaceholderClassifier {
    fn default() -> Self {
        Self::styled(&MergeConfig::default())
    }
}

/// Trim and fold compatibility forms (full-width letters, ligatures).
fn normalize(text: &str) -> String {
    text.trim().nfkc().collect()
}

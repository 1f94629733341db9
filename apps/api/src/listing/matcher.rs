//! Decides whether a keyword occurs in a piece of text.
//!
//! Short tokens (three characters or fewer) and a handful of short acronyms are matched as
//! whole words, so "ai" does not fire inside "said". Longer keywords are matched as plain
//! substrings so compound forms ("designers", "user interfaces") still count.

use regex::Regex;
use tracing::warn;

/// Acronyms that are always matched as whole words, independent of their length.
const WHOLE_WORD_ACRONYMS: [&str; 6] = ["hr", "bi", "ai", "seo", "sem", "crm"];

const WHOLE_WORD_MAX_CHARS: usize = 3;

/// Replaces `_` and `-` with spaces and lowercases.
pub fn normalize(text: &str) -> String {
    text.replace(['_', '-'], " ").to_lowercase()
}

/// A keyword compiled once and tested against many texts.
#[derive(Debug, Clone)]
pub enum KeywordMatcher {
    WholeWord(Regex),
    Substring(String),
    /// Blank keywords never match.
    Blank,
}

impl KeywordMatcher {
    pub fn new(keyword: &str) -> Self {
        // Only the text is separator-normalized; the keyword keeps its hyphens and underscores.
        let keyword = keyword.trim().to_lowercase();
        if keyword.is_empty() {
            return KeywordMatcher::Blank;
        }

        if !needs_word_boundary(&keyword) {
            return KeywordMatcher::Substring(keyword);
        }

        let pattern = format!(r"\b{}\b", regex::escape(&keyword));
        match Regex::new(&pattern) {
            Ok(re) => KeywordMatcher::WholeWord(re),
            Err(e) => {
                warn!("Falling back to substring match for keyword '{keyword}': {e}");
                KeywordMatcher::Substring(keyword)
            }
        }
    }

    /// Tests text that has already been through [`normalize`].
    pub fn is_match_normalized(&self, normalized: &str) -> bool {
        match self {
            KeywordMatcher::WholeWord(re) => re.is_match(normalized),
            KeywordMatcher::Substring(keyword) => normalized.contains(keyword.as_str()),
            KeywordMatcher::Blank => false,
        }
    }

    #[cfg(test)]
    pub fn is_match(&self, text: &str) -> bool {
        self.is_match_normalized(&normalize(text))
    }
}

fn needs_word_boundary(keyword: &str) -> bool {
    keyword.chars().count() <= WHOLE_WORD_MAX_CHARS || WHOLE_WORD_ACRONYMS.contains(&keyword)
}

/// One-shot form of [`KeywordMatcher`]. Prefer compiling a matcher when testing the same
/// keyword against many texts.
#[cfg(test)]
pub fn matches(text: &str, keyword: &str) -> bool {
    KeywordMatcher::new(keyword).is_match(text)
}

/// True when any of `matchers` fires on `text`.
pub fn any_match(matchers: &[KeywordMatcher], text: &str) -> bool {
    if matchers.is_empty() {
        return false;
    }
    let normalized = normalize(text);
    matchers.iter().any(|m| m.is_match_normalized(&normalized))
}

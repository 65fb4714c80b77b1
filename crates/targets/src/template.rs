//! URL templating with `{word}` and `{time}` placeholders

use contracts::Target;

use crate::error::{Result, TargetError};

/// Placeholder replaced by the form-encoded word
pub const WORD_PLACEHOLDER: &str = "{word}";

/// Placeholder replaced verbatim by the resolved time string
pub const TIME_PLACEHOLDER: &str = "{time}";

/// A URL template such as `http://host/page?id={word}&ts={time}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    raw: String,
}

impl UrlTemplate {
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(TargetError::EmptyTemplate);
        }
        Ok(Self { raw })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Without `{word}` every generated target is identical
    pub fn has_word_placeholder(&self) -> bool {
        self.raw.contains(WORD_PLACEHOLDER)
    }

    /// Substitute one word and the time string
    pub fn render(&self, word: &str, time: &str) -> Target {
        let encoded = encode_word(word);
        self.raw
            .replace(WORD_PLACEHOLDER, &encoded)
            .replace(TIME_PLACEHOLDER, time)
            .into()
    }

    /// Render every word, preserving wordlist order
    pub fn generate<S: AsRef<str>>(&self, words: &[S], time: &str) -> Vec<Target> {
        words
            .iter()
            .map(|word| self.render(word.as_ref(), time))
            .collect()
    }
}

/// Form-style encoding: unreserved characters kept, spaces become `+`,
/// everything else percent-encoded as UTF-8.
pub fn encode_word(word: &str) -> String {
    urlencoding::encode(word).replace("%20", "+")
}

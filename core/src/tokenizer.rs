use crate::error::Result;
use lazy_static::lazy_static;
use regex::Regex;
use std::borrow::Cow;
use unicode_normalization::{is_nfkc_quick, IsNormalized, UnicodeNormalization};

/// Pattern for runs of letters, optionally followed by digits, underscores and apostrophes.
pub const WORD_PATTERN: &str = r"(?u)\p{L}[\p{L}\p{N}_']*";

lazy_static! {
    static ref WORD_RE: Regex = Regex::new(WORD_PATTERN).expect("valid regex");
}

/// Splits text into index tokens.
///
/// Implementations must be deterministic: the same text always yields the
/// same token sequence, since postings and queries are matched verbatim.
/// Callers lower-case text before tokenizing.
pub trait Tokenizer: Send + Sync {
    /// The text form tokens are cut from. Every token returned by
    /// [`tokenize`](Self::tokenize) occurs verbatim in `normalize(text)`, and
    /// term frequency is recounted against this form.
    fn normalize<'a>(&self, text: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(text)
    }

    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// NFKC-normalizing regex tokenizer.
pub struct WordTokenizer {
    re: Regex,
}

impl WordTokenizer {
    pub fn new() -> Self {
        Self { re: WORD_RE.clone() }
    }

    /// Build a tokenizer from a custom pattern; every non-empty match becomes a token.
    pub fn with_pattern(pattern: &str) -> Result<Self> {
        Ok(Self { re: Regex::new(pattern)? })
    }
}

impl Default for WordTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for WordTokenizer {
    fn normalize<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match is_nfkc_quick(text.chars()) {
            IsNormalized::Yes => Cow::Borrowed(text),
            _ => Cow::Owned(text.nfkc().collect()),
        }
    }

    fn tokenize(&self, text: &str) -> Vec<String> {
        let normalized = self.normalize(text);
        self.re
            .find_iter(&normalized)
            .map(|m| m.as_str())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Splits on Unicode whitespace and keeps punctuation attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }
}

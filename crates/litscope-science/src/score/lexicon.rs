use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}]+").expect("valid token regex"));

/// Lowercase alphanumeric tokens, in order.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Adjacent token pairs joined by a single space.
pub fn bigrams(tokens: &[String]) -> Vec<String> {
    tokens
        .windows(2)
        .map(|pair| format!("{} {}", pair[0], pair[1]))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phrase {
    /// The keyword as supplied, trimmed.
    pub text: String,
    pub tokens: HashSet<String>,
    pub bigrams: HashSet<String>,
}

impl Phrase {
    fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            bigrams: bigrams(&tokens).into_iter().collect(),
            tokens: tokens.into_iter().collect(),
        })
    }
}

/// Unigrams and bigrams drawn from a keyword list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lexicon {
    pub phrases: Vec<Phrase>,
    pub unigrams: HashSet<String>,
    pub bigrams: HashSet<String>,
}

impl Lexicon {
    /// Phrases without any alphanumeric token are dropped.
    pub fn build<S: AsRef<str>>(keywords: &[S]) -> Self {
        let mut lexicon = Self::default();
        for keyword in keywords {
            let Some(phrase) = Phrase::parse(keyword.as_ref()) else {
                continue;
            };
            lexicon.unigrams.extend(phrase.tokens.iter().cloned());
            lexicon.bigrams.extend(phrase.bigrams.iter().cloned());
            lexicon.phrases.push(phrase);
        }
        lexicon
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

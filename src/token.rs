//! Tokens produced by the upstream tokenizer.

use crate::Span;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute key under which the upstream tagger stores part-of-speech tags.
pub const PART_OF_SPEECH: &str = "pos";

/// Attribute key under which the upstream pipeline stores lemmas.
pub const LEMMA: &str = "lemma";

/// An immutable token with externally computed attributes.
///
/// Attributes (part-of-speech, lemma, chunk type, ...) are produced upstream
/// and consumed here as opaque strings looked up by key. A missing key is not
/// an error; extractors simply emit no feature for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Position of the token in the document text.
    pub span: Span,
    /// Surface text of the token.
    pub text: String,
    attributes: BTreeMap<String, String>,
}

impl Token {
    /// Create a new token.
    #[must_use]
    pub fn new(span: Span, text: impl Into<String>) -> Self {
        Self {
            span,
            text: text.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Attach an attribute, builder style.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Look up an attribute by key.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

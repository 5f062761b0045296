//! Feature extractors: per-token, windowed context, neighbor tags, and
//! previous outcomes.
//!
//! Base extractors turn one token into features; `ContextExtractor` applies
//! a base extractor across a window of neighboring tokens with
//! position-qualified names. `NeighborTagFeatures` and
//! `PreviousOutcomeFeatures` read parallel tag sequences rather than tokens.
//!
//! No extractor fails under normal input: a missing attribute key or a
//! clipped window edge simply yields fewer features.

use crate::{Feature, Span, Tag, Token};
use std::collections::HashMap;

/// Turns one token into zero or more features.
pub trait FeatureExtractor: Send + Sync {
    /// Base name used to qualify context features produced by this extractor.
    fn name(&self) -> &str;

    /// Extract features from a token.
    fn extract(&self, token: &Token) -> Vec<Feature>;
}

/// The literal token text.
#[derive(Debug, Default, Clone)]
pub struct CoveredText;

impl FeatureExtractor for CoveredText {
    fn name(&self) -> &str {
        "word"
    }

    fn extract(&self, token: &Token) -> Vec<Feature> {
        vec![Feature::nominal(self.name(), &token.text)]
    }
}

/// One nominal feature from an attribute map lookup.
///
/// A missing key emits no feature.
#[derive(Debug, Clone)]
pub struct TokenAttribute {
    key: String,
}

impl TokenAttribute {
    /// Extract the attribute stored under `key`.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl FeatureExtractor for TokenAttribute {
    fn name(&self) -> &str {
        &self.key
    }

    fn extract(&self, token: &Token) -> Vec<Feature> {
        token
            .attribute(&self.key)
            .map(|value| Feature::nominal(self.name(), value))
            .into_iter()
            .collect()
    }
}

/// Character-category pattern of the token text, one category character per
/// input character: uppercase → `A`, lowercase → `a`, digit → `9`, anything
/// else kept as-is.
#[derive(Debug, Default, Clone)]
pub struct CharShape;

impl FeatureExtractor for CharShape {
    fn name(&self) -> &str {
        "shape"
    }

    fn extract(&self, token: &Token) -> Vec<Feature> {
        let shape: String = token
            .text
            .chars()
            .map(|c| {
                if c.is_uppercase() {
                    'A'
                } else if c.is_lowercase() {
                    'a'
                } else if c.is_ascii_digit() {
                    '9'
                } else {
                    c
                }
            })
            .collect();
        vec![Feature::nominal(self.name(), shape)]
    }
}

/// Concatenation of several base extractors.
pub struct Combined {
    extractors: Vec<Box<dyn FeatureExtractor>>,
}

impl Combined {
    /// Combine the given extractors.
    #[must_use]
    pub fn new(extractors: Vec<Box<dyn FeatureExtractor>>) -> Self {
        Self { extractors }
    }
}

impl FeatureExtractor for Combined {
    fn name(&self) -> &str {
        "combined"
    }

    fn extract(&self, token: &Token) -> Vec<Feature> {
        self.extractors
            .iter()
            .flat_map(|e| e.extract(token))
            .collect()
    }
}

/// One numeric feature from a word → value table.
///
/// Unknown words receive the table mean, so the feature is always present.
#[derive(Debug, Clone)]
pub struct LexiconValue {
    name: String,
    table: HashMap<String, f64>,
    default: f64,
}

impl LexiconValue {
    /// Build from a lookup table; the default for unknown words is the mean
    /// of the table values (0.0 for an empty table).
    #[must_use]
    pub fn new(name: impl Into<String>, table: HashMap<String, f64>) -> Self {
        let default = if table.is_empty() {
            0.0
        } else {
            table.values().sum::<f64>() / table.len() as f64
        };
        Self {
            name: name.into(),
            table,
            default,
        }
    }
}

impl FeatureExtractor for LexiconValue {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self, token: &Token) -> Vec<Feature> {
        let value = self.table.get(&token.text).copied().unwrap_or(self.default);
        vec![Feature::numeric(self.name(), value)]
    }
}

/// One numeric feature per dimension from a word → vector table.
///
/// Unknown words receive the dimension-wise mean vector.
#[derive(Debug, Clone)]
pub struct LexiconVector {
    name: String,
    table: HashMap<String, Vec<f64>>,
    default: Vec<f64>,
}

impl LexiconVector {
    /// Build from a lookup table; all vectors must share one dimension.
    #[must_use]
    pub fn new(name: impl Into<String>, table: HashMap<String, Vec<f64>>) -> Self {
        let default = match table.values().next() {
            None => Vec::new(),
            Some(first) => {
                let dim = first.len();
                let mut sums = vec![0.0; dim];
                for vector in table.values() {
                    for (sum, v) in sums.iter_mut().zip(vector) {
                        *sum += v;
                    }
                }
                let n = table.len() as f64;
                sums.iter().map(|s| s / n).collect()
            }
        };
        Self {
            name: name.into(),
            table,
            default,
        }
    }
}

impl FeatureExtractor for LexiconVector {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self, token: &Token) -> Vec<Feature> {
        let vector = self.table.get(&token.text).unwrap_or(&self.default);
        vector
            .iter()
            .enumerate()
            .map(|(i, v)| Feature::numeric(format!("{}_{}", self.name, i), *v))
            .collect()
    }
}

/// Applies a base extractor to the tokens around a focus position, with
/// position-qualified feature names.
///
/// Windows are clipped at their boundaries: a focus near the window edge
/// emits fewer context features, never an error.
pub struct ContextExtractor {
    base: Box<dyn FeatureExtractor>,
    preceding: usize,
    following: usize,
    covered: bool,
}

impl ContextExtractor {
    /// Extract `preceding` tokens before and `following` tokens after the
    /// focus with the given base extractor.
    #[must_use]
    pub fn new(base: Box<dyn FeatureExtractor>, preceding: usize, following: usize) -> Self {
        Self {
            base,
            preceding,
            following,
            covered: false,
        }
    }

    /// Also extract the tokens covered by the focus span (only meaningful
    /// for [`extract_around`](Self::extract_around)).
    #[must_use]
    pub fn with_covered(mut self) -> Self {
        self.covered = true;
        self
    }

    /// Context features around the token at `focus` within `window`.
    ///
    /// Features from the token at relative offset `d` are name-qualified
    /// with `d` (`word@-3` ... `word@+3`); the focus token itself is not
    /// extracted.
    #[must_use]
    pub fn extract_within(&self, window: &[Token], focus: usize) -> Vec<Feature> {
        let mut features = Vec::new();
        let lo = focus.saturating_sub(self.preceding);
        for i in lo..focus {
            let offset = i as isize - focus as isize;
            features.extend(
                self.base
                    .extract(&window[i])
                    .into_iter()
                    .map(|f| f.at_offset(offset)),
            );
        }
        let hi = window.len().min(focus + 1 + self.following);
        for i in (focus + 1)..hi {
            let offset = i as isize - focus as isize;
            features.extend(
                self.base
                    .extract(&window[i])
                    .into_iter()
                    .map(|f| f.at_offset(offset)),
            );
        }
        features
    }

    /// Context features around a focus span (e.g. a multi-token mention).
    ///
    /// Preceding and following tokens are qualified by their signed offset
    /// from the focus region; covered tokens (when enabled) are qualified
    /// `c0`, `c1`, ... by position within the region.
    #[must_use]
    pub fn extract_around(&self, window: &[Token], focus: Span) -> Vec<Feature> {
        let lo = window.partition_point(|t| t.span.end <= focus.begin);
        let hi = window.partition_point(|t| t.span.begin < focus.end);

        let mut features = Vec::new();
        for i in lo.saturating_sub(self.preceding)..lo {
            let offset = i as isize - lo as isize;
            features.extend(
                self.base
                    .extract(&window[i])
                    .into_iter()
                    .map(|f| f.at_offset(offset)),
            );
        }
        if self.covered {
            for i in lo..hi {
                features.extend(
                    self.base
                        .extract(&window[i])
                        .into_iter()
                        .map(|f| f.at_position(format!("c{}", i - lo))),
                );
            }
        }
        for i in hi..window.len().min(hi + self.following) {
            let offset = i as isize - hi as isize + 1;
            features.extend(
                self.base
                    .extract(&window[i])
                    .into_iter()
                    .map(|f| f.at_offset(offset)),
            );
        }
        features
    }
}

/// Emits a parallel tag sequence around the focus token, one feature per
/// position in `[max(0, i - window), min(n, i + window))`.
///
/// This is how entity-tag context is fed into event classification: the
/// entity layer is encoded as BIO tags once per sentence, then sampled
/// around each focus token.
#[derive(Debug, Clone)]
pub struct NeighborTagFeatures {
    name: String,
    window: usize,
}

impl NeighborTagFeatures {
    /// Sample `window` positions either side of the focus.
    #[must_use]
    pub fn new(name: impl Into<String>, window: usize) -> Self {
        Self {
            name: name.into(),
            window,
        }
    }

    /// Features for the focus token at `focus`, named by offset from the
    /// sampled window's start.
    #[must_use]
    pub fn extract(&self, tags: &[Tag], focus: usize) -> Vec<Feature> {
        let begin = focus.saturating_sub(self.window);
        let end = tags.len().min(focus + self.window);
        (begin..end)
            .map(|i| Feature::nominal(format!("{}_{}", self.name, i - begin), tags[i].to_string()))
            .collect()
    }
}

/// Emits the labels assigned to the previous tokens, one feature per
/// lookback step.
///
/// Positions before the start of the window receive the sentinel `O`.
/// During training the values come from gold tags; during inference from
/// the driver's running prediction buffer, which is what makes the tagger
/// sequential rather than independent per token.
#[derive(Debug, Clone)]
pub struct PreviousOutcomeFeatures {
    name: String,
    n_previous: usize,
}

impl PreviousOutcomeFeatures {
    /// Look back `n_previous` steps.
    #[must_use]
    pub fn new(name: impl Into<String>, n_previous: usize) -> Self {
        Self {
            name: name.into(),
            n_previous,
        }
    }

    /// Features for the token at `focus`, reading only positions `< focus`
    /// of `outcomes`.
    #[must_use]
    pub fn extract(&self, outcomes: &[Tag], focus: usize) -> Vec<Feature> {
        (1..=self.n_previous)
            .rev()
            .map(|step| {
                let value = if focus >= step {
                    outcomes[focus - step].to_string()
                } else {
                    Tag::Outside.to_string()
                };
                Feature::nominal(format!("{}_{}", self.name, step), value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PART_OF_SPEECH;

    fn window() -> Vec<Token> {
        ["the", "chest", "pain", "has", "resolved"]
            .iter()
            .enumerate()
            .map(|(i, text)| {
                Token::new(Span::new(6 * i, 6 * i + text.len()), *text)
                    .with_attribute(PART_OF_SPEECH, "X")
            })
            .collect()
    }

    #[test]
    fn covered_text_and_shape() {
        let token = Token::new(Span::new(0, 5), "mi-2B");
        assert_eq!(
            CoveredText.extract(&token),
            vec![Feature::nominal("word", "mi-2B")]
        );
        assert_eq!(
            CharShape.extract(&token),
            vec![Feature::nominal("shape", "aa-9A")]
        );
    }

    #[test]
    fn missing_attribute_emits_nothing() {
        let token = Token::new(Span::new(0, 1), "x");
        assert!(TokenAttribute::new(PART_OF_SPEECH).extract(&token).is_empty());
    }

    #[test]
    fn combined_concatenates() {
        let extractor = Combined::new(vec![Box::new(CoveredText), Box::new(CharShape)]);
        let features = extractor.extract(&Token::new(Span::new(0, 3), "Big"));
        let names: Vec<&str> = features.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["word", "shape"]);
    }

    #[test]
    fn context_window_is_clipped_at_start() {
        let extractor = ContextExtractor::new(Box::new(CoveredText), 3, 0);
        // Focus index 0 with 3 preceding requested emits nothing at all.
        assert!(extractor.extract_within(&window(), 0).is_empty());
    }

    #[test]
    fn context_offsets_qualify_names() {
        let extractor = ContextExtractor::new(Box::new(CoveredText), 1, 2);
        let features = extractor.extract_within(&window(), 2);
        let names: Vec<&str> = features.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["word@-1", "word@+1", "word@+2"]);
        assert_eq!(features[0].value, crate::FeatureValue::Nominal("chest".into()));
    }

    #[test]
    fn context_around_span_with_covered() {
        let extractor = ContextExtractor::new(Box::new(CoveredText), 1, 1).with_covered();
        // Focus on "chest pain" (tokens 1..3).
        let focus = Span::new(6, 16);
        let features = extractor.extract_around(&window(), focus);
        let names: Vec<&str> = features.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["word@-1", "word@c0", "word@c1", "word@+1"]);
    }

    #[test]
    fn context_around_clips_both_edges() {
        let extractor = ContextExtractor::new(Box::new(CoveredText), 3, 3).with_covered();
        let tokens = window();
        let whole = Span::new(0, tokens.last().unwrap().span.end);
        let features = extractor.extract_around(&tokens, whole);
        // Everything is covered; nothing precedes or follows.
        assert!(features.iter().all(|f| f.name.contains("@c")));
        assert_eq!(features.len(), 5);
    }

    #[test]
    fn neighbor_tags_window_arithmetic() {
        let tags = vec![
            Tag::Outside,
            Tag::Begin("DRUG".into()),
            Tag::Inside("DRUG".into()),
            Tag::Outside,
            Tag::Outside,
        ];
        let extractor = NeighborTagFeatures::new("entity", 2);
        let features = extractor.extract(&tags, 1);
        let rendered: Vec<String> = features.iter().map(|f| f.to_string()).collect();
        // Window [0, 3): named by offset from the window start.
        assert_eq!(rendered, vec!["entity_0=O", "entity_1=B-DRUG", "entity_2=I-DRUG"]);
    }

    #[test]
    fn previous_outcomes_use_sentinel_before_start() {
        let outcomes = vec![Tag::Begin("EVENT".into()), Tag::Inside("EVENT".into())];
        let extractor = PreviousOutcomeFeatures::new("previous", 2);

        let at_zero = extractor.extract(&outcomes, 0);
        let rendered: Vec<String> = at_zero.iter().map(|f| f.to_string()).collect();
        assert_eq!(rendered, vec!["previous_2=O", "previous_1=O"]);

        let at_two = extractor.extract(&outcomes, 2);
        let rendered: Vec<String> = at_two.iter().map(|f| f.to_string()).collect();
        assert_eq!(rendered, vec!["previous_2=B-EVENT", "previous_1=I-EVENT"]);
    }

    #[test]
    fn lexicon_value_defaults_to_mean() {
        let table: HashMap<String, f64> =
            [("pain".to_string(), 2.0), ("cough".to_string(), 4.0)].into();
        let extractor = LexiconValue::new("severity", table);
        let known = extractor.extract(&Token::new(Span::new(0, 4), "pain"));
        assert_eq!(known, vec![Feature::numeric("severity", 2.0)]);
        let unknown = extractor.extract(&Token::new(Span::new(0, 4), "rash"));
        assert_eq!(unknown, vec![Feature::numeric("severity", 3.0)]);
    }

    #[test]
    fn lexicon_vector_defaults_to_mean_vector() {
        let table: HashMap<String, Vec<f64>> = [
            ("pain".to_string(), vec![1.0, 0.0]),
            ("cough".to_string(), vec![3.0, 2.0]),
        ]
        .into();
        let extractor = LexiconVector::new("embed", table);
        let unknown = extractor.extract(&Token::new(Span::new(0, 4), "rash"));
        assert_eq!(
            unknown,
            vec![Feature::numeric("embed_0", 2.0), Feature::numeric("embed_1", 1.0)]
        );
    }
}

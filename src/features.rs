//! Features and training instances handed to the classifier contract.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A feature value: nominal (string) or numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeatureValue {
    /// A categorical value.
    Nominal(String),
    /// A real-valued value, e.g. from a lexicon lookup.
    Numeric(f64),
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Nominal(s) => write!(f, "{}", s),
            FeatureValue::Numeric(n) => write!(f, "{}", n),
        }
    }
}

/// A named feature.
///
/// Context features carry position-qualified names (`word@-3`, `word@+2`,
/// `word@c1`) so that the same base extractor applied at different positions
/// never collides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Feature name, unique within one extraction position.
    pub name: String,
    /// Feature value.
    pub value: FeatureValue,
}

impl Feature {
    /// Create a nominal feature.
    #[must_use]
    pub fn nominal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FeatureValue::Nominal(value.into()),
        }
    }

    /// Create a numeric feature.
    #[must_use]
    pub fn numeric(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value: FeatureValue::Numeric(value),
        }
    }

    /// Qualify the feature name with a signed relative offset.
    #[must_use]
    pub fn at_offset(mut self, offset: isize) -> Self {
        self.name = format!("{}@{:+}", self.name, offset);
        self
    }

    /// Qualify the feature name with an arbitrary position marker.
    #[must_use]
    pub fn at_position(mut self, position: impl fmt::Display) -> Self {
        self.name = format!("{}@{}", self.name, position);
        self
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// A single training example: an outcome label plus its features.
///
/// Instances exist only during one training pass; they are handed to the
/// training sink and discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    /// The outcome label the classifier should learn for these features.
    pub label: String,
    /// The extracted features.
    pub features: Vec<Feature>,
}

impl Instance {
    /// Create a new instance.
    #[must_use]
    pub fn new(label: impl Into<String>, features: Vec<Feature>) -> Self {
        Self {
            label: label.into(),
            features,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_qualification_is_signed() {
        assert_eq!(Feature::nominal("word", "x").at_offset(-3).name, "word@-3");
        assert_eq!(Feature::nominal("word", "x").at_offset(2).name, "word@+2");
    }

    #[test]
    fn position_qualification() {
        assert_eq!(
            Feature::nominal("pos", "NN").at_position("c1").name,
            "pos@c1"
        );
    }

    #[test]
    fn qualified_names_never_collide_across_offsets() {
        let a = Feature::nominal("word", "x").at_offset(-1);
        let b = Feature::nominal("word", "x").at_offset(1);
        assert_ne!(a.name, b.name);
    }

    #[test]
    fn display_forms() {
        assert_eq!(Feature::nominal("word", "pain").to_string(), "word=pain");
        assert_eq!(Feature::numeric("freq", 0.5).to_string(), "freq=0.5");
    }
}

//! Classifier and training-sink contracts.
//!
//! The trainable models themselves (maximum-entropy, SVM, ...) live outside
//! this crate; annotators only produce [`Instance`]s for a [`DataWriter`]
//! during training and consume labels from a [`Classifier`] during
//! inference. [`MockClassifier`] and [`VecDataWriter`] support tests, and
//! [`BaselineClassifier`] is an always-available per-word frequency model
//! for end-to-end runs without an external learner.

use crate::{Error, Feature, FeatureValue, Instance, Result};
use std::collections::HashMap;
use std::sync::Mutex;

/// A trained model that labels one feature vector at a time.
pub trait Classifier: Send + Sync {
    /// Predict an outcome label for the features.
    ///
    /// # Errors
    ///
    /// Implementation-specific failures propagate to the caller unchanged;
    /// the pipeline never retries or substitutes a default label.
    fn classify(&self, features: &[Feature]) -> Result<String>;
}

/// A sink for training instances.
pub trait DataWriter {
    /// Record one training instance.
    fn write(&mut self, instance: Instance) -> Result<()>;
}

/// A `DataWriter` that collects instances in memory.
#[derive(Debug, Default)]
pub struct VecDataWriter {
    instances: Vec<Instance>,
}

impl VecDataWriter {
    /// Create an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The collected instances.
    #[must_use]
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// Consume the writer, returning the collected instances.
    #[must_use]
    pub fn into_instances(self) -> Vec<Instance> {
        self.instances
    }
}

impl DataWriter for VecDataWriter {
    fn write(&mut self, instance: Instance) -> Result<()> {
        self.instances.push(instance);
        Ok(())
    }
}

/// A mock classifier for tests.
///
/// Either returns labels from a fixed script (one per call, erroring when
/// exhausted, which exercises failure propagation) or computes them with a
/// closure over the features.
///
/// # Example
///
/// ```
/// use clinspan::{Classifier, MockClassifier};
///
/// let mock = MockClassifier::scripted(["B-EVENT", "O"]);
/// assert_eq!(mock.classify(&[]).unwrap(), "B-EVENT");
/// assert_eq!(mock.classify(&[]).unwrap(), "O");
/// assert!(mock.classify(&[]).is_err());
/// ```
pub struct MockClassifier {
    inner: MockInner,
}

enum MockInner {
    Script(Mutex<std::collections::VecDeque<String>>),
    Func(Box<dyn Fn(&[Feature]) -> Result<String> + Send + Sync>),
}

impl MockClassifier {
    /// Return the given labels in order, then error.
    #[must_use]
    pub fn scripted<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queue = labels.into_iter().map(Into::into).collect();
        Self {
            inner: MockInner::Script(Mutex::new(queue)),
        }
    }

    /// Always return the same label.
    #[must_use]
    pub fn constant(label: impl Into<String>) -> Self {
        let label = label.into();
        Self::with_fn(move |_| Ok(label.clone()))
    }

    /// Compute labels from the features.
    #[must_use]
    pub fn with_fn(f: impl Fn(&[Feature]) -> Result<String> + Send + Sync + 'static) -> Self {
        Self {
            inner: MockInner::Func(Box::new(f)),
        }
    }
}

impl Classifier for MockClassifier {
    fn classify(&self, features: &[Feature]) -> Result<String> {
        match &self.inner {
            MockInner::Script(queue) => queue
                .lock()
                .expect("mock classifier script lock")
                .pop_front()
                .ok_or_else(|| Error::classifier("mock classifier script exhausted")),
            MockInner::Func(f) => f(features),
        }
    }
}

/// Trains a [`BaselineClassifier`] by counting outcomes per focus word.
///
/// This is the zero-dependency fallback model: it memorizes, for each value
/// of the given feature (by default the unqualified `word` feature), the
/// most frequent outcome seen in training. It exists so pipelines remain
/// runnable end to end without an external learner, not to be competitive.
#[derive(Debug)]
pub struct BaselineTrainer {
    feature_name: String,
    counts: HashMap<String, HashMap<String, usize>>,
    fallback_counts: HashMap<String, usize>,
}

impl BaselineTrainer {
    /// Count outcomes keyed by the `word` feature.
    #[must_use]
    pub fn new() -> Self {
        Self::keyed_on("word")
    }

    /// Count outcomes keyed by an arbitrary feature name.
    #[must_use]
    pub fn keyed_on(feature_name: impl Into<String>) -> Self {
        Self {
            feature_name: feature_name.into(),
            counts: HashMap::new(),
            fallback_counts: HashMap::new(),
        }
    }

    /// Finish training.
    #[must_use]
    pub fn into_classifier(self) -> BaselineClassifier {
        let by_word = self
            .counts
            .into_iter()
            .map(|(word, outcomes)| (word, most_frequent(&outcomes)))
            .collect();
        let fallback = if self.fallback_counts.is_empty() {
            "O".to_string()
        } else {
            most_frequent(&self.fallback_counts)
        };
        BaselineClassifier { by_word, fallback }
    }
}

impl Default for BaselineTrainer {
    fn default() -> Self {
        Self::new()
    }
}

impl DataWriter for BaselineTrainer {
    fn write(&mut self, instance: Instance) -> Result<()> {
        *self
            .fallback_counts
            .entry(instance.label.clone())
            .or_default() += 1;
        if let Some(feature) = instance.features.iter().find(|f| f.name == self.feature_name) {
            if let FeatureValue::Nominal(word) = &feature.value {
                *self
                    .counts
                    .entry(word.clone())
                    .or_default()
                    .entry(instance.label)
                    .or_default() += 1;
            }
        }
        Ok(())
    }
}

/// Per-word most-frequent-outcome model produced by [`BaselineTrainer`].
#[derive(Debug, Clone)]
pub struct BaselineClassifier {
    by_word: HashMap<String, String>,
    fallback: String,
}

impl Classifier for BaselineClassifier {
    fn classify(&self, features: &[Feature]) -> Result<String> {
        let word = features.iter().find_map(|f| match (&*f.name, &f.value) {
            ("word", FeatureValue::Nominal(w)) => Some(w),
            _ => None,
        });
        Ok(word
            .and_then(|w| self.by_word.get(w))
            .unwrap_or(&self.fallback)
            .clone())
    }
}

/// Ties broken lexicographically so training is deterministic.
fn most_frequent(counts: &HashMap<String, usize>) -> String {
    counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(label, _)| label.clone())
        .unwrap_or_else(|| "O".to_string())
}

//! The sequence tagger driver: greedy left-to-right labeling per window.
//!
//! One driver instance holds an annotator's feature configuration. Per
//! bounded window (one sentence) it either emits gold-labeled training
//! instances or predicts token by token, feeding each prediction back into
//! the next token's previous-outcome features through an explicit outcome
//! buffer, then decodes the buffer into mentions.
//!
//! Token order within a window is a strict sequential dependency; windows
//! themselves are independent and may be processed in any order.

use crate::extractors::{
    ContextExtractor, FeatureExtractor, NeighborTagFeatures, PreviousOutcomeFeatures,
};
use crate::{chunking, Classifier, DataWriter, Feature, Instance, Mention, Result, Tag, Token};

/// A configured sequence tagger.
pub struct SequenceTagger {
    token_extractors: Vec<Box<dyn FeatureExtractor>>,
    context_extractors: Vec<ContextExtractor>,
    neighbor_tags: Option<NeighborTagFeatures>,
    previous_outcomes: Option<PreviousOutcomeFeatures>,
}

impl SequenceTagger {
    /// Create a tagger with no extractors configured.
    #[must_use]
    pub fn new() -> Self {
        Self {
            token_extractors: Vec::new(),
            context_extractors: Vec::new(),
            neighbor_tags: None,
            previous_outcomes: None,
        }
    }

    /// Add a focus-token extractor (features left unqualified).
    #[must_use]
    pub fn with_token_extractor(mut self, extractor: Box<dyn FeatureExtractor>) -> Self {
        self.token_extractors.push(extractor);
        self
    }

    /// Add a windowed context extractor.
    #[must_use]
    pub fn with_context_extractor(mut self, extractor: ContextExtractor) -> Self {
        self.context_extractors.push(extractor);
        self
    }

    /// Sample a parallel tag sequence around each focus token.
    #[must_use]
    pub fn with_neighbor_tags(mut self, neighbor: NeighborTagFeatures) -> Self {
        self.neighbor_tags = Some(neighbor);
        self
    }

    /// Feed previously assigned outcomes back as features.
    #[must_use]
    pub fn with_previous_outcomes(mut self, previous: PreviousOutcomeFeatures) -> Self {
        self.previous_outcomes = Some(previous);
        self
    }

    /// The feature list for the token at `focus`.
    ///
    /// `outcomes` holds gold tags during training and the running prediction
    /// buffer during inference; only positions before `focus` are read.
    fn features(
        &self,
        window: &[Token],
        focus: usize,
        neighbor_tags: Option<&[Tag]>,
        outcomes: &[Tag],
    ) -> Vec<Feature> {
        let mut features = Vec::new();
        for extractor in &self.token_extractors {
            features.extend(extractor.extract(&window[focus]));
        }
        for extractor in &self.context_extractors {
            features.extend(extractor.extract_within(window, focus));
        }
        if let (Some(extractor), Some(tags)) = (&self.neighbor_tags, neighbor_tags) {
            features.extend(extractor.extract(tags, focus));
        }
        if let Some(extractor) = &self.previous_outcomes {
            features.extend(extractor.extract(outcomes, focus));
        }
        features
    }

    /// Training pass over one window: encode the gold mentions, emit one
    /// instance per token.
    ///
    /// # Errors
    ///
    /// Gold encoding errors (overlapping mentions) and writer errors are
    /// fatal for the window.
    pub fn write_instances(
        &self,
        window: &[Token],
        gold: &[Mention],
        neighbor_tags: Option<&[Tag]>,
        writer: &mut dyn DataWriter,
    ) -> Result<()> {
        let outcomes = chunking::encode(window, gold)?;
        for focus in 0..window.len() {
            let features = self.features(window, focus, neighbor_tags, &outcomes);
            writer.write(Instance::new(outcomes[focus].to_string(), features))?;
        }
        Ok(())
    }

    /// Inference pass over one window: greedy left-to-right prediction, then
    /// decode the outcome buffer into mentions.
    ///
    /// # Errors
    ///
    /// Classifier failures propagate unchanged.
    pub fn predict(
        &self,
        window: &[Token],
        neighbor_tags: Option<&[Tag]>,
        classifier: &dyn Classifier,
    ) -> Result<Vec<Mention>> {
        let mut outcomes: Vec<Tag> = Vec::with_capacity(window.len());
        for focus in 0..window.len() {
            let features = self.features(window, focus, neighbor_tags, &outcomes);
            let label = classifier.classify(&features)?;
            outcomes.push(Tag::parse(&label));
        }
        log::debug!(
            "window of {} tokens decoded from {} predictions",
            window.len(),
            outcomes.len()
        );
        chunking::decode(window, &outcomes)
    }
}

impl Default for SequenceTagger {
    fn default() -> Self {
        Self::new()
    }
}

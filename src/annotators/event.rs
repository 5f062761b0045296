//! Event span tagging.
//!
//! Classifies each token of each sentence as beginning, inside or outside a
//! clinical event mention. Feature inventory: the focus token's text,
//! character shape and part-of-speech; text and part-of-speech of the three
//! tokens either side; the entity-layer BIO tags in a two-token window; and
//! the two previously assigned outcomes.

use crate::extractors::{
    CharShape, Combined, ContextExtractor, CoveredText, NeighborTagFeatures,
    PreviousOutcomeFeatures, TokenAttribute,
};
use crate::tagger::SequenceTagger;
use crate::{
    chunking, Classifier, DataWriter, Document, Event, MentionKind, Result, PART_OF_SPEECH,
};

/// The label event mentions are tagged with.
pub const EVENT_LABEL: &str = "EVENT";

/// Sentence-windowed BIO tagger for event mentions.
pub struct EventTagger {
    tagger: SequenceTagger,
}

impl EventTagger {
    /// Create an event tagger with the standard feature inventory.
    #[must_use]
    pub fn new() -> Self {
        let context_base = Combined::new(vec![
            Box::new(CoveredText),
            Box::new(TokenAttribute::new(PART_OF_SPEECH)),
        ]);
        let tagger = SequenceTagger::new()
            .with_token_extractor(Box::new(CoveredText))
            .with_token_extractor(Box::new(CharShape))
            .with_token_extractor(Box::new(TokenAttribute::new(PART_OF_SPEECH)))
            .with_context_extractor(ContextExtractor::new(Box::new(context_base), 3, 3))
            .with_neighbor_tags(NeighborTagFeatures::new("entity", 2))
            .with_previous_outcomes(PreviousOutcomeFeatures::new("previous", 2));
        Self { tagger }
    }

    /// Training pass: emit one instance per token of each sentence.
    ///
    /// # Errors
    ///
    /// Encoding and writer failures are fatal for the document.
    pub fn write_training_data(
        &self,
        doc: &Document,
        writer: &mut dyn DataWriter,
    ) -> Result<()> {
        for &sentence in doc.sentences() {
            let tokens = doc.tokens_in(sentence);
            let entities = doc.mentions_in(MentionKind::Entity, sentence);
            let entity_tags = chunking::encode(tokens, &entities)?;
            let events = doc.mentions_in(MentionKind::Event, sentence);
            self.tagger
                .write_instances(tokens, &events, Some(&entity_tags), writer)?;
        }
        Ok(())
    }

    /// Inference pass: predict per sentence and register decoded event
    /// mentions on the document.
    ///
    /// # Errors
    ///
    /// Classifier failures propagate; encoding failures of the entity layer
    /// are fatal for the document.
    pub fn annotate(&self, doc: &mut Document, classifier: &dyn Classifier) -> Result<()> {
        let mut predicted = Vec::new();
        for &sentence in doc.sentences() {
            let tokens = doc.tokens_in(sentence);
            let entities = doc.mentions_in(MentionKind::Entity, sentence);
            let entity_tags = chunking::encode(tokens, &entities)?;
            predicted.extend(self.tagger.predict(tokens, Some(&entity_tags), classifier)?);
        }
        log::debug!("predicted {} event mentions", predicted.len());
        for mention in predicted {
            doc.add_event(Event::new(mention));
        }
        Ok(())
    }
}

impl Default for EventTagger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        EntityMention, Instance, Mention, MockClassifier, Span, Token, VecDataWriter,
    };

    fn doc() -> Document {
        let text = "Chest pain resolved";
        let mut doc = Document::new(text);
        doc.set_sentences(vec![Span::new(0, 19)]);
        doc.set_tokens(vec![
            Token::new(Span::new(0, 5), "Chest").with_attribute(PART_OF_SPEECH, "NN"),
            Token::new(Span::new(6, 10), "pain").with_attribute(PART_OF_SPEECH, "NN"),
            Token::new(Span::new(11, 19), "resolved").with_attribute(PART_OF_SPEECH, "VBD"),
        ]);
        doc.add_entity(EntityMention::new(Mention::new(Span::new(0, 10), "FINDING")));
        doc
    }

    #[test]
    fn training_features_include_all_groups() {
        let mut doc = doc();
        doc.add_event(Event::new(Mention::new(Span::new(11, 19), EVENT_LABEL)));
        let mut writer = VecDataWriter::new();
        EventTagger::new()
            .write_training_data(&doc, &mut writer)
            .unwrap();

        let instances: &[Instance] = writer.instances();
        assert_eq!(instances.len(), 3);
        assert_eq!(instances[2].label, "B-EVENT");

        let names: Vec<&str> = instances[2]
            .features
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        // Token-level, context, entity-tag and previous-outcome features.
        assert!(names.contains(&"word"));
        assert!(names.contains(&"shape"));
        assert!(names.contains(&"pos"));
        assert!(names.contains(&"word@-2"));
        assert!(names.contains(&"pos@-1"));
        assert!(names.contains(&"entity_0"));
        assert!(names.contains(&"previous_1"));
        // Clipped at the sentence end: no following context.
        assert!(!names.iter().any(|n| n.ends_with("@+1")));
    }

    #[test]
    fn annotate_registers_decoded_mentions() {
        let mut doc = doc();
        let classifier = MockClassifier::scripted(["O", "O", "B-EVENT"]);
        EventTagger::new().annotate(&mut doc, &classifier).unwrap();
        assert_eq!(doc.events().len(), 1);
        assert_eq!(doc.events()[0].mention.span, Span::new(11, 19));
        assert_eq!(doc.events()[0].mention.label, EVENT_LABEL);
    }
}

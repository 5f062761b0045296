//! Document-creation-time relation classification.
//!
//! For each event mention, predicts how the event relates to the document
//! creation time (`BEFORE`, `OVERLAP`, `AFTER`, `BEFORE/OVERLAP`) from the
//! text and part-of-speech of the three tokens before the mention, the
//! tokens it covers, and the three tokens after it.

use crate::extractors::{Combined, ContextExtractor, CoveredText, TokenAttribute};
use crate::{
    Classifier, DataWriter, Document, Error, Instance, Result, PART_OF_SPEECH,
};

/// Per-event doc-time-relation classifier.
pub struct DocTimeRelAnnotator {
    context: ContextExtractor,
}

impl DocTimeRelAnnotator {
    /// Create an annotator with the standard feature inventory.
    #[must_use]
    pub fn new() -> Self {
        let base = Combined::new(vec![
            Box::new(CoveredText),
            Box::new(TokenAttribute::new(PART_OF_SPEECH)),
        ]);
        Self {
            context: ContextExtractor::new(Box::new(base), 3, 3).with_covered(),
        }
    }

    /// Training pass: one instance per event, labeled with its gold
    /// doc-time relation.
    ///
    /// # Errors
    ///
    /// An event without a gold doc-time relation is a data error; writer
    /// failures propagate.
    pub fn write_training_data(
        &self,
        doc: &Document,
        writer: &mut dyn DataWriter,
    ) -> Result<()> {
        for event in doc.events() {
            let features = self.context.extract_around(doc.tokens(), event.mention.span);
            let outcome = event.properties.doc_time_rel.clone().ok_or_else(|| {
                Error::record(format!(
                    "event at {} has no doc-time relation",
                    event.mention.span
                ))
            })?;
            writer.write(Instance::new(outcome, features))?;
        }
        Ok(())
    }

    /// Inference pass: classify each event and write the predicted relation
    /// back onto its properties.
    ///
    /// # Errors
    ///
    /// Classifier failures propagate.
    pub fn annotate(&self, doc: &mut Document, classifier: &dyn Classifier) -> Result<()> {
        let tokens = doc.tokens().to_vec();
        for event in doc.events_mut() {
            let features = self.context.extract_around(&tokens, event.mention.span);
            let outcome = classifier.classify(&features)?;
            event.properties.doc_time_rel = Some(outcome);
        }
        Ok(())
    }
}

impl Default for DocTimeRelAnnotator {
    fn default() -> Self {
        Self::new()
    }
}

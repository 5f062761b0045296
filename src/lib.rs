//! # clinspan
//!
//! Clinical span tagging for Rust: extract events and named entities from
//! text by classifying each token with a sequence label, then reconstruct
//! span annotations from the label sequence.
//!
//! - **Span codec**: BIO encoding of mentions over a token sequence, and
//!   fault-tolerant decoding of predicted tag sequences
//! - **Feature pipeline**: token, windowed-context, neighbor-tag and
//!   previous-outcome features
//! - **Sequence tagger**: greedy left-to-right labeling per sentence window
//! - **Evaluation**: span-match statistics and n-fold cross-validation with
//!   error diagnostics
//!
//! ## Quick start
//!
//! ```
//! use clinspan::{chunking, Mention, Span, Token};
//!
//! let tokens = vec![
//!     Token::new(Span::new(0, 5), "chest"),
//!     Token::new(Span::new(6, 10), "pain"),
//!     Token::new(Span::new(11, 19), "resolved"),
//! ];
//! let mentions = vec![Mention::new(Span::new(0, 10), "FINDING")];
//!
//! let tags = chunking::encode(&tokens, &mentions)?;
//! assert_eq!(chunking::decode(&tokens, &tags)?, mentions);
//! # Ok::<(), clinspan::Error>(())
//! ```
//!
//! ## Annotators
//!
//! The trainable annotators combine the tagger driver with their feature
//! inventories:
//!
//! ```rust,ignore
//! use clinspan::annotators::EventTagger;
//! use clinspan::{BaselineTrainer, DataWriter};
//!
//! let tagger = EventTagger::new();
//! let mut trainer = BaselineTrainer::new();
//! for doc in &training_documents {
//!     tagger.write_training_data(doc, &mut trainer)?;
//! }
//! let model = trainer.into_classifier();
//! tagger.annotate(&mut test_document, &model)?;
//! ```
//!
//! ## Design
//!
//! - **Trait-based seams**: classifiers and training sinks are contracts
//!   ([`Classifier`], [`DataWriter`]); the trainable models themselves live
//!   outside this crate. [`MockClassifier`] supports tests, and the
//!   per-word [`BaselineClassifier`] keeps pipelines runnable end to end.
//! - **Explicit state**: the tagger's previous-outcome buffer is a plain
//!   `Vec<Tag>` threaded through the prediction loop, not ambient state.
//! - **Fail closed**: precondition and data-format violations are reported
//!   immediately; only decode inconsistencies (orphan `Inside` tags, which
//!   arise routinely from imperfect predictions) are recovered from.

#![warn(missing_docs)]

pub mod annotators;
pub mod chunking;
mod classifier;
pub mod cli;
mod document;
mod error;
pub mod eval;
pub mod extractors;
mod features;
pub mod gold;
mod mention;
mod span;
pub mod tagger;
mod token;

pub use classifier::{
    BaselineClassifier, BaselineTrainer, Classifier, DataWriter, MockClassifier, VecDataWriter,
};
pub use document::{
    copy_mentions, Document, EntityMention, Event, EventProperties, Relation, RelationKind,
    TimeMention,
};
pub use error::{Error, Result};
pub use features::{Feature, FeatureValue, Instance};
pub use gold::{gold_set_directory, map_records, set_number_from_directory, GoldRecord};
pub use mention::{Mention, MentionKind, Tag};
pub use span::Span;
pub use tagger::SequenceTagger;
pub use token::{Token, LEMMA, PART_OF_SPEECH};

pub mod prelude {
    //! Commonly used items, re-exported for convenience.
    //!
    //! ```rust
    //! use clinspan::prelude::*;
    //!
    //! let tag = Tag::parse("B-EVENT");
    //! assert_eq!(tag.label(), Some("EVENT"));
    //! ```
    pub use crate::annotators::{DocTimeRelAnnotator, EventTagger};
    pub use crate::eval::{CrossValidation, FoldRunner, MatchKey, SpanStatistics};
    pub use crate::{
        chunking, Classifier, DataWriter, Document, Error, Feature, Instance, Mention,
        MentionKind, MockClassifier, Result, Span, Tag, Token,
    };
}

//! Error types for clinspan.

use thiserror::Error;

/// Result type for clinspan operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for clinspan operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid input provided (length mismatches, bad fold counts, bad selectors).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Two mentions passed to the span codec overlap, or are out of span order.
    #[error("Mention overlap: {0}")]
    MentionOverlap(String),

    /// A gold record is malformed (missing span, invalid slot value).
    #[error("Malformed gold record: {0}")]
    Record(String),

    /// A gold record carried slots the mapping did not consume.
    #[error("Unconsumed slots: {0}")]
    UnconsumedSlots(String),

    /// A gold record has a type the mapping does not recognize.
    #[error("Unrecognized record type: {0}")]
    UnrecognizedRecordType(String),

    /// Classifier failure, propagated to the caller.
    #[error("Classifier error: {0}")]
    Classifier(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a mention overlap error.
    pub fn mention_overlap(msg: impl Into<String>) -> Self {
        Error::MentionOverlap(msg.into())
    }

    /// Create a malformed record error.
    pub fn record(msg: impl Into<String>) -> Self {
        Error::Record(msg.into())
    }

    /// Create an unconsumed slots error.
    pub fn unconsumed_slots(msg: impl Into<String>) -> Self {
        Error::UnconsumedSlots(msg.into())
    }

    /// Create an unrecognized record type error.
    pub fn unrecognized_record_type(msg: impl Into<String>) -> Self {
        Error::UnrecognizedRecordType(msg.into())
    }

    /// Create a classifier error.
    pub fn classifier(msg: impl Into<String>) -> Self {
        Error::Classifier(msg.into())
    }
}

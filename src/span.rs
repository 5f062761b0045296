//! Character-offset spans and span ordering.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open interval `[begin, end)` of byte offsets into a document text.
///
/// The derived `Ord` is the span order used everywhere spans are sorted,
/// deduplicated or diffed: primary key `begin`, tie-break `end`, both
/// ascending.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Span {
    /// Offset of the first byte in the span.
    pub begin: usize,
    /// Offset immediately after the last byte in the span.
    pub end: usize,
}

impl Span {
    /// Create a new span. Panics if `begin > end`.
    #[must_use]
    pub fn new(begin: usize, end: usize) -> Self {
        assert!(begin <= end, "span begin {} exceeds end {}", begin, end);
        Self { begin, end }
    }

    /// Length of the span in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    /// Whether the span is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    /// Whether this span shares at least one byte with `other`.
    #[must_use]
    pub fn overlaps(&self, other: &Span) -> bool {
        self.begin < other.end && other.begin < self.end
    }

    /// Whether this span fully contains `other`.
    #[must_use]
    pub fn contains(&self, other: &Span) -> bool {
        self.begin <= other.begin && other.end <= self.end
    }

    /// The text this span covers within `text`.
    ///
    /// Returns an empty string if the span falls outside `text`.
    #[must_use]
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        text.get(self.begin..self.end).unwrap_or("")
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.begin, self.end)
    }
}

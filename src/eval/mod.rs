//! Span-based evaluation: statistics, fold partitioning, and the
//! cross-validation harness.
//!
//! # Overview
//!
//! - [`stats`]: TP/FP/FN accumulators with per-label breakdown and an
//!   order-independent merge.
//! - [`folds`]: deterministic contiguous fold partitioning over corpus
//!   group keys.
//! - [`harness`]: the cross-validation driver and its [`FoldRunner`]
//!   collaborator contract, plus gold-only/system-only diagnostics.
//!
//! # Example
//!
//! ```rust,ignore
//! use clinspan::eval::{CrossValidation, FoldRunner, MatchKey};
//!
//! let run = CrossValidation::new(runner, 4)
//!     .with_match_key(MatchKey::Span)
//!     .run(&document_sets)?;
//! for (i, fold) in run.fold_statistics.iter().enumerate() {
//!     println!("fold {}:\n{}", i, fold);
//! }
//! println!("OVERALL\n{}", run.aggregate);
//! ```

pub mod folds;
pub mod harness;
pub mod stats;

pub use folds::{partition_folds, Fold};
pub use harness::{property_mentions, CrossValidation, Diagnostics, EvalRun, FoldEval, FoldRunner};
pub use stats::{Counts, MatchKey, SpanStatistics};

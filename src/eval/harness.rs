//! Cross-validation harness.
//!
//! Partitions corpus group keys into folds, trains and tests a collaborator
//! per fold, and accumulates span statistics plus diagnostic multisets of
//! the annotation texts only one side produced.
//!
//! Folds are independent: each trains its own model, so they may run in
//! parallel. Results are collected and merged in fold-index order, which
//! keeps the aggregate identical regardless of completion order.

use crate::eval::folds::partition_folds;
use crate::eval::stats::{MatchKey, SpanStatistics};
use crate::{Event, EventProperties, Mention, Result};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::io::Write;

/// Trains and tests one fold. The harness never touches documents or models
/// directly; implementations load their corpus slice by group key and call
/// [`FoldEval::evaluate_document`] once per test document.
pub trait FoldRunner {
    /// Corpus grouping key (e.g. a document-set number).
    type Key: Ord + Clone + Send + Sync;
    /// The trained model for one fold.
    type Model: Send;

    /// Train a fresh model on the fold's train keys.
    fn train(&self, keys: &[Self::Key]) -> Result<Self::Model>;

    /// Evaluate the model over the fold's test keys, reporting each document
    /// through `eval`.
    fn test(&self, model: &Self::Model, keys: &[Self::Key], eval: &mut FoldEval) -> Result<()>;
}

/// Per-fold evaluation sink handed to [`FoldRunner::test`].
#[derive(Debug)]
pub struct FoldEval {
    match_key: MatchKey,
    stats: SpanStatistics,
    diagnostics: Diagnostics,
}

impl FoldEval {
    fn new(match_key: MatchKey) -> Self {
        Self {
            match_key,
            stats: SpanStatistics::new(),
            diagnostics: Diagnostics::default(),
        }
    }

    /// Diff one document's gold and system mentions into the fold's
    /// statistics and diagnostics. Both slices must be sorted in span order.
    pub fn evaluate_document(&mut self, text: &str, gold: &[Mention], system: &[Mention]) {
        self.stats.add(gold, system, self.match_key);
        self.diagnostics.record(text, gold, system);
    }

    /// The fold's statistics so far.
    #[must_use]
    pub fn statistics(&self) -> &SpanStatistics {
        &self.stats
    }
}

/// Cross-validation over a [`FoldRunner`].
pub struct CrossValidation<R> {
    runner: R,
    n_folds: usize,
    match_key: MatchKey,
    parallel: bool,
}

impl<R: FoldRunner + Sync> CrossValidation<R> {
    /// Evaluate `runner` with `n_folds`-fold cross-validation.
    #[must_use]
    pub fn new(runner: R, n_folds: usize) -> Self {
        Self {
            runner,
            n_folds,
            match_key: MatchKey::default(),
            parallel: false,
        }
    }

    /// Choose what counts as a match (span only, or span plus label).
    #[must_use]
    pub fn with_match_key(mut self, match_key: MatchKey) -> Self {
        self.match_key = match_key;
        self
    }

    /// Run folds in parallel. Aggregates are unaffected: fold results merge
    /// in fold-index order either way.
    #[must_use]
    pub fn with_parallel(mut self) -> Self {
        self.parallel = true;
        self
    }

    /// Partition `keys`, run every fold, and aggregate.
    ///
    /// # Errors
    ///
    /// Fold-partition precondition violations, and any training, testing or
    /// classifier error from the runner. The first failing fold aborts the
    /// run.
    pub fn run(&self, keys: &[R::Key]) -> Result<EvalRun> {
        let folds = partition_folds(keys, self.n_folds)?;
        log::info!("running {} folds over {} keys", folds.len(), keys.len());

        let run_fold = |fold: &crate::eval::Fold<R::Key>| -> Result<FoldEval> {
            let model = self.runner.train(&fold.train)?;
            let mut eval = FoldEval::new(self.match_key);
            self.runner.test(&model, &fold.test, &mut eval)?;
            Ok(eval)
        };

        let results: Vec<FoldEval> = if self.parallel {
            folds.par_iter().map(run_fold).collect::<Result<_>>()?
        } else {
            folds.iter().map(run_fold).collect::<Result<_>>()?
        };

        let mut fold_statistics = Vec::with_capacity(results.len());
        let mut diagnostics = Diagnostics::default();
        for (i, eval) in results.into_iter().enumerate() {
            log::info!("fold {}: {}", i, eval.stats);
            diagnostics.merge(&eval.diagnostics);
            fold_statistics.push(eval.stats);
        }
        let aggregate = SpanStatistics::sum(&fold_statistics);
        Ok(EvalRun {
            fold_statistics,
            aggregate,
            diagnostics,
        })
    }
}

/// The results of one cross-validation run.
#[derive(Debug)]
pub struct EvalRun {
    /// Per-fold statistics, in fold order.
    pub fold_statistics: Vec<SpanStatistics>,
    /// Statistics summed over all folds.
    pub aggregate: SpanStatistics,
    /// Gold-only / system-only annotation texts across the whole run.
    pub diagnostics: Diagnostics,
}

/// Multisets of annotation texts that appeared on only one side, for
/// human-reviewable error reports.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    gold_only: BTreeMap<String, usize>,
    system_only: BTreeMap<String, usize>,
}

impl Diagnostics {
    /// Record one document's differences.
    ///
    /// Texts are compared setwise per document; each distinct text missed
    /// (or invented) in a document counts once. Missed spans are logged
    /// `DROPPED` and invented spans `ADDED`, each with surrounding context,
    /// in span order.
    pub fn record(&mut self, text: &str, gold: &[Mention], system: &[Mention]) {
        let gold_texts: std::collections::BTreeSet<&str> =
            gold.iter().map(|m| m.span.slice(text)).collect();
        let system_texts: std::collections::BTreeSet<&str> =
            system.iter().map(|m| m.span.slice(text)).collect();

        for mention in gold {
            let covered = mention.span.slice(text);
            if !system_texts.contains(covered) {
                log::debug!("DROPPED {} {:?} | {}", mention.span, covered, context(text, &mention.span));
            }
        }
        for mention in system {
            let covered = mention.span.slice(text);
            if !gold_texts.contains(covered) {
                log::debug!("ADDED {} {:?} | {}", mention.span, covered, context(text, &mention.span));
            }
        }

        for t in gold_texts.difference(&system_texts) {
            *self.gold_only.entry((*t).to_string()).or_default() += 1;
        }
        for t in system_texts.difference(&gold_texts) {
            *self.system_only.entry((*t).to_string()).or_default() += 1;
        }
    }

    /// Texts annotated in gold but never produced by the system, with their
    /// document counts.
    #[must_use]
    pub fn gold_only(&self) -> &BTreeMap<String, usize> {
        &self.gold_only
    }

    /// Texts produced by the system but absent from gold, with their
    /// document counts.
    #[must_use]
    pub fn system_only(&self) -> &BTreeMap<String, usize> {
        &self.system_only
    }

    /// Sum another accumulator into this one.
    pub fn merge(&mut self, other: &Diagnostics) {
        for (text, count) in &other.gold_only {
            *self.gold_only.entry(text.clone()).or_default() += count;
        }
        for (text, count) in &other.system_only {
            *self.system_only.entry(text.clone()).or_default() += count;
        }
    }

    /// Write the gold-only report: one `count text` line per distinct text,
    /// sorted by text.
    ///
    /// # Errors
    ///
    /// IO errors from the writer.
    pub fn write_gold_only(&self, writer: &mut dyn Write) -> Result<()> {
        write_multiset(&self.gold_only, writer)
    }

    /// Write the system-only report, same format as
    /// [`write_gold_only`](Self::write_gold_only).
    ///
    /// # Errors
    ///
    /// IO errors from the writer.
    pub fn write_system_only(&self, writer: &mut dyn Write) -> Result<()> {
        write_multiset(&self.system_only, writer)
    }
}

fn write_multiset(multiset: &BTreeMap<String, usize>, writer: &mut dyn Write) -> Result<()> {
    for (text, count) in multiset {
        writeln!(writer, "{:2} {}", count, text)?;
    }
    Ok(())
}

/// Up to 50 bytes of document text either side of the span, widened to
/// character boundaries.
fn context<'a>(text: &'a str, span: &crate::Span) -> &'a str {
    let mut begin = span.begin.saturating_sub(50);
    while begin > 0 && !text.is_char_boundary(begin) {
        begin -= 1;
    }
    let mut end = (span.end + 50).min(text.len());
    while end < text.len() && !text.is_char_boundary(end) {
        end += 1;
    }
    text.get(begin..end).unwrap_or("")
}

/// Project events onto mentions labeled by one of their properties, for
/// property evaluation: match on span, compare the property value as the
/// label (with [`MatchKey::SpanAndLabel`]).
///
/// A missing property becomes the empty label, so an event that exists on
/// both sides but carries the property on only one still counts as a
/// mismatch.
#[must_use]
pub fn property_mentions(
    events: &[Event],
    property: impl Fn(&EventProperties) -> Option<&str>,
) -> Vec<Mention> {
    events
        .iter()
        .map(|event| {
            Mention::new(
                event.mention.span,
                property(&event.properties).unwrap_or(""),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Span};

    fn mention(begin: usize, end: usize, label: &str) -> Mention {
        Mention::new(Span::new(begin, end), label)
    }

    /// Keys 0..n map to one synthetic document each; the "model" is just the
    /// set of train keys, and the system annotates correctly only for even
    /// keys.
    struct EvenRunner;

    impl FoldRunner for EvenRunner {
        type Key = u32;
        type Model = Vec<u32>;

        fn train(&self, keys: &[u32]) -> Result<Vec<u32>> {
            Ok(keys.to_vec())
        }

        fn test(&self, _model: &Vec<u32>, keys: &[u32], eval: &mut FoldEval) -> Result<()> {
            for &key in keys {
                let text = "chest pain";
                let gold = vec![mention(0, 10, "EVENT")];
                let system = if key % 2 == 0 {
                    gold.clone()
                } else {
                    vec![mention(0, 5, "EVENT")]
                };
                eval.evaluate_document(text, &gold, &system);
            }
            Ok(())
        }
    }

    #[test]
    fn cross_validation_aggregates_over_folds() {
        let keys: Vec<u32> = (0..6).collect();
        let run = CrossValidation::new(EvenRunner, 3).run(&keys).unwrap();

        assert_eq!(run.fold_statistics.len(), 3);
        // Even keys (0, 2, 4) match exactly; odd keys miss and add one each.
        let counts = run.aggregate.counts();
        assert_eq!(counts.true_positives, 3);
        assert_eq!(counts.false_negatives, 3);
        assert_eq!(counts.false_positives, 3);

        assert_eq!(run.diagnostics.gold_only().get("chest pain"), Some(&3));
        assert_eq!(run.diagnostics.system_only().get("chest"), Some(&3));
    }

    #[test]
    fn parallel_run_matches_sequential() {
        let keys: Vec<u32> = (0..8).collect();
        let sequential = CrossValidation::new(EvenRunner, 4).run(&keys).unwrap();
        let parallel = CrossValidation::new(EvenRunner, 4)
            .with_parallel()
            .run(&keys)
            .unwrap();
        assert_eq!(sequential.aggregate, parallel.aggregate);
        assert_eq!(sequential.fold_statistics, parallel.fold_statistics);
    }

    #[test]
    fn failing_fold_aborts_run() {
        struct FailingRunner;
        impl FoldRunner for FailingRunner {
            type Key = u32;
            type Model = ();
            fn train(&self, _keys: &[u32]) -> Result<()> {
                Err(Error::classifier("no converge"))
            }
            fn test(&self, _m: &(), _keys: &[u32], _eval: &mut FoldEval) -> Result<()> {
                Ok(())
            }
        }
        let keys: Vec<u32> = (0..4).collect();
        assert!(matches!(
            CrossValidation::new(FailingRunner, 2).run(&keys),
            Err(Error::Classifier(_))
        ));
    }

    #[test]
    fn report_lines_are_sorted_by_text() {
        let mut diagnostics = Diagnostics::default();
        let text = "b pain a ache";
        diagnostics.record(
            text,
            &[mention(0, 6, "E"), mention(7, 13, "E")],
            &[],
        );
        let mut out = Vec::new();
        diagnostics.write_gold_only(&mut out).unwrap();
        let rendered = String::from_utf8(out).unwrap();
        assert_eq!(rendered, " 1 a ache\n 1 b pain\n");
    }

    #[test]
    fn property_mentions_project_doc_time_rel() {
        let mut before = Event::new(mention(0, 4, "EVENT"));
        before.properties.doc_time_rel = Some("BEFORE".to_string());
        let unlabeled = Event::new(mention(6, 10, "EVENT"));

        let projected = property_mentions(&[before, unlabeled], |p| p.doc_time_rel.as_deref());
        assert_eq!(projected[0].label, "BEFORE");
        assert_eq!(projected[1].label, "");
    }

    #[test]
    fn context_is_clipped_to_text() {
        let text = "short";
        assert_eq!(context(text, &Span::new(0, 5)), "short");
    }
}

//! Span-match statistics: true/false positives and negatives over mention
//! sets, with per-label breakdown and an order-independent merge.

use crate::Mention;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// What counts as "the same annotation" when diffing gold against system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchKey {
    /// Spans must be identical; labels are ignored for matching.
    #[default]
    Span,
    /// Spans and labels must both be identical.
    SpanAndLabel,
}

/// Raw counts for one label (or for the whole run).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    /// Annotations present in both gold and system.
    pub true_positives: usize,
    /// System annotations with no gold counterpart.
    pub false_positives: usize,
    /// Gold annotations with no system counterpart.
    pub false_negatives: usize,
}

impl Counts {
    /// Precision; 0.0 when the system produced nothing.
    #[must_use]
    pub fn precision(&self) -> f64 {
        let denominator = self.true_positives + self.false_positives;
        if denominator == 0 {
            return 0.0;
        }
        self.true_positives as f64 / denominator as f64
    }

    /// Recall; 0.0 when there is no gold.
    #[must_use]
    pub fn recall(&self) -> f64 {
        let denominator = self.true_positives + self.false_negatives;
        if denominator == 0 {
            return 0.0;
        }
        self.true_positives as f64 / denominator as f64
    }

    /// F1; 0.0 when precision and recall are both 0.
    #[must_use]
    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            return 0.0;
        }
        2.0 * p * r / (p + r)
    }

    /// Sum counts from another accumulator.
    pub fn merge(&mut self, other: &Counts) {
        self.true_positives += other.true_positives;
        self.false_positives += other.false_positives;
        self.false_negatives += other.false_negatives;
    }
}

/// Accumulated span-match statistics.
///
/// `merge` is commutative and associative (plain count sums), so fold
/// results combine into identical aggregates regardless of execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanStatistics {
    overall: Counts,
    by_label: BTreeMap<String, Counts>,
}

impl SpanStatistics {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Diff one document's gold and system mentions into the counts.
    ///
    /// Both sets are deduplicated by match key before diffing. Per-label
    /// counts attribute true positives and false negatives to the gold
    /// mention's label, false positives to the system mention's label.
    pub fn add(&mut self, gold: &[Mention], system: &[Mention], key: MatchKey) {
        let gold_keys = keyed(gold, key);
        let system_keys = keyed(system, key);

        for (k, label) in &gold_keys {
            let counts = self.by_label.entry(label.clone()).or_default();
            if system_keys.iter().any(|(sk, _)| sk == k) {
                self.overall.true_positives += 1;
                counts.true_positives += 1;
            } else {
                self.overall.false_negatives += 1;
                counts.false_negatives += 1;
            }
        }
        for (k, label) in &system_keys {
            if !gold_keys.iter().any(|(gk, _)| gk == k) {
                self.overall.false_positives += 1;
                self.by_label.entry(label.clone()).or_default().false_positives += 1;
            }
        }
    }

    /// The overall counts.
    #[must_use]
    pub fn counts(&self) -> Counts {
        self.overall
    }

    /// The per-label counts, keyed by label.
    #[must_use]
    pub fn by_label(&self) -> &BTreeMap<String, Counts> {
        &self.by_label
    }

    /// Number of gold annotations seen.
    #[must_use]
    pub fn gold_count(&self) -> usize {
        self.overall.true_positives + self.overall.false_negatives
    }

    /// Number of system annotations seen.
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.overall.true_positives + self.overall.false_positives
    }

    /// Overall precision.
    #[must_use]
    pub fn precision(&self) -> f64 {
        self.overall.precision()
    }

    /// Overall recall.
    #[must_use]
    pub fn recall(&self) -> f64 {
        self.overall.recall()
    }

    /// Overall F1.
    #[must_use]
    pub fn f1(&self) -> f64 {
        self.overall.f1()
    }

    /// Sum another accumulator into this one.
    pub fn merge(&mut self, other: &SpanStatistics) {
        self.overall.merge(&other.overall);
        for (label, counts) in &other.by_label {
            self.by_label.entry(label.clone()).or_default().merge(counts);
        }
    }

    /// Merge a sequence of accumulators.
    #[must_use]
    pub fn sum<'a>(all: impl IntoIterator<Item = &'a SpanStatistics>) -> SpanStatistics {
        let mut total = SpanStatistics::new();
        for stats in all {
            total.merge(stats);
        }
        total
    }
}

/// Match keys plus attribution labels for one mention set, deduplicated.
fn keyed(mentions: &[Mention], key: MatchKey) -> Vec<((crate::Span, Option<String>), String)> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for mention in mentions {
        let k = match key {
            MatchKey::Span => (mention.span, None),
            MatchKey::SpanAndLabel => (mention.span, Some(mention.label.clone())),
        };
        if seen.insert(k.clone()) {
            out.push((k, mention.label.clone()));
        }
    }
    out
}

impl fmt::Display for SpanStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "P {:.3}  R {:.3}  F1 {:.3}  (gold {}, system {}, matched {})",
            self.precision(),
            self.recall(),
            self.f1(),
            self.gold_count(),
            self.system_count(),
            self.overall.true_positives,
        )?;
        for (label, counts) in &self.by_label {
            writeln!(
                f,
                "  {:<20} P {:.3}  R {:.3}  F1 {:.3}",
                label,
                counts.precision(),
                counts.recall(),
                counts.f1(),
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Span;

    fn mention(begin: usize, end: usize, label: &str) -> Mention {
        Mention::new(Span::new(begin, end), label)
    }

    #[test]
    fn span_only_matching() {
        let gold = vec![mention(0, 5, "EVENT"), mention(10, 15, "EVENT")];
        let system = vec![mention(0, 5, "EVENT"), mention(20, 25, "EVENT")];
        let mut stats = SpanStatistics::new();
        stats.add(&gold, &system, MatchKey::Span);

        let counts = stats.counts();
        assert_eq!(counts.true_positives, 1);
        assert_eq!(counts.false_positives, 1);
        assert_eq!(counts.false_negatives, 1);
        assert!((stats.precision() - 0.5).abs() < 1e-9);
        assert!((stats.recall() - 0.5).abs() < 1e-9);
        assert!((stats.f1() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn label_mismatch_counts_both_ways_under_labeled_key() {
        let gold = vec![mention(0, 5, "DRUG")];
        let system = vec![mention(0, 5, "FINDING")];

        let mut labeled = SpanStatistics::new();
        labeled.add(&gold, &system, MatchKey::SpanAndLabel);
        assert_eq!(labeled.counts().true_positives, 0);
        assert_eq!(labeled.counts().false_positives, 1);
        assert_eq!(labeled.counts().false_negatives, 1);

        let mut span_only = SpanStatistics::new();
        span_only.add(&gold, &system, MatchKey::Span);
        assert_eq!(span_only.counts().true_positives, 1);
    }

    #[test]
    fn duplicates_collapse_before_diffing() {
        let gold = vec![mention(0, 5, "EVENT"), mention(0, 5, "EVENT")];
        let system = vec![mention(0, 5, "EVENT")];
        let mut stats = SpanStatistics::new();
        stats.add(&gold, &system, MatchKey::Span);
        assert_eq!(stats.gold_count(), 1);
        assert_eq!(stats.counts().true_positives, 1);
    }

    #[test]
    fn per_label_attribution() {
        let gold = vec![mention(0, 5, "DRUG"), mention(10, 15, "FINDING")];
        let system = vec![mention(0, 5, "DRUG"), mention(20, 25, "DRUG")];
        let mut stats = SpanStatistics::new();
        stats.add(&gold, &system, MatchKey::SpanAndLabel);

        let drug = stats.by_label()["DRUG"];
        assert_eq!(drug.true_positives, 1);
        assert_eq!(drug.false_positives, 1);
        let finding = stats.by_label()["FINDING"];
        assert_eq!(finding.false_negatives, 1);
    }

    #[test]
    fn empty_sets_give_zero_metrics() {
        let stats = SpanStatistics::new();
        assert_eq!(stats.precision(), 0.0);
        assert_eq!(stats.recall(), 0.0);
        assert_eq!(stats.f1(), 0.0);
    }

    #[test]
    fn merge_is_commutative() {
        let mut a = SpanStatistics::new();
        a.add(
            &[mention(0, 5, "A")],
            &[mention(0, 5, "A"), mention(9, 12, "B")],
            MatchKey::SpanAndLabel,
        );
        let mut b = SpanStatistics::new();
        b.add(&[mention(3, 7, "B")], &[], MatchKey::SpanAndLabel);

        let mut ab = a.clone();
        ab.merge(&b);
        let mut ba = b.clone();
        ba.merge(&a);
        assert_eq!(ab, ba);
        assert_eq!(ab.gold_count(), 2);
        assert_eq!(ab.system_count(), 2);
    }
}

//! Command-line surface for the evaluation binary.

use crate::{Error, Result};
use clap::Parser;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use std::str::FromStr;

/// Arguments for `clinspan-eval`.
#[derive(Debug, Parser)]
#[command(name = "clinspan-eval")]
#[command(
    version,
    about = "Cross-validated evaluation of clinical span annotators",
    long_about = "Runs n-fold cross-validation of the event tagger.\n\
                  With --text and --xml, prints the fold plan over the corpus \
                  layout; without them, runs the built-in demonstration corpus \
                  with the baseline classifier."
)]
pub struct Args {
    /// Raw text root directory (contains doc<N> subdirectories).
    #[arg(long = "text")]
    pub raw_text_root: Option<PathBuf>,

    /// Gold annotation root directory (contains Set<NN> subdirectories).
    #[arg(long = "xml")]
    pub gold_root: Option<PathBuf>,

    /// Document sets to evaluate, e.g. "1-5,8,12-14".
    #[arg(long = "sets", default_value = "1-4")]
    pub sets: DocumentSets,

    /// Number of cross-validation folds.
    #[arg(long, default_value_t = 4)]
    pub folds: usize,

    /// Require labels to match as well as spans.
    #[arg(long)]
    pub labeled: bool,

    /// Run folds in parallel.
    #[arg(long)]
    pub parallel: bool,

    /// Print the aggregate statistics as JSON.
    #[arg(long)]
    pub json: bool,
}

/// A document-set selector: comma-separated integers and inclusive ranges,
/// expanded to an explicit sorted list.
///
/// # Example
///
/// ```
/// use clinspan::cli::DocumentSets;
///
/// let sets: DocumentSets = "12-14,1-5,8,3".parse().unwrap();
/// assert_eq!(sets.list(), &[1, 2, 3, 4, 5, 8, 12, 13, 14]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSets(Vec<u32>);

impl DocumentSets {
    /// The expanded, sorted, deduplicated set numbers.
    #[must_use]
    pub fn list(&self) -> &[u32] {
        &self.0
    }
}

impl FromStr for DocumentSets {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        static RANGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)-(\d+)$").unwrap());

        let mut sets = Vec::new();
        for part in s.split(',').map(str::trim) {
            if let Some(captures) = RANGE.captures(part) {
                let begin: u32 = captures[1]
                    .parse()
                    .map_err(|_| bad_selector(part))?;
                let end: u32 = captures[2]
                    .parse()
                    .map_err(|_| bad_selector(part))?;
                if begin > end {
                    return Err(bad_selector(part));
                }
                sets.extend(begin..=end);
            } else {
                sets.push(part.parse().map_err(|_| bad_selector(part))?);
            }
        }
        if sets.is_empty() {
            return Err(Error::invalid_input("empty document-set selector"));
        }
        sets.sort_unstable();
        sets.dedup();
        Ok(DocumentSets(sets))
    }
}

fn bad_selector(part: &str) -> Error {
    Error::invalid_input(format!(
        "bad document-set selector component {:?} (expected an integer or a range like 3-7)",
        part
    ))
}

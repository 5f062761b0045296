//! Cross-validated evaluation CLI.
//!
//! Without corpus directories, runs the event tagger with the baseline
//! classifier over a built-in demonstration corpus:
//!
//! ```text
//! clinspan-eval --sets 1-4 --folds 4
//! ```
//!
//! With `--text`/`--xml`, checks the corpus layout and prints the fold plan
//! (the gold XML parser lives upstream, so no training happens here):
//!
//! ```text
//! clinspan-eval --text corpus/text --xml corpus/gold --sets 1-5,8
//! ```

use clap::Parser;
use clinspan::annotators::EventTagger;
use clinspan::cli::Args;
use clinspan::eval::{partition_folds, CrossValidation, FoldEval, FoldRunner, MatchKey};
use clinspan::{
    copy_mentions, gold_set_directory, BaselineClassifier, BaselineTrainer, Document,
    EntityMention, Event, Mention, MentionKind, Result, Span, Token, PART_OF_SPEECH,
};
use std::collections::BTreeMap;
use std::path::Path;
use std::process;

fn main() {
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let match_key = if args.labeled {
        MatchKey::SpanAndLabel
    } else {
        MatchKey::Span
    };

    if let (Some(text_root), Some(gold_root)) = (&args.raw_text_root, &args.gold_root) {
        return plan(text_root, gold_root, args);
    }

    let corpus = demo_corpus(args.sets.list());
    let mut validation = CrossValidation::new(DemoRunner { corpus }, args.folds)
        .with_match_key(match_key);
    if args.parallel {
        validation = validation.with_parallel();
    }
    let run = validation.run(args.sets.list())?;

    for (i, stats) in run.fold_statistics.iter().enumerate() {
        println!("--------------------");
        println!("Fold {}", i);
        print!("{}", stats);
    }
    println!("--------------------");
    println!("OVERALL");
    print!("{}", run.aggregate);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&run.aggregate).expect("stats serialize"));
    }
    if !run.diagnostics.gold_only().is_empty() {
        println!("DROPPED:");
        run.diagnostics.write_gold_only(&mut std::io::stdout().lock())?;
    }
    if !run.diagnostics.system_only().is_empty() {
        println!("ADDED:");
        run.diagnostics.write_system_only(&mut std::io::stdout().lock())?;
    }
    Ok(())
}

/// Check the corpus layout and print the fold plan.
fn plan(text_root: &Path, gold_root: &Path, args: &Args) -> Result<()> {
    for &set in args.sets.list() {
        let text_dir = text_root.join(format!("doc{}", set));
        let gold_dir = gold_root.join(gold_set_directory(set));
        let documents = match std::fs::read_dir(&text_dir) {
            Ok(entries) => entries.count(),
            Err(e) => {
                eprintln!("warning: cannot read {}: {}", text_dir.display(), e);
                0
            }
        };
        println!(
            "set {:>3}: {} documents in {} (gold: {})",
            set,
            documents,
            text_dir.display(),
            gold_dir.display()
        );
    }
    let folds = partition_folds(args.sets.list(), args.folds)?;
    for (i, fold) in folds.iter().enumerate() {
        println!("fold {}: train {:?} test {:?}", i, fold.train, fold.test);
    }
    Ok(())
}

/// Event-tagger fold runner over an in-memory corpus keyed by set number.
struct DemoRunner {
    corpus: BTreeMap<u32, Vec<Document>>,
}

impl FoldRunner for DemoRunner {
    type Key = u32;
    type Model = BaselineClassifier;

    fn train(&self, keys: &[u32]) -> Result<BaselineClassifier> {
        let tagger = EventTagger::new();
        let mut trainer = BaselineTrainer::new();
        for key in keys {
            for doc in self.corpus.get(key).map_or(&[][..], Vec::as_slice) {
                tagger.write_training_data(doc, &mut trainer)?;
            }
        }
        Ok(trainer.into_classifier())
    }

    fn test(&self, model: &BaselineClassifier, keys: &[u32], eval: &mut FoldEval) -> Result<()> {
        let tagger = EventTagger::new();
        for key in keys {
            for gold_doc in self.corpus.get(key).map_or(&[][..], Vec::as_slice) {
                // Entities are gold at test time; events are predicted fresh.
                let mut system_doc = Document::new(gold_doc.text());
                system_doc.set_sentences(gold_doc.sentences().to_vec());
                system_doc.set_tokens(gold_doc.tokens().to_vec());
                copy_mentions(gold_doc, &mut system_doc, MentionKind::Entity);
                tagger.annotate(&mut system_doc, model)?;

                eval.evaluate_document(
                    gold_doc.text(),
                    &gold_doc.mentions(MentionKind::Event),
                    &system_doc.mentions(MentionKind::Event),
                );
            }
        }
        Ok(())
    }
}

/// A small clinical-note corpus with gold events and entities, two
/// documents per set.
fn demo_corpus(sets: &[u32]) -> BTreeMap<u32, Vec<Document>> {
    let notes: [(&str, &[&str], &[&str]); 4] = [
        (
            "The patient reports chest pain . Denies cough .",
            &["pain", "Denies", "cough"],
            &["chest pain", "cough"],
        ),
        (
            "Chest pain resolved after treatment .",
            &["pain", "resolved", "treatment"],
            &["Chest pain"],
        ),
        (
            "She denies fever and reports headache .",
            &["denies", "fever", "headache"],
            &["fever", "headache"],
        ),
        (
            "No cough today . Headache improved .",
            &["cough", "Headache", "improved"],
            &["cough", "Headache"],
        ),
    ];

    let mut corpus = BTreeMap::new();
    for (i, &set) in sets.iter().enumerate() {
        let a = &notes[i % notes.len()];
        let b = &notes[(i + 1) % notes.len()];
        corpus.insert(set, vec![make_note(a), make_note(b)]);
    }
    corpus
}

/// Build one document from whitespace-separated text, marking the given
/// words as gold events and the given phrases as gold entities.
fn make_note((text, event_words, entity_phrases): &(&str, &[&str], &[&str])) -> Document {
    let mut doc = Document::new(*text);

    let mut tokens = Vec::new();
    let mut sentences = Vec::new();
    let mut sentence_begin = 0;
    let mut begin = 0;
    for word in text.split(' ') {
        let span = Span::new(begin, begin + word.len());
        let pos = if word.chars().all(|c| !c.is_alphabetic()) {
            "."
        } else if word.ends_with('s') {
            "VBZ"
        } else {
            "NN"
        };
        tokens.push(Token::new(span, word).with_attribute(PART_OF_SPEECH, pos));
        if word == "." {
            sentences.push(Span::new(sentence_begin, span.end));
            sentence_begin = span.end + 1;
        }
        begin += word.len() + 1;
    }
    if sentence_begin < text.len() {
        sentences.push(Span::new(sentence_begin, text.len()));
    }
    doc.set_tokens(tokens);
    doc.set_sentences(sentences);

    for word in *event_words {
        if let Some(at) = text.find(word) {
            doc.add_event(Event::new(Mention::new(
                Span::new(at, at + word.len()),
                "EVENT",
            )));
        }
    }
    for phrase in *entity_phrases {
        if let Some(at) = text.find(phrase) {
            doc.add_entity(EntityMention::new(Mention::new(
                Span::new(at, at + phrase.len()),
                "FINDING",
            )));
        }
    }
    doc
}

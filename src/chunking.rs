//! The span codec: between mentions and per-token BIO tag sequences.
//!
//! `encode` turns a set of non-overlapping, span-ordered mentions into one
//! tag per token; `decode` reconstructs mentions from a (possibly
//! ill-formed) predicted tag sequence.
//!
//! Coverage is tested by character overlap, not containment: gold mention
//! boundaries are character offsets from human annotation and need not fall
//! on token boundaries, so a mention covers every token it shares at least
//! one character with.
//!
//! # Example
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
//! let tags = chunking::encode(&tokens, &mentions).unwrap();
//! assert_eq!(
//!     tags.iter().map(|t| t.to_string()).collect::<Vec<_>>(),
//!     vec!["B-FINDING", "I-FINDING", "O"]
//! );
//! assert_eq!(chunking::decode(&tokens, &tags).unwrap(), mentions);
//! ```

use crate::{Error, Mention, Result, Span, Tag, Token};

/// Encode mentions as one tag per token.
///
/// The first token a mention covers receives `Begin`, subsequent covered
/// tokens `Inside`, uncovered tokens `Outside`.
///
/// # Errors
///
/// `Error::MentionOverlap` if `mentions` is not sorted in span order or two
/// mentions overlap. Both are caller bugs, reported immediately.
pub fn encode(tokens: &[Token], mentions: &[Mention]) -> Result<Vec<Tag>> {
    for pair in mentions.windows(2) {
        if pair[1].span < pair[0].span {
            return Err(Error::mention_overlap(format!(
                "mentions out of span order: {} precedes {}",
                pair[0].span, pair[1].span
            )));
        }
        if pair[0].span.overlaps(&pair[1].span) {
            return Err(Error::mention_overlap(format!(
                "mentions {} and {} overlap",
                pair[0].span, pair[1].span
            )));
        }
    }

    let mut tags = Vec::with_capacity(tokens.len());
    let mut current = 0;
    let mut started = false;
    for token in tokens {
        // Mentions ending at or before this token can never cover a later
        // token, so the cursor only moves forward.
        while current < mentions.len() && mentions[current].span.end <= token.span.begin {
            current += 1;
            started = false;
        }
        match mentions.get(current) {
            Some(mention) if mention.span.overlaps(&token.span) => {
                if started {
                    tags.push(Tag::Inside(mention.label.clone()));
                } else {
                    tags.push(Tag::Begin(mention.label.clone()));
                    started = true;
                }
            }
            _ => tags.push(Tag::Outside),
        }
    }
    Ok(tags)
}

/// Decode a tag sequence back into mentions.
///
/// The scan keeps one open-mention accumulator. `Begin` closes any open
/// mention and opens a new one; `Outside` closes; `Inside` extends the open
/// mention when its label matches. An `Inside` with no matching open mention
/// (an orphan, routine in predicted sequences) opens a new mention as if it
/// were `Begin`. Decoding never fails on tag content.
///
/// A closed mention spans from the begin offset of its first covered token
/// to the end offset of its last.
///
/// # Errors
///
/// `Error::InvalidInput` if `tags` and `tokens` differ in length.
pub fn decode(tokens: &[Token], tags: &[Tag]) -> Result<Vec<Mention>> {
    if tokens.len() != tags.len() {
        return Err(Error::invalid_input(format!(
            "token count ({}) != tag count ({})",
            tokens.len(),
            tags.len()
        )));
    }

    let mut mentions = Vec::new();
    // (first token index, last token index, label)
    let mut open: Option<(usize, usize, String)> = None;
    let close = |open: &mut Option<(usize, usize, String)>, out: &mut Vec<Mention>| {
        if let Some((first, last, label)) = open.take() {
            let span = Span::new(tokens[first].span.begin, tokens[last].span.end);
            out.push(Mention::new(span, label));
        }
    };

    for (i, tag) in tags.iter().enumerate() {
        match tag {
            Tag::Outside => close(&mut open, &mut mentions),
            Tag::Begin(label) => {
                close(&mut open, &mut mentions);
                open = Some((i, i, label.clone()));
            }
            Tag::Inside(label) => match open {
                Some((_, ref mut last, ref open_label)) if open_label == label => *last = i,
                _ => {
                    close(&mut open, &mut mentions);
                    open = Some((i, i, label.clone()));
                }
            },
        }
    }
    close(&mut open, &mut mentions);
    Ok(mentions)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Tokens with single-space gaps, and mentions built from random disjoint
    /// runs of consecutive tokens, which is exactly the domain where the
    /// round-trip law holds.
    fn tokens_and_mentions() -> impl Strategy<Value = (Vec<Token>, Vec<Mention>)> {
        (2usize..12).prop_flat_map(|n| {
            let tokens: Vec<Token> = (0..n)
                .map(|i| Token::new(Span::new(3 * i, 3 * i + 2), "t"))
                .collect();
            let labels = proptest::collection::vec(prop_oneof!["EVENT", "DISORDER", "DRUG"], n);
            let picks = proptest::collection::vec(0u8..3, n);
            (Just(tokens), labels, picks).prop_map(|(tokens, labels, picks)| {
                let mut mentions: Vec<Mention> = Vec::new();
                let mut run_start: Option<usize> = None;
                for i in 0..tokens.len() {
                    // pick 0 = outside, 1 = continue/open run, 2 = open new run
                    match picks[i] {
                        0 => {
                            if let Some(s) = run_start.take() {
                                mentions.push(Mention::new(
                                    Span::new(tokens[s].span.begin, tokens[i - 1].span.end),
                                    labels[s].clone(),
                                ));
                            }
                        }
                        1 => {
                            if run_start.is_none() {
                                run_start = Some(i);
                            }
                        }
                        _ => {
                            if let Some(s) = run_start.take() {
                                mentions.push(Mention::new(
                                    Span::new(tokens[s].span.begin, tokens[i - 1].span.end),
                                    labels[s].clone(),
                                ));
                            }
                            run_start = Some(i);
                        }
                    }
                }
                if let Some(s) = run_start {
                    let last = tokens.len() - 1;
                    mentions.push(Mention::new(
                        Span::new(tokens[s].span.begin, tokens[last].span.end),
                        labels[s].clone(),
                    ));
                }
                (tokens, mentions)
            })
        })
    }

    proptest! {
        #[test]
        fn encode_decode_roundtrip((tokens, mentions) in tokens_and_mentions()) {
            let tags = encode(&tokens, &mentions).unwrap();
            prop_assert_eq!(tags.len(), tokens.len());
            let decoded = decode(&tokens, &tags).unwrap();
            prop_assert_eq!(decoded, mentions);
        }

        #[test]
        fn decode_is_stable((tokens, mentions) in tokens_and_mentions()) {
            // Re-encoding decoded mentions reproduces a consistent tag
            // sequence; decoding that again changes nothing.
            let tags = encode(&tokens, &mentions).unwrap();
            let decoded = decode(&tokens, &tags).unwrap();
            let tags2 = encode(&tokens, &decoded).unwrap();
            let decoded2 = decode(&tokens, &tags2).unwrap();
            prop_assert_eq!(decoded2, decoded);
        }
    }
}

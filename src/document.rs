//! In-memory annotation store for one document.
//!
//! Owns the text, sentence spans, tokens and typed annotation layers, and
//! answers the covered-by queries the annotators need. All layers are kept
//! sorted in span order. Mutation happens only between pipeline stages;
//! during evaluation every read is immutable, so independent windows may be
//! processed concurrently.

use crate::{Mention, MentionKind, Span, Token};
use serde::{Deserialize, Serialize};

/// Properties attached to a clinical event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventProperties {
    /// Event category (e.g. `DISEASE_DISORDER`).
    pub category: Option<String>,
    /// Contextual modality (e.g. `ACTUAL`, `HYPOTHETICAL`).
    pub contextual_modality: Option<String>,
    /// Contextual aspect.
    pub contextual_aspect: Option<String>,
    /// Degree qualifier.
    pub degree: Option<String>,
    /// Relation of the event to the document creation time
    /// (`BEFORE`, `OVERLAP`, `AFTER`, `BEFORE/OVERLAP`).
    pub doc_time_rel: Option<String>,
    /// Permanence qualifier.
    pub permanence: Option<String>,
    /// Aspect qualifier.
    pub aspect: Option<String>,
    /// Polarity: `+1` asserted, `-1` negated, `0` cleared.
    pub polarity: i32,
}

/// An event mention plus its properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// The span annotation.
    pub mention: Mention,
    /// The event's properties.
    pub properties: EventProperties,
}

impl Event {
    /// Create an event with default properties.
    #[must_use]
    pub fn new(mention: Mention) -> Self {
        Self {
            mention,
            properties: EventProperties::default(),
        }
    }
}

/// An entity mention plus the facts carried by its gold record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMention {
    /// The span annotation.
    pub mention: Mention,
    /// Polarity: `+1` asserted, `-1` negated.
    pub polarity: i32,
    /// Ontology code (CUI or RxNorm code) when the gold record carried one.
    pub code: Option<String>,
}

impl EntityMention {
    /// Create an asserted entity mention with no code.
    #[must_use]
    pub fn new(mention: Mention) -> Self {
        Self {
            mention,
            polarity: 1,
            code: None,
        }
    }
}

/// A temporal expression mention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeMention {
    /// The span annotation.
    pub mention: Mention,
    /// Temporal class (e.g. `DATE`, `DURATION`) when annotated.
    pub class: Option<String>,
}

/// A typed link between two annotated records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Relation kind.
    pub kind: RelationKind,
    /// Record id of the source annotation.
    pub source_id: String,
    /// Record id of the target annotation.
    pub target_id: String,
    /// Relation type label when annotated.
    pub relation_type: Option<String>,
}

/// The relation layers carried by the gold corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationKind {
    /// Aspectual link between events.
    Aspectual,
    /// Temporal link between events or times.
    Temporal,
}

/// One document: text plus sentence, token and annotation layers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    text: String,
    sentences: Vec<Span>,
    tokens: Vec<Token>,
    entities: Vec<EntityMention>,
    events: Vec<Event>,
    times: Vec<TimeMention>,
    relations: Vec<Relation>,
}

impl Document {
    /// Create a document over the given text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// The document text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Set the sentence spans. Kept sorted in span order.
    pub fn set_sentences(&mut self, mut sentences: Vec<Span>) {
        sentences.sort();
        self.sentences = sentences;
    }

    /// Set the token layer. Kept sorted in span order.
    pub fn set_tokens(&mut self, mut tokens: Vec<Token>) {
        tokens.sort_by_key(|t| t.span);
        self.tokens = tokens;
    }

    /// Sentence spans in span order.
    #[must_use]
    pub fn sentences(&self) -> &[Span] {
        &self.sentences
    }

    /// All tokens in span order.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The tokens fully contained in `span` (e.g. one sentence's tokens).
    #[must_use]
    pub fn tokens_in(&self, span: Span) -> &[Token] {
        let lo = self.tokens.partition_point(|t| t.span.begin < span.begin);
        let hi = self.tokens.partition_point(|t| t.span.begin < span.end);
        let slice = &self.tokens[lo..hi];
        // Tokens never straddle sentence boundaries, but clip defensively.
        let end = slice.partition_point(|t| t.span.end <= span.end);
        &slice[..end]
    }

    /// Add an entity mention, keeping span order.
    pub fn add_entity(&mut self, entity: EntityMention) {
        let at = self
            .entities
            .partition_point(|e| e.mention.span <= entity.mention.span);
        self.entities.insert(at, entity);
    }

    /// Add an event, keeping span order.
    pub fn add_event(&mut self, event: Event) {
        let at = self
            .events
            .partition_point(|e| e.mention.span <= event.mention.span);
        self.events.insert(at, event);
    }

    /// Add a time mention, keeping span order.
    pub fn add_time(&mut self, time: TimeMention) {
        let at = self
            .times
            .partition_point(|t| t.mention.span <= time.mention.span);
        self.times.insert(at, time);
    }

    /// Add a relation.
    pub fn add_relation(&mut self, relation: Relation) {
        self.relations.push(relation);
    }

    /// All entity mentions in span order.
    #[must_use]
    pub fn entities(&self) -> &[EntityMention] {
        &self.entities
    }

    /// All events in span order.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Mutable access to the events (the doc-time annotator writes predicted
    /// relations back onto them).
    #[must_use]
    pub fn events_mut(&mut self) -> &mut [Event] {
        &mut self.events
    }

    /// All time mentions in span order.
    #[must_use]
    pub fn times(&self) -> &[TimeMention] {
        &self.times
    }

    /// All relations, in insertion order.
    #[must_use]
    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// The plain mentions of one layer, in span order.
    #[must_use]
    pub fn mentions(&self, kind: MentionKind) -> Vec<Mention> {
        match kind {
            MentionKind::Entity => self.entities.iter().map(|e| e.mention.clone()).collect(),
            MentionKind::Event => self.events.iter().map(|e| e.mention.clone()).collect(),
            MentionKind::Time => self.times.iter().map(|t| t.mention.clone()).collect(),
        }
    }

    /// The mentions of one layer fully contained in `span`, in span order.
    #[must_use]
    pub fn mentions_in(&self, kind: MentionKind, span: Span) -> Vec<Mention> {
        self.mentions(kind)
            .into_iter()
            .filter(|m| span.contains(&m.span))
            .collect()
    }

    /// Remove every annotation of one layer.
    pub fn clear_mentions(&mut self, kind: MentionKind) {
        match kind {
            MentionKind::Entity => self.entities.clear(),
            MentionKind::Event => self.events.clear(),
            MentionKind::Time => self.times.clear(),
        }
    }
}

/// Copy one annotation layer from `from` into `to`.
///
/// Used when an annotation kind should be gold at test time: the evaluated
/// annotator consumes another layer (event tagging consumes entity
/// mentions) and that layer is seeded from the gold document rather than
/// produced by an upstream system component.
pub fn copy_mentions(from: &Document, to: &mut Document, kind: MentionKind) {
    match kind {
        MentionKind::Entity => {
            for entity in from.entities() {
                to.add_entity(entity.clone());
            }
        }
        MentionKind::Event => {
            for event in from.events() {
                to.add_event(event.clone());
            }
        }
        MentionKind::Time => {
            for time in from.times() {
                to.add_time(time.clone());
            }
        }
    }
}

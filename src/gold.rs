//! Mapping parsed gold-standard records into document annotation layers.
//!
//! The XML parser itself lives upstream; this module consumes its output
//! shape — records with an id, an optional span, a type name, and
//! string/boolean/annotation-reference slots — and turns each record into
//! typed document facts.
//!
//! Every slot present on a record must be consumed by the mapping. A
//! leftover slot after mapping means the corpus carries information this
//! pipeline silently ignores, which is a format-contract violation and is
//! reported, never dropped.

use crate::{
    Document, EntityMention, Error, Event, EventProperties, Mention, Relation, RelationKind,
    Result, Span, TimeMention,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// A parsed gold-standard annotation record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoldRecord {
    /// Unique record id.
    pub id: String,
    /// Character offsets, absent for document-level records.
    pub span: Option<Span>,
    /// Annotation type name (`EVENT`, `TIMEX3`, entity type names, ...).
    pub record_type: String,
    /// String-valued slots.
    pub string_slots: BTreeMap<String, String>,
    /// Boolean-valued slots.
    pub boolean_slots: BTreeMap<String, bool>,
    /// Annotation-reference slots, by referenced record id.
    pub annotation_slots: BTreeMap<String, String>,
}

impl GoldRecord {
    /// Create a record with the given id and type.
    #[must_use]
    pub fn new(id: impl Into<String>, record_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            record_type: record_type.into(),
            ..Self::default()
        }
    }

    /// Attach a span, builder style.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Attach a string slot, builder style.
    #[must_use]
    pub fn with_string_slot(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.string_slots.insert(key.into(), value.into());
        self
    }

    /// Attach a boolean slot, builder style.
    #[must_use]
    pub fn with_boolean_slot(mut self, key: impl Into<String>, value: bool) -> Self {
        self.boolean_slots.insert(key.into(), value);
        self
    }

    /// Attach an annotation-reference slot, builder style.
    #[must_use]
    pub fn with_annotation_slot(mut self, key: impl Into<String>, id: impl Into<String>) -> Self {
        self.annotation_slots.insert(key.into(), id.into());
        self
    }
}

/// Corpus entity type names and the mention labels they map to.
const ENTITY_TYPES: &[(&str, &str)] = &[
    ("Anatomical_site", "ANATOMICAL_SITE"),
    ("Disease_Disorder", "DISORDER"),
    ("Medications/Drugs", "DRUG"),
    ("Procedure", "PROCEDURE"),
    ("Sign_symptom", "FINDING"),
];

/// Map gold records into the document's annotation layers.
///
/// # Errors
///
/// - `Error::UnrecognizedRecordType` for a type name the mapping does not
///   know.
/// - `Error::Record` for malformed records: a span-anchored type without a
///   span, an invalid `polarity` or `Status` value.
/// - `Error::UnconsumedSlots` when a record carries slots the mapping did
///   not use.
///
/// All are fatal for the document; the caller decides whether to skip the
/// document or abort the run.
pub fn map_records(records: &[GoldRecord], doc: &mut Document) -> Result<()> {
    for record in records {
        map_record(record, doc)?;
    }
    Ok(())
}

fn map_record(record: &GoldRecord, doc: &mut Document) -> Result<()> {
    // Working copies: slots are removed as they are consumed, so whatever
    // remains at the end is a contract violation.
    let mut strings = record.string_slots.clone();
    let mut booleans = record.boolean_slots.clone();
    let mut annotations = record.annotation_slots.clone();

    if let Some(&(_, label)) = ENTITY_TYPES
        .iter()
        .find(|(name, _)| *name == record.record_type)
    {
        let span = require_span(record)?;
        let negated = booleans.remove("Negation").unwrap_or(false);
        if let Some(status) = strings.remove("Status") {
            match status.as_str() {
                "HistoryOf" | "FamilyHistoryOf" | "Possible" => {}
                other => {
                    return Err(Error::record(format!(
                        "{}: unknown entity status {:?}",
                        record.id, other
                    )))
                }
            }
        }
        let code = strings
            .remove("AssociateCode")
            .or_else(|| strings.remove("associatedCode"));
        doc.add_entity(EntityMention {
            mention: Mention::new(span, label),
            polarity: if negated { -1 } else { 1 },
            code,
        });
    } else {
        match record.record_type.as_str() {
            "EVENT" => {
                let span = require_span(record)?;
                let properties = EventProperties {
                    category: strings.remove("type"),
                    contextual_modality: strings.remove("contextualmoduality"),
                    contextual_aspect: strings.remove("contextualaspect"),
                    degree: strings.remove("degree"),
                    doc_time_rel: strings.remove("DocTimeRel"),
                    permanence: strings.remove("permanence"),
                    aspect: None,
                    polarity: parse_polarity(record, strings.remove("polarity"))?,
                };
                doc.add_event(Event {
                    mention: Mention::new(span, "EVENT"),
                    properties,
                });
            }
            "TIMEX3" => {
                let span = require_span(record)?;
                doc.add_time(TimeMention {
                    mention: Mention::new(span, "TIMEX3"),
                    class: strings.remove("class"),
                });
            }
            // Document-level time anchors carry no slots of their own.
            "DOCTIME" | "SECTIONTIME" => {}
            "ALINK" | "TLINK" => {
                let kind = if record.record_type == "ALINK" {
                    RelationKind::Aspectual
                } else {
                    RelationKind::Temporal
                };
                let source_id = annotations.remove("Event").ok_or_else(|| {
                    Error::record(format!("{}: {} without Event slot", record.id, kind_name(kind)))
                })?;
                let target_id = annotations.remove("related_to").ok_or_else(|| {
                    Error::record(format!(
                        "{}: {} without related_to slot",
                        record.id,
                        kind_name(kind)
                    ))
                })?;
                doc.add_relation(Relation {
                    kind,
                    source_id,
                    target_id,
                    relation_type: strings.remove("Relationtype"),
                });
            }
            other => {
                return Err(Error::unrecognized_record_type(format!(
                    "{}: {:?}",
                    record.id, other
                )))
            }
        }
    }

    let remaining: Vec<&String> = strings
        .keys()
        .chain(booleans.keys())
        .chain(annotations.keys())
        .collect();
    if !remaining.is_empty() {
        return Err(Error::unconsumed_slots(format!(
            "{} ({}) has unprocessed slot(s) {:?}",
            record.record_type, record.id, remaining
        )));
    }
    Ok(())
}

fn require_span(record: &GoldRecord) -> Result<Span> {
    record.span.ok_or_else(|| {
        Error::record(format!(
            "{} record {} has no span",
            record.record_type, record.id
        ))
    })
}

fn parse_polarity(record: &GoldRecord, value: Option<String>) -> Result<i32> {
    match value.as_deref() {
        None | Some("POS") => Ok(1),
        Some("NEG") => Ok(-1),
        Some(other) => Err(Error::record(format!(
            "{}: invalid polarity {:?}",
            record.id, other
        ))),
    }
}

fn kind_name(kind: RelationKind) -> &'static str {
    match kind {
        RelationKind::Aspectual => "ALINK",
        RelationKind::Temporal => "TLINK",
    }
}

/// The gold directory paired with raw-text directory `doc<n>`: `Set<NN>`,
/// zero-padded to two digits.
#[must_use]
pub fn gold_set_directory(set: u32) -> String {
    format!("Set{:02}", set)
}

/// Extract the set number from a raw-text directory name (`doc12` → `12`).
///
/// # Errors
///
/// `Error::InvalidInput` for any other naming.
pub fn set_number_from_directory(name: &str) -> Result<u32> {
    static DOC_DIR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^doc(\d+)$").unwrap());
    let captures = DOC_DIR
        .captures(name)
        .ok_or_else(|| Error::invalid_input(format!("unrecognized directory naming: {:?}", name)))?;
    captures[1]
        .parse()
        .map_err(|_| Error::invalid_input(format!("set number out of range: {:?}", name)))
}

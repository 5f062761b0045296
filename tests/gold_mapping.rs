//! Gold record mapping and the slot-consumption contract.

use clinspan::{
    map_records, Document, Error, GoldRecord, MentionKind, RelationKind, Span,
};

#[test]
fn full_document_maps_all_layers() {
    let text = "Chest pain resolved last week";
    let records = vec![
        GoldRecord::new("E1", "EVENT")
            .with_span(Span::new(6, 10))
            .with_string_slot("type", "SIGN_SYMPTOM")
            .with_string_slot("DocTimeRel", "BEFORE")
            .with_string_slot("polarity", "POS"),
        GoldRecord::new("N1", "Sign_symptom")
            .with_span(Span::new(0, 10))
            .with_boolean_slot("Negation", false),
        GoldRecord::new("T1", "TIMEX3")
            .with_span(Span::new(20, 29))
            .with_string_slot("class", "DATE"),
        GoldRecord::new("L1", "TLINK")
            .with_annotation_slot("Event", "E1")
            .with_annotation_slot("related_to", "T1")
            .with_string_slot("Relationtype", "BEFORE"),
        GoldRecord::new("D1", "DOCTIME"),
    ];

    let mut doc = Document::new(text);
    map_records(&records, &mut doc).unwrap();

    assert_eq!(doc.mentions(MentionKind::Event).len(), 1);
    assert_eq!(doc.events()[0].properties.doc_time_rel.as_deref(), Some("BEFORE"));
    assert_eq!(doc.events()[0].properties.polarity, 1);

    assert_eq!(doc.entities()[0].mention.label, "FINDING");
    assert_eq!(doc.entities()[0].polarity, 1);

    assert_eq!(doc.times()[0].class.as_deref(), Some("DATE"));

    assert_eq!(doc.relations().len(), 1);
    assert_eq!(doc.relations()[0].kind, RelationKind::Temporal);
    assert_eq!(doc.relations()[0].source_id, "E1");
}

#[test]
fn deliberately_unhandled_slot_raises_data_violation() {
    // One extra string slot the mapping knows nothing about: the record
    // must be rejected, not silently half-imported.
    let record = GoldRecord::new("E9", "EVENT")
        .with_span(Span::new(0, 4))
        .with_string_slot("DocTimeRel", "AFTER")
        .with_string_slot("reviewer_note", "check this one");

    let mut doc = Document::new("pain");
    let err = map_records(&[record], &mut doc).unwrap_err();
    let message = err.to_string();
    assert!(matches!(err, Error::UnconsumedSlots(_)));
    assert!(message.contains("reviewer_note"));
    assert!(message.contains("E9"));
}

#[test]
fn unhandled_boolean_and_annotation_slots_are_also_caught() {
    let with_boolean = GoldRecord::new("T3", "TIMEX3")
        .with_span(Span::new(0, 4))
        .with_boolean_slot("approximate", true);
    let mut doc = Document::new("noon");
    assert!(matches!(
        map_records(&[with_boolean], &mut doc),
        Err(Error::UnconsumedSlots(_))
    ));

    let with_annotation = GoldRecord::new("L3", "ALINK")
        .with_annotation_slot("Event", "E1")
        .with_annotation_slot("related_to", "E2")
        .with_annotation_slot("witness", "E3");
    let mut doc = Document::new("");
    assert!(matches!(
        map_records(&[with_annotation], &mut doc),
        Err(Error::UnconsumedSlots(_))
    ));
}

#[test]
fn unknown_record_type_names_the_type() {
    let record = GoldRecord::new("X1", "ANNOTATION_V2").with_span(Span::new(0, 1));
    let mut doc = Document::new("x");
    let err = map_records(&[record], &mut doc).unwrap_err();
    assert!(err.to_string().contains("ANNOTATION_V2"));
}

#[test]
fn later_records_are_not_applied_after_a_failure() {
    let records = vec![
        GoldRecord::new("B1", "BOGUS"),
        GoldRecord::new("E1", "EVENT").with_span(Span::new(0, 4)),
    ];
    let mut doc = Document::new("pain");
    assert!(map_records(&records, &mut doc).is_err());
    // The failing record aborts the document's mapping pass.
    assert!(doc.events().is_empty());
}

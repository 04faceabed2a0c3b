//! End-to-end tests for schema loading and registration.
//!
//! Loads relations from JSON, binds typed properties against them and
//! checks what the frozen registry reports.

mod common;

use std::sync::Arc;
use std::thread;

use common::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use propgraph_orm::schema::{autocreate_description, describe_ordinal, CASCADING_DESCRIPTIONS};
use propgraph_orm::{
    Autocreatable, Autocreation, Cardinality, CollectionProperty, Error, GraphStore, MemoryStore,
    Readable, SchemaConfig, SuperUserContext, TxMode, ValueProperty, Writable,
};

const SCHEMA_JSON: &str = r#"{
    "types": ["Folder", "Page", "Tag"],
    "relations": [
        { "id": "folders", "type": "CONTAINS", "source": "Folder", "target": "Folder" },
        { "id": "tags", "type": "TAGGED", "source": "Page", "target": "Tag",
          "cardinality": "manyToMany", "autocreate": "always" },
        { "id": "home", "type": "LIVES_IN", "source": "Page", "target": "Folder",
          "cardinality": "manyToOne", "autocreate": "targetToSource" }
    ]
}"#;

// ============================================================================
// 1. Loading from JSON
// ============================================================================

#[test]
fn test_json_schema_binds_typed_properties() {
    let config = SchemaConfig::from_json(SCHEMA_JSON).unwrap();
    let mut builder = config.into_builder().unwrap();

    let children: Arc<CollectionProperty<Folder, Folder>> =
        CollectionProperty::register(&mut builder, "children", "folders", identity()).unwrap();
    let tags: Arc<CollectionProperty<Page, Tag>> =
        CollectionProperty::register(&mut builder, "tags", "tags", identity()).unwrap();
    ValueProperty::<Page>::register(&mut builder, "title").unwrap();
    let registry = builder.build();

    assert_eq!(registry.types(), vec!["Folder", "Page", "Tag"]);
    let folders = registry.relation("folders").unwrap();
    assert_eq!(folders.cardinality, Cardinality::OneToMany);
    assert_eq!(folders.autocreation, Autocreation::None);

    let page_props: Vec<(&str, &str)> =
        registry.properties_of("Page").iter().map(|p| (p.name(), p.type_name())).collect();
    assert_eq!(page_props, vec![("tags", "collection"), ("title", "value")]);

    assert!(!children.do_autocreate());
    assert_eq!(children.autocreate_flag_name(), "none");
    assert!(tags.do_autocreate());
    assert_eq!(tags.autocreate_flag_name(), "always");

    let home = registry.relation("home").unwrap();
    assert_eq!(autocreate_description(Some(&**home)), "targetToSource");
    let ids: Vec<&str> = registry.relations_of("Folder").iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["folders", "home"]);
}

#[test]
fn test_json_round_trip_keeps_relations() {
    let config = SchemaConfig::from_json(SCHEMA_JSON).unwrap();
    let again = SchemaConfig::from_json(&config.to_json().unwrap()).unwrap();
    assert_eq!(again, config);
}

// ============================================================================
// 2. Configuration errors surface at registration
// ============================================================================

#[test]
fn test_unknown_end_type_fails_to_load() {
    let json = r#"{
        "types": ["Folder"],
        "relations": [
            { "id": "files", "type": "CONTAINS", "source": "Folder", "target": "File" }
        ]
    }"#;
    let err = SchemaConfig::from_json(json).unwrap().into_builder().unwrap_err();
    assert!(matches!(err, Error::Configuration(msg) if msg.contains("File")));
}

#[test]
fn test_malformed_json_is_a_serialization_error() {
    let err = SchemaConfig::from_json(r#"{ "relations": [{ "id": 3 }] }"#).unwrap_err();
    assert!(matches!(err, Error::Serialization(_)));
}

#[test]
fn test_collection_over_single_valued_relation_fails() {
    let mut builder = SchemaConfig::from_json(SCHEMA_JSON).unwrap().into_builder().unwrap();
    let homes =
        CollectionProperty::<Page, Folder>::register(&mut builder, "homes", "home", identity());
    let err = homes.unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
}

#[test]
fn test_property_on_unknown_type_fails() {
    let mut builder = SchemaConfig::default().into_builder().unwrap();
    let err = ValueProperty::<Folder>::register(&mut builder, "name").unwrap_err();
    assert!(matches!(err, Error::Configuration(msg) if msg.contains("Folder")));
}

// ============================================================================
// 3. Autocreation descriptions
// ============================================================================

#[test]
fn test_descriptions_match_ordinals() {
    assert_eq!(CASCADING_DESCRIPTIONS, ["none", "sourceToTarget", "targetToSource", "always"]);
    assert_eq!(autocreate_description(None), "none");
}

proptest! {
    #[test]
    fn prop_any_ordinal_has_a_description(ordinal in any::<usize>()) {
        let desc = describe_ordinal(ordinal);
        prop_assert!(CASCADING_DESCRIPTIONS.contains(&desc));
        if ordinal >= CASCADING_DESCRIPTIONS.len() {
            prop_assert_eq!(desc, "none");
        }
    }
}

// ============================================================================
// 4. A frozen registry and its properties are shared across threads
// ============================================================================

#[test]
fn test_properties_are_shared_across_threads() {
    let s = Arc::new(schema());
    let store = MemoryStore::new();
    let parents: Vec<Folder> = (0..4).map(|i| folder(&store, &format!("parent{i}"))).collect();

    let handles: Vec<_> = parents
        .into_iter()
        .map(|parent| {
            let s = Arc::clone(&s);
            let store = store.clone();
            thread::spawn(move || {
                let child = folder(&store, "child");
                let mut tx = store.begin_tx(TxMode::ReadWrite).unwrap();
                let value = vec![child.clone()];
                s.children.set(&store, &mut tx, &SuperUserContext, &parent, value).unwrap();
                store.commit_tx(tx).unwrap();
                (parent, child)
            })
        })
        .collect();

    let tx = store.begin_tx(TxMode::ReadOnly).unwrap();
    for handle in handles {
        let (parent, child) = handle.join().unwrap();
        let got = s.children.get(&store, &tx, &SuperUserContext, &parent, None).unwrap();
        assert_eq!(got, vec![child]);
    }
    assert!(s.registry.property("Folder", "children").is_some());
}

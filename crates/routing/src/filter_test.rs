//! Filter predicate tests

use std::collections::BTreeMap;

use serde_json::{json, Value};

use pipestorm_protocol::{MessageKey, ParsedMessage, Payload};

use crate::error::RoutingError;
use crate::filter::Predicate;

fn message(value: Value) -> ParsedMessage {
    ParsedMessage {
        key: Some(MessageKey::Text("k".into())),
        value: Payload::Json(value),
        partition: 2,
        offset: 17,
        timestamp: 1_000,
        processed_at: 2_000,
    }
}

fn filter(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[test]
fn test_empty_filter_always_passes() {
    let predicate = Predicate::compile(&BTreeMap::new()).unwrap();
    assert!(predicate.is_always());
    assert!(predicate.matches(&message(json!({"any": "thing"}))));
}

#[test]
fn test_bracket_key_fails_compilation() {
    let spec = filter(&[("value.items[0]", json!(1))]);
    assert!(matches!(
        Predicate::compile(&spec),
        Err(RoutingError::BracketInFilterKey { .. })
    ));
}

#[test]
fn test_structured_value_fails_compilation() {
    let spec = filter(&[("value.tags", json!(["a"]))]);
    assert!(matches!(
        Predicate::compile(&spec),
        Err(RoutingError::NonScalarFilterValue { .. })
    ));

    let spec = filter(&[("value.meta", json!({"a": 1}))]);
    assert!(Predicate::compile(&spec).is_err());
}

#[test]
fn test_matches_nested_payload_path() {
    let predicate = Predicate::compile(&filter(&[("value.order.status", json!("open"))])).unwrap();

    assert!(predicate.matches(&message(json!({"order": {"status": "open"}}))));
    assert!(!predicate.matches(&message(json!({"order": {"status": "closed"}}))));
    assert!(!predicate.matches(&message(json!({"order": {}}))));
}

#[test]
fn test_all_checks_must_pass() {
    let predicate = Predicate::compile(&filter(&[
        ("value.a", json!(1)),
        ("value.b", json!("x")),
    ]))
    .unwrap();

    assert!(predicate.matches(&message(json!({"a": 1, "b": "x"}))));
    assert!(!predicate.matches(&message(json!({"a": 1, "b": "y"}))));
    assert!(!predicate.matches(&message(json!({"a": 2, "b": "x"}))));
}

#[test]
fn test_envelope_fields_resolve() {
    let predicate = Predicate::compile(&filter(&[("partition", json!(2))])).unwrap();
    assert!(predicate.matches(&message(json!({}))));

    let predicate = Predicate::compile(&filter(&[("offset", json!(17))])).unwrap();
    assert!(predicate.matches(&message(json!({}))));

    let predicate = Predicate::compile(&filter(&[("key", json!("k"))])).unwrap();
    assert!(predicate.matches(&message(json!({}))));

    let predicate = Predicate::compile(&filter(&[("processedAt", json!(2_000))])).unwrap();
    assert!(predicate.matches(&message(json!({}))));
}

#[test]
fn test_unknown_root_never_matches() {
    let predicate = Predicate::compile(&filter(&[("headers.x", json!(1))])).unwrap();
    assert!(!predicate.matches(&message(json!({"headers": {"x": 1}}))));
}

#[test]
fn test_bytes_payload_has_no_structure() {
    let predicate = Predicate::compile(&filter(&[("value.a", json!(1))])).unwrap();
    let mut msg = message(json!({}));
    msg.value = Payload::Bytes(bytes::Bytes::from_static(b"{\"a\":1}"));
    assert!(!predicate.matches(&msg));
}

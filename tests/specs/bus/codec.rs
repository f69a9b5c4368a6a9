//! Event codec specs
//!
//! Verify the JSON representation and reserved-key precedence.

use crate::prelude::*;

#[test]
fn round_trip_preserves_topic_timestamp_and_fields() {
    let event = Event::new(
        "sensor/temp",
        fields(json!({"device": "d1", "value": 21.5, "tags": ["a", "b"]})),
    )
    .unwrap();

    let decoded = Event::decode(&event.encode().unwrap()).unwrap();

    assert_eq!(decoded.topic(), event.topic());
    assert_eq!(decoded.timestamp(), event.timestamp());
    similar_asserts::assert_eq!(decoded.fields(), event.fields());
}

#[test]
fn canonical_topic_wins_over_field() {
    let event = Event::new("real", fields(json!({"topic": "bogus"}))).unwrap();
    let wire: serde_json::Value = serde_json::from_slice(&event.encode().unwrap()).unwrap();

    assert_eq!(wire["topic"], "real");
}

#[test]
fn wire_carries_canonical_timestamp() {
    let event = Event::command("lamp", "on", 0);
    let wire: serde_json::Value = serde_json::from_slice(&event.encode().unwrap()).unwrap();

    let stamp = wire["timestamp"].as_str().unwrap();
    // YYYY-MM-DD HH:MM:SS.ffffff
    assert_eq!(stamp.len(), 26);
    assert_eq!(&stamp[10..11], " ");
    assert_eq!(&stamp[19..20], ".");
}

#[test]
fn decoded_fields_exclude_reserved_keys() {
    let bytes = br#"{"topic":"temp","timestamp":"2026-01-02 03:04:05.123456","value":1}"#;
    let event = Event::decode(bytes).unwrap();

    similar_asserts::assert_eq!(event.fields(), &fields(json!({"value": 1})));
    assert_eq!(event.get_int("value"), Some(1));
    assert_eq!(event.get_int("missing"), None);
    assert_eq!(event.field_int("missing"), 0);
}

#[test]
fn undecodable_payloads_are_rejected() {
    assert!(Event::parse(b"{}").is_none());
    assert!(Event::parse(br#"{"topic":"t"}"#).is_none());
    assert!(Event::parse(br#"{"topic":"","timestamp":"2026-01-02 03:04:05.000000"}"#).is_none());
}

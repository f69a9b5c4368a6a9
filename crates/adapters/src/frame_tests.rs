use super::*;
use hb_core::{Fields, FakeClock};

fn temp_event() -> Event {
    let clock = FakeClock::new();
    let mut fields = Fields::new();
    fields.insert("value".to_string(), serde_json::json!(21.5));
    Event::new_with_clock("sensor/temp", fields, &clock).unwrap()
}

#[test]
fn frame_layout() {
    let event = temp_event();
    let frame = encode_frame(&event).unwrap();

    assert!(frame.starts_with(b"sensor/temp\0{"));
    assert_eq!(frame.iter().filter(|b| **b == SEPARATOR).count(), 1);

    let (topic, payload) = split_frame(&frame).unwrap();
    assert_eq!(topic, b"sensor/temp");
    assert_eq!(payload, event.encode().unwrap().as_slice());
}

#[test]
fn decode_recovers_event() {
    let event = temp_event().with_field("room", "kitchen");
    let frame = encode_frame(&event).unwrap();
    assert_eq!(decode_frame(&frame), Some(event));
}

#[test]
fn nul_in_field_value_is_escaped() {
    let event = temp_event().with_field("label", "a\0b");
    let frame = encode_frame(&event).unwrap();

    let decoded = decode_frame(&frame).unwrap();
    assert_eq!(decoded.get_str("label"), Some("a\0b"));
}

#[yare::parameterized(
    empty = { b"" },
    no_separator = { b"sensor/temp{}" },
    two_separators = { b"sensor\0temp\0{}" },
    trailing_separator = { b"sensor/temp\0{}\0" },
    bad_json = { b"sensor/temp\0{not json" },
    not_object = { b"sensor/temp\0[1,2]" },
    missing_timestamp = { b"sensor/temp\0{\"topic\":\"sensor/temp\"}" },
    bad_timestamp = { b"t\0{\"topic\":\"t\",\"timestamp\":\"yesterday\"}" },
)]
fn malformed_frames_are_dropped(frame: &[u8]) {
    assert!(decode_frame(frame).is_none());
}

#[test]
fn payload_topic_is_authoritative() {
    let event = temp_event();
    let mut frame = b"other".to_vec();
    frame.push(SEPARATOR);
    frame.extend(event.encode().unwrap());

    assert_eq!(decode_frame(&frame).unwrap().topic(), "sensor/temp");
}

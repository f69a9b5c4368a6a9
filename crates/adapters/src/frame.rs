// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire framing for the message-queue transport
//!
//! A frame is the topic bytes, one NUL byte, then the event's JSON
//! encoding. The topic prefix lets subscriber sockets filter on raw bytes
//! before anything is parsed.

use hb_core::{Event, EventError};

/// Byte separating the topic from the JSON payload
pub const SEPARATOR: u8 = 0x00;

/// Encode an event as `topic NUL json`
pub fn encode_frame(event: &Event) -> Result<Vec<u8>, EventError> {
    let payload = event.encode()?;
    let topic = event.topic().as_bytes();

    let mut frame = Vec::with_capacity(topic.len() + 1 + payload.len());
    frame.extend_from_slice(topic);
    frame.push(SEPARATOR);
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Split a frame into topic and payload.
///
/// Returns `None` unless the frame holds exactly one separator.
pub fn split_frame(frame: &[u8]) -> Option<(&[u8], &[u8])> {
    let mut parts = frame.splitn(3, |b| *b == SEPARATOR);
    let topic = parts.next()?;
    let payload = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some((topic, payload))
}

/// Decode a frame, or `None` if it is malformed.
///
/// The event's topic comes from the JSON payload; the leading topic bytes
/// only serve socket-level filtering.
pub fn decode_frame(frame: &[u8]) -> Option<Event> {
    let (_, payload) = split_frame(frame)?;
    Event::parse(payload)
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;

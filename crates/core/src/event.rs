// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Events carried by the bus
//!
//! An [`Event`] is a topic, a UTC timestamp and an open set of named fields.
//! On the wire it is a flat JSON object: the fields plus the reserved keys
//! `topic` and `timestamp`. The reserved keys always carry the canonical
//! values; a user field with the same name is shadowed when encoding.

use crate::clock::{Clock, SystemClock};
use crate::timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Dynamically typed event payload
pub type Fields = Map<String, Value>;

/// Reserved wire key holding the topic
pub const TOPIC_KEY: &str = "topic";
/// Reserved wire key holding the canonical timestamp
pub const TIMESTAMP_KEY: &str = "timestamp";
/// Topic used by [`Event::command`]
pub const COMMAND_TOPIC: &str = "command";

/// Errors from building or encoding an event
#[derive(Debug, Error)]
pub enum EventError {
    #[error("event topic must not be empty")]
    EmptyTopic,
    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Why a payload could not be decoded into an event
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid json: {0}")]
    InvalidJson(String),
    #[error("payload is not a json object")]
    NotAnObject,
    #[error("missing or non-string \"{0}\" key")]
    MissingKey(&'static str),
    #[error("empty topic")]
    EmptyTopic,
    #[error("timestamp not in canonical format: {0:?}")]
    BadTimestamp(String),
}

/// A single bus event. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "Fields", try_from = "Fields")]
pub struct Event {
    topic: String,
    timestamp: DateTime<Utc>,
    fields: Fields,
}

impl Event {
    /// Build an event stamped with the current time.
    ///
    /// A string `timestamp` field in the canonical format is taken as the
    /// event time and removed from the fields.
    pub fn new(topic: impl Into<String>, fields: Fields) -> Result<Self, EventError> {
        Self::new_with_clock(topic, fields, &SystemClock)
    }

    /// Same as [`Event::new`], reading "now" from `clock`
    pub fn new_with_clock(
        topic: impl Into<String>,
        mut fields: Fields,
        clock: &impl Clock,
    ) -> Result<Self, EventError> {
        let topic = topic.into();
        if topic.is_empty() {
            return Err(EventError::EmptyTopic);
        }
        let timestamp = take_timestamp(&mut fields).unwrap_or_else(|| clock.now());
        Ok(Self {
            topic,
            timestamp,
            fields,
        })
    }

    /// Build an event with an explicit timestamp. Fields are kept verbatim.
    pub fn at(
        topic: impl Into<String>,
        fields: Fields,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, EventError> {
        let topic = topic.into();
        if topic.is_empty() {
            return Err(EventError::EmptyTopic);
        }
        Ok(Self {
            topic,
            timestamp: timestamp::normalize(timestamp),
            fields,
        })
    }

    /// Build a device command. `repeat` is only set when non-zero.
    pub fn command(device: impl Into<String>, state: impl Into<String>, repeat: u32) -> Self {
        let mut fields = Fields::new();
        fields.insert("device".to_string(), Value::String(device.into()));
        fields.insert("state".to_string(), Value::String(state.into()));
        if repeat > 0 {
            fields.insert("repeat".to_string(), Value::from(repeat));
        }
        Self {
            topic: COMMAND_TOPIC.to_string(),
            timestamp: SystemClock.now(),
            fields,
        }
    }

    /// Add or replace a field while the event is still being built
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn into_fields(self) -> Fields {
        self.fields
    }

    /// Flat wire mapping: the fields, then the canonical `topic` and
    /// `timestamp` written over any field of the same name.
    pub fn to_wire_map(&self) -> Fields {
        let mut map = self.fields.clone();
        insert_metadata(&mut map, &self.topic, &self.timestamp);
        map
    }

    /// JSON encoding of [`Event::to_wire_map`]
    pub fn encode(&self) -> Result<Vec<u8>, EventError> {
        Ok(serde_json::to_vec(&self.to_wire_map())?)
    }

    /// Decode a JSON payload, keeping the reason for a rejection
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| DecodeError::InvalidJson(e.to_string()))?;
        match value {
            Value::Object(map) => Self::try_from(map),
            _ => Err(DecodeError::NotAnObject),
        }
    }

    /// Decode a JSON payload. `None` means "drop it": callers never see why.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        Self::decode(bytes).ok()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Integer field; JSON floats are truncated toward zero
    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.fields.get(key)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            _ => None,
        }
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.fields.get(key).and_then(Value::as_bool)
    }

    /// String field, or `""` when absent or not a string
    pub fn field_str(&self, key: &str) -> &str {
        self.get_str(key).unwrap_or("")
    }

    /// Integer field, or `0` when absent or not a number
    pub fn field_int(&self, key: &str) -> i64 {
        self.get_int(key).unwrap_or(0)
    }

    pub fn device(&self) -> &str {
        self.field_str("device")
    }

    pub fn state(&self) -> &str {
        self.field_str("state")
    }

    pub fn repeat(&self) -> u32 {
        self.get_int("repeat")
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0)
    }
}

fn take_timestamp(fields: &mut Fields) -> Option<DateTime<Utc>> {
    let ts = fields
        .get(TIMESTAMP_KEY)
        .and_then(Value::as_str)
        .and_then(timestamp::parse)?;
    fields.remove(TIMESTAMP_KEY);
    Some(ts)
}

fn insert_metadata(map: &mut Fields, topic: &str, ts: &DateTime<Utc>) {
    map.insert(TOPIC_KEY.to_string(), Value::String(topic.to_string()));
    map.insert(TIMESTAMP_KEY.to_string(), Value::String(timestamp::format(ts)));
}

impl From<Event> for Fields {
    fn from(event: Event) -> Self {
        let Event {
            topic,
            timestamp,
            mut fields,
        } = event;
        insert_metadata(&mut fields, &topic, &timestamp);
        fields
    }
}

impl TryFrom<Fields> for Event {
    type Error = DecodeError;

    fn try_from(mut map: Fields) -> Result<Self, Self::Error> {
        let timestamp = match map.remove(TIMESTAMP_KEY) {
            Some(Value::String(s)) => timestamp::parse(&s).ok_or(DecodeError::BadTimestamp(s))?,
            _ => return Err(DecodeError::MissingKey(TIMESTAMP_KEY)),
        };
        let topic = match map.remove(TOPIC_KEY) {
            Some(Value::String(s)) if s.is_empty() => return Err(DecodeError::EmptyTopic),
            Some(Value::String(s)) => s,
            _ => return Err(DecodeError::MissingKey(TOPIC_KEY)),
        };
        Ok(Self {
            topic,
            timestamp,
            fields: map,
        })
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! hb-core: Core library for the home bus
//!
//! This crate provides:
//! - The `Event` model and its JSON wire representation
//! - Topic matching and in-process fan-out of event streams
//! - Bus configuration
//! - An append-only event journal

pub mod clock;
pub mod config;
pub mod event;
pub mod events;
pub mod timestamp;

// Re-exports
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{BusConfig, ConfigError, EndpointConfig, SocketMode};
pub use event::{DecodeError, Event, EventError, Fields};
pub use events::{
    EnqueuePolicy, EventJournal, EventStream, FilteredSubscriber, JournalRecord, Predicate,
    StreamId, StreamOptions, TopicMatcher, DEFAULT_STREAM_CAPACITY, MAX_STREAM_CAPACITY,
};

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process event routing
//!
//! This module provides:
//! - `TopicMatcher` - Hierarchical topic matching for subscriptions
//! - `FilteredSubscriber` - Fan one inbound stream out to filtered streams
//! - `StreamOptions` - Queue depth and enqueue policy per stream
//! - `EventJournal` - Append-only record of events

mod fanout;
mod journal;
mod matcher;
mod policy;

pub use fanout::{EventStream, FilteredSubscriber, Predicate, StreamId};
pub use journal::{EventJournal, JournalRecord};
pub use matcher::TopicMatcher;
pub use policy::{EnqueuePolicy, StreamOptions, DEFAULT_STREAM_CAPACITY, MAX_STREAM_CAPACITY};

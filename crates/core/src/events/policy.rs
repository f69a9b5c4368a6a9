// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-stream queue options

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Queue depth of an outbound stream unless configured otherwise
pub const DEFAULT_STREAM_CAPACITY: usize = 16;

/// Largest queue depth a stream may be configured with
pub const MAX_STREAM_CAPACITY: usize = 1 << 16;

/// What the dispatcher does when an outbound queue is full
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EnqueuePolicy {
    /// Wait for room. Stalls delivery to every sibling stream meanwhile.
    #[default]
    Block,
    /// Wait up to the given time, then drop the event for this stream
    Timeout(#[serde(with = "humantime_serde")] Duration),
    /// Never wait; evict the oldest queued event
    DropOldest,
}

impl fmt::Display for EnqueuePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Block => f.write_str("block"),
            Self::Timeout(d) => write!(f, "timeout({})", humantime::format_duration(*d)),
            Self::DropOldest => f.write_str("drop-oldest"),
        }
    }
}

/// Queue settings for one outbound stream
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamOptions {
    pub capacity: usize,
    pub policy: EnqueuePolicy,
}

impl StreamOptions {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_policy(mut self, policy: EnqueuePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Capacity clamped to `1..=MAX_STREAM_CAPACITY`
    pub fn effective_capacity(&self) -> usize {
        self.capacity.clamp(1, MAX_STREAM_CAPACITY)
    }
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_STREAM_CAPACITY,
            policy: EnqueuePolicy::Block,
        }
    }
}

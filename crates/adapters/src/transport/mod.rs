// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inter-process event transport
//!
//! Socket failures are not retried. A failed `start` or a steady-state I/O
//! error ends the endpoint, and the owning process is expected to exit and
//! be restarted by an external supervisor.

mod zmq;

pub use zmq::{ZmqPublisher, ZmqSubscriber, SLOW_JOINER_DELAY};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakePublisher, FakeSubscriber, SubscriberCall};

use async_trait::async_trait;
use hb_core::{ConfigError, Event, EventError, EventStream, TopicMatcher};
use thiserror::Error;

/// Errors from transport endpoints
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid endpoint: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to open {endpoint}: {source}")]
    Startup {
        endpoint: String,
        #[source]
        source: zeromq::ZmqError,
    },
    #[error("socket i/o failed on {endpoint}: {source}")]
    Io {
        endpoint: String,
        #[source]
        source: zeromq::ZmqError,
    },
    #[error(transparent)]
    Encode(#[from] EventError),
    #[error("transport closed")]
    Closed,
}

/// Sends events to the bus
pub trait Publisher: Clone + Send + Sync + 'static {
    /// Queue an event for delivery. Never waits on the network.
    fn emit(&self, event: Event) -> Result<(), TransportError>;
}

/// Receives events from the bus
#[async_trait]
pub trait Subscriber: Clone + Send + Sync + 'static {
    /// Register a stream of the events accepted by `matcher`
    async fn subscribe(&self, matcher: TopicMatcher) -> EventStream;

    /// Unregister a stream. Returns false if it was already closed.
    async fn close(&self, stream: &mut EventStream) -> bool;
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake transport endpoints for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{Publisher, Subscriber, TransportError};
use async_trait::async_trait;
use hb_core::{Event, EventStream, FilteredSubscriber, StreamOptions, TopicMatcher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Publisher that records emitted events
#[derive(Clone, Default)]
pub struct FakePublisher {
    events: Arc<Mutex<Vec<Event>>>,
    closed: Arc<AtomicBool>,
}

impl FakePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events emitted so far
    pub fn emitted(&self) -> Vec<Event> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Topics of emitted events, in order
    pub fn topics(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|e| e.topic().to_string())
            .collect()
    }

    /// Make every later `emit` fail as if the send task had stopped
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

impl Publisher for FakePublisher {
    fn emit(&self, event: Event) -> Result<(), TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
        Ok(())
    }
}

/// Recorded subscriber call
#[derive(Debug, Clone, PartialEq)]
pub enum SubscriberCall {
    Subscribe { matcher: TopicMatcher },
    Close { stream: hb_core::StreamId },
}

/// Subscriber fed by the test instead of a socket
#[derive(Clone)]
pub struct FakeSubscriber {
    inbound: Arc<Mutex<Option<mpsc::Sender<Event>>>>,
    fanout: FilteredSubscriber,
    calls: Arc<Mutex<Vec<SubscriberCall>>>,
}

impl Default for FakeSubscriber {
    fn default() -> Self {
        Self::new(StreamOptions::default())
    }
}

impl FakeSubscriber {
    pub fn new(options: StreamOptions) -> Self {
        let (tx, rx) = mpsc::channel(options.effective_capacity());
        Self {
            inbound: Arc::new(Mutex::new(Some(tx))),
            fanout: FilteredSubscriber::with_options(rx, options),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Deliver an event as if it arrived from the wire.
    ///
    /// Returns false once the upstream has been finished.
    pub async fn inject(&self, event: Event) -> bool {
        let sender = self
            .inbound
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        match sender {
            Some(sender) => sender.send(event).await.is_ok(),
            None => false,
        }
    }

    /// End the upstream, closing every registered stream
    pub fn finish(&self) {
        self.inbound.lock().unwrap_or_else(|e| e.into_inner()).take();
    }

    pub fn fanout(&self) -> &FilteredSubscriber {
        &self.fanout
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<SubscriberCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Subscriber for FakeSubscriber {
    async fn subscribe(&self, matcher: TopicMatcher) -> EventStream {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(SubscriberCall::Subscribe {
                matcher: matcher.clone(),
            });
        self.fanout.matching(matcher).await
    }

    async fn close(&self, stream: &mut EventStream) -> bool {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(SubscriberCall::Close { stream: stream.id() });
        self.fanout.close(stream).await
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filtered fan-out of one inbound event stream
//!
//! A [`FilteredSubscriber`] reads a single ordered inbound stream and copies
//! every event to each registered outbound [`EventStream`] whose predicate
//! accepts it. One dispatch task does all deliveries while holding the
//! registration lock, so registrations never change mid-iteration and each
//! stream sees events in inbound order.
//!
//! With the default [`EnqueuePolicy::Block`] a full outbound queue holds the
//! lock until the consumer makes room: one slow consumer delays every other
//! stream on the same subscriber. Streams that cannot tolerate this use
//! [`EnqueuePolicy::Timeout`] or [`EnqueuePolicy::DropOldest`].

use super::matcher::TopicMatcher;
use super::policy::{EnqueuePolicy, StreamOptions};
use crate::event::Event;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::{broadcast, mpsc, Mutex};
use tracing::{debug, trace, warn};

/// Predicate deciding whether a stream receives an event
pub type Predicate = Box<dyn Fn(&Event) -> bool + Send + Sync>;

/// Identifies an outbound stream within its subscriber
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamId(pub u64);

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stream-{}", self.0)
    }
}

enum Sink {
    Queue(mpsc::Sender<Event>),
    Ring(broadcast::Sender<Event>),
}

impl Sink {
    fn is_closed(&self) -> bool {
        match self {
            Sink::Queue(tx) => tx.is_closed(),
            Sink::Ring(tx) => tx.receiver_count() == 0,
        }
    }
}

enum Delivery {
    Delivered,
    Dropped,
    Closed,
}

struct OutboundRecord {
    id: StreamId,
    predicate: Predicate,
    sink: Sink,
    policy: EnqueuePolicy,
}

impl OutboundRecord {
    async fn deliver(&self, event: Event) -> Delivery {
        match (&self.sink, self.policy) {
            (Sink::Ring(tx), _) => match tx.send(event) {
                Ok(_) => Delivery::Delivered,
                Err(_) => Delivery::Closed,
            },
            (Sink::Queue(tx), EnqueuePolicy::Timeout(limit)) => {
                match tx.send_timeout(event, limit).await {
                    Ok(()) => Delivery::Delivered,
                    Err(mpsc::error::SendTimeoutError::Timeout(_)) => Delivery::Dropped,
                    Err(mpsc::error::SendTimeoutError::Closed(_)) => Delivery::Closed,
                }
            }
            (Sink::Queue(tx), _) => match tx.send(event).await {
                Ok(()) => Delivery::Delivered,
                Err(_) => Delivery::Closed,
            },
        }
    }
}

#[derive(Default)]
struct Registry {
    records: Vec<OutboundRecord>,
    upstream_closed: bool,
}

struct Inner {
    registry: Mutex<Registry>,
    next_id: AtomicU64,
    defaults: StreamOptions,
}

/// Turns one inbound stream into many independently filtered streams
#[derive(Clone)]
pub struct FilteredSubscriber {
    inner: Arc<Inner>,
}

impl FilteredSubscriber {
    /// Start dispatching `inbound` with default stream options.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(inbound: mpsc::Receiver<Event>) -> Self {
        Self::with_options(inbound, StreamOptions::default())
    }

    /// Start dispatching `inbound`; `defaults` applies to streams registered
    /// without explicit options
    pub fn with_options(inbound: mpsc::Receiver<Event>, defaults: StreamOptions) -> Self {
        let inner = Arc::new(Inner {
            registry: Mutex::new(Registry::default()),
            next_id: AtomicU64::new(1),
            defaults,
        });
        tokio::spawn(dispatch(Arc::clone(&inner), inbound));
        Self { inner }
    }

    /// Register a stream that receives every event
    pub async fn channel(&self) -> EventStream {
        self.channel_with(|_| true, self.inner.defaults).await
    }

    /// Register a stream receiving events whose topic is literally one of
    /// `topics`. No hierarchy is implied: "a" does not admit "a/b".
    pub async fn filtered_channel<I, S>(&self, topics: I) -> EventStream
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let topics: HashSet<String> = topics.into_iter().map(Into::into).collect();
        self.channel_with(
            move |event: &Event| topics.contains(event.topic()),
            self.inner.defaults,
        )
        .await
    }

    /// Register a stream filtered by a [`TopicMatcher`]
    pub async fn matching(&self, matcher: TopicMatcher) -> EventStream {
        self.channel_with(
            move |event: &Event| matcher.matches(event.topic()),
            self.inner.defaults,
        )
        .await
    }

    /// Register a stream with an arbitrary predicate and queue options
    pub async fn channel_with<F>(&self, predicate: F, options: StreamOptions) -> EventStream
    where
        F: Fn(&Event) -> bool + Send + Sync + 'static,
    {
        let id = StreamId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let capacity = options.effective_capacity();
        let (sink, receiver) = match options.policy {
            EnqueuePolicy::DropOldest => {
                let (tx, rx) = broadcast::channel(capacity);
                (Sink::Ring(tx), Receiver::Ring(rx))
            }
            EnqueuePolicy::Block | EnqueuePolicy::Timeout(_) => {
                let (tx, rx) = mpsc::channel(capacity);
                (Sink::Queue(tx), Receiver::Queue(rx))
            }
        };

        let mut registry = self.inner.registry.lock().await;
        if registry.upstream_closed {
            // Dropping the sink hands back an already-finished stream
            debug!(stream = %id, "upstream closed, stream not registered");
        } else {
            registry.records.push(OutboundRecord {
                id,
                predicate: Box::new(predicate),
                sink,
                policy: options.policy,
            });
            debug!(stream = %id, capacity, policy = %options.policy, "registered stream");
        }

        EventStream {
            id,
            owner: Arc::downgrade(&self.inner),
            receiver,
            dropped: 0,
            closed: false,
        }
    }

    /// Unregister a stream and release its queue.
    ///
    /// Events already queued can still be read; `recv` then returns `None`.
    /// Returns `true` only for the first close of a stream; later calls are
    /// no-ops, as is closing a stream registered on another subscriber.
    /// Never fails.
    pub async fn close(&self, stream: &mut EventStream) -> bool {
        // Stream ids are only unique per subscriber
        if !self.owns(stream) {
            trace!(stream = %stream.id, "close: stream belongs to another subscriber");
            return false;
        }
        let first = !stream.closed;
        stream.closed = true;
        // Stop accepting first so a dispatcher blocked on this queue lets go
        // of the registration lock.
        stream.stop_accepting();

        let removed = {
            let mut registry = self.inner.registry.lock().await;
            let index = registry.records.iter().position(|r| r.id == stream.id);
            index.map(|i| registry.records.remove(i))
        };

        match removed {
            Some(record) => {
                drop(record);
                debug!(stream = %stream.id, "closed stream");
            }
            None => trace!(stream = %stream.id, "close: stream not registered"),
        }
        first
    }

    fn owns(&self, stream: &EventStream) -> bool {
        std::ptr::eq(stream.owner.as_ptr(), Arc::as_ptr(&self.inner))
    }

    /// Number of registered outbound streams
    pub async fn stream_count(&self) -> usize {
        self.inner.registry.lock().await.records.len()
    }
}

async fn dispatch(inner: Arc<Inner>, mut inbound: mpsc::Receiver<Event>) {
    while let Some(event) = inbound.recv().await {
        let mut registry = inner.registry.lock().await;
        let mut abandoned = Vec::new();

        for record in registry.records.iter() {
            if record.sink.is_closed() {
                abandoned.push(record.id);
                continue;
            }
            if !(record.predicate)(&event) {
                continue;
            }
            match record.deliver(event.clone()).await {
                Delivery::Delivered => {
                    trace!(stream = %record.id, topic = event.topic(), "delivered")
                }
                Delivery::Dropped => warn!(
                    stream = %record.id,
                    topic = event.topic(),
                    policy = %record.policy,
                    "queue full, event dropped"
                ),
                Delivery::Closed => abandoned.push(record.id),
            }
        }

        if !abandoned.is_empty() {
            registry.records.retain(|r| !abandoned.contains(&r.id));
            debug!(count = abandoned.len(), "pruned abandoned streams");
        }
    }

    let mut registry = inner.registry.lock().await;
    debug!(
        streams = registry.records.len(),
        "upstream closed, closing all streams"
    );
    registry.upstream_closed = true;
    registry.records.clear();
}

enum Receiver {
    Queue(mpsc::Receiver<Event>),
    Ring(broadcast::Receiver<Event>),
}

/// Receiving end of one outbound stream
pub struct EventStream {
    id: StreamId,
    owner: Weak<Inner>,
    receiver: Receiver,
    dropped: u64,
    closed: bool,
}

impl EventStream {
    pub fn id(&self) -> StreamId {
        self.id
    }

    /// Next event, or `None` once the stream is closed and drained
    pub async fn recv(&mut self) -> Option<Event> {
        match &mut self.receiver {
            Receiver::Queue(rx) => rx.recv().await,
            Receiver::Ring(rx) => loop {
                match rx.recv().await {
                    Ok(event) => return Some(event),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        self.dropped += n;
                        trace!(stream = %self.id, skipped = n, "evicted oldest events");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            },
        }
    }

    /// Next event if one is already queued
    pub fn try_recv(&mut self) -> Option<Event> {
        match &mut self.receiver {
            Receiver::Queue(rx) => rx.try_recv().ok(),
            Receiver::Ring(rx) => loop {
                match rx.try_recv() {
                    Ok(event) => return Some(event),
                    Err(broadcast::error::TryRecvError::Lagged(n)) => self.dropped += n,
                    Err(_) => return None,
                }
            },
        }
    }

    /// Events evicted from a drop-oldest stream before they were read
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    fn stop_accepting(&mut self) {
        if let Receiver::Queue(rx) = &mut self.receiver {
            rx.close();
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("id", &self.id)
            .field("dropped", &self.dropped)
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
#[path = "fanout_tests.rs"]
mod tests;

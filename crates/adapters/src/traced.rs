// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced transport wrappers for consistent observability

use crate::transport::{Publisher, Subscriber, TransportError};
use async_trait::async_trait;
use hb_core::{Event, EventStream, TopicMatcher};
use tracing::Instrument;

/// Wrapper that adds tracing to any Publisher
#[derive(Clone)]
pub struct TracedPublisher<P> {
    inner: P,
}

impl<P> TracedPublisher<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: Publisher> Publisher for TracedPublisher<P> {
    fn emit(&self, event: Event) -> Result<(), TransportError> {
        let span = tracing::debug_span!("bus.emit", topic = event.topic());
        let _guard = span.enter();

        tracing::trace!(fields = event.fields().len(), "emitting");
        let result = self.inner.emit(event);

        match &result {
            Ok(()) => tracing::trace!("queued"),
            // A closed transport means the process should be restarting
            Err(TransportError::Closed) => tracing::error!("emit on closed transport"),
            Err(e) => tracing::warn!(error = %e, "emit failed"),
        }

        result
    }
}

/// Wrapper that adds tracing to any Subscriber
#[derive(Clone)]
pub struct TracedSubscriber<S> {
    inner: S,
}

impl<S> TracedSubscriber<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: Subscriber> Subscriber for TracedSubscriber<S> {
    async fn subscribe(&self, matcher: TopicMatcher) -> EventStream {
        let span = tracing::info_span!("bus.subscribe", matcher = %matcher);

        async {
            let stream = self.inner.subscribe(matcher).await;
            tracing::info!(stream = %stream.id(), "subscribed");
            stream
        }
        .instrument(span)
        .await
    }

    async fn close(&self, stream: &mut EventStream) -> bool {
        let span = tracing::info_span!("bus.close", stream = %stream.id());

        async {
            let first = self.inner.close(stream).await;
            if first {
                tracing::info!(dropped = stream.dropped(), "closed");
            } else {
                tracing::debug!("already closed");
            }
            first
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;

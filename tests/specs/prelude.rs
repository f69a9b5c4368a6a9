//! Shared helpers for bus specs

#![allow(dead_code)]

pub use hb_adapters::{
    FakeSubscriber, Publisher, Subscriber, TransportError, ZmqPublisher, ZmqSubscriber,
};
pub use hb_core::{
    EndpointConfig, Event, EventStream, Fields, FilteredSubscriber, StreamOptions,
    TopicMatcher,
};
pub use serde_json::json;
pub use std::time::Duration;
pub use tokio::sync::mpsc;

/// Upper bound for anything crossing a socket
pub const WIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Build a field map from a JSON object literal
pub fn fields(value: serde_json::Value) -> Fields {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}

/// Loopback endpoint on an ephemeral port
pub fn loopback() -> EndpointConfig {
    EndpointConfig::bind("tcp://127.0.0.1:0")
}

/// A fan-out together with the sender feeding it
pub fn fanout() -> (FilteredSubscriber, mpsc::Sender<Event>) {
    let (tx, rx) = mpsc::channel(16);
    (FilteredSubscriber::new(rx), tx)
}

/// Collect a stream until it ends
pub async fn drain(stream: &mut EventStream) -> Vec<Event> {
    let mut events = Vec::new();
    while let Some(event) = tokio::time::timeout(WIRE_TIMEOUT, stream.recv())
        .await
        .expect("stream stalled")
    {
        events.push(event);
    }
    events
}

/// Repeat `send` until `stream` yields an event.
///
/// Early sends can be lost while the subscription handshake is in flight.
pub async fn resend_until_received<F>(stream: &mut EventStream, mut send: F) -> Event
where
    F: FnMut(),
{
    tokio::time::timeout(WIRE_TIMEOUT, async {
        loop {
            send();
            if let Ok(Some(event)) =
                tokio::time::timeout(Duration::from_millis(100), stream.recv()).await
            {
                return event;
            }
        }
    })
    .await
    .expect("nothing arrived over the wire")
}

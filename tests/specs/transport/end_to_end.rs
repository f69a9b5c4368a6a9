//! End-to-end transport specs
//!
//! Verify events cross a real PUB/SUB socket pair intact.

use crate::prelude::*;

#[tokio::test]
async fn temperature_reading_crosses_the_wire() {
    let publisher = ZmqPublisher::start(&loopback()).await.unwrap();
    let subscriber = ZmqSubscriber::start(
        &EndpointConfig::connect(publisher.endpoint()),
        StreamOptions::default(),
    )
    .await
    .unwrap();
    let mut temps = subscriber.fanout().filtered_channel(["temp"]).await;

    let reading = Event::new("temp", fields(json!({"device": "d1", "value": 21.5}))).unwrap();
    let received = resend_until_received(&mut temps, || {
        publisher.emit(reading.clone()).unwrap();
    })
    .await;

    assert_eq!(received.topic(), "temp");
    assert_eq!(received.timestamp(), reading.timestamp());
    similar_asserts::assert_eq!(
        received.fields(),
        &fields(json!({"device": "d1", "value": 21.5}))
    );

    subscriber.shutdown().await.unwrap();
    publisher.shutdown().await.unwrap();
}

#[tokio::test]
async fn events_arrive_in_emit_order() {
    let publisher = ZmqPublisher::start(&loopback()).await.unwrap();
    let subscriber = ZmqSubscriber::start(
        &EndpointConfig::connect(publisher.endpoint()),
        StreamOptions::default(),
    )
    .await
    .unwrap();
    let mut probes = subscriber.subscribe(TopicMatcher::exact("probe")).await;
    let mut counters = subscriber.subscribe(TopicMatcher::prefix("count")).await;

    let probe = Event::new("probe", Fields::new()).unwrap();
    resend_until_received(&mut probes, || publisher.emit(probe.clone()).unwrap()).await;

    for n in 0..10 {
        let event = Event::new("count/up", Fields::new())
            .unwrap()
            .with_field("n", n);
        publisher.emit(event).unwrap();
    }

    let mut seen = Vec::new();
    while seen.len() < 10 {
        let event = tokio::time::timeout(WIRE_TIMEOUT, counters.recv())
            .await
            .unwrap()
            .unwrap();
        seen.push(event.field_int("n"));
    }
    assert_eq!(seen, (0..10).collect::<Vec<i64>>());

    subscriber.shutdown().await.unwrap();
    publisher.shutdown().await.unwrap();
}

#[tokio::test]
async fn publisher_rejects_emit_after_shutdown() {
    let publisher = ZmqPublisher::start(&loopback()).await.unwrap();
    publisher.shutdown().await.unwrap();

    let result = publisher.emit(Event::command("lamp", "on", 0));
    assert!(matches!(result, Err(TransportError::Closed)));
}

#[tokio::test]
async fn startup_failure_is_reported() {
    let publisher = ZmqPublisher::start(&loopback()).await.unwrap();

    // Second bind on the same port cannot succeed
    let taken = EndpointConfig::bind(publisher.endpoint());
    let result = ZmqPublisher::start(&taken).await;
    assert!(matches!(result, Err(TransportError::Startup { .. })));

    publisher.shutdown().await.unwrap();
}

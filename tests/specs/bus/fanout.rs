//! Fan-out specs
//!
//! Verify filtered delivery, ordering, and stream lifecycle.

use crate::prelude::*;

#[tokio::test]
async fn filtered_and_unfiltered_streams_are_isolated() {
    let (fanout, tx) = fanout();
    let mut only_a = fanout.filtered_channel(["a"]).await;
    let mut everything = fanout.channel().await;

    for (index, topic) in ["a", "b", "a", "c"].into_iter().enumerate() {
        let event = Event::new(topic, Fields::new())
            .unwrap()
            .with_field("seq", index as u64);
        tx.send(event).await.unwrap();
    }
    drop(tx);

    let a: Vec<i64> = drain(&mut only_a)
        .await
        .iter()
        .map(|e| e.field_int("seq"))
        .collect();
    assert_eq!(a, vec![0, 2]);

    let all: Vec<String> = drain(&mut everything)
        .await
        .iter()
        .map(|e| e.topic().to_string())
        .collect();
    assert_eq!(all, vec!["a", "b", "a", "c"]);
}

#[tokio::test]
async fn prefix_streams_follow_topic_hierarchy() {
    let (fanout, tx) = fanout();
    let mut stream = fanout.matching(TopicMatcher::prefix("a/b")).await;

    for topic in ["a/b", "a/b/c", "a/bc", "a"] {
        tx.send(Event::new(topic, Fields::new()).unwrap())
            .await
            .unwrap();
    }
    drop(tx);

    let topics: Vec<String> = drain(&mut stream)
        .await
        .iter()
        .map(|e| e.topic().to_string())
        .collect();
    assert_eq!(topics, vec!["a/b", "a/b/c"]);
}

#[tokio::test]
async fn closing_twice_removes_once() {
    let (fanout, _tx) = fanout();
    let mut stream = fanout.channel().await;
    let _sibling = fanout.channel().await;
    assert_eq!(fanout.stream_count().await, 2);

    assert!(fanout.close(&mut stream).await);
    assert!(!fanout.close(&mut stream).await);
    assert_eq!(fanout.stream_count().await, 1);
}

#[tokio::test]
async fn subscribers_are_independent_instances() {
    let first = FakeSubscriber::default();
    let second = FakeSubscriber::default();

    let mut a = first.subscribe(TopicMatcher::All).await;
    let mut b = second.subscribe(TopicMatcher::All).await;

    first.inject(Event::command("lamp", "on", 0)).await;

    assert_eq!(a.recv().await.unwrap().device(), "lamp");
    assert!(b.try_recv().is_none());
}

#[tokio::test]
async fn closing_a_foreign_stream_is_a_no_op() {
    let (first, first_tx) = fanout();
    let (second, second_tx) = fanout();
    let mut mine = first.channel().await;
    let mut theirs = second.channel().await;

    assert!(!first.close(&mut theirs).await);
    assert_eq!(first.stream_count().await, 1);
    assert_eq!(second.stream_count().await, 1);

    first_tx.send(Event::command("lamp", "on", 0)).await.unwrap();
    second_tx.send(Event::command("fan", "on", 0)).await.unwrap();
    drop(first_tx);
    drop(second_tx);

    assert_eq!(drain(&mut mine).await.len(), 1);
    let received = drain(&mut theirs).await;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].device(), "fan");
}

//! Malformed frame specs
//!
//! Verify bad frames are dropped without stopping the receiver.

use crate::prelude::*;
use zeromq::{Socket, SocketSend, ZmqMessage};

#[tokio::test]
async fn malformed_frames_are_skipped() {
    let mut raw = zeromq::PubSocket::new();
    let endpoint = raw.bind("tcp://127.0.0.1:0").await.unwrap().to_string();

    let config = EndpointConfig::connect(endpoint);
    let subscriber = ZmqSubscriber::start(&config, StreamOptions::default())
        .await
        .unwrap();
    let mut stream = subscriber.subscribe(TopicMatcher::All).await;

    let good = Event::new("temp", fields(json!({"value": 1}))).unwrap();
    let mut good_frame = b"temp\0".to_vec();
    good_frame.extend(good.encode().unwrap());

    let bad_frames: Vec<Vec<u8>> = vec![
        b"temp{\"topic\":\"temp\"}".to_vec(),
        b"temp\0{}\0".to_vec(),
        b"temp\0{\"topic\":\"temp\",\"value\":1}".to_vec(),
        b"temp\0not json".to_vec(),
    ];

    // Each round sends every bad frame before the good one, so the good
    // event can only arrive after the receiver has handled the bad ones.
    let received = tokio::time::timeout(WIRE_TIMEOUT, async {
        loop {
            for frame in &bad_frames {
                raw.send(ZmqMessage::from(frame.clone())).await.unwrap();
            }
            raw.send(ZmqMessage::from(good_frame.clone())).await.unwrap();
            if let Ok(Some(event)) =
                tokio::time::timeout(Duration::from_millis(100), stream.recv()).await
            {
                return event;
            }
        }
    })
    .await
    .unwrap();

    assert_eq!(received, good);
    while let Some(event) = stream.try_recv() {
        assert_eq!(event, good);
    }

    subscriber.shutdown().await.unwrap();
}

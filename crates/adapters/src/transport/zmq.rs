// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ZeroMQ PUB/SUB transport endpoints

use super::{Publisher, Subscriber, TransportError};
use crate::frame::{decode_frame, encode_frame};
use async_trait::async_trait;
use hb_core::{
    EndpointConfig, Event, EventStream, FilteredSubscriber, SocketMode, StreamOptions,
    TopicMatcher,
};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace};
use zeromq::{PubSocket, Socket, SocketRecv, SocketSend, SubSocket, ZmqMessage};

/// Pause between opening a publisher socket and its first send, giving
/// peers time to complete their subscriptions.
pub const SLOW_JOINER_DELAY: Duration = Duration::from_millis(50);

type TaskHandle = Arc<Mutex<Option<JoinHandle<Result<(), TransportError>>>>>;

enum Outbound {
    Frame(Vec<u8>),
    Shutdown,
}

/// Bind or connect `socket` as configured, returning the resolved endpoint
async fn attach<S: Socket>(
    socket: &mut S,
    config: &EndpointConfig,
) -> Result<String, TransportError> {
    let result = match config.mode {
        SocketMode::Bind => socket
            .bind(&config.address)
            .await
            .map(|endpoint| endpoint.to_string()),
        SocketMode::Connect => socket
            .connect(&config.address)
            .await
            .map(|()| config.address.clone()),
    };
    result.map_err(|source| TransportError::Startup {
        endpoint: config.address.clone(),
        source,
    })
}

/// Publisher endpoint over a PUB socket.
///
/// `emit` only queues; a single background task owns the socket.
#[derive(Clone)]
pub struct ZmqPublisher {
    queue: mpsc::UnboundedSender<Outbound>,
    /// Set once shutdown begins; writers hold it while queueing so no frame
    /// lands behind the shutdown marker
    closed: Arc<RwLock<bool>>,
    endpoint: String,
    task: TaskHandle,
}

impl ZmqPublisher {
    /// Open the socket and start the send task
    pub async fn start(config: &EndpointConfig) -> Result<Self, TransportError> {
        config.validate()?;
        let mut socket = PubSocket::new();
        let endpoint = attach(&mut socket, config).await?;
        info!(endpoint = %endpoint, mode = %config.mode, "publisher started");

        let (queue, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_sender(socket, rx, endpoint.clone()));

        Ok(Self {
            queue,
            closed: Arc::new(RwLock::new(false)),
            endpoint,
            task: Arc::new(Mutex::new(Some(task))),
        })
    }

    /// Resolved socket endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Flush queued events and stop the send task.
    ///
    /// Returns the error that ended the task, if any. Later calls return `Ok`.
    pub async fn shutdown(&self) -> Result<(), TransportError> {
        {
            let mut closed = self.closed.write().unwrap_or_else(|e| e.into_inner());
            if !*closed {
                *closed = true;
                // Fails only if the task already ended; the join below reports why
                let _ = self.queue.send(Outbound::Shutdown);
            }
        }

        let handle = self.task.lock().unwrap_or_else(|e| e.into_inner()).take();
        let Some(handle) = handle else {
            return Ok(());
        };
        match handle.await {
            Ok(result) => result,
            Err(e) => {
                error!(endpoint = %self.endpoint, error = %e, "send task aborted");
                Err(TransportError::Closed)
            }
        }
    }
}

impl Publisher for ZmqPublisher {
    fn emit(&self, event: Event) -> Result<(), TransportError> {
        let frame = encode_frame(&event)?;
        let closed = self.closed.read().unwrap_or_else(|e| e.into_inner());
        if *closed {
            return Err(TransportError::Closed);
        }
        self.queue
            .send(Outbound::Frame(frame))
            .map_err(|_| TransportError::Closed)?;
        drop(closed);
        trace!(endpoint = %self.endpoint, topic = event.topic(), "queued");
        Ok(())
    }
}

async fn run_sender(
    mut socket: PubSocket,
    mut queue: mpsc::UnboundedReceiver<Outbound>,
    endpoint: String,
) -> Result<(), TransportError> {
    tokio::time::sleep(SLOW_JOINER_DELAY).await;

    while let Some(outbound) = queue.recv().await {
        let frame = match outbound {
            Outbound::Frame(frame) => frame,
            Outbound::Shutdown => break,
        };
        if let Err(source) = socket.send(ZmqMessage::from(frame)).await {
            error!(endpoint = %endpoint, error = %source, "send failed");
            return Err(TransportError::Io { endpoint, source });
        }
    }

    info!(endpoint = %endpoint, "publisher stopped");
    Ok(())
}

/// Subscriber endpoint over a SUB socket.
///
/// A background task decodes frames into a [`FilteredSubscriber`]. When the
/// task ends, every stream registered here is closed.
#[derive(Clone)]
pub struct ZmqSubscriber {
    fanout: FilteredSubscriber,
    endpoint: String,
    task: TaskHandle,
}

impl ZmqSubscriber {
    /// Open the socket, apply its byte-prefix filter, and start receiving.
    ///
    /// `options` become the defaults for streams registered through
    /// [`Subscriber::subscribe`].
    pub async fn start(
        config: &EndpointConfig,
        options: StreamOptions,
    ) -> Result<Self, TransportError> {
        config.validate()?;
        let mut socket = SubSocket::new();
        socket
            .subscribe(&config.filter)
            .await
            .map_err(|source| TransportError::Startup {
                endpoint: config.address.clone(),
                source,
            })?;
        let endpoint = attach(&mut socket, config).await?;
        info!(
            endpoint = %endpoint,
            mode = %config.mode,
            filter = %config.filter,
            "subscriber started"
        );

        let (inbound, rx) = mpsc::channel(options.effective_capacity());
        let fanout = FilteredSubscriber::with_options(rx, options);
        let task = tokio::spawn(run_receiver(socket, inbound, endpoint.clone()));

        Ok(Self {
            fanout,
            endpoint,
            task: Arc::new(Mutex::new(Some(task))),
        })
    }

    /// Resolved socket endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The fan-out behind this endpoint, for literal-set and custom streams
    pub fn fanout(&self) -> &FilteredSubscriber {
        &self.fanout
    }

    /// Stop receiving. Registered streams drain what they hold, then end.
    ///
    /// Returns the error that ended the receive task, if it failed first.
    pub async fn shutdown(&self) -> Result<(), TransportError> {
        let handle = self.task.lock().unwrap_or_else(|e| e.into_inner()).take();
        let Some(handle) = handle else {
            return Ok(());
        };
        handle.abort();
        match handle.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => {
                info!(endpoint = %self.endpoint, "subscriber stopped");
                Ok(())
            }
            Err(e) => {
                error!(endpoint = %self.endpoint, error = %e, "receive task aborted");
                Err(TransportError::Closed)
            }
        }
    }
}

#[async_trait]
impl Subscriber for ZmqSubscriber {
    async fn subscribe(&self, matcher: TopicMatcher) -> EventStream {
        self.fanout.matching(matcher).await
    }

    async fn close(&self, stream: &mut EventStream) -> bool {
        self.fanout.close(stream).await
    }
}

/// Decode a single-part message; multi-part messages are not frames
fn decode_message(message: &ZmqMessage) -> Option<Event> {
    if message.len() != 1 {
        return None;
    }
    decode_frame(message.get(0)?)
}

async fn run_receiver(
    mut socket: SubSocket,
    inbound: mpsc::Sender<Event>,
    endpoint: String,
) -> Result<(), TransportError> {
    loop {
        let message = match socket.recv().await {
            Ok(message) => message,
            Err(source) => {
                error!(endpoint = %endpoint, error = %source, "receive failed");
                return Err(TransportError::Io { endpoint, source });
            }
        };

        let Some(event) = decode_message(&message) else {
            trace!(endpoint = %endpoint, "dropped malformed frame");
            continue;
        };

        trace!(endpoint = %endpoint, topic = event.topic(), "received");
        if inbound.send(event).await.is_err() {
            debug!(endpoint = %endpoint, "fan-out closed");
            return Ok(());
        }
    }
}

#[cfg(test)]
#[path = "zmq_tests.rs"]
mod tests;

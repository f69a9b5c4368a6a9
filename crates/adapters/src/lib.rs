// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters bridging the in-process bus across processes

pub mod frame;
pub mod traced;
pub mod transport;

pub use frame::{decode_frame, encode_frame};
pub use traced::{TracedPublisher, TracedSubscriber};
pub use transport::{
    Publisher, Subscriber, TransportError, ZmqPublisher, ZmqSubscriber, SLOW_JOINER_DELAY,
};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use transport::{FakePublisher, FakeSubscriber, SubscriberCall};

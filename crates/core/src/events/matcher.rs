// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Topic matching for subscriptions

use std::fmt;

/// Rule deciding whether a topic belongs to a subscription.
///
/// Topics are hierarchical with `/` as the only separator:
///   - Prefix: "sensor/temp" matches "sensor/temp" and "sensor/temp/kitchen",
///     but not "sensor/temperature"
///   - Exact: "command" matches "command" only
///   - All: matches every topic
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TopicMatcher {
    Prefix(String),
    Exact(String),
    All,
}

impl TopicMatcher {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::Prefix(prefix.into())
    }

    pub fn exact(topic: impl Into<String>) -> Self {
        Self::Exact(topic.into())
    }

    pub fn all() -> Self {
        Self::All
    }

    /// Check if this matcher accepts a topic
    pub fn matches(&self, topic: &str) -> bool {
        match self {
            Self::Prefix(prefix) => match topic.strip_prefix(prefix.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            },
            Self::Exact(exact) => topic == exact,
            Self::All => true,
        }
    }
}

impl fmt::Display for TopicMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prefix(prefix) => write!(f, "prefix:{}", prefix),
            Self::Exact(exact) => write!(f, "exact:{}", exact),
            Self::All => f.write_str("all"),
        }
    }
}

#[cfg(test)]
#[path = "matcher_tests.rs"]
mod tests;

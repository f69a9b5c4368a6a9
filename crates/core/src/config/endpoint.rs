// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transport endpoint configuration

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How an endpoint attaches to its address
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocketMode {
    /// Dial a remote listener
    #[default]
    Connect,
    /// Listen for peers
    Bind,
}

impl fmt::Display for SocketMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => f.write_str("connect"),
            Self::Bind => f.write_str("bind"),
        }
    }
}

/// One socket endpoint of the transport
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Socket address, e.g. `tcp://127.0.0.1:7040`
    pub address: String,
    #[serde(default)]
    pub mode: SocketMode,
    /// Byte prefix applied by subscriber sockets; empty admits every frame
    #[serde(default)]
    pub filter: String,
}

impl EndpointConfig {
    pub fn connect(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            mode: SocketMode::Connect,
            filter: String::new(),
        }
    }

    pub fn bind(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            mode: SocketMode::Bind,
            filter: String::new(),
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.address.trim().is_empty() {
            return Err(ConfigError::Invalid("endpoint address is empty".to_string()));
        }
        Ok(())
    }
}

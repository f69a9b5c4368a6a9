// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration modules
//!
//! Bus settings are read from TOML:
//!
//! ```toml
//! [publisher]
//! address = "tcp://127.0.0.1:7040"
//! mode = "bind"
//!
//! [subscriber]
//! address = "tcp://127.0.0.1:7040"
//! filter = "sensor/"
//!
//! [streams]
//! capacity = 16
//! policy = { timeout = "250ms" }
//! ```

mod endpoint;

pub use endpoint::{EndpointConfig, SocketMode};

use crate::events::{EnqueuePolicy, StreamOptions, MAX_STREAM_CAPACITY};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid toml: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Endpoints and stream defaults for one process
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusConfig {
    #[serde(default)]
    pub publisher: Option<EndpointConfig>,
    #[serde(default)]
    pub subscriber: Option<EndpointConfig>,
    #[serde(default)]
    pub streams: StreamOptions,
}

impl BusConfig {
    /// Parse and validate configuration text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for endpoint in [&self.publisher, &self.subscriber].into_iter().flatten() {
            endpoint.validate()?;
        }
        if self.streams.capacity == 0 || self.streams.capacity > MAX_STREAM_CAPACITY {
            return Err(ConfigError::Invalid(format!(
                "stream capacity must be between 1 and {}, got {}",
                MAX_STREAM_CAPACITY, self.streams.capacity
            )));
        }
        if self.streams.policy == EnqueuePolicy::Timeout(std::time::Duration::ZERO) {
            return Err(ConfigError::Invalid(
                "stream timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

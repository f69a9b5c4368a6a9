// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only event journal
//!
//! One JSON object per line: a sequence number and the event in its wire
//! representation. Lines that no longer decode are skipped on read, the
//! same way the bus drops undecodable frames.

use super::matcher::TopicMatcher;
use crate::event::Event;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::trace;

/// A journaled event with its position in the journal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalRecord {
    /// Monotonic sequence number, starting at 1
    pub sequence: u64,
    pub event: Event,
}

/// Journal of events for audit and replay
pub struct EventJournal {
    path: PathBuf,
    sequence: u64,
}

impl EventJournal {
    /// Open or create a journal at the given path
    pub fn open(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        // Count existing entries to set sequence
        let sequence = if path.exists() {
            let file = File::open(&path)?;
            BufReader::new(file).lines().count() as u64
        } else {
            0
        };

        Ok(Self { path, sequence })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an event to the journal
    pub fn append(&mut self, event: &Event) -> std::io::Result<JournalRecord> {
        let record = JournalRecord {
            sequence: self.sequence + 1,
            event: event.clone(),
        };

        let json = serde_json::to_string(&record)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", json)?;

        self.sequence = record.sequence;
        Ok(record)
    }

    /// Read every decodable record
    pub fn read_all(&self) -> std::io::Result<Vec<JournalRecord>> {
        if !self.path.exists() {
            return Ok(vec![]);
        }

        let file = File::open(&self.path)?;
        let mut records = Vec::new();

        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<JournalRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => trace!(line = index + 1, error = %e, "skipping undecodable journal line"),
            }
        }

        Ok(records)
    }

    /// Records whose topic the matcher accepts
    pub fn query(&self, matcher: &TopicMatcher) -> std::io::Result<Vec<JournalRecord>> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|r| matcher.matches(r.event.topic()))
            .collect())
    }

    /// Records after a sequence number
    pub fn after(&self, sequence: u64) -> std::io::Result<Vec<JournalRecord>> {
        Ok(self
            .read_all()?
            .into_iter()
            .filter(|r| r.sequence > sequence)
            .collect())
    }

    pub fn current_sequence(&self) -> u64 {
        self.sequence
    }
}

#[cfg(test)]
#[path = "journal_tests.rs"]
mod tests;

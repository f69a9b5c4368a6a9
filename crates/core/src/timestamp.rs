// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical event timestamp text format
//!
//! Timestamps travel as `YYYY-MM-DD HH:MM:SS.ffffff`: fixed width, six
//! fractional digits, UTC implied with no zone suffix.

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};

/// chrono format string for the canonical representation
pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Length of a canonical timestamp string
pub const WIDTH: usize = 26;

/// Format an instant in the canonical text format
pub fn format(ts: &DateTime<Utc>) -> String {
    ts.format(FORMAT).to_string()
}

/// Parse a canonical timestamp, returning `None` for anything else
pub fn parse(s: &str) -> Option<DateTime<Utc>> {
    if s.len() != WIDTH {
        return None;
    }
    NaiveDateTime::parse_from_str(s, FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Drop sub-microsecond precision so the value survives a text round trip
pub fn normalize(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.trunc_subsecs(6)
}

#[cfg(test)]
#[path = "timestamp_tests.rs"]
mod tests;
